use generation_domain::{
    ActualHeatRate, ActualHeatRates, Factors, GenerationOutput, GenerationReport, GeneratorTotal,
    GeneratorType, MaxEmissionDay, MaxEmissionGenerators, Totals,
};
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};

/// Value factor applied when converting daily energy into monetary value.
pub fn value_factor(generator_type: GeneratorType, factors: &Factors) -> Decimal {
    match generator_type {
        GeneratorType::OffshoreWind => factors.value_factor.low,
        GeneratorType::OnshoreWind => factors.value_factor.high,
        GeneratorType::Gas => factors.value_factor.medium,
        GeneratorType::Coal => factors.value_factor.medium,
    }
}

/// Emission factor applied to fossil-fuel generation. Wind carries no
/// emissions, so both wind types map to zero.
pub fn emission_factor(generator_type: GeneratorType, factors: &Factors) -> Decimal {
    match generator_type {
        GeneratorType::Gas => factors.emissions_factor.medium,
        GeneratorType::Coal => factors.emissions_factor.high,
        GeneratorType::OffshoreWind | GeneratorType::OnshoreWind => Decimal::ZERO,
    }
}

pub fn generation_value(
    energy: Decimal,
    price: Decimal,
    generator_type: GeneratorType,
    factors: &Factors,
) -> Decimal {
    energy * price * value_factor(generator_type, factors)
}

pub fn emissions(
    energy: Decimal,
    emissions_rating: Decimal,
    generator_type: GeneratorType,
    factors: &Factors,
) -> Decimal {
    energy * emissions_rating * emission_factor(generator_type, factors)
}

/// Pure transform of a validated report plus factor snapshot into the
/// output document. Performs no I/O; the three sections are independent
/// projections of the same input.
pub fn build_output(report: &GenerationReport, factors: &Factors) -> GenerationOutput {
    GenerationOutput {
        totals: Totals {
            generators: generator_totals(report, factors),
        },
        max_emission_generators: MaxEmissionGenerators {
            days: max_emissions_by_day(report, factors),
        },
        actual_heat_rates: ActualHeatRates {
            heat_rates: heat_rates(report),
        },
    }
}

/// Per-generator sum of `energy * price * value_factor` over its generation
/// days, in stable input order. A generator with no days totals zero.
fn generator_totals(report: &GenerationReport, factors: &Factors) -> Vec<GeneratorTotal> {
    report
        .generators()
        .map(|generator| {
            let generator_type = generator.generator_type();
            let total = generator
                .days()
                .iter()
                .map(|day| generation_value(day.energy, day.price, generator_type, factors))
                .sum();

            GeneratorTotal {
                name: generator.name().to_string(),
                total,
            }
        })
        .collect()
}

struct DayGroup {
    date: Date,
    best: Option<(String, OffsetDateTime, Decimal)>,
}

/// Highest-emitting fossil generator per calendar date, dates in
/// first-occurrence order. Ties resolve to the first entry in generator/day
/// iteration order; a date with no fossil data still yields an entry, with
/// all fields absent.
fn max_emissions_by_day(report: &GenerationReport, factors: &Factors) -> Vec<MaxEmissionDay> {
    let mut groups: Vec<DayGroup> = Vec::new();

    for generator in report.generators() {
        let generator_type = generator.generator_type();
        for day in generator.days() {
            let date = day.date.date();
            let index = match groups.iter().position(|g| g.date == date) {
                Some(index) => index,
                None => {
                    groups.push(DayGroup { date, best: None });
                    groups.len() - 1
                }
            };
            let group = &mut groups[index];

            // Wind has no emissions rating and never competes.
            if let Some(rating) = generator.emissions_rating() {
                let emission = emissions(day.energy, rating, generator_type, factors);
                let beats_current = match &group.best {
                    Some((_, _, current)) => emission > *current,
                    None => true,
                };
                if beats_current {
                    group.best = Some((generator.name().to_string(), day.date, emission));
                }
            }
        }
    }

    groups
        .into_iter()
        .map(|group| match group.best {
            Some((name, date, emission)) => MaxEmissionDay {
                name: Some(name),
                date: Some(date),
                emission: Some(emission),
            },
            None => MaxEmissionDay::default(),
        })
        .collect()
}

/// `total_heat_input / actual_net_generation` for each coal generator, with
/// an explicit zero when net generation is zero.
fn heat_rates(report: &GenerationReport) -> Vec<ActualHeatRate> {
    let coal = match &report.coal {
        Some(section) => section.generators.as_slice(),
        None => return Vec::new(),
    };

    coal.iter()
        .map(|generator| {
            let heat_rate = if generator.actual_net_generation == Decimal::ZERO {
                Decimal::ZERO
            } else {
                generator.total_heat_input / generator.actual_net_generation
            };

            ActualHeatRate {
                name: generator.name.clone(),
                heat_rate,
            }
        })
        .collect()
}
