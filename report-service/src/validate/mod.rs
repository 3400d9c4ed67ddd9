use generation_domain::{GenerationDay, GenerationReport, GeneratorRef, ReferenceData};
use rust_decimal::Decimal;

use crate::error::ProcessError;

/// Business-rule gate run by the repository after load and before save.
#[async_trait::async_trait]
pub trait Validator<T>: Send + Sync {
    async fn validate(&self, data: &T) -> Result<(), ProcessError>;
}

/// Pure validation of a generation report.
///
/// Rules:
/// - at least one generator across all fuel sections
/// - every generator has a name and at least one generation day
/// - energy and price are non-negative on every day
/// - wind generators carry a location
/// - emissions rating, heat input and net generation are non-negative
pub fn validate_report(report: &GenerationReport) -> Result<(), ProcessError> {
    if report.generators().next().is_none() {
        return Err(ProcessError::Validation(
            "generation report contains no generator data".to_string(),
        ));
    }

    for generator in report.generators() {
        validate_generator(&generator)?;
    }

    Ok(())
}

fn validate_generator(generator: &GeneratorRef<'_>) -> Result<(), ProcessError> {
    if generator.name().is_empty() {
        return Err(ProcessError::Validation(
            "found generator with missing name".to_string(),
        ));
    }

    let name = generator.name();

    if generator.days().is_empty() {
        return Err(ProcessError::Validation(format!(
            "generator {name} has no generation data"
        )));
    }

    for day in generator.days() {
        validate_day(name, day)?;
    }

    match generator {
        GeneratorRef::Wind(wind) => {
            if wind.location.is_empty() {
                return Err(ProcessError::Validation(format!(
                    "wind generator {name} has no location specified"
                )));
            }
        }
        GeneratorRef::Gas(gas) => {
            ensure_non_negative(name, "emissions rating", gas.emissions_rating)?;
        }
        GeneratorRef::Coal(coal) => {
            ensure_non_negative(name, "emissions rating", coal.emissions_rating)?;
            ensure_non_negative(name, "total heat input", coal.total_heat_input)?;
            ensure_non_negative(name, "actual net generation", coal.actual_net_generation)?;
        }
    }

    Ok(())
}

fn validate_day(name: &str, day: &GenerationDay) -> Result<(), ProcessError> {
    if day.energy < Decimal::ZERO {
        return Err(ProcessError::Validation(format!(
            "generator {name} has negative energy for {}",
            day.date
        )));
    }
    if day.price < Decimal::ZERO {
        return Err(ProcessError::Validation(format!(
            "generator {name} has negative price for {}",
            day.date
        )));
    }
    Ok(())
}

fn ensure_non_negative(name: &str, field: &str, value: Decimal) -> Result<(), ProcessError> {
    if value < Decimal::ZERO {
        return Err(ProcessError::Validation(format!(
            "generator {name} has negative {field}"
        )));
    }
    Ok(())
}

/// Pure validation of reference data: the factors block must be present and
/// all six factor values strictly positive.
pub fn validate_reference_data(data: &ReferenceData) -> Result<(), ProcessError> {
    let factors = data.factors.as_ref().ok_or_else(|| {
        ProcessError::Validation("reference data must contain factors".to_string())
    })?;

    ensure_positive("high value factor", factors.value_factor.high)?;
    ensure_positive("medium value factor", factors.value_factor.medium)?;
    ensure_positive("low value factor", factors.value_factor.low)?;
    ensure_positive("high emission factor", factors.emissions_factor.high)?;
    ensure_positive("medium emission factor", factors.emissions_factor.medium)?;
    ensure_positive("low emission factor", factors.emissions_factor.low)?;

    Ok(())
}

fn ensure_positive(field: &str, value: Decimal) -> Result<(), ProcessError> {
    if value <= Decimal::ZERO {
        return Err(ProcessError::Validation(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(())
}

#[derive(Clone, Default)]
pub struct ReportValidator;

#[async_trait::async_trait]
impl Validator<GenerationReport> for ReportValidator {
    async fn validate(&self, data: &GenerationReport) -> Result<(), ProcessError> {
        match validate_report(data) {
            Ok(()) => Ok(()),
            Err(e) => {
                metrics::counter!("validation_report_rejected_total").increment(1);
                Err(e)
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct ReferenceDataValidator;

#[async_trait::async_trait]
impl Validator<ReferenceData> for ReferenceDataValidator {
    async fn validate(&self, data: &ReferenceData) -> Result<(), ProcessError> {
        match validate_reference_data(data) {
            Ok(()) => Ok(()),
            Err(e) => {
                metrics::counter!("validation_reference_data_rejected_total").increment(1);
                Err(e)
            }
        }
    }
}
