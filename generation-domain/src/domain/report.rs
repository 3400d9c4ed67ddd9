use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Root element of an incoming generation report.
///
/// Each fuel section is optional in the document; a missing section simply
/// contributes no generators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "GenerationReport", rename_all = "PascalCase")]
pub struct GenerationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind: Option<WindSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<GasSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coal: Option<CoalSection>,
}

impl GenerationReport {
    /// Flattened view over all generators, in stable Wind -> Gas -> Coal
    /// document order.
    pub fn generators(&self) -> impl Iterator<Item = GeneratorRef<'_>> {
        let wind = self
            .wind
            .iter()
            .flat_map(|s| s.generators.iter().map(GeneratorRef::Wind));
        let gas = self
            .gas
            .iter()
            .flat_map(|s| s.generators.iter().map(GeneratorRef::Gas));
        let coal = self
            .coal
            .iter()
            .flat_map(|s| s.generators.iter().map(GeneratorRef::Coal));
        wind.chain(gas).chain(coal)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindSection {
    #[serde(rename = "WindGenerator", default)]
    pub generators: Vec<WindGenerator>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GasSection {
    #[serde(rename = "GasGenerator", default)]
    pub generators: Vec<GasGenerator>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoalSection {
    #[serde(rename = "CoalGenerator", default)]
    pub generators: Vec<CoalGenerator>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WindGenerator {
    pub name: String,
    #[serde(default)]
    pub generation: GenerationData,
    pub location: String,
}

impl WindGenerator {
    pub fn generator_type(&self) -> GeneratorType {
        if self.location.eq_ignore_ascii_case("Offshore") {
            GeneratorType::OffshoreWind
        } else {
            GeneratorType::OnshoreWind
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GasGenerator {
    pub name: String,
    #[serde(default)]
    pub generation: GenerationData,
    pub emissions_rating: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CoalGenerator {
    pub name: String,
    #[serde(default)]
    pub generation: GenerationData,
    pub emissions_rating: Decimal,
    pub total_heat_input: Decimal,
    pub actual_net_generation: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationData {
    #[serde(rename = "Day", default)]
    pub days: Vec<GenerationDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GenerationDay {
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub energy: Decimal,
    pub price: Decimal,
}

/// Generator classification, fixed at load time from the generator's static
/// fields and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorType {
    OffshoreWind,
    OnshoreWind,
    Gas,
    Coal,
}

impl std::fmt::Display for GeneratorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::OffshoreWind => "OffshoreWind",
            Self::OnshoreWind => "OnshoreWind",
            Self::Gas => "Gas",
            Self::Coal => "Coal",
        };
        f.write_str(name)
    }
}

/// Borrowed view of a generator of any fuel family.
///
/// The closed set of variants carries exactly the fields relevant to each
/// family; emissions rating is exposed as an `Option` so callers never
/// reach into a variant that has none.
#[derive(Debug, Clone, Copy)]
pub enum GeneratorRef<'a> {
    Wind(&'a WindGenerator),
    Gas(&'a GasGenerator),
    Coal(&'a CoalGenerator),
}

impl<'a> GeneratorRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Self::Wind(g) => &g.name,
            Self::Gas(g) => &g.name,
            Self::Coal(g) => &g.name,
        }
    }

    pub fn days(&self) -> &'a [GenerationDay] {
        match self {
            Self::Wind(g) => &g.generation.days,
            Self::Gas(g) => &g.generation.days,
            Self::Coal(g) => &g.generation.days,
        }
    }

    pub fn generator_type(&self) -> GeneratorType {
        match self {
            Self::Wind(g) => g.generator_type(),
            Self::Gas(_) => GeneratorType::Gas,
            Self::Coal(_) => GeneratorType::Coal,
        }
    }

    /// Emissions rating for fossil-fuel generators, `None` for wind.
    pub fn emissions_rating(&self) -> Option<Decimal> {
        match self {
            Self::Wind(_) => None,
            Self::Gas(g) => Some(g.emissions_rating),
            Self::Coal(g) => Some(g.emissions_rating),
        }
    }

    pub fn is_fossil(&self) -> bool {
        matches!(self, Self::Gas(_) | Self::Coal(_))
    }
}
