use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Root element of the result document written next to each processed
/// report. The three sections are independent projections of the same input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "GenerationOutput", rename_all = "PascalCase")]
pub struct GenerationOutput {
    pub totals: Totals,
    pub max_emission_generators: MaxEmissionGenerators,
    pub actual_heat_rates: ActualHeatRates,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(rename = "Generator", default)]
    pub generators: Vec<GeneratorTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeneratorTotal {
    pub name: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaxEmissionGenerators {
    #[serde(rename = "Day", default)]
    pub days: Vec<MaxEmissionDay>,
}

/// Highest-emitting fossil generator for one calendar date. All fields are
/// absent when no fossil generator produced that date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MaxEmissionDay {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emission: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActualHeatRates {
    #[serde(rename = "ActualHeatRate", default)]
    pub heat_rates: Vec<ActualHeatRate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActualHeatRate {
    pub name: String,
    pub heat_rate: Decimal,
}
