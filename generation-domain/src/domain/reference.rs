use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Root element of the reference-data document. Re-read on every processing
/// cycle so external updates take effect without a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "ReferenceData", rename_all = "PascalCase")]
pub struct ReferenceData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factors: Option<Factors>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Factors {
    #[serde(default)]
    pub value_factor: ValueFactor,
    #[serde(default)]
    pub emissions_factor: EmissionsFactor,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValueFactor {
    pub high: Decimal,
    pub medium: Decimal,
    pub low: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmissionsFactor {
    pub high: Decimal,
    pub medium: Decimal,
    pub low: Decimal,
}
