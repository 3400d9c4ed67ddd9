pub mod output;
pub mod reference;
pub mod report;

pub use output::{
    ActualHeatRate, ActualHeatRates, GenerationOutput, GeneratorTotal, MaxEmissionDay,
    MaxEmissionGenerators, Totals,
};
pub use reference::{EmissionsFactor, Factors, ReferenceData, ValueFactor};
pub use report::{
    CoalGenerator, CoalSection, GasGenerator, GasSection, GenerationData, GenerationDay,
    GenerationReport, GeneratorRef, GeneratorType, WindGenerator, WindSection,
};
