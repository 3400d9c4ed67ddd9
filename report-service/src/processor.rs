use std::path::Path;

use generation_domain::{GenerationOutput, GenerationReport, ReferenceData};

use crate::calculate;
use crate::error::ProcessError;
use crate::repository::XmlRepository;

/// One full processing cycle for a single report file. The monitor depends
/// on this seam, which is also where tests substitute a counting stub.
#[async_trait::async_trait]
pub trait ReportProcessing: Send + Sync {
    async fn process_report(
        &self,
        input_path: &Path,
        output_path: &Path,
        reference_path: &Path,
    ) -> Result<(), ProcessError>;
}

pub struct ReportProcessor {
    report_repository: XmlRepository<GenerationReport>,
    reference_repository: XmlRepository<ReferenceData>,
    output_repository: XmlRepository<GenerationOutput>,
}

impl ReportProcessor {
    pub fn new(
        report_repository: XmlRepository<GenerationReport>,
        reference_repository: XmlRepository<ReferenceData>,
        output_repository: XmlRepository<GenerationOutput>,
    ) -> Self {
        Self {
            report_repository,
            reference_repository,
            output_repository,
        }
    }
}

#[async_trait::async_trait]
impl ReportProcessing for ReportProcessor {
    /// load -> validate -> calculate -> save. Reference data is re-read on
    /// every cycle so external updates take effect without a restart.
    async fn process_report(
        &self,
        input_path: &Path,
        output_path: &Path,
        reference_path: &Path,
    ) -> Result<(), ProcessError> {
        tracing::info!(input = %input_path.display(), "starting report processing");

        let report = self.report_repository.load(input_path).await?;
        let reference = self.reference_repository.load(reference_path).await?;

        // The reference validator has already established the factors
        // block is present.
        let factors = reference.factors.as_ref().ok_or_else(|| {
            ProcessError::Validation("reference data must contain factors".to_string())
        })?;

        let output = calculate::build_output(&report, factors);
        self.output_repository.save(&output, output_path).await?;

        metrics::counter!("reports_processed_total").increment(1);
        tracing::info!(output = %output_path.display(), "report processed");
        Ok(())
    }
}
