use std::{env, path::Path, sync::Arc};

use anyhow::{bail, Result};
use report_service::{
    config::AppConfig,
    monitor, observability,
    processor::{ReportProcessing, ReportProcessor},
    repository::XmlRepository,
    validate::{ReferenceDataValidator, ReportValidator},
};

/// One-shot processing of a single report file, without watching. Output
/// and reference-data locations come from the regular service config.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: process_report <report_xml_path>");
    }
    let input = Path::new(&args[1]);

    let cfg = AppConfig::load()?;
    let monitor_cfg = &cfg.monitor;

    let processor = ReportProcessor::new(
        XmlRepository::with_validator(Arc::new(ReportValidator)),
        XmlRepository::with_validator(Arc::new(ReferenceDataValidator)),
        XmlRepository::new(),
    );

    let output =
        Path::new(&monitor_cfg.output_folder_path).join(monitor::result_file_name(input));

    processor
        .process_report(input, &output, Path::new(&monitor_cfg.reference_data_path))
        .await?;

    tracing::info!(output = %output.display(), "report processed");
    Ok(())
}
