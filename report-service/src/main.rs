use std::{path::Path, sync::Arc, time::Duration};

use anyhow::Result;
use report_service::{
    config::AppConfig,
    metrics_server, observability,
    monitor::FileMonitor,
    processor::ReportProcessor,
    repository::XmlRepository,
    validate::{ReferenceDataValidator, ReportValidator},
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let monitor_cfg = &cfg.monitor;

    // One repository per document type, constructed explicitly with its
    // validator; the output repository stays unvalidated on load but the
    // calculation engine only ever hands it well-formed documents.
    let processor = Arc::new(ReportProcessor::new(
        XmlRepository::with_validator(Arc::new(ReportValidator)),
        XmlRepository::with_validator(Arc::new(ReferenceDataValidator)),
        XmlRepository::new(),
    ));

    let mut monitor = FileMonitor::new(
        processor,
        Duration::from_millis(monitor_cfg.debounce_ms),
        monitor_cfg.max_retries,
        Duration::from_millis(monitor_cfg.retry_backoff_ms),
    );

    monitor.start_monitoring(
        Path::new(&monitor_cfg.input_folder_path),
        Path::new(&monitor_cfg.output_folder_path),
        Path::new(&monitor_cfg.reference_data_path),
    )?;

    tracing::info!("watching for generation reports, ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    monitor.stop_monitoring();
    Ok(())
}
