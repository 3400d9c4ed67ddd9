use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex as StdMutex},
    time::Duration,
};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::error::ProcessError;
use crate::processor::ReportProcessing;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

type PendingTimers = Arc<StdMutex<HashMap<PathBuf, JoinHandle<()>>>>;

/// Watches an input directory for report files and drives the processor.
///
/// Turns the noisy filesystem event stream into a low-noise, serialized
/// sequence of processing attempts: per-path debouncing coalesces the burst
/// of events a single write produces, a global mutex keeps at most one file
/// in flight, and transient i/o failures are retried with linear backoff.
pub struct FileMonitor {
    processor: Arc<dyn ReportProcessing>,
    debounce: Duration,
    max_retries: u32,
    retry_backoff: Duration,
    pending: PendingTimers,
    watcher: Option<Arc<StdMutex<RecommendedWatcher>>>,
    event_loop: Option<JoinHandle<()>>,
}

impl FileMonitor {
    pub fn new(
        processor: Arc<dyn ReportProcessing>,
        debounce: Duration,
        max_retries: u32,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            processor,
            debounce,
            max_retries,
            retry_backoff,
            pending: Arc::new(StdMutex::new(HashMap::new())),
            watcher: None,
            event_loop: None,
        }
    }

    /// Begins watching `input_dir` for report files. Creates the input and
    /// output directories if absent. Fails fast on empty paths or directory
    /// creation failure; these are the only errors fatal to the service.
    pub fn start_monitoring(
        &mut self,
        input_dir: &Path,
        output_dir: &Path,
        reference_path: &Path,
    ) -> Result<(), ProcessError> {
        if self.event_loop.is_some() {
            return Err(ProcessError::Configuration(
                "monitoring already started".to_string(),
            ));
        }

        validate_paths(input_dir, output_dir, reference_path)?;

        tracing::info!(path = %input_dir.display(), "starting file monitoring");

        for dir in [input_dir, output_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| ProcessError::io(dir, e))?;
                tracing::info!(path = %dir.display(), "created directory");
            }
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let watcher = RecommendedWatcher::new(
            move |event: notify::Result<Event>| {
                let _ = tx.send(event);
            },
            notify::Config::default(),
        )
        .map_err(|e| ProcessError::Configuration(format!("failed to create watcher: {e}")))?;

        let watcher = Arc::new(StdMutex::new(watcher));
        lock_unpoisoned(&watcher)
            .watch(input_dir, RecursiveMode::NonRecursive)
            .map_err(|e| {
                ProcessError::Configuration(format!(
                    "failed to watch {}: {e}",
                    input_dir.display()
                ))
            })?;

        let driver = Arc::new(ProcessDriver {
            processor: self.processor.clone(),
            process_lock: tokio::sync::Mutex::new(()),
            output_dir: output_dir.to_path_buf(),
            reference_path: reference_path.to_path_buf(),
            max_retries: self.max_retries,
            retry_backoff: self.retry_backoff,
        });

        let pending = self.pending.clone();
        let debounce = self.debounce;
        let watcher_for_restart = watcher.clone();
        let watched_dir = input_dir.to_path_buf();

        let event_loop = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    Ok(event) => {
                        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                            continue;
                        }
                        for path in event.paths {
                            if is_report_candidate(&path) {
                                tracing::debug!(file = %path.display(), "file change detected");
                                schedule_processing(&pending, &driver, debounce, path);
                            }
                        }
                    }
                    Err(error) => {
                        tracing::error!(%error, "file system watcher error");
                        restart_watcher(&watcher_for_restart, &watched_dir);
                    }
                }
            }
        });

        self.watcher = Some(watcher);
        self.event_loop = Some(event_loop);

        tracing::info!("file monitoring started");
        Ok(())
    }

    /// Unsubscribes from events and cancels every pending debounce timer.
    /// Idempotent; safe before `start_monitoring` and on repeated calls. A
    /// processing attempt already past its timer runs to completion.
    pub fn stop_monitoring(&mut self) {
        if self.watcher.is_none() && self.event_loop.is_none() {
            return;
        }

        tracing::info!("stopping file monitoring");

        if let Some(event_loop) = self.event_loop.take() {
            event_loop.abort();
        }
        self.watcher = None;

        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for (_, timer) in pending.drain() {
            timer.abort();
        }
    }
}

impl Drop for FileMonitor {
    fn drop(&mut self) {
        self.stop_monitoring();
    }
}

/// Everything a debounce timer needs to run one processing attempt. Shared
/// by all timers; the mutex inside is the global serialization primitive.
struct ProcessDriver {
    processor: Arc<dyn ReportProcessing>,
    process_lock: tokio::sync::Mutex<()>,
    output_dir: PathBuf,
    reference_path: PathBuf,
    max_retries: u32,
    retry_backoff: Duration,
}

impl ProcessDriver {
    /// Retries transient i/o failures only: attempt `n` sleeps
    /// `n * retry_backoff` before the next try. Every other error is final
    /// for this file; it is logged and monitoring continues.
    async fn process_with_retry(&self, path: &Path) {
        for attempt in 1..=self.max_retries {
            match self.process_file(path).await {
                Ok(()) => return,
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    tracing::warn!(
                        attempt,
                        file = %path.display(),
                        error = %e,
                        "transient i/o failure, retrying with backoff"
                    );
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(e) => {
                    metrics::counter!("reports_failed_total").increment(1);
                    tracing::error!(
                        file = %path.display(),
                        category = e.category(),
                        error = %e,
                        "report processing failed"
                    );
                    return;
                }
            }
        }
    }

    async fn process_file(&self, path: &Path) -> Result<(), ProcessError> {
        let _guard = self.process_lock.lock().await;

        // Best-effort readiness probe: a file the producer is still writing
        // stays untouched, and the next event for it restarts the cycle.
        if !is_file_ready(path) {
            tracing::info!(file = %path.display(), "file not ready, waiting for next event");
            return Ok(());
        }

        let output_path = self.output_dir.join(result_file_name(path));
        self.processor
            .process_report(path, &output_path, &self.reference_path)
            .await
    }
}

/// Arms a fresh one-shot timer for `path`, cancelling any timer already
/// pending for it. Only the timer that survives uncancelled fires, so a
/// burst of events for one file becomes exactly one processing attempt.
fn schedule_processing(
    pending: &PendingTimers,
    driver: &Arc<ProcessDriver>,
    debounce: Duration,
    path: PathBuf,
) {
    let timer = tokio::spawn({
        let pending = pending.clone();
        let driver = driver.clone();
        let path = path.clone();
        async move {
            tokio::time::sleep(debounce).await;
            pending
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .remove(&path);
            driver.process_with_retry(&path).await;
        }
    });

    let mut pending = pending
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(existing) = pending.insert(path, timer) {
        metrics::counter!("events_coalesced_total").increment(1);
        existing.abort();
    }
}

/// One restart attempt after a watcher-reported error; a second failure is
/// logged and monitoring degrades silently.
fn restart_watcher(watcher: &Arc<StdMutex<RecommendedWatcher>>, dir: &Path) {
    let mut guard = lock_unpoisoned(watcher);
    let restarted = guard
        .unwatch(dir)
        .and_then(|()| guard.watch(dir, RecursiveMode::NonRecursive));
    match restarted {
        Ok(()) => tracing::info!("file system watcher restarted"),
        Err(error) => tracing::error!(%error, "failed to restart file system watcher"),
    }
}

fn lock_unpoisoned<T>(mutex: &StdMutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn validate_paths(
    input_dir: &Path,
    output_dir: &Path,
    reference_path: &Path,
) -> Result<(), ProcessError> {
    for (label, path) in [
        ("input", input_dir),
        ("output", output_dir),
        ("reference data", reference_path),
    ] {
        if path.as_os_str().is_empty() {
            return Err(ProcessError::Configuration(format!(
                "{label} path cannot be empty"
            )));
        }
    }
    Ok(())
}

/// Opens the file for read and write as a proxy for "the producer is done
/// with it". Not a guarantee, just enough to skip files mid-copy.
fn is_file_ready(path: &Path) -> bool {
    std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .is_ok()
}

pub fn result_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}-Result.xml")
}

fn is_report_candidate(path: &Path) -> bool {
    let has_xml_extension = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("xml"))
        .unwrap_or(false);
    if !has_xml_extension {
        return false;
    }

    match path.file_name() {
        Some(name) => {
            let name = name.to_string_lossy();
            !(name.starts_with('~') || name.starts_with('.') || name.ends_with(".tmp"))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingProcessor {
        calls: AtomicU32,
        io_failures_before_success: AtomicU32,
    }

    #[async_trait::async_trait]
    impl ReportProcessing for CountingProcessor {
        async fn process_report(
            &self,
            input_path: &Path,
            _output_path: &Path,
            _reference_path: &Path,
        ) -> Result<(), ProcessError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.io_failures_before_success.load(Ordering::SeqCst);
            if remaining > 0 {
                self.io_failures_before_success
                    .store(remaining - 1, Ordering::SeqCst);
                return Err(ProcessError::io(
                    input_path,
                    std::io::Error::other("simulated transient failure"),
                ));
            }
            Ok(())
        }
    }

    fn driver(processor: Arc<CountingProcessor>, dir: &Path) -> Arc<ProcessDriver> {
        Arc::new(ProcessDriver {
            processor,
            process_lock: tokio::sync::Mutex::new(()),
            output_dir: dir.join("out"),
            reference_path: dir.join("reference.xml"),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_secs(1),
        })
    }

    fn touch(path: &Path) {
        std::fs::write(path, "<GenerationReport/>").expect("write file");
    }

    #[test]
    fn report_candidates_filter_temporaries_and_extensions() {
        assert!(is_report_candidate(Path::new("/in/report.xml")));
        assert!(is_report_candidate(Path::new("/in/REPORT.XML")));
        assert!(!is_report_candidate(Path::new("/in/report.txt")));
        assert!(!is_report_candidate(Path::new("/in/~report.xml")));
        assert!(!is_report_candidate(Path::new("/in/.report.xml")));
        assert!(!is_report_candidate(Path::new("/in/report.xml.tmp")));
    }

    #[test]
    fn result_file_name_appends_suffix_to_stem() {
        assert_eq!(
            result_file_name(Path::new("/in/GenerationReport.xml")),
            "GenerationReport-Result.xml"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_events_coalesces_into_one_attempt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.xml");
        touch(&path);

        let processor = Arc::new(CountingProcessor::default());
        let driver = driver(processor.clone(), dir.path());
        let pending: PendingTimers = Arc::new(StdMutex::new(HashMap::new()));

        schedule_processing(&pending, &driver, DEFAULT_DEBOUNCE, path.clone());
        schedule_processing(&pending, &driver, DEFAULT_DEBOUNCE, path.clone());
        schedule_processing(&pending, &driver, DEFAULT_DEBOUNCE, path.clone());

        tokio::time::sleep(DEFAULT_DEBOUNCE * 4).await;
        assert_eq!(processor.calls.load(Ordering::SeqCst), 1);
        assert!(lock_unpoisoned(&pending).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_paths_debounce_independently() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = dir.path().join("first.xml");
        let second = dir.path().join("second.xml");
        touch(&first);
        touch(&second);

        let processor = Arc::new(CountingProcessor::default());
        let driver = driver(processor.clone(), dir.path());
        let pending: PendingTimers = Arc::new(StdMutex::new(HashMap::new()));

        schedule_processing(&pending, &driver, DEFAULT_DEBOUNCE, first);
        schedule_processing(&pending, &driver, DEFAULT_DEBOUNCE, second);

        tokio::time::sleep(DEFAULT_DEBOUNCE * 4).await;
        assert_eq!(processor.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn io_errors_are_retried_up_to_three_attempts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.xml");
        touch(&path);

        let processor = Arc::new(CountingProcessor::default());
        processor.io_failures_before_success.store(2, Ordering::SeqCst);
        let driver = driver(processor.clone(), dir.path());

        driver.process_with_retry(&path).await;
        assert_eq!(processor.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn io_errors_stop_after_max_attempts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.xml");
        touch(&path);

        let processor = Arc::new(CountingProcessor::default());
        processor.io_failures_before_success.store(10, Ordering::SeqCst);
        let driver = driver(processor.clone(), dir.path());

        driver.process_with_retry(&path).await;
        assert_eq!(processor.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn validation_failures_are_not_retried() {
        struct RejectingProcessor {
            calls: AtomicU32,
        }

        #[async_trait::async_trait]
        impl ReportProcessing for RejectingProcessor {
            async fn process_report(
                &self,
                _input_path: &Path,
                _output_path: &Path,
                _reference_path: &Path,
            ) -> Result<(), ProcessError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Err(ProcessError::Validation("bad report".to_string()))
            }
        }

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.xml");
        touch(&path);

        let processor = Arc::new(RejectingProcessor {
            calls: AtomicU32::new(0),
        });
        let driver = Arc::new(ProcessDriver {
            processor: processor.clone(),
            process_lock: tokio::sync::Mutex::new(()),
            output_dir: dir.path().join("out"),
            reference_path: dir.path().join("reference.xml"),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_secs(1),
        });

        driver.process_with_retry(&path).await;
        assert_eq!(processor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unready_file_is_skipped_without_consuming_a_retry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("still-being-written.xml");

        let processor = Arc::new(CountingProcessor::default());
        let driver = driver(processor.clone(), dir.path());

        // The probe fails (the file does not exist yet), the attempt ends
        // silently and the processor is never invoked.
        driver.process_with_retry(&missing).await;
        assert_eq!(processor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn start_rejects_empty_paths() {
        let processor = Arc::new(CountingProcessor::default());
        let mut monitor = FileMonitor::new(
            processor,
            DEFAULT_DEBOUNCE,
            DEFAULT_MAX_RETRIES,
            DEFAULT_RETRY_BACKOFF,
        );

        let err = monitor
            .start_monitoring(Path::new(""), Path::new("/out"), Path::new("/ref.xml"))
            .unwrap_err();
        assert!(matches!(err, ProcessError::Configuration(_)));
    }

    #[tokio::test]
    async fn start_creates_missing_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        let reference = dir.path().join("reference.xml");

        let processor = Arc::new(CountingProcessor::default());
        let mut monitor = FileMonitor::new(
            processor,
            DEFAULT_DEBOUNCE,
            DEFAULT_MAX_RETRIES,
            DEFAULT_RETRY_BACKOFF,
        );

        monitor
            .start_monitoring(&input, &output, &reference)
            .expect("start");
        assert!(input.is_dir());
        assert!(output.is_dir());

        monitor.stop_monitoring();
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_safe_before_start() {
        let processor = Arc::new(CountingProcessor::default());
        let mut monitor = FileMonitor::new(
            processor,
            DEFAULT_DEBOUNCE,
            DEFAULT_MAX_RETRIES,
            DEFAULT_RETRY_BACKOFF,
        );

        monitor.stop_monitoring();

        let dir = tempfile::tempdir().expect("tempdir");
        monitor
            .start_monitoring(
                &dir.path().join("in"),
                &dir.path().join("out"),
                &dir.path().join("reference.xml"),
            )
            .expect("start");

        monitor.stop_monitoring();
        monitor.stop_monitoring();
    }
}
