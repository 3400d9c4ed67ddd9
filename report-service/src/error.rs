use std::path::PathBuf;

/// Failure categories for a single file-processing cycle.
///
/// Only `Io` is considered transient and retried by the monitor; everything
/// else aborts the current file and is surfaced through logging.
#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to deserialize {type_name} from {}: {reason}", path.display())]
    Deserialization {
        type_name: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("failed to serialize {type_name}: {reason}")]
    Serialization {
        type_name: &'static str,
        reason: String,
    },

    #[error("validation failed: {0}")]
    Validation(String),
}

impl ProcessError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short category label used in logs and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Io { .. } => "io",
            Self::Deserialization { .. } => "deserialization",
            Self::Serialization { .. } => "serialization",
            Self::Validation(_) => "validation",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
