pub mod calculate;
pub mod config;
pub mod error;
pub mod metrics_server;
pub mod monitor;
pub mod observability;
pub mod processor;
pub mod repository;
pub mod validate;

pub use error::ProcessError;
pub use monitor::FileMonitor;
pub use repository::XmlRepository;
