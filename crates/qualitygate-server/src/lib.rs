pub mod bootstrap;
pub mod config;
pub mod error;
pub mod observability;
pub mod qualitygate;
pub mod reconcile;
pub mod startup;

pub use config::{
    AppConfig, BootstrapConfig, LoggingConfig, PostgresStorageConfig, StorageBackend,
    StorageConfig,
};
pub use error::{ConditionError, StartupError};
pub use observability::init_tracing;
pub use qualitygate::{ConditionsUpdater, QualityGates};
pub use reconcile::{RegisterQualityGates, RegisterReport};
pub use startup::StartupReport;
