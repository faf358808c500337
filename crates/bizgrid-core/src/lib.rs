pub mod app_config;
pub mod config;
pub mod regions;
pub mod types;
pub mod validate;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    Business, GeographyMode, JobStatus, Location, RunStats, SearchJobConfig, StopReason,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read regions file {path}: {source}")]
    RegionsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse regions file: {0}")]
    RegionsFileParse(#[from] serde_yaml::Error),

    #[error("invalid regions file: {0}")]
    Validation(String),
}
