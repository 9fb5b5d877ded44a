pub mod app_config;
pub mod config;
pub mod leads;
pub mod lookups;

pub use app_config::{AppConfig, Environment, PlacesProvider};
pub use config::{load_app_config, load_app_config_from_env};
pub use leads::{lead_key, LeadSource, PipelineStatus};
pub use lookups::{load_lookups, parse_lookups, LookupTables};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read lookups file {path}: {source}")]
    LookupsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lookups file: {0}")]
    LookupsFileParse(#[from] serde_yaml::Error),

    #[error("lookup table validation failed: {0}")]
    Validation(String),
}
