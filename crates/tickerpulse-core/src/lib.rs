//! Shared configuration and reference data for tickerpulse.

pub mod app_config;
pub mod config;
pub mod securities;

pub use app_config::{AppConfig, Environment, RedditCredentials, SinkKind, SupabaseCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use securities::{clean_company_name, load_securities, parse_securities, SearchTerms, Security};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read constituents file {path}: {source}")]
    ConstituentsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse constituents file: {0}")]
    ConstituentsFileParse(#[from] csv::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}
