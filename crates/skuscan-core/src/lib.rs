pub mod app_config;
pub mod config;
pub mod records;
pub mod sites;

pub use app_config::{AppConfig, Environment, MatchMode, DEFAULT_USER_AGENT};
pub use config::{load_app_config, load_app_config_from_env};
pub use records::{
    ComparisonResult, ExtractedRecord, FaultKind, Identifier, LookupOutcome, MatchTier, PriceRow,
    ProductDetails, MODEL_PLACEHOLDER, PRICE_UNAVAILABLE, TITLE_PLACEHOLDER,
};
pub use sites::{load_sites, parse_sites, SiteConfig, SitesFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sites file {path}: {source}")]
    SitesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sites file: {0}")]
    SitesFileParse(#[from] serde_yaml::Error),

    #[error("sites validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("identifier is empty")]
    EmptyIdentifier,
}
