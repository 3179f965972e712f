use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Desktop browser user agent sent with every catalog request. Several
/// storefronts serve a stripped page (or a bot challenge) to non-browser agents.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How identifiers are compared against candidate page text.
///
/// `Tolerant` treats every run of separators (`-`, `.`, whitespace) in the
/// identifier as optional, so `HV6341-702` also matches `hv6341 702` and
/// `hv6341702`. `Exact` is a plain substring test on normalized text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Exact,
    #[default]
    Tolerant,
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMode::Exact => write!(f, "exact"),
            MatchMode::Tolerant => write!(f, "tolerant"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub sites_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// How many discovered candidates are fetched and verified per site.
    pub max_candidates: usize,
    pub max_concurrent_sources: usize,
    pub match_mode: MatchMode,
}
