use crate::app_config::{AppConfig, Environment, MatchMode, DEFAULT_USER_AGENT};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// config. Tests drive this with a `HashMap` lookup instead of `set_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("SKUSCAN_ENV", "development"))
        .map_err(|reason| invalid("SKUSCAN_ENV", reason))?;
    let log_level = or_default("SKUSCAN_LOG_LEVEL", "info");
    let sites_path = PathBuf::from(or_default("SKUSCAN_SITES_PATH", "./config/sites.yaml"));

    let request_timeout_secs = parse_u64("SKUSCAN_REQUEST_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "SKUSCAN_REQUEST_TIMEOUT_SECS",
            "must be at least 1".to_string(),
        ));
    }
    let user_agent = or_default("SKUSCAN_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = parse_u32("SKUSCAN_MAX_RETRIES", "1")?;
    let retry_backoff_base_ms = parse_u64("SKUSCAN_RETRY_BACKOFF_BASE_MS", "500")?;
    let max_candidates = parse_positive_usize("SKUSCAN_MAX_CANDIDATES", "3")?;
    let max_concurrent_sources = parse_positive_usize("SKUSCAN_MAX_CONCURRENT_SOURCES", "4")?;
    let match_mode = parse_match_mode(&or_default("SKUSCAN_MATCH_MODE", "tolerant"))
        .map_err(|reason| invalid("SKUSCAN_MATCH_MODE", reason))?;

    Ok(AppConfig {
        env,
        log_level,
        sites_path,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        max_candidates,
        max_concurrent_sources,
        match_mode,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "development" | "dev" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" | "prod" => Ok(Environment::Production),
        other => Err(format!(
            "unknown environment \"{other}\"; expected development, test, or production"
        )),
    }
}

fn parse_match_mode(s: &str) -> Result<MatchMode, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "tolerant" => Ok(MatchMode::Tolerant),
        "exact" => Ok(MatchMode::Exact),
        other => Err(format!(
            "unknown match mode \"{other}\"; expected tolerant or exact"
        )),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
