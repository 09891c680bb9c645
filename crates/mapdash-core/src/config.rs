use std::path::PathBuf;

use crate::app_config::AppConfig;
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
/// Decoupled from the process environment so tests can drive it from a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = optional("DATABASE_URL");
    let log_level = or_default("MAPDASH_LOG_LEVEL", "info");

    let territory_boundaries_path = PathBuf::from(or_default(
        "MAPDASH_TERRITORY_BOUNDARIES_PATH",
        "./storage/territories.geojson",
    ));
    let county_boundaries_path = PathBuf::from(or_default(
        "MAPDASH_COUNTY_BOUNDARIES_PATH",
        "./storage/counties.geojson",
    ));
    let aliases_path = optional("MAPDASH_ALIASES_PATH").map(PathBuf::from);

    let report_base_url = or_default("MAPDASH_REPORT_BASE_URL", "http://127.0.0.1:8001");
    let generation_base_url =
        or_default("MAPDASH_GENERATION_BASE_URL", "http://127.0.0.1:8000");
    let http_user_agent = or_default("MAPDASH_HTTP_USER_AGENT", "mapdash/0.1 (market-discovery)");

    let generation_timeout_secs = parse_u64("MAPDASH_GENERATION_TIMEOUT_SECS", "300")?;
    let generation_max_attempts = parse_u32("MAPDASH_GENERATION_MAX_ATTEMPTS", "3")?;
    if generation_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MAPDASH_GENERATION_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let generation_backoff_base_secs = parse_u64("MAPDASH_GENERATION_BACKOFF_BASE_SECS", "2")?;

    let db_max_connections = parse_u32("MAPDASH_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("MAPDASH_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "MAPDASH_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }
    let db_acquire_timeout_secs = parse_u64("MAPDASH_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        log_level,
        territory_boundaries_path,
        county_boundaries_path,
        aliases_path,
        report_base_url,
        generation_base_url,
        http_user_agent,
        generation_timeout_secs,
        generation_max_attempts,
        generation_backoff_base_secs,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
