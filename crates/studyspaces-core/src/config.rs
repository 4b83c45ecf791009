use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::error::ConfigError;
use crate::geodesic::{Coordinates, DistanceFormula};

/// Dickinson College campus center, Carlisle PA.
pub const DEFAULT_FALLBACK_LAT: &str = "40.2025";
pub const DEFAULT_FALLBACK_LNG: &str = "-77.1989";

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
/// Decoupled from the process environment so tests can feed a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let env = parse_environment(&or_default("STUDYSPACES_ENV", "development"));
    let bind_addr: SocketAddr =
        parse_var(&or_default, "STUDYSPACES_BIND_ADDR", "0.0.0.0:3002")?;
    let log_level = or_default("STUDYSPACES_LOG_LEVEL", "info");
    let data_path = PathBuf::from(or_default("STUDYSPACES_DATA_PATH", "./data/data.json"));
    let google_maps_api_key = lookup("GOOGLE_MAPS_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let geocoder_base_url =
        or_default("STUDYSPACES_GEOCODER_BASE_URL", "https://maps.googleapis.com");

    let geocoder_timeout_secs =
        parse_var(&or_default, "STUDYSPACES_GEOCODER_TIMEOUT_SECS", "10")?;
    let geocoder_max_retries = parse_var(&or_default, "STUDYSPACES_GEOCODER_MAX_RETRIES", "2")?;
    let geocoder_backoff_base_ms =
        parse_var(&or_default, "STUDYSPACES_GEOCODER_BACKOFF_BASE_MS", "500")?;
    let max_concurrent_geocodes: usize =
        parse_var(&or_default, "STUDYSPACES_MAX_CONCURRENT_GEOCODES", "4")?;

    let fallback_coords = Coordinates::new(
        parse_var(&or_default, "STUDYSPACES_FALLBACK_LAT", DEFAULT_FALLBACK_LAT)?,
        parse_var(&or_default, "STUDYSPACES_FALLBACK_LNG", DEFAULT_FALLBACK_LNG)?,
    );
    if !fallback_coords.is_valid() {
        return Err(ConfigError::InvalidEnvVar {
            var: "STUDYSPACES_FALLBACK_LAT/STUDYSPACES_FALLBACK_LNG".to_string(),
            reason: format!("{fallback_coords} is not a valid latitude/longitude"),
        });
    }

    let distance_formula: DistanceFormula =
        parse_var(&or_default, "STUDYSPACES_DISTANCE_FORMULA", "vincenty")?;
    let cache_max_age_secs = parse_var(&or_default, "STUDYSPACES_CACHE_MAX_AGE_SECS", "300")?;
    let allowed_origins = or_default("STUDYSPACES_ALLOWED_ORIGINS", "http://localhost:3000")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_path,
        google_maps_api_key,
        geocoder_base_url,
        geocoder_timeout_secs,
        geocoder_max_retries,
        geocoder_backoff_base_ms,
        max_concurrent_geocodes: max_concurrent_geocodes.max(1),
        fallback_coords,
        distance_formula,
        cache_max_age_secs,
        allowed_origins,
    })
}

fn parse_var<T, D>(or_default: &D, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    D: Fn(&str, &str) -> String,
{
    or_default(var, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
