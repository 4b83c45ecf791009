use std::net::SocketAddr;
use std::path::PathBuf;

use crate::geodesic::{Coordinates, DistanceFormula};

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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// JSON array of facility records served by the API.
    pub data_path: PathBuf,
    /// Enables geocoding and Street View images when set.
    pub google_maps_api_key: Option<String>,
    pub geocoder_base_url: String,
    pub geocoder_timeout_secs: u64,
    pub geocoder_max_retries: u32,
    pub geocoder_backoff_base_ms: u64,
    pub max_concurrent_geocodes: usize,
    /// Used for any facility whose location cannot be resolved.
    pub fallback_coords: Coordinates,
    pub distance_formula: DistanceFormula,
    pub cache_max_age_secs: u64,
    pub allowed_origins: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("data_path", &self.data_path)
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("geocoder_timeout_secs", &self.geocoder_timeout_secs)
            .field("geocoder_max_retries", &self.geocoder_max_retries)
            .field("geocoder_backoff_base_ms", &self.geocoder_backoff_base_ms)
            .field("max_concurrent_geocodes", &self.max_concurrent_geocodes)
            .field("fallback_coords", &self.fallback_coords)
            .field("distance_formula", &self.distance_formula)
            .field("cache_max_age_secs", &self.cache_max_age_secs)
            .field("allowed_origins", &self.allowed_origins)
            .finish()
    }
}
