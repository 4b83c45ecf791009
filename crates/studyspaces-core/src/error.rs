use thiserror::Error;

/// Errors raised while loading application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Errors from the distance formulas.
#[derive(Debug, Error, PartialEq)]
pub enum GeodesicError {
    /// Vincenty's λ iteration did not settle; typical for near-antipodal points.
    #[error("vincenty formula failed to converge after {iterations} iterations")]
    Convergence { iterations: u32 },

    #[error("unknown distance formula '{0}' (expected 'vincenty' or 'spherical')")]
    UnknownFormula(String),
}

/// A time-of-day string in an hours table that is not `HH:MM`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HoursError {
    #[error("malformed time of day '{value}'")]
    Malformed { value: String },
}

/// Errors reading the facility data file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read facility data at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse facility data at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Unrecognised sort or filter option.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("unknown sort option '{0}' (expected Closest, Furthest, Highest Rated or Name)")]
    UnknownSort(String),

    #[error("unknown status filter '{0}' (expected All, Open or Closed)")]
    UnknownFilter(String),
}
