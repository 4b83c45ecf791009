use thiserror::Error;

/// Errors returned by the geocoding client.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The API answered `ZERO_RESULTS`, or `OK` with an empty result list.
    #[error("no geocoding results for '{address}'")]
    NoResults { address: String },

    /// Any other non-`OK` status (`REQUEST_DENIED`, `OVER_QUERY_LIMIT`, ...).
    #[error("geocoding API error {status}: {message}")]
    Api { status: String, message: String },

    /// Blank address; no request is made.
    #[error("address is empty")]
    InvalidAddress,

    /// The configured base URL could not be parsed.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
