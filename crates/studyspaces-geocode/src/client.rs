//! HTTP client for the Google Geocoding API.
//!
//! Wraps `reqwest` with API key management, retry on transient failures and
//! typed response decoding. Non-`OK` statuses in the JSON body surface as
//! [`GeocodeError::NoResults`] or [`GeocodeError::Api`].

use std::time::Duration;

use reqwest::{Client, Url};
use studyspaces_core::{AppConfig, Coordinates, Geocoder};

use crate::error::GeocodeError;
use crate::retry::retry_with_backoff;
use crate::types::GeocodeResponse;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";
const GEOCODE_PATH: &str = "maps/api/geocode/json";
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_BACKOFF_BASE_MS: u64 = 500;

/// Client for the Google Geocoding API.
///
/// Use [`GoogleGeocoder::new`] for production or
/// [`GoogleGeocoder::with_base_url`] to point at a mock server in tests.
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for GoogleGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleGeocoder")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url.as_str())
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

impl GoogleGeocoder {
    /// Creates a new client pointed at the production Google Maps host.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, GeocodeError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("studyspaces/0.1 (facility-locator)")
            .build()?;

        // One trailing slash so `join` appends the geocode path instead of
        // replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeocodeError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        })
    }

    /// Builds a client from application config, or `None` when no Google
    /// Maps key is configured.
    ///
    /// # Errors
    ///
    /// Same as [`GoogleGeocoder::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, GeocodeError> {
        let Some(key) = config.google_maps_api_key.as_deref() else {
            return Ok(None);
        };
        let client =
            Self::with_base_url(key, config.geocoder_timeout_secs, &config.geocoder_base_url)?
                .with_retry(config.geocoder_max_retries, config.geocoder_backoff_base_ms);
        Ok(Some(client))
    }

    /// Overrides the retry budget and back-off base.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Resolves `address` to the first result's location.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::InvalidAddress`] if `address` is blank; no request is sent.
    /// - [`GeocodeError::NoResults`] on `ZERO_RESULTS` or an empty result list.
    /// - [`GeocodeError::Api`] for any other non-`OK` status.
    /// - [`GeocodeError::Http`] on network failure or non-2xx HTTP status,
    ///   after retries are exhausted.
    /// - [`GeocodeError::Deserialize`] if the body is not the expected shape.
    pub async fn lookup(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::InvalidAddress);
        }
        let url = self.build_url(address)?;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.lookup_once(&url, address)
        })
        .await
    }

    async fn lookup_once(&self, url: &Url, address: &str) -> Result<Coordinates, GeocodeError> {
        tracing::debug!(address, "geocoding address");
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("geocode(address={address})"),
                source: e,
            })?;
        Self::first_location(parsed, address)
    }

    fn first_location(
        response: GeocodeResponse,
        address: &str,
    ) -> Result<Coordinates, GeocodeError> {
        match response.status.as_str() {
            "OK" => response
                .results
                .into_iter()
                .next()
                .map(|r| r.geometry.location.into())
                .ok_or_else(|| GeocodeError::NoResults {
                    address: address.to_owned(),
                }),
            "ZERO_RESULTS" => Err(GeocodeError::NoResults {
                address: address.to_owned(),
            }),
            _ => Err(GeocodeError::Api {
                message: response
                    .error_message
                    .unwrap_or_else(|| "unknown error".to_owned()),
                status: response.status,
            }),
        }
    }

    /// Builds the request URL with percent-encoded `address` and `key`.
    fn build_url(&self, address: &str) -> Result<Url, GeocodeError> {
        let mut url = self
            .base_url
            .join(GEOCODE_PATH)
            .map_err(|e| GeocodeError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("key", &self.api_key);
        Ok(url)
    }
}

impl Geocoder for GoogleGeocoder {
    type Error = GeocodeError;

    async fn geocode(&self, address: &str) -> Result<Coordinates, Self::Error> {
        self.lookup(address).await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
