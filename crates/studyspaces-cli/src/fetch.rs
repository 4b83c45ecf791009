//! Fetching the enriched facility list from a running server.
//!
//! The server wraps the list as `{"data": "<base64 JSON array>", "meta": ..}`.
//! A failed fetch is retried a fixed number of times with a fixed delay; if
//! every attempt fails the caller gets an empty list and an `error` log.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, StatusCode};
use studyspaces_core::{Coordinates, EnrichedFacility};
use thiserror::Error;

/// Errors from a single fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with {0}")]
    Status(StatusCode),

    #[error("response has no string `data` field")]
    MissingData,

    #[error("`data` is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("decoded payload is not a facility list: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client for `GET /api/buildings`.
pub struct BuildingsClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl BuildingsClient {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("studyspaces-cli/0.1")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// One request, no retry.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] variant; see the type for when each applies.
    pub async fn fetch_once(
        &self,
        user: Option<Coordinates>,
    ) -> Result<Vec<EnrichedFacility>, FetchError> {
        let mut request = self.client.get(format!("{}/api/buildings", self.base_url));
        if let Some(user) = user {
            request = request.query(&[("lat", user.lat), ("lng", user.lng)]);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body: serde_json::Value = response.json().await?;
        decode_payload(&body)
    }
}

/// Extract and decode the base64 `data` field of a buildings response.
pub(crate) fn decode_payload(
    body: &serde_json::Value,
) -> Result<Vec<EnrichedFacility>, FetchError> {
    let encoded = body
        .get("data")
        .and_then(serde_json::Value::as_str)
        .ok_or(FetchError::MissingData)?;
    let bytes = STANDARD.decode(encoded)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Runs `operation` up to `retries + 1` times, sleeping `delay` between
/// attempts. Every error is retried.
pub(crate) async fn retry_fixed<T, E, F, Fut>(
    retries: u32,
    delay: Duration,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= retries {
                    return Err(err);
                }
                attempt += 1;
                tracing::warn!(
                    attempt,
                    retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// First try plus `retries`, saturating at `u32::MAX`.
pub(crate) fn total_attempts(retries: u32) -> u32 {
    retries.saturating_add(1)
}

/// Fetch with retry; an empty list once every attempt has failed.
pub async fn fetch_buildings(
    client: &BuildingsClient,
    user: Option<Coordinates>,
    retries: u32,
    delay: Duration,
) -> Vec<EnrichedFacility> {
    match retry_fixed(retries, delay, || client.fetch_once(user)).await {
        Ok(facilities) => facilities,
        Err(err) => {
            tracing::error!(
                error = %err,
                attempts = total_attempts(retries),
                "failed to fetch buildings; showing an empty list"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
