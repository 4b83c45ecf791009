use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use studyspaces_core::{load_facilities, Coordinates};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// `?lat=&lng=`; kept as strings so that `lat=` alone reads as "no location".
#[derive(Debug, Default, Deserialize)]
pub(super) struct BuildingsQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

impl BuildingsQuery {
    /// The requesting user's location, or `None` unless both values are
    /// present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns a message when a value is present but is not a number, or
    /// the pair is outside latitude/longitude range.
    fn user_location(&self) -> Result<Option<Coordinates>, String> {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
        };
        let (Some(lat), Some(lng)) = (non_empty(&self.lat), non_empty(&self.lng)) else {
            return Ok(None);
        };

        let lat: f64 = lat
            .parse()
            .map_err(|_| format!("lat must be a number, got '{lat}'"))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| format!("lng must be a number, got '{lng}'"))?;

        let coords = Coordinates::new(lat, lng);
        if !coords.is_valid() {
            return Err(format!("{coords} is not a valid latitude/longitude"));
        }
        Ok(Some(coords))
    }
}

/// Enriched facility list, serialized to JSON and base64-encoded into `data`.
pub(super) async fn list_buildings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BuildingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user = query
        .user_location()
        .map_err(|msg| ApiError::new(req_id.0.clone(), "validation_error", msg))?;

    let path = Arc::clone(&state.data_path);
    let records = tokio::task::spawn_blocking(move || load_facilities(&path))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "facility loader task failed");
            ApiError::new(req_id.0.clone(), "internal_error", "failed to load data")
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "failed to load facility data");
            ApiError::new(req_id.0.clone(), "internal_error", "failed to load data")
        })?;

    let now = (state.clock)();
    let enriched = state.pipeline.enrich(&records, user, now).await;

    let json = serde_json::to_vec(&enriched).map_err(|e| {
        tracing::error!(error = %e, "failed to serialize facilities");
        ApiError::new(req_id.0.clone(), "internal_error", "failed to encode data")
    })?;

    tracing::info!(
        count = enriched.len(),
        with_location = user.is_some(),
        "served buildings"
    );

    Ok((
        [(
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.cache_max_age_secs),
        )],
        Json(ApiResponse {
            data: STANDARD.encode(json),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
