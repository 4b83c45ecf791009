//! Google Geocoding API response types.
//!
//! Only the fields the client reads are modelled; everything else in the
//! payload is ignored.

use serde::Deserialize;
use studyspaces_core::Coordinates;

/// Top-level body of `GET /maps/api/geocode/json`.
///
/// `status` is `"OK"` on success. `"ZERO_RESULTS"`, `"OVER_QUERY_LIMIT"`,
/// `"REQUEST_DENIED"` and friends come back with HTTP 200 and an empty
/// `results` list.
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Coordinates {
    fn from(value: LatLng) -> Self {
        Coordinates::new(value.lat, value.lng)
    }
}
