//! Facility enrichment: coordinates, open/closed status and distance.
//!
//! [`EnrichmentPipeline::enrich`] turns the raw data-file records into the
//! list a client renders:
//!
//! 1. Records without a name are logged and dropped. Names are emitted
//!    trimmed of surrounding whitespace.
//! 2. Coordinates come from the record, else the [`Geocoder`] (by address),
//!    else the configured fallback location. Geocoding failures never fail
//!    the batch.
//! 3. Status is evaluated against the caller-supplied instant.
//! 4. Distance is attached only when the caller knows the user's location,
//!    and the list is then ordered nearest first.
//!
//! Geocode lookups run concurrently, but results are gathered in input order
//! before sorting, so completion order never leaks into the output.

use std::fmt;
use std::future::Future;

use chrono::NaiveDateTime;
use futures::stream::{self, StreamExt};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::app_config::AppConfig;
use crate::facility::{EnrichedFacility, FacilityRecord};
use crate::geodesic::{round_km, spherical_distance_km, Coordinates, DistanceFormula};
use crate::hours;
use crate::listing::by_distance_ascending;

/// Keys the pipeline writes itself; a data record's own copies are dropped
/// from `extra` so each appears once in the output.
const COMPUTED_KEYS: [&str; 9] = [
    "name", "address", "coords", "hours", "rating", "station", "image", "status", "distance",
];

/// Resolves a street address to coordinates.
///
/// Any error means "coordinates unavailable"; the pipeline substitutes its
/// fallback location and moves on.
pub trait Geocoder: Send + Sync {
    type Error: fmt::Display + Send;

    fn geocode(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Coordinates, Self::Error>> + Send;
}

/// Builds Street View static-image URLs for records that ship without an image.
#[derive(Clone)]
pub struct StreetViewImages {
    base_url: String,
    api_key: String,
}

impl StreetViewImages {
    #[must_use]
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    #[must_use]
    pub fn image_url(&self, address: &str) -> String {
        format!(
            "{}/maps/api/streetview?size=400x400&location={}&key={}",
            self.base_url,
            utf8_percent_encode(address, NON_ALPHANUMERIC),
            self.api_key
        )
    }
}

impl fmt::Debug for StreetViewImages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreetViewImages")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .finish()
    }
}

#[derive(Debug)]
pub struct EnrichmentPipeline<G> {
    geocoder: Option<G>,
    fallback: Coordinates,
    formula: DistanceFormula,
    max_concurrent: usize,
    street_view: Option<StreetViewImages>,
}

impl<G: Geocoder> EnrichmentPipeline<G> {
    /// A pipeline using Vincenty distances, four concurrent lookups and no
    /// image fallback. Pass `None` to skip geocoding entirely.
    #[must_use]
    pub fn new(geocoder: Option<G>, fallback: Coordinates) -> Self {
        Self {
            geocoder,
            fallback,
            formula: DistanceFormula::default(),
            max_concurrent: 4,
            street_view: None,
        }
    }

    /// Pipeline settings taken from application config. Street View images
    /// are enabled whenever a Google Maps key is configured.
    #[must_use]
    pub fn from_config(geocoder: Option<G>, config: &AppConfig) -> Self {
        let street_view = config
            .google_maps_api_key
            .as_deref()
            .map(|key| StreetViewImages::new(&config.geocoder_base_url, key));
        Self::new(geocoder, config.fallback_coords)
            .with_formula(config.distance_formula)
            .with_max_concurrent(config.max_concurrent_geocodes)
            .with_street_view(street_view)
    }

    #[must_use]
    pub fn with_formula(mut self, formula: DistanceFormula) -> Self {
        self.formula = formula;
        self
    }

    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    #[must_use]
    pub fn with_street_view(mut self, street_view: Option<StreetViewImages>) -> Self {
        self.street_view = street_view;
        self
    }

    #[must_use]
    pub fn formula(&self) -> DistanceFormula {
        self.formula
    }

    /// Enrich `facilities` as seen by a user at `user` at wall-clock `now`.
    ///
    /// With a user location the result is ordered nearest first; without
    /// one every `distance` is `None` and input order is kept. Output names
    /// are trimmed.
    pub async fn enrich(
        &self,
        facilities: &[FacilityRecord],
        user: Option<Coordinates>,
        now: NaiveDateTime,
    ) -> Vec<EnrichedFacility> {
        let named: Vec<(&FacilityRecord, &str)> = facilities
            .iter()
            .enumerate()
            .filter_map(|(index, record)| match record.display_name() {
                Some(name) => Some((record, name)),
                None => {
                    tracing::warn!(index, "facility record missing name; skipping");
                    None
                }
            })
            .collect();

        let lookups: Vec<_> = named
            .iter()
            .map(|&(record, name)| self.resolve_coords(record, name))
            .collect();
        let resolved: Vec<Coordinates> = stream::iter(lookups)
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut enriched: Vec<EnrichedFacility> = named
            .into_iter()
            .zip(resolved)
            .map(|((record, name), coords)| self.stamp(record, name, coords, user, now))
            .collect();

        if user.is_some() {
            enriched.sort_by(by_distance_ascending);
        }

        tracing::debug!(
            input = facilities.len(),
            output = enriched.len(),
            with_location = user.is_some(),
            "enriched facilities"
        );
        enriched
    }

    async fn resolve_coords(&self, record: &FacilityRecord, name: &str) -> Coordinates {
        if let Some(coords) = record.coords {
            return coords;
        }

        let Some(address) = record.geocodable_address() else {
            tracing::warn!(facility = name, "no coordinates or address; using fallback location");
            return self.fallback;
        };

        let Some(geocoder) = &self.geocoder else {
            tracing::debug!(facility = name, "geocoding disabled; using fallback location");
            return self.fallback;
        };

        match geocoder.geocode(address).await {
            Ok(coords) => {
                tracing::debug!(facility = name, %coords, "geocoded facility address");
                coords
            }
            Err(e) => {
                tracing::warn!(
                    facility = name,
                    address,
                    error = %e,
                    "geocoding failed; using fallback location"
                );
                self.fallback
            }
        }
    }

    fn stamp(
        &self,
        record: &FacilityRecord,
        name: &str,
        coords: Coordinates,
        user: Option<Coordinates>,
        now: NaiveDateTime,
    ) -> EnrichedFacility {
        let status = hours::evaluate(record.hours.as_ref(), now).status;
        let distance = user.map(|from| self.distance_km(from, coords, name));
        let image = record.image.clone().or_else(|| {
            let street_view = self.street_view.as_ref()?;
            record
                .geocodable_address()
                .map(|address| street_view.image_url(address))
        });

        let mut extra = record.extra.clone();
        for key in COMPUTED_KEYS {
            extra.remove(key);
        }

        EnrichedFacility {
            name: name.to_string(),
            address: record.address.clone(),
            coords,
            hours: record.hours.clone(),
            rating: record.rating,
            station: record.station.clone(),
            image,
            status,
            distance,
            extra,
        }
    }

    fn distance_km(&self, from: Coordinates, to: Coordinates, name: &str) -> f64 {
        let km = self.formula.distance_km(from, to).unwrap_or_else(|err| {
            tracing::warn!(
                facility = name,
                error = %err,
                "distance formula failed; using spherical distance"
            );
            spherical_distance_km(from, to)
        });
        round_km(km)
    }
}

#[cfg(test)]
#[path = "enrich_test.rs"]
mod tests;
