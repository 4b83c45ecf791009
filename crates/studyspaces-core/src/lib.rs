//! Domain logic for the study-spaces locator: geodesic distance, opening
//! hours, facility enrichment and the listing transforms used by clients.

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod enrich;
pub mod error;
pub mod facility;
pub mod geodesic;
pub mod hours;
pub mod listing;

pub use app_config::{AppConfig, Environment};
pub use catalog::load_facilities;
pub use config::{load_app_config, load_app_config_from_env};
pub use enrich::{EnrichmentPipeline, Geocoder, StreetViewImages};
pub use error::{CatalogError, ConfigError, GeodesicError, HoursError, ListingError};
pub use facility::{slugify, EnrichedFacility, FacilityRecord};
pub use geodesic::{
    round_km, spherical_distance_km, vincenty_distance_km, Coordinates, DistanceFormula,
};
pub use hours::{
    evaluate, format_clock, weekly_schedule, DaySchedule, FacilityStatus, HoursEvaluation,
    WeeklyHours,
};
pub use listing::{filter_facilities, sort_facilities, SortOption, StatusFilter};
