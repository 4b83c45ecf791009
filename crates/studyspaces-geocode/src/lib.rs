//! Google Geocoding API client used to place facilities that ship with an
//! address but no coordinates.

pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod types;

pub use client::GoogleGeocoder;
pub use error::GeocodeError;
