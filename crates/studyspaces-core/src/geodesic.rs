//! Geodesic distance between two latitude/longitude points.
//!
//! Two formulas are available:
//!
//! - [`spherical_distance_km`]: haversine on a sphere of radius 6371 km.
//!   Closed form, cannot fail.
//! - [`vincenty_distance_km`]: Vincenty's inverse formula on the WGS-84
//!   ellipsoid. Iterative; may fail to converge for near-antipodal points.
//!
//! Both take decimal degrees and return full-precision kilometers. Use
//! [`round_km`] when a figure is shown to a user or put on the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GeodesicError;

/// Mean Earth radius used by the spherical formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// WGS-84 semi-major axis in meters.
const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

const VINCENTY_TOLERANCE: f64 = 1e-12;
pub const VINCENTY_MAX_ITERATIONS: u32 = 1000;

/// A point in decimal degrees. Serialized as a `[lat, lng]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `true` when both components are finite and inside the usual
    /// latitude/longitude ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

/// Which distance formula a caller wants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceFormula {
    Spherical,
    #[default]
    Vincenty,
}

impl DistanceFormula {
    /// Distance in kilometers using this formula.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::Convergence`] when the Vincenty iteration does
    /// not settle. The spherical formula never fails.
    pub fn distance_km(self, a: Coordinates, b: Coordinates) -> Result<f64, GeodesicError> {
        match self {
            Self::Spherical => Ok(spherical_distance_km(a, b)),
            Self::Vincenty => vincenty_distance_km(a, b),
        }
    }
}

impl fmt::Display for DistanceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spherical => write!(f, "spherical"),
            Self::Vincenty => write!(f, "vincenty"),
        }
    }
}

impl FromStr for DistanceFormula {
    type Err = GeodesicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spherical" | "haversine" => Ok(Self::Spherical),
            "vincenty" | "ellipsoidal" => Ok(Self::Vincenty),
            other => Err(GeodesicError::UnknownFormula(other.to_string())),
        }
    }
}

/// Great-circle distance on a sphere of radius [`EARTH_RADIUS_KM`].
#[must_use]
pub fn spherical_distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Ellipsoidal distance on WGS-84 using Vincenty's inverse formula.
///
/// Coincident points (sinσ = 0) yield exactly `0.0`.
///
/// # Errors
///
/// Returns [`GeodesicError::Convergence`] when λ has not settled to within
/// 1e-12 after [`VINCENTY_MAX_ITERATIONS`] iterations.
#[allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::float_cmp
)]
pub fn vincenty_distance_km(p1: Coordinates, p2: Coordinates) -> Result<f64, GeodesicError> {
    let a = WGS84_A;
    let f = WGS84_F;
    let b = a * (1.0 - f);

    let l = (p2.lng - p1.lng).to_radians();
    let u1 = ((1.0 - f) * p1.lat.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * p2.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut iterations = 0u32;

    let (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m) = loop {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            return Ok(0.0);
        }

        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha.powi(2);
        // Equatorial lines have cos²α = 0; the midpoint term is then zero.
        let cos_2sigma_m = if cos_sq_alpha == 0.0 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));

        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));
        iterations += 1;

        if (lambda - previous).abs() <= VINCENTY_TOLERANCE {
            break (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m);
        }
        if iterations >= VINCENTY_MAX_ITERATIONS {
            return Err(GeodesicError::Convergence { iterations });
        }
    };

    let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = big_b
        * sin_sigma
        * (cos_2sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                    - big_b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma.powi(2))
                        * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));

    let meters = b * big_a * (sigma - delta_sigma);
    Ok(meters / 1000.0)
}

/// Round a distance to two decimal places for display and transport.
#[must_use]
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}
