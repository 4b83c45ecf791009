//! Client-side ordering and filtering of an enriched facility list.
//!
//! These are pure transforms over an already-enriched list: they never
//! mutate their input and all sorts are stable.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ListingError;
use crate::facility::EnrichedFacility;
use crate::hours::FacilityStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOption {
    #[default]
    Closest,
    Furthest,
    HighestRated,
    Name,
}

impl SortOption {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Closest => "Closest",
            Self::Furthest => "Furthest",
            Self::HighestRated => "Highest Rated",
            Self::Name => "Name",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortOption {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "closest" => Ok(Self::Closest),
            "furthest" => Ok(Self::Furthest),
            "highest rated" | "highest-rated" | "rating" => Ok(Self::HighestRated),
            "name" => Ok(Self::Name),
            _ => Err(ListingError::UnknownSort(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Open,
    Closed,
}

impl FromStr for StatusFilter {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(ListingError::UnknownFilter(s.to_string())),
        }
    }
}

/// Missing distances compare as +∞.
fn distance_key(facility: &EnrichedFacility) -> f64 {
    facility.distance.unwrap_or(f64::INFINITY)
}

/// Nearest first; facilities without a distance go last.
pub(crate) fn by_distance_ascending(a: &EnrichedFacility, b: &EnrichedFacility) -> Ordering {
    distance_key(a).total_cmp(&distance_key(b))
}

fn by_name(a: &EnrichedFacility, b: &EnrichedFacility) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// Return a sorted copy of `facilities`.
///
/// - `Closest`: ascending distance, missing distance last.
/// - `Furthest`: descending distance; missing distance counts as +∞ and so
///   comes first.
/// - `HighestRated`: descending rating, missing rating counts as 0.
/// - `Name`: case-insensitive, ties broken by the exact name.
#[must_use]
pub fn sort_facilities(facilities: &[EnrichedFacility], option: SortOption) -> Vec<EnrichedFacility> {
    let mut sorted = facilities.to_vec();
    match option {
        SortOption::Closest => sorted.sort_by(by_distance_ascending),
        SortOption::Furthest => sorted.sort_by(|a, b| by_distance_ascending(b, a)),
        SortOption::HighestRated => sorted.sort_by(|a, b| {
            b.rating
                .unwrap_or(0.0)
                .total_cmp(&a.rating.unwrap_or(0.0))
        }),
        SortOption::Name => sorted.sort_by(by_name),
    }
    sorted
}

/// Return the facilities whose status matches `filter`.
#[must_use]
pub fn filter_facilities(facilities: &[EnrichedFacility], filter: StatusFilter) -> Vec<EnrichedFacility> {
    let wanted = match filter {
        StatusFilter::All => return facilities.to_vec(),
        StatusFilter::Open => FacilityStatus::Open,
        StatusFilter::Closed => FacilityStatus::Closed,
    };
    facilities
        .iter()
        .filter(|f| f.status == wanted)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesic::Coordinates;

    fn facility(name: &str, distance: Option<f64>, rating: Option<f64>, open: bool) -> EnrichedFacility {
        EnrichedFacility {
            name: name.to_string(),
            address: None,
            coords: Coordinates::new(40.2, -77.2),
            hours: None,
            rating,
            station: None,
            image: None,
            status: if open {
                FacilityStatus::Open
            } else {
                FacilityStatus::Closed
            },
            distance,
            extra: serde_json::Map::new(),
        }
    }

    fn names(list: &[EnrichedFacility]) -> Vec<&str> {
        list.iter().map(|f| f.name.as_str()).collect()
    }

    fn sample() -> Vec<EnrichedFacility> {
        vec![
            facility("library", Some(1.2), Some(4.5), true),
            facility("Union", None, None, false),
            facility("Archives", Some(0.4), Some(3.0), true),
            facility("Gym", Some(2.8), Some(4.5), false),
        ]
    }

    #[test]
    fn closest_puts_missing_distance_last() {
        let sorted = sort_facilities(&sample(), SortOption::Closest);
        assert_eq!(names(&sorted), ["Archives", "library", "Gym", "Union"]);
    }

    #[test]
    fn furthest_treats_missing_distance_as_infinite() {
        let sorted = sort_facilities(&sample(), SortOption::Furthest);
        assert_eq!(names(&sorted), ["Union", "Gym", "library", "Archives"]);
    }

    #[test]
    fn highest_rated_is_stable_and_unrated_last() {
        let sorted = sort_facilities(&sample(), SortOption::HighestRated);
        assert_eq!(names(&sorted), ["library", "Gym", "Archives", "Union"]);
    }

    #[test]
    fn name_sort_ignores_case() {
        let sorted = sort_facilities(&sample(), SortOption::Name);
        assert_eq!(names(&sorted), ["Archives", "Gym", "library", "Union"]);
    }

    #[test]
    fn sorting_does_not_touch_input() {
        let input = sample();
        let _ = sort_facilities(&input, SortOption::Name);
        assert_eq!(names(&input), ["library", "Union", "Archives", "Gym"]);
    }

    #[test]
    fn status_filters_match_exactly() {
        let input = sample();
        assert_eq!(
            names(&filter_facilities(&input, StatusFilter::Open)),
            ["library", "Archives"]
        );
        assert_eq!(
            names(&filter_facilities(&input, StatusFilter::Closed)),
            ["Union", "Gym"]
        );
        assert_eq!(filter_facilities(&input, StatusFilter::All).len(), 4);
    }

    #[test]
    fn options_parse_from_ui_labels() {
        assert_eq!("Highest Rated".parse::<SortOption>(), Ok(SortOption::HighestRated));
        assert_eq!("closest".parse::<SortOption>(), Ok(SortOption::Closest));
        assert_eq!("Open".parse::<StatusFilter>(), Ok(StatusFilter::Open));
        assert!(matches!(
            "nearest".parse::<SortOption>(),
            Err(ListingError::UnknownSort(_))
        ));
        assert!("maybe".parse::<StatusFilter>().is_err());
    }
}
