//! Terminal rendering of facility cards.

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use studyspaces_core::{
    evaluate, filter_facilities, round_km, sort_facilities, spherical_distance_km,
    weekly_schedule, Coordinates, DistanceFormula, EnrichedFacility, SortOption, StatusFilter,
};

/// Recompute status and distance locally, then sort and filter.
///
/// The server's figures may be minutes old by the time they are shown, and
/// distance is only present when the request carried a location.
pub fn prepare(
    facilities: &[EnrichedFacility],
    user: Option<Coordinates>,
    now: NaiveDateTime,
    sort: SortOption,
    filter: StatusFilter,
) -> Vec<EnrichedFacility> {
    let refreshed: Vec<EnrichedFacility> = facilities
        .iter()
        .map(|facility| {
            let mut facility = facility.clone();
            facility.status = evaluate(facility.hours.as_ref(), now).status;
            facility.distance = user.map(|from| {
                let km = DistanceFormula::Vincenty
                    .distance_km(from, facility.coords)
                    .unwrap_or_else(|_| spherical_distance_km(from, facility.coords));
                round_km(km)
            });
            facility
        })
        .collect();

    filter_facilities(&sort_facilities(&refreshed, sort), filter)
}

/// `"Open until 5:00pm"`, `"Open"`, `"Closed"` or `"Closed today"`.
pub fn status_line(facility: &EnrichedFacility, now: NaiveDateTime) -> String {
    let evaluation = evaluate(facility.hours.as_ref(), now);
    match (evaluation.is_open(), evaluation.closes_at) {
        (true, Some(closes_at)) => format!("Open until {closes_at}"),
        (true, None) => "Open".to_string(),
        (false, _) if evaluation.scheduled_today => "Closed".to_string(),
        (false, _) => "Closed today".to_string(),
    }
}

pub fn render_card(facility: &EnrichedFacility, now: NaiveDateTime) -> String {
    let mut card = String::new();
    let _ = writeln!(card, "{}  [#{}]", facility.name, facility.slug());
    let _ = writeln!(card, "  {}", status_line(facility, now));

    if let Some(km) = facility.distance {
        let _ = writeln!(card, "  {km:.2} km away");
    }
    if let Some(rating) = facility.rating {
        let _ = writeln!(card, "  Rating: {rating:.1}");
    }
    if let Some(address) = &facility.address {
        let _ = writeln!(card, "  {address}");
    }
    if let Some(station) = &facility.station {
        let _ = writeln!(card, "  Station: {station}");
    }
    if let Some(image) = &facility.image {
        let _ = writeln!(card, "  Image: {image}");
    }
    if let Some(hours) = &facility.hours {
        let _ = writeln!(card, "  View Hours:");
        for day in weekly_schedule(hours) {
            let _ = writeln!(card, "    {:<10} {}", day.day, day.label);
        }
    }
    card
}

pub fn render_list(
    facilities: &[EnrichedFacility],
    now: NaiveDateTime,
    sort: SortOption,
    filter: StatusFilter,
) -> String {
    if facilities.is_empty() {
        return "No study spaces found.\n".to_string();
    }

    let mut out = format!(
        "{} study spaces (sorted by {sort}, showing {filter:?})\n\n",
        facilities.len()
    );
    for facility in facilities {
        out.push_str(&render_card(facility, now));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Weekday};
    use studyspaces_core::{FacilityStatus, WeeklyHours};

    use super::*;

    /// Monday 2024-01-01.
    fn monday_at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn facility(name: &str, coords: Coordinates, hours: Option<WeeklyHours>) -> EnrichedFacility {
        EnrichedFacility {
            name: name.to_string(),
            address: None,
            coords,
            hours,
            rating: None,
            station: None,
            image: None,
            status: FacilityStatus::Closed,
            distance: None,
            extra: serde_json::Map::new(),
        }
    }

    fn library() -> EnrichedFacility {
        facility(
            "Waidner-Spahr Library",
            Coordinates::new(40.2028, -77.1975),
            Some(WeeklyHours::from([
                (Weekday::Mon, "08:00", "23:00"),
                (Weekday::Tue, "08:00", "23:00"),
            ])),
        )
    }

    #[test]
    fn prepare_refreshes_status_and_distance() {
        let stale = vec![library()];
        let user = Coordinates::new(40.2025, -77.1989);
        let out = prepare(
            &stale,
            Some(user),
            monday_at(9, 0),
            SortOption::Closest,
            StatusFilter::All,
        );

        assert_eq!(out[0].status, FacilityStatus::Open);
        let km = out[0].distance.expect("distance with a user location");
        assert!(km > 0.0 && km < 1.0, "{km}");
        assert_eq!(stale[0].status, FacilityStatus::Closed, "input untouched");
    }

    #[test]
    fn prepare_applies_filter_after_refresh() {
        let facilities = vec![
            library(),
            facility("Kline Center", Coordinates::new(40.2051, -77.1939), None),
        ];
        let open = prepare(
            &facilities,
            None,
            monday_at(9, 0),
            SortOption::Name,
            StatusFilter::Open,
        );
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].name, "Waidner-Spahr Library");
        assert!(open[0].distance.is_none());
    }

    #[test]
    fn status_line_variants() {
        let lib = library();
        assert_eq!(status_line(&lib, monday_at(9, 0)), "Open until 11:00pm");
        assert_eq!(status_line(&lib, monday_at(23, 30)), "Closed");

        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(status_line(&lib, sunday), "Closed today");

        let all_day = facility(
            "Annex",
            Coordinates::new(40.2, -77.2),
            Some(WeeklyHours::from([(Weekday::Mon, "00:00", "24:00")])),
        );
        assert_eq!(status_line(&all_day, monday_at(3, 0)), "Open");
    }

    #[test]
    fn card_lists_hours_and_slug() {
        let mut lib = library();
        lib.distance = Some(0.12);
        let card = render_card(&lib, monday_at(9, 0));

        assert!(card.starts_with("Waidner-Spahr Library  [#waidner-spahr-library]"), "{card}");
        assert!(card.contains("0.12 km away"));
        assert!(card.contains("View Hours:"));
        assert!(card.contains("Monday     8:00am - 11:00pm"), "{card}");
        assert!(card.contains("Sunday     Closed"), "{card}");
    }

    #[test]
    fn empty_list_has_placeholder() {
        let out = render_list(&[], monday_at(9, 0), SortOption::Closest, StatusFilter::All);
        assert_eq!(out, "No study spaces found.\n");
    }
}
