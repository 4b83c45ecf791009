//! Open/closed evaluation against a weekday-keyed hours table.
//!
//! Hours tables map full English weekday names (`"Monday"`) to a
//! `[start, end]` pair of 24-hour `HH:MM` strings. Both ends are inclusive:
//! a facility closing at `17:00` still reports open at 17:00.
//!
//! A day whose times do not parse is treated as closed and logged; an hours
//! table is caller-supplied data, so a typo must never fail the whole batch.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::HoursError;

/// Start/end pair that means "open around the clock".
const ALWAYS_OPEN: (&str, &str) = ("00:00", "24:00");

/// Weekdays in display order.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacilityStatus {
    Open,
    Closed,
}

impl FacilityStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for FacilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weekly opening hours as stored in the data file.
///
/// Values stay as raw string lists so that a malformed entry (wrong length,
/// `null`) deserializes and is judged closed at evaluation time instead of
/// rejecting the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyHours(BTreeMap<String, Option<Vec<String>>>);

impl WeeklyHours {
    /// Raw entry for `weekday`, if the table has one.
    #[must_use]
    pub fn day(&self, weekday: Weekday) -> Option<&[String]> {
        self.0
            .get(weekday_name(weekday))
            .and_then(Option::as_deref)
    }

    /// Sets the `[start, end]` pair for `weekday`.
    pub fn insert(&mut self, weekday: Weekday, start: &str, end: &str) {
        self.0.insert(
            weekday_name(weekday).to_string(),
            Some(vec![start.to_string(), end.to_string()]),
        );
    }
}

impl<const N: usize> From<[(Weekday, &str, &str); N]> for WeeklyHours {
    fn from(days: [(Weekday, &str, &str); N]) -> Self {
        let mut hours = Self::default();
        for (weekday, start, end) in days {
            hours.insert(weekday, start, end);
        }
        hours
    }
}

/// Outcome of checking an hours table at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoursEvaluation {
    pub status: FacilityStatus,
    /// Display closing time (`"5:00pm"`), present only while open and not
    /// for round-the-clock days.
    pub closes_at: Option<String>,
    /// Whether the table has a well-formed `[start, end]` entry for the day.
    /// Lets callers say "Closed today" rather than plain "Closed".
    pub scheduled_today: bool,
}

impl HoursEvaluation {
    fn closed(scheduled_today: bool) -> Self {
        Self {
            status: FacilityStatus::Closed,
            closes_at: None,
            scheduled_today,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == FacilityStatus::Open
    }
}

/// Full English name of `weekday`. Never localized.
#[must_use]
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Decide whether a facility is open at `now` (local wall-clock time).
#[must_use]
pub fn evaluate(hours: Option<&WeeklyHours>, now: NaiveDateTime) -> HoursEvaluation {
    let weekday = now.weekday();
    let Some([start, end]) = hours.and_then(|h| h.day(weekday)) else {
        return HoursEvaluation::closed(false);
    };

    if (start.as_str(), end.as_str()) == ALWAYS_OPEN {
        return HoursEvaluation {
            status: FacilityStatus::Open,
            closes_at: None,
            scheduled_today: true,
        };
    }

    let (start_minutes, end_minutes) = match (parse_clock(start), parse_clock(end)) {
        (Ok(s), Ok(e)) => (s, e),
        (Err(err), _) | (_, Err(err)) => {
            tracing::warn!(
                day = weekday_name(weekday),
                error = %err,
                "unparseable hours entry; treating as closed"
            );
            return HoursEvaluation::closed(true);
        }
    };

    let current = now.hour() * 60 + now.minute();
    if !(start_minutes..=end_minutes).contains(&current) {
        return HoursEvaluation::closed(true);
    }

    let closes_at = if end == "00:00" {
        None
    } else {
        format_clock(end).ok()
    };

    HoursEvaluation {
        status: FacilityStatus::Open,
        closes_at,
        scheduled_today: true,
    }
}

/// Minutes since midnight for an `HH:MM` string. `24:00` is accepted as the
/// end of the day.
///
/// # Errors
///
/// Returns [`HoursError::Malformed`] for anything other than `H:MM`/`HH:MM`
/// with an hour ≤ 24 and a minute < 60.
pub fn parse_clock(value: &str) -> Result<u32, HoursError> {
    let (hour, minute) = split_clock(value)?;
    Ok(hour * 60 + minute)
}

fn split_clock(value: &str) -> Result<(u32, u32), HoursError> {
    let malformed = || HoursError::Malformed {
        value: value.to_string(),
    };

    let (h, m) = value.trim().split_once(':').ok_or_else(malformed)?;
    let hour = u32::from_str(h).map_err(|_| malformed())?;
    let minute = u32::from_str(m).map_err(|_| malformed())?;

    if minute >= 60 || hour > 24 || (hour == 24 && minute != 0) {
        return Err(malformed());
    }
    Ok((hour, minute))
}

/// 12-hour display form of an `HH:MM` string: `"17:00"` → `"5:00pm"`,
/// `"00:30"` → `"12:30am"`. Any hour from 12 up, `"24:00"` included, is `pm`.
///
/// # Errors
///
/// Returns [`HoursError::Malformed`] when `value` does not parse.
pub fn format_clock(value: &str) -> Result<String, HoursError> {
    let (hour, minute) = split_clock(value)?;
    let period = if hour < 12 { "am" } else { "pm" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    Ok(format!("{display_hour}:{minute:02}{period}"))
}

/// One line of a weekly schedule listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySchedule {
    pub day: &'static str,
    pub label: String,
}

/// Monday-to-Sunday listing: `"9:00am - 5:00pm"` or `"Closed"` per day.
#[must_use]
pub fn weekly_schedule(hours: &WeeklyHours) -> Vec<DaySchedule> {
    WEEK.iter()
        .map(|&weekday| {
            let label = match hours.day(weekday) {
                Some([start, end]) => match (format_clock(start), format_clock(end)) {
                    (Ok(s), Ok(e)) => format!("{s} - {e}"),
                    _ => format!("{start} - {end}"),
                },
                _ => "Closed".to_string(),
            };
            DaySchedule {
                day: weekday_name(weekday),
                label,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    /// 2024-01-01 was a Monday.
    fn monday_at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn nine_to_five() -> WeeklyHours {
        WeeklyHours::from([(Weekday::Mon, "09:00", "17:00")])
    }

    #[test]
    fn open_at_midday_with_closing_time() {
        let eval = evaluate(Some(&nine_to_five()), monday_at(12, 0));
        assert_eq!(eval.status, FacilityStatus::Open);
        assert_eq!(eval.closes_at.as_deref(), Some("5:00pm"));
        assert!(eval.scheduled_today);
    }

    #[test]
    fn closed_one_minute_before_opening() {
        let eval = evaluate(Some(&nine_to_five()), monday_at(8, 59));
        assert_eq!(eval.status, FacilityStatus::Closed);
        assert_eq!(eval.closes_at, None);
        assert!(eval.scheduled_today);
    }

    #[test]
    fn both_boundaries_are_inclusive() {
        assert!(evaluate(Some(&nine_to_five()), monday_at(9, 0)).is_open());
        assert!(evaluate(Some(&nine_to_five()), monday_at(17, 0)).is_open());
        assert!(!evaluate(Some(&nine_to_five()), monday_at(17, 1)).is_open());
    }

    #[test]
    fn round_the_clock_day_is_open_without_closing_time() {
        let hours = WeeklyHours::from([(Weekday::Mon, "00:00", "24:00")]);
        for (h, m) in [(0, 0), (3, 17), (12, 0), (23, 59)] {
            let eval = evaluate(Some(&hours), monday_at(h, m));
            assert_eq!(eval.status, FacilityStatus::Open, "at {h}:{m}");
            assert_eq!(eval.closes_at, None);
        }
    }

    #[test]
    fn missing_weekday_is_closed_and_unscheduled() {
        let hours = WeeklyHours::from([(Weekday::Tue, "09:00", "17:00")]);
        let eval = evaluate(Some(&hours), monday_at(12, 0));
        assert_eq!(eval.status, FacilityStatus::Closed);
        assert!(!eval.scheduled_today);
    }

    #[test]
    fn absent_table_is_closed() {
        let eval = evaluate(None, monday_at(12, 0));
        assert_eq!(eval.status, FacilityStatus::Closed);
        assert!(!eval.scheduled_today);
    }

    #[test]
    fn wrong_arity_and_null_entries_are_closed() {
        let hours: WeeklyHours =
            serde_json::from_str(r#"{"Monday": ["09:00"], "Tuesday": null}"#).unwrap();
        assert!(!evaluate(Some(&hours), monday_at(12, 0)).is_open());
        let tuesday = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert!(!evaluate(Some(&hours), tuesday).is_open());
    }

    #[test]
    fn malformed_times_are_treated_as_closed() {
        let hours = WeeklyHours::from([(Weekday::Mon, "nine", "17:00")]);
        let eval = evaluate(Some(&hours), monday_at(12, 0));
        assert_eq!(eval.status, FacilityStatus::Closed);
        assert!(eval.scheduled_today);
    }

    #[test]
    fn closing_at_twenty_four_reads_as_pm() {
        let hours = WeeklyHours::from([(Weekday::Mon, "08:00", "24:00")]);
        let eval = evaluate(Some(&hours), monday_at(20, 0));
        assert!(eval.is_open());
        assert_eq!(eval.closes_at.as_deref(), Some("12:00pm"));
    }

    #[test]
    fn midnight_end_reports_no_closing_time() {
        // Same-day comparison: an end of 00:00 only matches a 00:00 start.
        let hours = WeeklyHours::from([(Weekday::Mon, "00:00", "00:00")]);
        let eval = evaluate(Some(&hours), monday_at(0, 0));
        assert!(eval.is_open());
        assert_eq!(eval.closes_at, None);
        assert!(!evaluate(Some(&hours), monday_at(0, 1)).is_open());
    }

    #[test]
    fn parse_clock_accepts_single_digit_hours() {
        assert_eq!(parse_clock("9:05"), Ok(545));
        assert_eq!(parse_clock("24:00"), Ok(1440));
    }

    #[test]
    fn parse_clock_rejects_garbage() {
        for bad in ["", "12", "12:60", "25:00", "24:30", "ab:cd", "-1:00"] {
            assert!(parse_clock(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn format_clock_edges() {
        assert_eq!(format_clock("17:00").unwrap(), "5:00pm");
        assert_eq!(format_clock("00:30").unwrap(), "12:30am");
        assert_eq!(format_clock("12:00").unwrap(), "12:00pm");
        assert_eq!(format_clock("09:05").unwrap(), "9:05am");
        assert_eq!(format_clock("24:00").unwrap(), "12:00pm");
    }

    #[test]
    fn weekly_schedule_lists_every_day_in_order() {
        let hours = WeeklyHours::from([
            (Weekday::Mon, "08:00", "22:00"),
            (Weekday::Sun, "12:00", "18:30"),
        ]);
        let schedule = weekly_schedule(&hours);
        assert_eq!(schedule.len(), 7);
        assert_eq!(schedule[0].day, "Monday");
        assert_eq!(schedule[0].label, "8:00am - 10:00pm");
        assert_eq!(schedule[1].label, "Closed");
        assert_eq!(schedule[6].day, "Sunday");
        assert_eq!(schedule[6].label, "12:00pm - 6:30pm");
    }

    #[test]
    fn status_serializes_as_literal_strings() {
        assert_eq!(serde_json::to_string(&FacilityStatus::Open).unwrap(), "\"Open\"");
        assert_eq!(FacilityStatus::Closed.to_string(), "Closed");
    }
}
