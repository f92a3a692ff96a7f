//! Day-of-operation filter.
//!
//! Schedules carry a set of weekdays they run on; an empty set means the
//! schedule runs every day. The weekday always comes from an injected
//! evaluation instant so the pipeline stays a pure function of its inputs.

use crate::models::Schedule;
use chrono::{Datelike, NaiveDateTime, Weekday};

/// Whether a schedule operates on the given weekday.
pub fn runs_on(schedule: &Schedule, weekday: Weekday) -> bool {
    schedule.operating_days.is_empty() || schedule.operating_days.contains(&weekday)
}

/// Weekday of the evaluation instant (local wall-clock; the system has no
/// timezone model).
pub fn weekday_of(now: NaiveDateTime) -> Weekday {
    now.date().weekday()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Schedule;
    use chrono::NaiveDate;
    use compact_str::CompactString;

    fn make_schedule(days: Vec<Weekday>) -> Schedule {
        Schedule {
            id: 1,
            train_number: CompactString::from("891002"),
            departure_station: "Dijon".to_string(),
            arrival_station: "Besançon".to_string(),
            departure_time: "08:00".to_string(),
            arrival_time: "09:00".to_string(),
            train_type: CompactString::from("TER"),
            served_stations: Vec::new(),
            operating_days: days,
            delay_minutes: 0,
            is_cancelled: false,
            track: None,
            rolling_stock_file_name: None,
            composition: Vec::new(),
        }
    }

    #[test]
    fn empty_days_means_every_day() {
        let s = make_schedule(vec![]);
        assert!(runs_on(&s, Weekday::Mon));
        assert!(runs_on(&s, Weekday::Sun));
    }

    #[test]
    fn membership_check() {
        let s = make_schedule(vec![Weekday::Mon, Weekday::Fri]);
        assert!(runs_on(&s, Weekday::Mon));
        assert!(runs_on(&s, Weekday::Fri));
        assert!(!runs_on(&s, Weekday::Tue));
    }

    #[test]
    fn weekday_from_instant() {
        // 2026-08-31 is a Monday
        let monday = NaiveDate::from_ymd_opt(2026, 8, 31)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap();
        assert_eq!(weekday_of(monday), Weekday::Mon);
    }
}
