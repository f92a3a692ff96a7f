//! Effective display-time resolution for a station on a schedule.
//!
//! A station can be the origin, the terminus, or an intermediate stop; each
//! has its own source for the displayed `HH:MM`. A missing time means the row
//! is not displayable on that board, never an error.

use crate::models::{Schedule, TimeKind};
use crate::station_matching::find_served_stop;
use crate::station_names_match;
use chrono::{Duration, NaiveTime, Timelike};

/// The `HH:MM` shown for this station on this schedule, if any.
pub fn station_time<'a>(schedule: &'a Schedule, station: &str, kind: TimeKind) -> Option<&'a str> {
    match kind {
        TimeKind::Departure if station_names_match(station, &schedule.departure_station) => {
            return Some(&schedule.departure_time);
        }
        TimeKind::Arrival if station_names_match(station, &schedule.arrival_station) => {
            return Some(&schedule.arrival_time);
        }
        _ => {}
    }
    let stop = find_served_stop(schedule, station)?;
    let time = match kind {
        TimeKind::Departure => stop.departure_time.as_deref(),
        TimeKind::Arrival => stop.arrival_time.as_deref(),
    };
    time.filter(|t| !t.is_empty())
}

/// Parse a wall-clock `HH:MM` string. Any other shape is unusable for
/// display and resolves to `None`.
pub fn parse_hhmm(time: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M").ok()
}

/// Rescheduled clock time after applying a delay, wrapping at midnight.
/// `None` when there is no delay or the base time is unusable.
pub fn delayed_time(base: &str, delay_minutes: u32) -> Option<String> {
    if delay_minutes == 0 {
        return None;
    }
    let shifted = parse_hhmm(base)? + Duration::minutes(i64::from(delay_minutes));
    Some(format!("{:02}:{:02}", shifted.hour(), shifted.minute()))
}
