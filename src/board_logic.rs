//! Board preparation: the full derivation pipeline from a schedule snapshot
//! to the ordered, filtered, status-annotated rows a board renders.
//!
//! Everything here is a pure function of (snapshot, overlay, station,
//! direction, evaluation instant). A poll cycle that is superseded simply
//! discards its output; there is nothing to roll back.

use crate::models::{BoardRow, Direction, Schedule, StatusCode};
use crate::service_days::{runs_on, weekday_of};
use crate::station_matching::is_relevant;
use crate::station_names_match;
use crate::status::derive_status;
use crate::time_resolution::{delayed_time, parse_hhmm, station_time};
use crate::track_overlay::{TrackAssignments, effective_track};
use chrono::{NaiveDateTime, NaiveTime};
use itertools::Itertools;

/// A row disappears from the board once fewer than this many seconds remain
/// before its effective time (the final countdown is suppressed).
const HIDE_BEFORE_DEPARTURE_SECS: i64 = 2 * 60;

/// How long before its effective time a row's track is shown. Urban stations
/// reveal the platform late; inter-urban stations post it far in advance; the
/// simple board variant uses a fixed half-hour.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlatformWindow {
    Urban,
    InterUrban,
    Fixed(u32),
}

impl PlatformWindow {
    pub fn minutes(self) -> u32 {
        match self {
            PlatformWindow::Urban => 20,
            PlatformWindow::InterUrban => 720,
            PlatformWindow::Fixed(minutes) => minutes,
        }
    }

    /// Window for a station's persisted location type (`"Ville"` or
    /// `"Interurbain"`); unknown types fall back to urban, like the admin UI.
    pub fn for_location_type(location_type: &str) -> Self {
        if location_type.eq_ignore_ascii_case("interurbain") {
            PlatformWindow::InterUrban
        } else {
            PlatformWindow::Urban
        }
    }
}

impl Default for PlatformWindow {
    fn default() -> Self {
        PlatformWindow::Fixed(30)
    }
}

/// Seconds from the evaluation instant until a time-of-day later today.
/// Negative once the time has passed.
fn seconds_until(time: NaiveTime, now: NaiveDateTime) -> i64 {
    time.signed_duration_since(now.time()).num_seconds()
}

/// Station names for the "via" strip of a row.
///
/// Departures list the served stops strictly after the queried station (all
/// of them when the station is the origin). Arrivals list the provenance
/// chain: the origin followed by the served stops strictly before the
/// queried station. Empty when the schedule serves no intermediate stops.
pub fn via_stations(schedule: &Schedule, station: &str, direction: Direction) -> Vec<String> {
    if schedule.served_stations.is_empty() {
        return Vec::new();
    }
    let names: Vec<&str> = schedule
        .served_stations
        .iter()
        .map(|stop| stop.name.as_str())
        .collect();
    let station_idx = names
        .iter()
        .position(|name| station_names_match(name, station));

    match direction {
        Direction::Departures => {
            let after = match station_idx {
                Some(idx) => &names[idx + 1..],
                None => &names[..],
            };
            after.iter().map(|name| name.to_string()).collect()
        }
        Direction::Arrivals => {
            let before = match station_idx {
                Some(idx) => &names[..idx],
                None => &names[..],
            };
            let mut chain = Vec::with_capacity(before.len() + 1);
            if !schedule.departure_station.is_empty() {
                chain.push(schedule.departure_station.clone());
            }
            chain.extend(
                before
                    .iter()
                    .filter(|name| !station_names_match(name, &schedule.departure_station))
                    .map(|name| name.to_string()),
            );
            chain
        }
    }
}

/// Derive the full board for a station and direction at a given instant.
///
/// Pipeline: relevance filter, day-of-operation filter, effective-time
/// resolution (rows without a usable time are dropped), stable ascending
/// sort by (time, train number, id), then the visibility window. The
/// chronologically last row of the day stays visible after its time passes,
/// acting as a "last train" marker until the dataset rolls over.
pub fn prepare_board(
    schedules: &[Schedule],
    overlay: &TrackAssignments,
    station: &str,
    direction: Direction,
    now: NaiveDateTime,
    platform_window: PlatformWindow,
) -> Vec<BoardRow> {
    let weekday = weekday_of(now);
    let kind = direction.time_kind();

    let candidates: Vec<(NaiveTime, &str, &Schedule)> = schedules
        .iter()
        .filter(|schedule| is_relevant(schedule, station, direction))
        .filter(|schedule| runs_on(schedule, weekday))
        .filter_map(|schedule| {
            let time_str = station_time(schedule, station, kind)?;
            let time = parse_hhmm(time_str)?;
            Some((time, time_str, schedule))
        })
        .sorted_by_key(|(time, _, schedule)| (*time, schedule.train_number.clone(), schedule.id))
        .collect();

    let last_time = candidates.last().map(|(time, _, _)| *time);
    let platform_window_secs = i64::from(platform_window.minutes()) * 60;

    candidates
        .into_iter()
        .filter(|(time, _, _)| {
            let diff = seconds_until(*time, now);
            if diff >= HIDE_BEFORE_DEPARTURE_SECS {
                true
            } else if diff >= 0 {
                false
            } else {
                // past its time: only the last train of the day stays up
                last_time == Some(*time)
            }
        })
        .map(|(time, time_str, schedule)| {
            let status = derive_status(schedule);
            let diff = seconds_until(time, now);
            let platform = if (0..=platform_window_secs).contains(&diff) {
                Some(effective_track(schedule, station, overlay))
            } else {
                None
            };
            BoardRow {
                schedule_id: schedule.id,
                train_number: schedule.train_number.clone(),
                train_type: schedule.train_type.clone(),
                origin: schedule.departure_station.clone(),
                destination: schedule.arrival_station.clone(),
                display_time: time_str.to_string(),
                status,
                delayed_time: match status.code {
                    StatusCode::Delayed => delayed_time(time_str, status.delay_minutes),
                    _ => None,
                },
                platform,
                via: via_stations(schedule, station, direction),
                is_bus: schedule.is_bus(),
            }
        })
        .collect()
}

/// Rows shown on the physical display's alternating pages: the first page
/// holds the next 4 rows, the second the following 10.
pub fn page_rows(rows: &[BoardRow], page: usize) -> &[BoardRow] {
    match page {
        0 => &rows[..rows.len().min(4)],
        _ => &rows[rows.len().min(4)..rows.len().min(14)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServedStop;
    use chrono::{NaiveDate, Weekday};
    use compact_str::CompactString;
    use serde_json::json;

    fn make_schedule(id: i64, number: &str, dep_time: &str, arr_time: &str) -> Schedule {
        Schedule {
            id,
            train_number: CompactString::from(number),
            departure_station: "Dijon".to_string(),
            arrival_station: "Besançon".to_string(),
            departure_time: dep_time.to_string(),
            arrival_time: arr_time.to_string(),
            train_type: CompactString::from("TER"),
            served_stations: Vec::new(),
            operating_days: Vec::new(),
            delay_minutes: 0,
            is_cancelled: false,
            track: None,
            rolling_stock_file_name: None,
            composition: Vec::new(),
        }
    }

    fn stop(name: &str, dep: Option<&str>, arr: Option<&str>) -> ServedStop {
        ServedStop {
            name: name.to_string(),
            departure_time: dep.map(str::to_string),
            arrival_time: arr.map(str::to_string),
        }
    }

    // 2026-08-31 is a Monday
    fn monday_at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 31)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn tuesday_at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn dijon_besancon_via_auxonne() -> Schedule {
        let mut s = make_schedule(1, "891002", "08:00", "09:00");
        s.served_stations = vec![stop("Auxonne", Some("08:20"), Some("08:19"))];
        s.operating_days = vec![Weekday::Mon];
        s
    }

    #[test]
    fn day_filter_excludes_on_wrong_weekday() {
        let schedules = vec![dijon_besancon_via_auxonne()];
        let board = prepare_board(
            &schedules,
            &TrackAssignments::default(),
            "Auxonne",
            Direction::Departures,
            tuesday_at(6, 0),
            PlatformWindow::default(),
        );
        assert!(board.is_empty());
    }

    #[test]
    fn intermediate_stop_included_with_its_own_time() {
        let schedules = vec![dijon_besancon_via_auxonne()];
        let board = prepare_board(
            &schedules,
            &TrackAssignments::default(),
            "Auxonne",
            Direction::Departures,
            monday_at(6, 0, 0),
            PlatformWindow::default(),
        );
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].display_time, "08:20");
        assert_eq!(board[0].destination, "Besançon");
    }

    #[test]
    fn rows_sorted_by_effective_time() {
        let schedules = vec![
            make_schedule(1, "17820", "10:30", "11:30"),
            make_schedule(2, "17810", "08:15", "09:15"),
            make_schedule(3, "17815", "09:00", "10:00"),
        ];
        let board = prepare_board(
            &schedules,
            &TrackAssignments::default(),
            "Dijon",
            Direction::Departures,
            monday_at(6, 0, 0),
            PlatformWindow::default(),
        );
        let times: Vec<&str> = board.iter().map(|row| row.display_time.as_str()).collect();
        assert_eq!(times, vec!["08:15", "09:00", "10:30"]);
    }

    #[test]
    fn equal_times_tie_break_on_train_number_then_id() {
        let schedules = vec![
            make_schedule(9, "17825", "08:15", "09:15"),
            make_schedule(4, "17810", "08:15", "09:15"),
            make_schedule(2, "17810", "08:15", "09:15"),
        ];
        let board = prepare_board(
            &schedules,
            &TrackAssignments::default(),
            "Dijon",
            Direction::Departures,
            monday_at(6, 0, 0),
            PlatformWindow::default(),
        );
        let order: Vec<i64> = board.iter().map(|row| row.schedule_id).collect();
        assert_eq!(order, vec![2, 4, 9]);
    }

    #[test]
    fn visibility_boundary_at_two_minutes() {
        let schedules = vec![
            make_schedule(1, "17810", "08:00", "09:00"),
            make_schedule(2, "17820", "23:00", "23:59"),
        ];
        let overlay = TrackAssignments::default();

        // exactly 2 minutes before: visible
        let board = prepare_board(
            &schedules,
            &overlay,
            "Dijon",
            Direction::Departures,
            monday_at(7, 58, 0),
            PlatformWindow::default(),
        );
        assert!(board.iter().any(|row| row.schedule_id == 1));

        // 1 minute 59 seconds before: hidden
        let board = prepare_board(
            &schedules,
            &overlay,
            "Dijon",
            Direction::Departures,
            monday_at(7, 58, 1),
            PlatformWindow::default(),
        );
        assert!(!board.iter().any(|row| row.schedule_id == 1));

        // past its time and not the last of the day: hidden
        let board = prepare_board(
            &schedules,
            &overlay,
            "Dijon",
            Direction::Departures,
            monday_at(8, 5, 0),
            PlatformWindow::default(),
        );
        assert!(!board.iter().any(|row| row.schedule_id == 1));
    }

    #[test]
    fn last_train_of_day_stays_after_departure() {
        let schedules = vec![
            make_schedule(1, "17810", "08:00", "09:00"),
            make_schedule(2, "17820", "22:00", "23:00"),
        ];
        let board = prepare_board(
            &schedules,
            &TrackAssignments::default(),
            "Dijon",
            Direction::Departures,
            monday_at(22, 30, 0),
            PlatformWindow::default(),
        );
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].schedule_id, 2);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let schedules = vec![
            make_schedule(1, "17810", "08:00", "09:00"),
            make_schedule(2, "17820", "10:00", "11:00"),
        ];
        let overlay = TrackAssignments::default();
        let now = monday_at(6, 0, 0);
        let first = prepare_board(
            &schedules,
            &overlay,
            "Dijon",
            Direction::Departures,
            now,
            PlatformWindow::default(),
        );
        let second = prepare_board(
            &schedules,
            &overlay,
            "Dijon",
            Direction::Departures,
            now,
            PlatformWindow::default(),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn platform_only_inside_window() {
        let mut schedule = make_schedule(5, "17810", "08:00", "09:00");
        schedule.track = Some(CompactString::from("1"));
        let schedules = vec![schedule];
        let overlay = crate::track_overlay::parse_track_assignments(&json!({"5": {"Dijon": "3"}}));

        // 40 minutes out with a 30-minute window: no platform yet
        let board = prepare_board(
            &schedules,
            &overlay,
            "Dijon",
            Direction::Departures,
            monday_at(7, 20, 0),
            PlatformWindow::default(),
        );
        assert_eq!(board[0].platform, None);

        // 10 minutes out: overlay wins over the schedule's own track
        let board = prepare_board(
            &schedules,
            &overlay,
            "Dijon",
            Direction::Departures,
            monday_at(7, 50, 0),
            PlatformWindow::default(),
        );
        assert_eq!(board[0].platform.as_deref(), Some("3"));

        // inter-urban window posts the platform hours in advance
        let board = prepare_board(
            &schedules,
            &overlay,
            "Dijon",
            Direction::Departures,
            monday_at(1, 0, 0),
            PlatformWindow::InterUrban,
        );
        assert_eq!(board[0].platform.as_deref(), Some("3"));
    }

    #[test]
    fn delayed_and_cancelled_rows() {
        let mut delayed = make_schedule(1, "17810", "08:00", "09:00");
        delayed.delay_minutes = 15;
        let mut cancelled = make_schedule(2, "17820", "10:00", "11:00");
        cancelled.delay_minutes = 15;
        cancelled.is_cancelled = true;

        let board = prepare_board(
            &[delayed, cancelled],
            &TrackAssignments::default(),
            "Dijon",
            Direction::Departures,
            monday_at(6, 0, 0),
            PlatformWindow::default(),
        );
        assert_eq!(board[0].status.code, StatusCode::Delayed);
        assert_eq!(board[0].status.delay_minutes, 15);
        assert_eq!(board[0].delayed_time.as_deref(), Some("08:15"));
        assert_eq!(board[1].status.code, StatusCode::Cancelled);
        assert_eq!(board[1].status.delay_minutes, 0);
        assert_eq!(board[1].delayed_time, None);
    }

    #[test]
    fn via_strip_departures() {
        let mut s = make_schedule(1, "17810", "08:00", "09:00");
        s.served_stations = vec![
            stop("Auxonne", Some("08:20"), Some("08:19")),
            stop("Dole", Some("08:36"), Some("08:35")),
        ];
        // from the origin: every served stop
        assert_eq!(
            via_stations(&s, "Dijon", Direction::Departures),
            vec!["Auxonne", "Dole"]
        );
        // from an intermediate stop: only what lies ahead
        assert_eq!(
            via_stations(&s, "Auxonne", Direction::Departures),
            vec!["Dole"]
        );
        assert!(via_stations(&s, "Dole", Direction::Departures).is_empty());
    }

    #[test]
    fn via_strip_arrivals_prepends_origin() {
        let mut s = make_schedule(1, "17810", "08:00", "09:00");
        s.served_stations = vec![
            stop("Auxonne", Some("08:20"), Some("08:19")),
            stop("Dole", Some("08:36"), Some("08:35")),
        ];
        assert_eq!(
            via_stations(&s, "Dole", Direction::Arrivals),
            vec!["Dijon", "Auxonne"]
        );
        // at the terminus: whole provenance chain
        assert_eq!(
            via_stations(&s, "Besançon", Direction::Arrivals),
            vec!["Dijon", "Auxonne", "Dole"]
        );
    }

    #[test]
    fn pagination_slices() {
        let schedules: Vec<Schedule> = (0..16)
            .map(|i| make_schedule(i, &format!("{}", 17800 + i), &format!("{:02}:00", 6 + i), "23:00"))
            .collect();
        let board = prepare_board(
            &schedules,
            &TrackAssignments::default(),
            "Dijon",
            Direction::Departures,
            monday_at(0, 30, 0),
            PlatformWindow::default(),
        );
        assert_eq!(board.len(), 16);
        assert_eq!(page_rows(&board, 0).len(), 4);
        assert_eq!(page_rows(&board, 1).len(), 10);
        assert_eq!(page_rows(&board[..3], 1).len(), 0);
    }

    #[test]
    fn unusable_time_drops_row_not_batch() {
        let schedules = vec![
            make_schedule(1, "17810", "garbage", "09:00"),
            make_schedule(2, "17820", "10:00", "11:00"),
        ];
        let board = prepare_board(
            &schedules,
            &TrackAssignments::default(),
            "Dijon",
            Direction::Departures,
            monday_at(6, 0, 0),
            PlatformWindow::default(),
        );
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].schedule_id, 2);
    }
}
