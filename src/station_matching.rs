//! Determines whether a schedule belongs on a station's board.
//!
//! The only non-trivial matching rule in the system: a schedule is relevant
//! to a station not just as origin or terminus but also as an intermediate
//! stop, provided the stop carries a time of the right kind. Getting this
//! wrong silently drops valid rows from the board.

use crate::models::{Direction, Schedule, ServedStop};
use crate::normalize_station_name;

/// Find the served stop matching a station, by normalised name.
pub fn find_served_stop<'a>(schedule: &'a Schedule, station: &str) -> Option<&'a ServedStop> {
    let wanted = normalize_station_name(station);
    schedule
        .served_stations
        .iter()
        .find(|stop| normalize_station_name(&stop.name) == wanted)
}

/// Whether a schedule appears on the given board for the given station.
///
/// Departures: the station is the origin, or a served stop with a departure
/// time (a boarding point before the terminus). Arrivals: the station is the
/// terminus, or a served stop with an arrival time.
pub fn is_relevant(schedule: &Schedule, station: &str, direction: Direction) -> bool {
    let wanted = normalize_station_name(station);
    match direction {
        Direction::Departures => {
            normalize_station_name(&schedule.departure_station) == wanted
                || find_served_stop(schedule, station)
                    .is_some_and(|stop| stop.departure_time.is_some())
        }
        Direction::Arrivals => {
            normalize_station_name(&schedule.arrival_station) == wanted
                || find_served_stop(schedule, station)
                    .is_some_and(|stop| stop.arrival_time.is_some())
        }
    }
}
