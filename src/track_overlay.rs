//! Per-schedule, per-station track assignment overlay.
//!
//! The admin side assigns a track to a (schedule, station) pair without
//! touching the schedule record; this overlay takes precedence over the
//! schedule's own default track. It is keyed independently of board
//! direction: the same station can hold different tracks for a schedule that
//! departs there versus one that terminates there.

use crate::TRACK_PLACEHOLDER;
use crate::models::Schedule;
use crate::normalize_station_name;
use ahash::AHashMap;
use compact_str::CompactString;
use serde_json::Value;
use tracing::warn;

/// schedule id -> normalised station name -> track label
pub type TrackAssignments = AHashMap<i64, AHashMap<String, CompactString>>;

/// The track to display for a schedule at a station: overlay first, then the
/// schedule's default track, then the placeholder.
pub fn effective_track(
    schedule: &Schedule,
    station: &str,
    overlay: &TrackAssignments,
) -> CompactString {
    overlay
        .get(&schedule.id)
        .and_then(|by_station| by_station.get(&normalize_station_name(station)))
        .filter(|track| !track.is_empty())
        .cloned()
        .or_else(|| schedule.track.clone().filter(|track| !track.is_empty()))
        .unwrap_or_else(|| CompactString::from(TRACK_PLACEHOLDER))
}

/// Decode the overlay from the shape the track-assignments API returns:
/// an object keyed by schedule id (as a JSON string) then station name.
/// Malformed entries are dropped with a warning, never an error.
pub fn parse_track_assignments(raw: &Value) -> TrackAssignments {
    let mut overlay = TrackAssignments::default();
    let Value::Object(by_schedule) = raw else {
        if !raw.is_null() {
            warn!("track assignments payload is not an object");
        }
        return overlay;
    };
    for (schedule_key, stations) in by_schedule {
        let Ok(schedule_id) = schedule_key.parse::<i64>() else {
            warn!(%schedule_key, "non-numeric schedule id in track assignments");
            continue;
        };
        let Value::Object(by_station) = stations else {
            warn!(schedule_id, "track assignment entry is not an object");
            continue;
        };
        let entry = overlay.entry(schedule_id).or_default();
        for (station, track) in by_station {
            match track.as_str() {
                Some(track) if !track.is_empty() => {
                    entry.insert(
                        normalize_station_name(station),
                        CompactString::from(track),
                    );
                }
                _ => warn!(schedule_id, %station, "dropping empty or non-string track"),
            }
        }
    }
    overlay
}
