//! Wire shapes for persisted schedule records and their normalisation into
//! the canonical `Schedule`.
//!
//! The admin API persists snake_case columns but older clients send camelCase,
//! and the array sub-fields (`served_stations`, `jours_circulation`,
//! `composition`) are stored as JSON-encoded strings in the relational store,
//! so each may arrive either as a native structure or as a string. This module
//! is the only place aware of any of that.

use crate::FALLBACK_TRAIN_TYPE;
use crate::models::{RollingStockItem, Schedule, ServedStop};
use chrono::Weekday;
use compact_str::CompactString;
use serde_json::Value;
use tracing::warn;

/// A schedule record as returned by the schedules API, before normalisation.
/// Sub-fields that may be JSON-encoded strings are kept as raw values and
/// decoded fail-soft in [`normalize`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawSchedule {
    #[serde(default)]
    pub id: i64,
    #[serde(default, alias = "trainNumber")]
    pub train_number: String,
    #[serde(default, alias = "departureStation")]
    pub departure_station: String,
    #[serde(default, alias = "arrivalStation")]
    pub arrival_station: String,
    #[serde(default, alias = "departureTime")]
    pub departure_time: String,
    #[serde(default, alias = "arrivalTime")]
    pub arrival_time: String,
    #[serde(default, alias = "trainType")]
    pub train_type: Option<String>,
    #[serde(default, alias = "servedStations")]
    pub served_stations: Option<Value>,
    #[serde(default, alias = "joursCirculation")]
    pub jours_circulation: Option<Value>,
    #[serde(default, alias = "delayMinutes")]
    pub delay_minutes: Option<i64>,
    // MySQL hands booleans back as 0/1 tinyints, older clients send true/false
    #[serde(default, alias = "isCancelled")]
    pub is_cancelled: Option<Value>,
    #[serde(default)]
    pub track: Option<String>,
    #[serde(default, alias = "rollingStockFileName")]
    pub rolling_stock_file_name: Option<String>,
    #[serde(default)]
    pub composition: Option<Value>,
}

/// Unwrap one level of JSON-string encoding: `"[\"a\"]"` becomes `["a"]`,
/// native values pass through untouched. Returns `None` (and logs) when the
/// inner string is not valid JSON.
fn unwrap_json_string(value: Value, schedule_id: i64, field: &str) -> Option<Value> {
    match value {
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(inner) => Some(inner),
            Err(e) => {
                warn!(schedule_id, field, error = %e, "dropping unparseable sub-field");
                None
            }
        },
        Value::Null => None,
        other => Some(other),
    }
}

fn parse_served_stop(entry: &Value) -> Option<ServedStop> {
    match entry {
        Value::String(name) => Some(ServedStop::name_only(name.clone())),
        Value::Object(map) => {
            let name = map.get("name").and_then(Value::as_str)?;
            let time_of = |snake: &str, camel: &str| {
                map.get(camel)
                    .or_else(|| map.get(snake))
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(normalize_time)
            };
            Some(ServedStop {
                name: name.to_string(),
                departure_time: time_of("departure_time", "departureTime"),
                arrival_time: time_of("arrival_time", "arrivalTime"),
            })
        }
        _ => None,
    }
}

fn parse_served_stations(raw: Option<Value>, schedule_id: i64) -> Vec<ServedStop> {
    let Some(value) = raw.and_then(|v| unwrap_json_string(v, schedule_id, "served_stations"))
    else {
        return Vec::new();
    };
    match value {
        Value::Array(entries) => entries.iter().filter_map(parse_served_stop).collect(),
        other => {
            warn!(schedule_id, ?other, "served_stations is not an array");
            Vec::new()
        }
    }
}

/// English weekday names as stored in `jours_circulation`.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.trim().to_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn parse_operating_days(raw: Option<Value>, schedule_id: i64) -> Vec<Weekday> {
    let Some(value) = raw.and_then(|v| unwrap_json_string(v, schedule_id, "jours_circulation"))
    else {
        return Vec::new();
    };
    match value {
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| {
                let name = entry.as_str()?;
                let day = parse_weekday(name);
                if day.is_none() {
                    warn!(schedule_id, name, "unknown weekday in jours_circulation");
                }
                day
            })
            .collect(),
        other => {
            warn!(schedule_id, ?other, "jours_circulation is not an array");
            Vec::new()
        }
    }
}

fn parse_composition(raw: Option<Value>, schedule_id: i64) -> Vec<RollingStockItem> {
    let Some(value) = raw.and_then(|v| unwrap_json_string(v, schedule_id, "composition")) else {
        return Vec::new();
    };
    match serde_json::from_value::<Vec<RollingStockItem>>(value) {
        Ok(items) => items,
        Err(e) => {
            warn!(schedule_id, error = %e, "composition is not a rolling-stock array");
            Vec::new()
        }
    }
}

fn parse_bool_like(raw: Option<&Value>) -> bool {
    match raw {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
        Some(Value::String(s)) => matches!(s.as_str(), "1" | "true" | "TRUE"),
        _ => false,
    }
}

/// Truncate a persisted time to `HH:MM`. MySQL TIME columns come back as
/// `HH:MM:SS`.
pub fn normalize_time(time: &str) -> String {
    let mut parts = time.splitn(3, ':');
    match (parts.next(), parts.next()) {
        (Some(h), Some(m)) => format!("{}:{}", h, m),
        _ => time.to_string(),
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

/// Convert a raw persisted record into the canonical schedule shape.
///
/// Fails soft on every malformed sub-field: the field degrades to its empty
/// value and the anomaly is logged, the record itself is always produced.
pub fn normalize(raw: RawSchedule) -> Schedule {
    let id = raw.id;

    let delay_minutes = match raw.delay_minutes {
        Some(d) if d < 0 => {
            warn!(schedule_id = id, delay = d, "clamping negative delay to 0");
            0
        }
        Some(d) => d as u32,
        None => 0,
    };

    let train_type = non_empty(raw.train_type)
        .map(CompactString::from)
        .unwrap_or_else(|| CompactString::from(FALLBACK_TRAIN_TYPE));

    Schedule {
        id,
        train_number: CompactString::from(raw.train_number),
        departure_station: raw.departure_station,
        arrival_station: raw.arrival_station,
        departure_time: normalize_time(&raw.departure_time),
        arrival_time: normalize_time(&raw.arrival_time),
        train_type,
        served_stations: parse_served_stations(raw.served_stations, id),
        operating_days: parse_operating_days(raw.jours_circulation, id),
        delay_minutes,
        is_cancelled: parse_bool_like(raw.is_cancelled.as_ref()),
        track: non_empty(raw.track).map(CompactString::from),
        rolling_stock_file_name: non_empty(raw.rolling_stock_file_name),
        composition: parse_composition(raw.composition, id),
    }
}

/// Normalise a whole API response batch.
pub fn normalize_batch(raw: Vec<RawSchedule>) -> Vec<Schedule> {
    raw.into_iter().map(normalize).collect()
}
