#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::arc_with_non_send_sync,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::bytes_nth,
    clippy::deprecated_clippy_cfg_attr,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::cmp_null,
    clippy::op_ref
)]

#[macro_use]
extern crate serde;

pub mod board_logic;
pub mod models;
pub mod raw_formats;
pub mod refresh;
pub mod service_days;
pub mod station_matching;
pub mod status;
pub mod time_resolution;
pub mod track_overlay;

/// Fallback category label for schedules persisted without a train type.
pub const FALLBACK_TRAIN_TYPE: &str = "TER";

/// Placeholder shown when neither the overlay nor the schedule carries a track.
pub const TRACK_PLACEHOLDER: &str = "-";

/// Canonical form for station-name comparison. Persisted names have
/// inconsistent casing and whitespace, so every comparison in the crate goes
/// through this.
pub fn normalize_station_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Exact-match station comparison after normalisation.
pub fn station_names_match(a: &str, b: &str) -> bool {
    normalize_station_name(a) == normalize_station_name(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_name_normalisation() {
        assert_eq!(normalize_station_name("  Dijon Ville "), "dijon ville");
        assert!(station_names_match("BESANÇON viotte", "Besançon Viotte"));
        assert!(!station_names_match("Dijon", "Dole"));
    }
}
