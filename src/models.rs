use compact_str::CompactString;
use std::fmt;

/// One intermediate stop on a schedule's route, in physical route order.
/// Raw entries may be bare station names; those normalise to a stop with no
/// times, which never matches a board lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServedStop {
    pub name: String,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
}

impl ServedStop {
    pub fn name_only(name: impl Into<String>) -> Self {
        ServedStop {
            name: name.into(),
            departure_time: None,
            arrival_time: None,
        }
    }
}

/// One rolling-stock unit of a schedule's composition. Carried through the
/// normaliser, unused by board derivation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RollingStockItem {
    #[serde(default)]
    pub name: Option<String>,
}

/// Canonical in-memory schedule, the only shape the derivation pipeline sees.
/// Produced from the wire shape by `raw_formats::normalize`.
#[derive(Clone, Debug, PartialEq)]
pub struct Schedule {
    pub id: i64,
    pub train_number: CompactString,
    pub departure_station: String,
    pub arrival_station: String,
    /// Wall-clock `HH:MM`, no date component. The system assumes a single
    /// operating day repeated daily.
    pub departure_time: String,
    pub arrival_time: String,
    pub train_type: CompactString,
    pub served_stations: Vec<ServedStop>,
    /// Empty means the schedule runs every day.
    pub operating_days: Vec<chrono::Weekday>,
    pub delay_minutes: u32,
    pub is_cancelled: bool,
    /// Default track, overridden per-station by the track assignment overlay.
    pub track: Option<CompactString>,
    pub rolling_stock_file_name: Option<String>,
    pub composition: Vec<RollingStockItem>,
}

impl Schedule {
    /// Whether the run is operated by a bus (coach replacement etc.), used by
    /// the boards to pick the vehicle pictogram.
    pub fn is_bus(&self) -> bool {
        self.train_type.to_lowercase().contains("bus")
    }
}

/// Which board a station page is rendering.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Departures,
    Arrivals,
}

/// Which time of a stop call is wanted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimeKind {
    Departure,
    Arrival,
}

impl Direction {
    /// The time kind a board of this direction displays.
    pub fn time_kind(self) -> TimeKind {
        match self {
            Direction::Departures => TimeKind::Departure,
            Direction::Arrivals => TimeKind::Arrival,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Departures => write!(f, "departures"),
            Direction::Arrivals => write!(f, "arrivals"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    OnTime,
    Delayed,
    Cancelled,
}

/// Tri-state train status plus the delay payload, derived purely from the
/// two stored fields. Cancellation wins over delay.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrainStatus {
    pub code: StatusCode,
    pub delay_minutes: u32,
}

/// One row of a derived board, ready for the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoardRow {
    pub schedule_id: i64,
    pub train_number: CompactString,
    pub train_type: CompactString,
    /// Origin of the run, shown as provenance on arrival boards.
    pub origin: String,
    /// Terminus of the run, shown as destination on departure boards.
    pub destination: String,
    /// Effective `HH:MM` at the queried station.
    pub display_time: String,
    pub status: TrainStatus,
    /// Rescheduled clock time when delayed, `None` when on time or cancelled.
    pub delayed_time: Option<String>,
    /// Track label, present only inside the platform-visibility window.
    pub platform: Option<CompactString>,
    /// Station names for the "via" strip (stops after the station for
    /// departures, provenance chain for arrivals).
    pub via: Vec<String>,
    /// Bus run (coach replacement etc.), selects the vehicle pictogram.
    pub is_bus: bool,
}
