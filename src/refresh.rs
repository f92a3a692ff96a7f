//! Pull-based snapshot refresh driver.
//!
//! Boards poll their data sources on a fixed cadence and recompute the whole
//! derived view from scratch on every tick; there is no incremental update
//! and no shared mutable cache. Fetch failures degrade to an empty snapshot
//! so the board renders "no schedules" instead of crashing the poll loop.

use crate::board_logic::{PlatformWindow, prepare_board};
use crate::models::{BoardRow, Direction};
use crate::raw_formats::{RawSchedule, normalize_batch};
use crate::track_overlay::TrackAssignments;
use chrono::{Local, NaiveDateTime};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// The cadence the physical displays poll at.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// The two snapshot sources a board reads. Implemented over the schedules
/// and track-assignments APIs in production, over files or fixtures in tests.
pub trait BoardSource {
    async fn fetch_schedules(&self) -> anyhow::Result<Vec<RawSchedule>>;
    async fn fetch_track_assignments(&self) -> anyhow::Result<TrackAssignments>;
}

/// What a single board instance displays.
#[derive(Clone, Debug)]
pub struct BoardConfig {
    pub station: String,
    pub direction: Direction,
    pub platform_window: PlatformWindow,
    pub refresh_interval: Duration,
}

impl BoardConfig {
    pub fn new(station: impl Into<String>, direction: Direction) -> Self {
        BoardConfig {
            station: station.into(),
            direction,
            platform_window: PlatformWindow::default(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

/// One poll cycle: fetch both snapshots concurrently, fail soft to empty,
/// normalise, derive. Pure apart from the two fetches.
pub async fn refresh_once<S: BoardSource>(
    source: &S,
    config: &BoardConfig,
    now: NaiveDateTime,
) -> Vec<BoardRow> {
    let (schedules, overlay) = tokio::join!(
        source.fetch_schedules(),
        source.fetch_track_assignments()
    );

    let schedules = match schedules {
        Ok(schedules) => schedules,
        Err(e) => {
            warn!(error = %e, "schedule fetch failed, rendering empty board");
            Vec::new()
        }
    };
    let overlay = match overlay {
        Ok(overlay) => overlay,
        Err(e) => {
            warn!(error = %e, "track assignment fetch failed, ignoring overlay");
            TrackAssignments::default()
        }
    };

    let schedules = normalize_batch(schedules);
    prepare_board(
        &schedules,
        &overlay,
        &config.station,
        config.direction,
        now,
        config.platform_window,
    )
}

/// Poll the sources on the configured interval and publish each derived
/// board on the watch channel. Stops once every receiver is gone.
pub async fn run_board_loop<S: BoardSource>(
    source: S,
    config: BoardConfig,
    tx: watch::Sender<Vec<BoardRow>>,
) {
    let mut interval = tokio::time::interval(config.refresh_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let rows = refresh_once(&source, &config, Local::now().naive_local()).await;
        if tx.send(rows).is_err() {
            info!(
                station = %config.station,
                direction = %config.direction,
                "all board watchers dropped, stopping refresh loop"
            );
            break;
        }
    }
}
