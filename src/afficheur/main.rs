// Terminal departure/arrival board: reads the schedule snapshot and track
// overlay from JSON files (the shape the back-office API returns), derives
// the board on the display cadence, and prints the rows.

use clap::Parser;
use quai::board_logic::PlatformWindow;
use quai::models::{BoardRow, Direction};
use quai::raw_formats::RawSchedule;
use quai::refresh::{BoardConfig, BoardSource, refresh_once};
use quai::status::display_label;
use quai::track_overlay::{TrackAssignments, parse_track_assignments};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Station the board is installed at
    #[arg(long)]
    station: String,
    /// departures or arrivals
    #[arg(long, default_value = "departures")]
    direction: String,
    /// JSON file with the schedule snapshot (schedules API response)
    #[arg(long)]
    snapshot: PathBuf,
    /// JSON file with the track overlay (track-assignments API response)
    #[arg(long)]
    overlay: Option<PathBuf>,
    /// Platform window: "ville", "interurbain", or minutes
    #[arg(long, default_value = "30")]
    window: String,
    #[arg(long, default_value_t = 10)]
    refresh_secs: u64,
    /// Derive and print once, then exit
    #[arg(long, default_value_t = false)]
    once: bool,
}

struct FileSource {
    snapshot: PathBuf,
    overlay: Option<PathBuf>,
}

impl BoardSource for FileSource {
    async fn fetch_schedules(&self) -> anyhow::Result<Vec<RawSchedule>> {
        let raw = tokio::fs::read_to_string(&self.snapshot).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn fetch_track_assignments(&self) -> anyhow::Result<TrackAssignments> {
        let Some(path) = &self.overlay else {
            return Ok(TrackAssignments::default());
        };
        let raw = tokio::fs::read_to_string(path).await?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        Ok(parse_track_assignments(&value))
    }
}

fn parse_window(window: &str) -> anyhow::Result<PlatformWindow> {
    match window.to_lowercase().as_str() {
        "ville" | "urban" => Ok(PlatformWindow::Urban),
        "interurbain" | "interurban" => Ok(PlatformWindow::InterUrban),
        minutes => Ok(PlatformWindow::Fixed(minutes.parse()?)),
    }
}

fn print_board(station: &str, direction: Direction, rows: &[BoardRow]) {
    println!("== {} / {} ==", station, direction);
    if rows.is_empty() {
        println!("Aucun horaire trouvé pour cette gare.");
        return;
    }
    for row in rows {
        let place = match direction {
            Direction::Departures => &row.destination,
            Direction::Arrivals => &row.origin,
        };
        let vehicle = if row.is_bus { "BUS" } else { "TRN" };
        let platform = row.platform.as_deref().unwrap_or("");
        let via = if row.via.is_empty() {
            String::new()
        } else {
            format!("via {}", row.via.join(" • "))
        };
        println!(
            "{}  {} {:<6} {:<8} {:<28} {:>3}  {:<18} {}",
            row.display_time,
            vehicle,
            row.train_type,
            row.train_number,
            place,
            platform,
            display_label(&row.status),
            via
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let direction = match args.direction.to_lowercase().as_str() {
        "departures" | "departs" => Direction::Departures,
        "arrivals" | "arrivees" => Direction::Arrivals,
        other => anyhow::bail!("unknown direction {:?}", other),
    };

    let mut config = BoardConfig::new(args.station.clone(), direction);
    config.platform_window = parse_window(&args.window)?;
    config.refresh_interval = Duration::from_secs(args.refresh_secs);

    let source = FileSource {
        snapshot: args.snapshot,
        overlay: args.overlay,
    };

    if args.once {
        let rows = refresh_once(&source, &config, chrono::Local::now().naive_local()).await;
        print_board(&args.station, direction, &rows);
        return Ok(());
    }

    let mut interval = tokio::time::interval(config.refresh_interval);
    loop {
        interval.tick().await;
        let rows = refresh_once(&source, &config, chrono::Local::now().naive_local()).await;
        print!("\x1B[2J\x1B[H");
        print_board(&args.station, direction, &rows);
    }
}
