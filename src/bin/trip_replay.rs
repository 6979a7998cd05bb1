use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};
use clap::Parser;
use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::json;
use trip_telemetry::{
    ChannelPublisher, EngineConfig, FixVerdict, HarshEvent, JsonDirSink, RawFix, RejectReason,
    TripExport, TripIdentity, TripSink, TripTracker,
};

/// Replay a recorded GPS log through the trip engine and print the finalized trip.
#[derive(Parser, Debug)]
#[command(name = "trip_replay")]
struct Args {
    /// Path to comparison_*.json[.gz] log
    #[arg(long)]
    log: PathBuf,

    #[arg(long, default_value = "replay-car")]
    car_id: String,

    #[arg(long, default_value = "replay-user")]
    user_id: String,

    /// Defaults to the log file stem
    #[arg(long)]
    reservation_id: Option<String>,

    /// JSON engine config; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the GPS jump threshold (meters)
    #[arg(long)]
    jump_threshold_m: Option<f64>,

    /// Write the finalized trip JSON into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Deserialize)]
struct GpsData {
    timestamp: f64,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    speed: Option<f64>,
}

#[derive(Deserialize)]
struct Reading {
    timestamp: f64,
    gps: Option<GpsData>,
}

#[derive(Deserialize)]
struct LogFile {
    readings: Vec<Reading>,
}

fn load_log(path: &Path) -> anyhow::Result<LogFile> {
    let file = File::open(path)?;
    if path.extension().map(|e| e == "gz").unwrap_or(false) {
        let gz = GzDecoder::new(file);
        let reader = BufReader::new(gz);
        Ok(serde_json::from_reader(reader)?)
    } else {
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

fn to_datetime(secs: f64) -> anyhow::Result<DateTime<Utc>> {
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    DateTime::<Utc>::from_timestamp(whole as i64, nanos)
        .ok_or_else(|| anyhow::anyhow!("timestamp out of range: {secs}"))
}

fn load_config(args: &Args) -> anyhow::Result<EngineConfig> {
    let mut config = match args.config.as_ref() {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(jump) = args.jump_threshold_m {
        config.jump_threshold_m = jump;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = load_config(&args)?;
    let recording = load_log(&args.log)?;

    let reservation_id = args.reservation_id.clone().unwrap_or_else(|| {
        args.log
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("replay")
            .trim_end_matches(".json")
            .to_string()
    });
    let identity = TripIdentity::new(args.car_id.clone(), args.user_id.clone(), reservation_id);

    let first_ts = recording
        .readings
        .iter()
        .find_map(|r| r.gps.as_ref().map(|g| g.timestamp))
        .or_else(|| recording.readings.first().map(|r| r.timestamp));
    let start = match first_ts {
        Some(ts) => to_datetime(ts)?,
        None => Utc::now(),
    };
    let end = match recording.readings.last() {
        Some(r) => to_datetime(r.timestamp)?,
        None => start,
    };

    let (publisher, rx) = ChannelPublisher::bounded(64);
    let observer = thread::spawn(move || {
        let mut received = 0u64;
        for snapshot in rx.iter() {
            received += 1;
            log::debug!(
                "[SNAPSHOT] {:.3} km, {:.1} km/h (max {:.1}, avg {:.1}), {} min",
                snapshot.distance_km,
                snapshot.current_speed_kmh,
                snapshot.max_speed_kmh,
                snapshot.avg_speed_kmh,
                snapshot.elapsed_minutes
            );
        }
        received
    });

    let tracker = TripTracker::start_with(identity, config.clone(), Arc::new(publisher), start)?;

    let mut events: Vec<HarshEvent> = Vec::new();
    let mut jump_rejections = 0u64;
    let mut malformed_rejections = 0u64;
    let mut last_gps_ts: Option<f64> = None;

    for r in &recording.readings {
        let Some(gps) = r.gps.as_ref() else {
            continue;
        };
        // Logs repeat the latest GPS fix on every IMU reading
        if last_gps_ts == Some(gps.timestamp) {
            continue;
        }
        last_gps_ts = Some(gps.timestamp);

        let fix = RawFix::new(gps.latitude, gps.longitude, gps.speed, to_datetime(gps.timestamp)?);
        let outcome = tracker.update(fix)?;
        match outcome.verdict {
            FixVerdict::Rejected(RejectReason::Jump { meters }) => {
                jump_rejections += 1;
                log::info!("[JUMP] t={:.1}s {:.0} m from last accepted fix", gps.timestamp, meters);
            }
            FixVerdict::Rejected(RejectReason::Malformed) => malformed_rejections += 1,
            FixVerdict::Accepted { .. } => {}
        }
        if let Some(event) = outcome.event {
            log::info!(
                "[{:?}] t={:.1}s {:.1} m/s² at {:.1} km/h",
                event.kind,
                gps.timestamp,
                event.accel_mps2,
                event.speed_kmh
            );
            events.push(event);
        }
    }

    let trip = tracker.stop(end)?;
    drop(tracker);
    let snapshots_published = observer
        .join()
        .map_err(|_| anyhow::anyhow!("snapshot observer panicked"))?;

    let export = TripExport::new(trip, config);
    let saved_to = match args.out_dir.as_ref() {
        Some(dir) => Some(JsonDirSink::new(dir)?.persist(&export)?),
        None => None,
    };

    let summary = json!({
        "log": args.log.display().to_string(),
        "trip": export.trip,
        "events": events,
        "jump_rejections": jump_rejections,
        "malformed_rejections": malformed_rejections,
        "snapshots_published": snapshots_published,
        "saved_to": saved_to.map(|p| p.display().to_string()),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
