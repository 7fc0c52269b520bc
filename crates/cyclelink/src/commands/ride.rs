use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use std::time::Duration;

use cyclelink_lib::parse_reader;
use tracing::info;

use crate::session::TrackSession;
use crate::settings::RideArgs;
use crate::source::ReplaySource;
use crate::storage::{self, FileStorage, StorageBackend};
use crate::telemetry::RowInsertClient;
use crate::tracker::{RideTracker, TrackerConfig};

pub async fn ride_command(args: RideArgs) -> Result<(), Box<dyn Error>> {
    let api_key = match args.api_key {
        Some(key) => key,
        None => std::env::var("CYCLELINK_API_KEY")
            .map_err(|_| "no API key: pass --api-key or set CYCLELINK_API_KEY")?,
    };

    let track = parse_reader(BufReader::new(File::open(&args.file)?))?;
    if track.points().is_empty() {
        return Err("track has no points to replay".into());
    }

    let backend: Arc<dyn StorageBackend> = match args.storage {
        Some(path) => Arc::new(FileStorage::new_with_path(Some(path))?),
        None => storage::default_backend()?,
    };
    let session = TrackSession::open(backend)?;
    println!("Ride session {}", session.id());

    let sink = Arc::new(RowInsertClient::new(&args.endpoint, &api_key, &args.table));
    info!("uploading accepted samples to {}", sink.url());

    let config = TrackerConfig {
        channel_capacity: args.capacity,
        ..TrackerConfig::default()
    };
    let (tx, rx) = tokio::sync::mpsc::channel(config.channel_capacity);
    let mut tracker = RideTracker::new(session.id(), sink, config);

    let producer = ReplaySource::new(track, session.id().to_string())
        .interval(Duration::from_millis(args.interval_ms))
        .accuracy(args.accuracy)
        .spawn(tx);

    // Ctrl-C aborts the producer; the channel then closes and the tracker
    // drains whatever is still buffered before returning.
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping the ride");
            producer.abort();
        }
    });

    tracker.run(rx).await;
    watcher.abort();

    let summary = tracker.summary();
    println!("Samples seen:      {}", summary.samples_seen);
    println!("Uploads attempted: {}", summary.uploads_attempted);
    println!("Uploads succeeded: {}", summary.uploads_succeeded);
    if let Some((lat, lon)) = summary.last_position {
        println!("Last position:     {lat:.6},{lon:.6}");
    }

    // The session ends with the ride, interrupted or not.
    session.clear()?;
    info!("track session cleared");

    Ok(())
}
