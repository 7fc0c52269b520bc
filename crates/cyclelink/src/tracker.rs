//! Ride tracking pipeline.
//!
//! Location fixes flow from a producer task through a bounded channel into
//! one serialized consumer, which applies the upload filter and hands
//! accepted samples to the telemetry sink. Producers use `try_send` and drop
//! the incoming fix when the buffer is full; the filter's time gate makes
//! any individual fix expendable. Uploads run on spawned tasks so a slow
//! backend never stalls the decision loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use cyclelink_lib::{FilterConfig, LocationSample, SampleDecision, SampleFilter};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::telemetry::TelemetrySink;

/// Tuning for a tracking run.
#[derive(Clone, Copy, Debug)]
pub struct TrackerConfig {
    /// Bound of the sample channel; overflow drops the incoming fix.
    pub channel_capacity: usize,
    /// Upload gate thresholds.
    pub filter: FilterConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 32,
            filter: FilterConfig::default(),
        }
    }
}

/// Totals reported when a ride ends.
#[derive(Clone, Copy, Debug)]
pub struct RideSummary {
    pub samples_seen: u64,
    pub uploads_attempted: u64,
    pub uploads_succeeded: u64,
    /// Latitude/longitude of the last fix received, whatever its verdict.
    pub last_position: Option<(f64, f64)>,
}

/// Serialized consumer of the live sample stream.
pub struct RideTracker {
    session_id: Uuid,
    sink: Arc<dyn TelemetrySink>,
    filter: SampleFilter,
    samples_seen: u64,
    current_position: Option<(f64, f64)>,
    uploads_attempted: AtomicU64,
    uploads_succeeded: Arc<AtomicU64>,
}

impl RideTracker {
    pub fn new(session_id: Uuid, sink: Arc<dyn TelemetrySink>, config: TrackerConfig) -> Self {
        Self {
            session_id,
            sink,
            filter: SampleFilter::new(config.filter),
            samples_seen: 0,
            current_position: None,
            uploads_attempted: AtomicU64::new(0),
            uploads_succeeded: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Consume samples until every sender is gone.
    pub async fn run(&mut self, mut rx: Receiver<LocationSample>) {
        info!("tracking ride session {}", self.session_id);
        while let Some(sample) = rx.recv().await {
            self.handle(sample, Instant::now());
        }
        info!("sample channel closed, ride tracking stopped");
    }

    /// Process one fix. Synchronous: the upload itself goes to a spawned
    /// task and may still be in flight when the next fix arrives.
    fn handle(&mut self, sample: LocationSample, now: Instant) {
        self.samples_seen += 1;
        // Every fix becomes the displayed position, whatever the verdict.
        self.current_position = Some((sample.latitude, sample.longitude));

        let was_lost = self.filter.signal_lost();
        match self.filter.evaluate(&sample, now) {
            SampleDecision::Upload => {
                if was_lost {
                    info!("GPS signal recovered (accuracy {:.0}m)", sample.accuracy);
                }
                self.uploads_attempted.fetch_add(1, Ordering::Relaxed);
                let sink = self.sink.clone();
                let succeeded = self.uploads_succeeded.clone();
                tokio::spawn(async move {
                    match sink.insert(&sample).await {
                        Ok(()) => {
                            succeeded.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => warn!("telemetry upload failed: {e}"),
                    }
                });
            }
            SampleDecision::PoorAccuracy => {
                if was_lost {
                    debug!("still no usable GPS signal (accuracy {:.0}m)", sample.accuracy);
                } else {
                    warn!(
                        "GPS signal lost (accuracy {:.0}m over the ceiling)",
                        sample.accuracy
                    );
                }
            }
            decision => debug!("sample rejected: {decision:?}"),
        }
    }

    pub fn summary(&self) -> RideSummary {
        RideSummary {
            samples_seen: self.samples_seen,
            uploads_attempted: self.uploads_attempted.load(Ordering::Relaxed),
            uploads_succeeded: self.uploads_succeeded.load(Ordering::Relaxed),
            last_position: self.current_position,
        }
    }
}
