//! Upload gate for live GPS samples
//!
//! A ride produces far more location fixes than the backend wants to store.
//! [`SampleFilter`] decides per sample whether it is worth uploading, using
//! three gates evaluated in a fixed order: minimum time since the last
//! upload, minimum displacement from the last uploaded position, and a GPS
//! accuracy ceiling. The decision is synchronous and never blocks; the
//! caller owns the clock so behavior stays testable.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::utils::haversine_distance;

/// One GPS fix, tagged with the ride session it belongs to.
///
/// Field names double as the wire format for telemetry uploads; `speed` is
/// omitted from the serialized record when absent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationSample {
    pub track_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Reported horizontal accuracy in meters (larger is worse).
    pub accuracy: f32,
    /// Ground speed in m/s, when the source knows it.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub speed: Option<f32>,
}

/// Thresholds for the upload gates.
#[derive(Clone, Copy, Debug)]
pub struct FilterConfig {
    /// Minimum time between two uploads.
    pub min_interval: Duration,
    /// Minimum displacement from the last uploaded position, in meters.
    pub min_distance_m: f64,
    /// Accuracy ceiling in meters; anything worse counts as lost signal.
    pub max_accuracy_m: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(5000),
            min_distance_m: 5.0,
            max_accuracy_m: 50.0,
        }
    }
}

/// Verdict for a single sample. Only [`SampleDecision::Upload`] accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleDecision {
    /// Forward the sample to the telemetry sink.
    Upload,
    /// Rejected: the last upload is too recent.
    TooSoon,
    /// Rejected: the rider has not moved far enough.
    TooClose,
    /// Rejected: reported accuracy is over the ceiling; signal counts as lost.
    PoorAccuracy,
}

impl SampleDecision {
    #[inline]
    pub fn is_upload(&self) -> bool {
        matches!(self, SampleDecision::Upload)
    }
}

/// Stateful gate over a stream of location samples.
#[derive(Debug)]
pub struct SampleFilter {
    config: FilterConfig,
    last_uploaded: Option<LocationSample>,
    last_upload_at: Option<Instant>,
    signal_lost: bool,
}

impl SampleFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            last_uploaded: None,
            last_upload_at: None,
            signal_lost: false,
        }
    }

    /// Decide whether `sample` should be uploaded, observed at `now`.
    ///
    /// Gates run strictly in order: time, distance, accuracy. The first
    /// sample of a ride has no upload history and is decided by accuracy
    /// alone. An `Upload` verdict commits the sample as the new reference
    /// position immediately, before any actual upload happens; a failed
    /// upload is dropped rather than retried, the next fix supersedes it.
    pub fn evaluate(&mut self, sample: &LocationSample, now: Instant) -> SampleDecision {
        if let Some(at) = self.last_upload_at
            && now.duration_since(at) < self.config.min_interval
        {
            debug!(
                "sample gated: {}ms since last upload",
                now.duration_since(at).as_millis()
            );
            return SampleDecision::TooSoon;
        }

        if let Some(prev) = &self.last_uploaded {
            let moved = haversine_distance(
                prev.latitude,
                prev.longitude,
                sample.latitude,
                sample.longitude,
            );
            if moved < self.config.min_distance_m {
                debug!("sample gated: moved {moved:.1}m since last upload");
                return SampleDecision::TooClose;
            }
        }

        if sample.accuracy > self.config.max_accuracy_m {
            self.signal_lost = true;
            debug!(
                "sample gated: accuracy {:.0}m over the {:.0}m ceiling",
                sample.accuracy, self.config.max_accuracy_m
            );
            return SampleDecision::PoorAccuracy;
        }

        self.signal_lost = false;
        self.last_uploaded = Some(sample.clone());
        self.last_upload_at = Some(now);
        SampleDecision::Upload
    }

    /// Drop all retained state, as if no sample had ever been seen.
    pub fn reset(&mut self) {
        self.last_uploaded = None;
        self.last_upload_at = None;
        self.signal_lost = false;
    }

    /// True while the latest verdict was [`SampleDecision::PoorAccuracy`].
    #[inline]
    pub fn signal_lost(&self) -> bool {
        self.signal_lost
    }

    /// The most recent sample that passed all gates.
    #[inline]
    pub fn last_uploaded(&self) -> Option<&LocationSample> {
        self.last_uploaded.as_ref()
    }
}

impl Default for SampleFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}
