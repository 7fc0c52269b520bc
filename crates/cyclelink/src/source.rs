//! Deterministic location source.
//!
//! Replays a recorded track as a live fix stream, standing in for GPS
//! hardware so the whole ride loop can run anywhere. Pacing, reported
//! accuracy and the session tag are configurable; speed is synthesized from
//! the recording's own timestamps.

use std::time::Duration;

use cyclelink_lib::{LocationSample, TrackData, TrackPoint, utils};
use tokio::sync::mpsc::{Sender, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct ReplaySource {
    track: TrackData,
    track_id: String,
    interval: Duration,
    accuracy: f32,
}

impl ReplaySource {
    pub fn new(track: TrackData, track_id: String) -> Self {
        Self {
            track,
            track_id,
            interval: Duration::from_millis(2000),
            accuracy: 8.0,
        }
    }

    /// Time between emitted fixes.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Reported accuracy of every synthesized fix, in meters.
    pub fn accuracy(mut self, accuracy: f32) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Emit one sample per track point, in order, pacing by the configured
    /// interval. A full buffer drops the fix; a closed receiver ends the
    /// task early.
    pub fn spawn(self, tx: Sender<LocationSample>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let points = self.track.points();
            let total = points.len();
            let mut dropped = 0u64;
            for i in 0..total {
                if i > 0 {
                    tokio::time::sleep(self.interval).await;
                }

                let speed = (i > 0)
                    .then(|| synthesize_speed(&points[i - 1], &points[i]))
                    .flatten();
                let sample = LocationSample {
                    track_id: self.track_id.clone(),
                    latitude: points[i].lat,
                    longitude: points[i].lon,
                    accuracy: self.accuracy,
                    speed,
                };

                match tx.try_send(sample) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        dropped += 1;
                        warn!("sample buffer full, dropping fix {}/{}", i + 1, total);
                    }
                    Err(TrySendError::Closed(_)) => {
                        debug!("sample receiver gone, stopping replay");
                        return;
                    }
                }
            }
            debug!("replay finished, {total} fixes, {dropped} dropped");
        })
    }
}

/// Ground speed between consecutive fixes in m/s, if both carry usable
/// timestamps.
fn synthesize_speed(prev: &TrackPoint, next: &TrackPoint) -> Option<f32> {
    let earlier = prev.timestamp()?;
    let later = next.timestamp()?;
    let dt = (later - earlier).as_seconds_f64();
    if dt <= 0.0 {
        return None;
    }
    let meters = utils::haversine_distance(prev.lat, prev.lon, next.lat, next.lon);
    Some((meters / dt) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclelink_lib::TrackExtensions;

    fn create_test_point(lat: f64, lon: f64, time: &str) -> TrackPoint {
        TrackPoint {
            lat,
            lon,
            ele: 10.0,
            time: time.to_string(),
        }
    }

    fn create_test_track(points: Vec<TrackPoint>) -> TrackData {
        TrackData::new(
            TrackExtensions {
                total_time: 10.0,
                cumulative_decrease: 0.0,
                cumulative_climb: 0.0,
                total_distance: 120.0,
                route_type: 1,
            },
            points,
        )
    }

    #[tokio::test]
    async fn test_replay_emits_points_in_order() {
        let track = create_test_track(vec![
            create_test_point(31.2300, 121.47, "2025-09-07T08:00:00Z"),
            create_test_point(31.2305, 121.47, "2025-09-07T08:00:05Z"),
            create_test_point(31.2310, 121.47, "2025-09-07T08:00:10Z"),
        ]);
        let source = ReplaySource::new(track, "session-1".to_string())
            .interval(Duration::from_millis(1))
            .accuracy(4.0);

        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        source.spawn(tx);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.track_id, "session-1");
        assert!((first.latitude - 31.2300).abs() < 1e-10);
        assert!((first.accuracy - 4.0).abs() < f32::EPSILON);
        assert_eq!(first.speed, None);

        // ~55.6 m in 5 s is ~11.1 m/s.
        let second = rx.recv().await.unwrap();
        assert!((second.latitude - 31.2305).abs() < 1e-10);
        let speed = second.speed.unwrap();
        assert!((speed - 11.12).abs() < 0.05, "speed was {speed}");

        let third = rx.recv().await.unwrap();
        assert!((third.latitude - 31.2310).abs() < 1e-10);

        // Sender dropped with the finished task.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_non_increasing_timestamps_give_no_speed() {
        let track = create_test_track(vec![
            create_test_point(31.2300, 121.47, "2025-09-07T08:00:05Z"),
            create_test_point(31.2305, 121.47, "2025-09-07T08:00:05Z"),
            create_test_point(31.2310, 121.47, "not-a-timestamp"),
        ]);
        let source =
            ReplaySource::new(track, "session-1".to_string()).interval(Duration::from_millis(1));

        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        source.spawn(tx);

        rx.recv().await.unwrap();
        assert_eq!(rx.recv().await.unwrap().speed, None);
        assert_eq!(rx.recv().await.unwrap().speed, None);
    }

    #[tokio::test]
    async fn test_full_buffer_drops_fixes() {
        let track = create_test_track(vec![
            create_test_point(31.2300, 121.47, "2025-09-07T08:00:00Z"),
            create_test_point(31.2305, 121.47, "2025-09-07T08:00:05Z"),
            create_test_point(31.2310, 121.47, "2025-09-07T08:00:10Z"),
        ]);
        let source =
            ReplaySource::new(track, "session-1".to_string()).interval(Duration::from_millis(1));

        let (tx, mut rx) = tokio::sync::mpsc::channel(1);
        let handle = source.spawn(tx);
        handle.await.unwrap();

        // Only the first fix fit; the later two were dropped on the floor.
        assert!((rx.recv().await.unwrap().latitude - 31.2300).abs() < 1e-10);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_replay_ends_when_receiver_dropped() {
        let track = create_test_track(vec![
            create_test_point(31.2300, 121.47, "2025-09-07T08:00:00Z"),
            create_test_point(31.2305, 121.47, "2025-09-07T08:00:05Z"),
        ]);
        let source =
            ReplaySource::new(track, "session-1".to_string()).interval(Duration::from_millis(1));

        let (tx, rx) = tokio::sync::mpsc::channel(1);
        drop(rx);
        source.spawn(tx).await.unwrap();
    }
}
