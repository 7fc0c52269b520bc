//! Display formatting for ride aggregates

use crate::track::TrackExtensions;

/// Formats the aggregate fields of a ride for display.
///
/// Output is plain ASCII: kilometers with one decimal, durations as
/// `"1h30m"` (or `"45m"` under an hour), elevation as whole meters.
pub struct RideStats<'a> {
    extensions: &'a TrackExtensions,
}

impl<'a> RideStats<'a> {
    pub fn new(extensions: &'a TrackExtensions) -> Self {
        Self { extensions }
    }

    pub fn distance(&self) -> String {
        format!("{:.1} km", self.extensions.total_distance / 1000.0)
    }

    pub fn duration(&self) -> String {
        let secs = self.extensions.total_time.max(0.0) as u64;
        if secs >= 3600 {
            format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{}m", secs / 60)
        }
    }

    pub fn climb(&self) -> String {
        format!("{:.0} m", self.extensions.cumulative_climb)
    }

    pub fn descent(&self) -> String {
        format!("{:.0} m", self.extensions.cumulative_decrease)
    }
}
