//! Parsed track data model
//!
//! The parser produces a [`TrackData`] per document: the aggregate ride
//! statistics recorded by the device plus the ordered point sequence. The
//! point sequence is never mutated after construction; loading another file
//! replaces the whole value.

use time::OffsetDateTime;
use time::format_description::well_known::Iso8601;

/// Aggregate ride statistics carried in the track-level `<extensions>` block
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackExtensions {
    /// Total elapsed ride time in seconds
    pub total_time: f64,
    /// Cumulative descent in meters
    pub cumulative_decrease: f64,
    /// Cumulative climb in meters
    pub cumulative_climb: f64,
    /// Total distance in meters
    pub total_distance: f64,
    /// Route type code (device-defined enumeration)
    pub route_type: i32,
}

/// One recorded GPS sample on a track
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackPoint {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Elevation in meters
    pub ele: f64,
    /// Timestamp exactly as recorded in the document (ISO-8601)
    pub time: String,
}

impl TrackPoint {
    /// Parse the recorded timestamp.
    ///
    /// Returns `None` when the stored string is not valid ISO-8601; the raw
    /// string stays available in [`TrackPoint::time`] either way.
    pub fn timestamp(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.time, &Iso8601::DEFAULT).ok()
    }

    /// The point's geographic coordinate.
    #[inline]
    pub fn geo_point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// Latitude/longitude pair, the input unit of projection
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// One parsed ride: aggregate statistics plus the ordered point sequence
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackData {
    extensions: TrackExtensions,
    points: Vec<TrackPoint>,
}

impl TrackData {
    /// Assemble a track from its parts.
    ///
    /// There are no mutators: the value is read-only once built.
    pub fn new(extensions: TrackExtensions, points: Vec<TrackPoint>) -> Self {
        TrackData { extensions, points }
    }

    /// The aggregate ride statistics.
    #[inline]
    pub fn extensions(&self) -> &TrackExtensions {
        &self.extensions
    }

    /// The recorded points, in document order.
    #[inline]
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// The point sequence as bare coordinates, ready for projection.
    pub fn geo_points(&self) -> Vec<GeoPoint> {
        self.points.iter().map(TrackPoint::geo_point).collect()
    }
}
