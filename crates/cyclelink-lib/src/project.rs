//! Track projection onto a pixel canvas
//!
//! Geographic points are pushed through the spherical Mercator transform in
//! [`crate::utils`], then the bounding box is normalized to the canvas with a
//! single uniform scale so the track keeps its aspect ratio. The Y axis flips
//! because screen coordinates grow downward. All math runs in f64; only the
//! final screen coordinates narrow to f32.

use tracing::warn;

use crate::track::GeoPoint;
use crate::utils::wgs84_to_mercator;

/// A projected point in canvas space, origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

/// A target drawing surface measured in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    width: f64,
    height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Project a track so its bounding box hugs the canvas origin.
    ///
    /// The track's Mercator bounding box is scaled by the smaller of the two
    /// axis ratios, so the longer axis spans the canvas exactly and the other
    /// leaves slack at the right or top edge. Output order matches input
    /// order. Fewer than two points, or a track whose points all collapse to
    /// one Mercator coordinate, produce an empty result.
    pub fn fit(&self, points: &[GeoPoint]) -> Vec<ScreenPoint> {
        self.project(points, false)
    }

    /// Like [`Canvas::fit`], with the slack axis split evenly so the track
    /// sits in the middle of the canvas.
    pub fn fit_centered(&self, points: &[GeoPoint]) -> Vec<ScreenPoint> {
        self.project(points, true)
    }

    fn project(&self, points: &[GeoPoint], centered: bool) -> Vec<ScreenPoint> {
        if points.len() < 2 {
            return Vec::new();
        }

        let projected: Vec<_> = points
            .iter()
            .map(|p| wgs84_to_mercator(p.lat, p.lon))
            .collect();

        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for c in &projected {
            min_x = min_x.min(c.x);
            max_x = max_x.max(c.x);
            min_y = min_y.min(c.y);
            max_y = max_y.max(c.y);
        }

        let extent_x = max_x - min_x;
        let extent_y = max_y - min_y;
        if extent_x <= 0.0 && extent_y <= 0.0 {
            warn!(
                "track collapses to a single Mercator coordinate ({} points), nothing to project",
                points.len()
            );
            return Vec::new();
        }

        // A zero extent on one axis yields an infinite ratio; min() then
        // picks the finite axis.
        let scale = (self.width / extent_x).min(self.height / extent_y);

        let (dx, dy) = if centered {
            (
                (self.width - extent_x * scale) / 2.0,
                (self.height - extent_y * scale) / 2.0,
            )
        } else {
            (0.0, 0.0)
        };

        projected
            .iter()
            .map(|c| ScreenPoint {
                x: ((c.x - min_x) * scale + dx) as f32,
                y: (self.height - (c.y - min_y) * scale - dy) as f32,
            })
            .collect()
    }
}
