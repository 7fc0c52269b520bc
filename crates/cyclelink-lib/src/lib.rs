//! CycleLink Core - GPX Ingestion, Track Projection and Live Sample Filtering
//!
//! This library implements the data pipeline behind the CycleLink ride
//! tracker: parsing recorded GPX documents into immutable track data,
//! projecting geographic coordinates into planar canvas coordinates for
//! polyline rendering, and filtering the live GPS sample stream before
//! anything is uploaded.
//!
//! # Architecture
//!
//! - **[`TrackData`]**: Immutable storage for one parsed ride
//! - **[`parser`]**: Single-pass, fail-fast GPX parser
//! - **[`AssetLibrary`]**: Named lookup over a directory of bundled tracks
//! - **[`Canvas`]**: Mercator projection plus canvas normalization
//! - **[`SampleFilter`]**: Accept/reject policy for live location fixes
//!
//! Rendering, networking and persistence live in the application crate; this
//! crate is synchronous and side-effect free apart from reading track files.

mod assets;
mod filter;
pub mod parser;
mod project;
mod stats;
mod track;
pub mod utils;

// Public API exports
pub use assets::AssetLibrary;
pub use filter::{FilterConfig, LocationSample, SampleDecision, SampleFilter};
pub use parser::{ParseError, parse_reader, parse_str};
pub use project::{Canvas, ScreenPoint};
pub use stats::RideStats;
pub use track::{GeoPoint, TrackData, TrackExtensions, TrackPoint};

/// Error types for the track data pipeline
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("GPX parse error: {0}")]
    Parse(#[from] parser::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no bundled track named '{0}'")]
    UnknownAsset(String),
}

pub type Result<T> = std::result::Result<T, TrackError>;
