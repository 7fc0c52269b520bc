//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// CycleLink - inspect, render and live-replay recorded bicycle rides
#[derive(Parser, Debug)]
#[command(name = "cyclelink", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print point count and ride statistics for a GPX file
    Info {
        /// GPX file to inspect
        file: PathBuf,
    },

    /// List the bundled ride catalog
    Assets {
        /// Catalog directory to list
        #[arg(long, default_value = "samples")]
        dir: PathBuf,
    },

    /// Project a ride onto a canvas and print one x,y line per point
    Render {
        /// GPX file to render
        file: PathBuf,

        /// Canvas width in pixels
        #[arg(long)]
        width: u32,

        /// Canvas height in pixels
        #[arg(long)]
        height: u32,

        /// Center the track instead of anchoring it to the canvas origin
        #[arg(long)]
        centered: bool,
    },

    /// Replay a ride as a live session and upload filtered samples
    Ride(RideArgs),
}

#[derive(Args, Debug)]
pub struct RideArgs {
    /// GPX file to replay
    pub file: PathBuf,

    /// Base URL of the row-insert endpoint
    #[arg(long)]
    pub endpoint: String,

    /// Destination table name
    #[arg(long)]
    pub table: String,

    /// API key; falls back to the CYCLELINK_API_KEY environment variable
    #[arg(long)]
    pub api_key: Option<String>,

    /// Milliseconds between replayed fixes
    #[arg(long, default_value = "2000")]
    pub interval_ms: u64,

    /// Reported accuracy of replayed fixes, in meters
    #[arg(long, default_value = "8.0")]
    pub accuracy: f32,

    /// Sample channel capacity
    #[arg(long, default_value = "32")]
    pub capacity: usize,

    /// Storage file overriding the per-user default
    #[arg(long)]
    pub storage: Option<PathBuf>,
}
