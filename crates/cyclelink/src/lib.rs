//! CycleLink application crate.
//!
//! The CLI over [`cyclelink_lib`]: commands for inspecting and rendering
//! recorded rides, plus the live ride pipeline wiring a replayed fix stream
//! through the upload filter into a telemetry sink, with the session
//! identity persisted across runs.

pub mod commands;
pub mod session;
pub mod settings;
pub mod source;
pub mod storage;
pub mod telemetry;
pub mod tracker;
