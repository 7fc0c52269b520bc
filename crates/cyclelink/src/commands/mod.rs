//! Subcommand implementations.

mod assets;
mod info;
mod render;
mod ride;

pub use assets::assets_command;
pub use info::info_command;
pub use render::render_command;
pub use ride::ride_command;
