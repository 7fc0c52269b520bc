use std::error::Error;
use std::path::Path;

use cyclelink_lib::{AssetLibrary, RideStats};

pub fn assets_command(dir: &Path) -> Result<(), Box<dyn Error>> {
    let library = AssetLibrary::new(dir);
    let tracks = library.load_all()?;

    if tracks.is_empty() {
        println!("No .gpx assets in {}", dir.display());
        return Ok(());
    }

    for (name, track) in &tracks {
        let stats = RideStats::new(track.extensions());
        println!(
            "{name}  ({} points, {}, {})",
            track.points().len(),
            stats.distance(),
            stats.duration()
        );
    }

    Ok(())
}
