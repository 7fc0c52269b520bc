use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use cyclelink_lib::{RideStats, parse_reader};

pub fn info_command(file: &Path) -> Result<(), Box<dyn Error>> {
    let track = parse_reader(BufReader::new(File::open(file)?))?;
    let stats = RideStats::new(track.extensions());

    println!("File:       {}", file.display());
    println!("Points:     {}", track.points().len());
    println!("Distance:   {}", stats.distance());
    println!("Duration:   {}", stats.duration());
    println!("Climb:      {}", stats.climb());
    println!("Descent:    {}", stats.descent());
    println!("Route type: {}", track.extensions().route_type);

    Ok(())
}
