use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use cyclelink_lib::{Canvas, parse_reader};

pub fn render_command(
    file: &Path,
    width: u32,
    height: u32,
    centered: bool,
) -> Result<(), Box<dyn Error>> {
    let track = parse_reader(BufReader::new(File::open(file)?))?;
    let canvas = Canvas::new(f64::from(width), f64::from(height));

    let points = track.geo_points();
    let screen = if centered {
        canvas.fit_centered(&points)
    } else {
        canvas.fit(&points)
    };

    for p in &screen {
        println!("{:.2},{:.2}", p.x, p.y);
    }

    Ok(())
}
