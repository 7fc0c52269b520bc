//! Catalog of bundled ride files
//!
//! Rides ship as `.gpx` files in a directory; the library addresses them by
//! file name so callers never build paths themselves.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::TrackError;
use crate::parser::parse_reader;
use crate::track::TrackData;

/// A directory of `.gpx` ride files addressable by name.
#[derive(Clone, Debug)]
pub struct AssetLibrary {
    dir: PathBuf,
}

impl AssetLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File names of every ride in the catalog, sorted lexicographically.
    ///
    /// Only regular files with a `.gpx` extension (any case) count;
    /// subdirectories and other files are ignored.
    pub fn list(&self) -> crate::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.to_ascii_lowercase().ends_with(".gpx") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load one ride by catalog name.
    ///
    /// A name with no matching file fails with [`TrackError::UnknownAsset`]
    /// before the file is ever opened.
    pub fn load(&self, name: &str) -> crate::Result<TrackData> {
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(TrackError::UnknownAsset(name.to_string()));
        }
        let file = std::fs::File::open(&path)?;
        parse_reader(std::io::BufReader::new(file))
    }

    /// Load every cataloged ride in parallel, failing on the first error.
    pub fn load_all(&self) -> crate::Result<Vec<(String, TrackData)>> {
        let names = self.list()?;
        names
            .into_par_iter()
            .map(|name| {
                let track = self.load(&name)?;
                Ok((name, track))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID_DOC: &str = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk>
    <extensions>
      <totalTime>300</totalTime>
      <cumulativeDecrease>5</cumulativeDecrease>
      <cumulativeClimb>8</cumulativeClimb>
      <totalDistance>1200</totalDistance>
      <routeType>1</routeType>
    </extensions>
    <trkseg>
      <trkpt lat="31.23" lon="121.47"><ele>10</ele><time>2025-09-07T08:00:00Z</time></trkpt>
      <trkpt lat="31.24" lon="121.48"><ele>12</ele><time>2025-09-07T08:05:00Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    fn create_test_catalog() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b_ride.gpx"), VALID_DOC).unwrap();
        std::fs::write(dir.path().join("a_ride.GPX"), VALID_DOC).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a track").unwrap();
        std::fs::create_dir(dir.path().join("archive.gpx")).unwrap();
        dir
    }

    #[test]
    fn test_list_filters_and_sorts() {
        let dir = create_test_catalog();
        let library = AssetLibrary::new(dir.path());
        assert_eq!(library.list().unwrap(), vec!["a_ride.GPX", "b_ride.gpx"]);
    }

    #[test]
    fn test_list_missing_directory_is_io_error() {
        let library = AssetLibrary::new("/nonexistent/cyclelink-assets");
        assert!(matches!(library.list(), Err(TrackError::Io(_))));
    }

    #[test]
    fn test_load_by_name() {
        let dir = create_test_catalog();
        let library = AssetLibrary::new(dir.path());
        let track = library.load("b_ride.gpx").unwrap();
        assert_eq!(track.points().len(), 2);
        assert!((track.extensions().total_distance - 1200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_unknown_name() {
        let dir = create_test_catalog();
        let library = AssetLibrary::new(dir.path());
        match library.load("no_such_ride.gpx") {
            Err(TrackError::UnknownAsset(name)) => assert_eq!(name, "no_such_ride.gpx"),
            other => panic!("expected unknown asset, got {other:?}"),
        }
    }

    #[test]
    fn test_load_all_preserves_catalog_order() {
        let dir = create_test_catalog();
        let library = AssetLibrary::new(dir.path());
        let tracks = library.load_all().unwrap();
        let names: Vec<&str> = tracks.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a_ride.GPX", "b_ride.gpx"]);
        assert!(tracks.iter().all(|(_, t)| t.points().len() == 2));
    }

    #[test]
    fn test_load_all_fails_on_first_broken_file() {
        let dir = create_test_catalog();
        std::fs::write(dir.path().join("corrupt.gpx"), "<gpx><trk>").unwrap();
        let library = AssetLibrary::new(dir.path());
        assert!(matches!(
            library.load_all(),
            Err(TrackError::Parse(_))
        ));
    }
}
