//! Single-pass GPX parser for recorded rides
//!
//! Ride files carry five aggregate fields in a track-level `<extensions>`
//! block alongside the usual `<trkpt>` sequence. Parsing is fail-fast: any
//! structural or numeric problem aborts with a [`ParseError`] and no partial
//! track ever escapes. Only the first `<trk>` in a document counts; points
//! are accepted both directly under `<trk>` and nested in `<trkseg>`.

use std::io::Read;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::track::{TrackData, TrackExtensions, TrackPoint};

/// Errors produced while parsing a GPX document
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The document is not well-formed XML.
    #[error("malformed GPX document: {0}")]
    MalformedDocument(#[from] quick_xml::Error),

    /// A required element or attribute is absent.
    #[error("missing required <{0}>")]
    MissingElement(&'static str),

    /// An element or attribute holds text that does not parse as a number.
    #[error("invalid number '{value}' in <{element}>")]
    InvalidNumber {
        element: &'static str,
        value: String,
    },
}

type Result<T> = std::result::Result<T, ParseError>;

/// Parse a GPX document held in memory.
///
/// The whole document is scanned once; XML problems after the track still
/// fail the parse.
pub fn parse_str(xml: &str) -> Result<TrackData> {
    let mut reader = Reader::from_str(xml);
    let mut track: Option<TrackData> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"trk" => {
                if track.is_none() {
                    track = Some(parse_trk(&mut reader)?);
                } else {
                    // Later tracks are scanned for well-formedness only.
                    reader
                        .read_to_end(e.name())
                        .map_err(ParseError::MalformedDocument)?;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::MalformedDocument(e)),
            _ => {}
        }
    }

    track.ok_or(ParseError::MissingElement("trk"))
}

/// Parse a GPX document from an arbitrary byte stream.
///
/// The stream is read to the end up front; ride recordings are at most a few
/// megabytes. I/O failures surface as [`crate::TrackError::Io`].
pub fn parse_reader<R: Read>(mut reader: R) -> crate::Result<TrackData> {
    let mut xml = String::new();
    reader.read_to_string(&mut xml)?;
    Ok(parse_str(&xml)?)
}

/// Parse one `<trk>` subtree. The caller has already consumed the start tag.
fn parse_trk(reader: &mut Reader<&[u8]>) -> Result<TrackData> {
    let mut extensions: Option<TrackExtensions> = None;
    let mut points: Vec<TrackPoint> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"extensions" => {
                    // First block wins, matching document-order lookup.
                    if extensions.is_none() {
                        extensions = Some(parse_extensions(reader)?);
                    } else {
                        reader
                            .read_to_end(e.name())
                            .map_err(ParseError::MalformedDocument)?;
                    }
                }
                b"trkseg" => parse_trkseg(reader, &mut points)?,
                b"trkpt" => points.push(parse_trkpt(&e, reader)?),
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(ParseError::MalformedDocument)?;
                }
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                // A self-closing trkpt cannot carry <ele>/<time> children.
                b"trkpt" => {
                    parse_lat_lon(&e)?;
                    return Err(ParseError::MissingElement("ele"));
                }
                b"extensions" if extensions.is_none() => {
                    return Err(ParseError::MissingElement("totalTime"));
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trk" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::MalformedDocument(e)),
            _ => {}
        }
    }

    let extensions = extensions.ok_or(ParseError::MissingElement("extensions"))?;
    Ok(TrackData::new(extensions, points))
}

/// Collect the `<trkpt>` children of one `<trkseg>`.
fn parse_trkseg(reader: &mut Reader<&[u8]>, points: &mut Vec<TrackPoint>) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => points.push(parse_trkpt(&e, reader)?),
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(ParseError::MalformedDocument)?;
                }
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"trkpt" => {
                parse_lat_lon(&e)?;
                return Err(ParseError::MissingElement("ele"));
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkseg" => return Ok(()),
            Ok(Event::Eof) => return Ok(()),
            Err(e) => return Err(ParseError::MalformedDocument(e)),
            _ => {}
        }
    }
}

/// Parse the five aggregate fields of the track-level `<extensions>` block.
fn parse_extensions(reader: &mut Reader<&[u8]>) -> Result<TrackExtensions> {
    let mut total_time: Option<f64> = None;
    let mut cumulative_decrease: Option<f64> = None;
    let mut cumulative_climb: Option<f64> = None;
    let mut total_distance: Option<f64> = None;
    let mut route_type: Option<i32> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"totalTime" => {
                    let text = read_text(reader, &e)?;
                    total_time = Some(parse_f64("totalTime", &text)?);
                }
                b"cumulativeDecrease" => {
                    let text = read_text(reader, &e)?;
                    cumulative_decrease = Some(parse_f64("cumulativeDecrease", &text)?);
                }
                b"cumulativeClimb" => {
                    let text = read_text(reader, &e)?;
                    cumulative_climb = Some(parse_f64("cumulativeClimb", &text)?);
                }
                b"totalDistance" => {
                    let text = read_text(reader, &e)?;
                    total_distance = Some(parse_f64("totalDistance", &text)?);
                }
                b"routeType" => {
                    let text = read_text(reader, &e)?;
                    route_type = Some(parse_i32("routeType", &text)?);
                }
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(ParseError::MalformedDocument)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"extensions" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::MalformedDocument(e)),
            _ => {}
        }
    }

    Ok(TrackExtensions {
        total_time: total_time.ok_or(ParseError::MissingElement("totalTime"))?,
        cumulative_decrease: cumulative_decrease
            .ok_or(ParseError::MissingElement("cumulativeDecrease"))?,
        cumulative_climb: cumulative_climb.ok_or(ParseError::MissingElement("cumulativeClimb"))?,
        total_distance: total_distance.ok_or(ParseError::MissingElement("totalDistance"))?,
        route_type: route_type.ok_or(ParseError::MissingElement("routeType"))?,
    })
}

/// Parse one `<trkpt>` and its required `<ele>`/`<time>` children. The
/// caller has consumed the start tag and passes it in for the attributes.
fn parse_trkpt(start: &BytesStart<'_>, reader: &mut Reader<&[u8]>) -> Result<TrackPoint> {
    let (lat, lon) = parse_lat_lon(start)?;

    let mut ele: Option<f64> = None;
    let mut time: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" => {
                    let text = read_text(reader, &e)?;
                    ele = Some(parse_f64("ele", &text)?);
                }
                b"time" => {
                    time = Some(read_text(reader, &e)?);
                }
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(ParseError::MalformedDocument)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkpt" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::MalformedDocument(e)),
            _ => {}
        }
    }

    Ok(TrackPoint {
        lat,
        lon,
        ele: ele.ok_or(ParseError::MissingElement("ele"))?,
        time: time.ok_or(ParseError::MissingElement("time"))?,
    })
}

/// Extract the `lat`/`lon` attributes from a point's start tag.
fn parse_lat_lon(e: &BytesStart<'_>) -> Result<(f64, f64)> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::MalformedDocument(e.into()))?;
        let value = std::str::from_utf8(&attr.value).unwrap_or_default();
        match attr.key.local_name().as_ref() {
            b"lat" => lat = Some(parse_f64("lat", value)?),
            b"lon" => lon = Some(parse_f64("lon", value)?),
            _ => {}
        }
    }

    let lat = lat.ok_or(ParseError::MissingElement("lat"))?;
    let lon = lon.ok_or(ParseError::MissingElement("lon"))?;
    Ok((lat, lon))
}

/// Read the text content of the element whose start tag was just consumed.
fn read_text(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<String> {
    let text = reader
        .read_text(start.name())
        .map_err(ParseError::MalformedDocument)?;
    Ok(text.trim().to_string())
}

fn parse_f64(element: &'static str, text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber {
            element,
            value: text.trim().to_string(),
        })
}

fn parse_i32(element: &'static str, text: &str) -> Result<i32> {
    text.trim()
        .parse::<i32>()
        .map_err(|_| ParseError::InvalidNumber {
            element,
            value: text.trim().to_string(),
        })
}
