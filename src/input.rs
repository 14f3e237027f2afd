//! Outline input: plain point lists and Gerber outline layers
//!
//! Both readers return the contour as an ordered list of points in the unit of
//! the run, with Y growing downwards like the rest of the board model.

use crate::config::Unit;
use crate::error::{PcbError, Result, ResultExt};
use crate::outline::Outline;
use crate::shape::Point;
use anyhow::anyhow;
use gerber_parser::gerber_types::{
    Command, Coordinates, DCode, ExtendedCode, FunctionCode, Operation, Unit as GerberUnit,
};
use gerber_parser::parse;
use regex::Regex;
use std::fs;
use std::io::{BufReader, Cursor};
use std::path::Path;
use tracing::{debug, info};

const MM_PER_INCH: f64 = 25.4;

/// File extensions read as Gerber rather than as a point list
const GERBER_EXTENSIONS: [&str; 5] = ["gbr", "gko", "gm1", "gml", "ger"];

const POINT_PATTERN: &str =
    r"^\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*(?:,\s*|\s+)([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*$";

/// Reads `x,y` or `x y` coordinate pairs
pub struct PointParser {
    pattern: Regex,
}

impl PointParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(POINT_PATTERN)?,
        })
    }

    pub fn parse(&self, text: &str) -> Result<Point> {
        let caps = self
            .pattern
            .captures(text)
            .ok_or_else(|| anyhow!("Expected \"x,y\", got {:?}", text))?;

        let x: f64 = caps[1].parse()?;
        let y: f64 = caps[2].parse()?;
        Ok(Point::new(x, y))
    }
}

/// Parse `x,y` or `x y`
pub fn parse_point(text: &str) -> Result<Point> {
    PointParser::new()?.parse(text)
}

/// Parse a point list, one point per line. Blank lines and `#` comments are
/// skipped.
pub fn parse_point_list(content: &str) -> Result<Vec<Point>> {
    let parser = PointParser::new()?;
    content
        .lines()
        .enumerate()
        .map(|(index, line)| (index, line.split('#').next().unwrap_or("").trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(index, line)| parser.parse(line).map_err(|e| invalid(format!("line {}: {}", index + 1, e))))
        .collect()
}

fn invalid(reason: String) -> anyhow::Error {
    PcbError::InvalidOutline { reason }.into()
}

fn unit_factor(from: GerberUnit, to: Unit) -> f64 {
    match (from, to) {
        (GerberUnit::Inches, Unit::Metric) => MM_PER_INCH,
        (GerberUnit::Millimeters, Unit::Imperial) => 1.0 / MM_PER_INCH,
        _ => 1.0,
    }
}

fn coords_to_point(coords: &Option<Coordinates>, last: Point, factor: f64) -> Point {
    let mut point = last;
    if let Some(coords) = coords {
        if let Some(x) = coords.x {
            let value: f64 = x.into();
            point.x = value * factor;
        }
        if let Some(y) = coords.y {
            let value: f64 = y.into();
            // Gerber Y grows upwards
            point.y = -value * factor;
        }
    }
    point
}

/// Extract the outline contour from a Gerber layer.
///
/// Draws are chained into contours; a move to anywhere but the current
/// position starts a new one. The contour with the most vertices wins.
pub fn parse_gerber_outline(content: &str, unit: Unit) -> Result<Vec<Point>> {
    let reader = BufReader::new(Cursor::new(content));
    let doc = match parse(reader) {
        Ok(doc) => doc,
        Err((partial, err)) => {
            if partial.commands().is_empty() {
                return Err(invalid(format!("failed to parse Gerber outline: {err}")));
            }
            partial
        }
    };

    let mut units = doc.units.unwrap_or(GerberUnit::Millimeters);
    let mut position = Point::default();
    let mut contours: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();

    for command in doc.commands() {
        match command {
            Command::ExtendedCode(ExtendedCode::Unit(u)) => units = *u,
            Command::FunctionCode(FunctionCode::DCode(DCode::Operation(op))) => {
                let factor = unit_factor(units, unit);
                match op {
                    Operation::Move(coords) => {
                        let next = coords_to_point(coords, position, factor);
                        if next != position {
                            if current.len() > 1 {
                                contours.push(std::mem::take(&mut current));
                            } else {
                                current.clear();
                            }
                        }
                        position = next;
                    }
                    Operation::Interpolate(coords, _) => {
                        let next = coords_to_point(coords, position, factor);
                        if current.is_empty() {
                            current.push(position);
                        }
                        current.push(next);
                        position = next;
                    }
                    Operation::Flash(coords) => {
                        position = coords_to_point(coords, position, factor);
                    }
                }
            }
            _ => {}
        }
    }

    if current.len() > 1 {
        contours.push(current);
    }

    debug!("Gerber outline has {} contour(s)", contours.len());

    contours
        .into_iter()
        .max_by_key(|contour| contour.len())
        .ok_or_else(|| invalid("Gerber file contains no drawn outline".to_string()))
}

fn is_gerber(path: &Path, content: &str) -> bool {
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| GERBER_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    by_extension || content.trim_start().starts_with('%') || content.trim_start().starts_with("G04")
}

/// Read the raw contour from `path`
pub fn read_contour(path: &Path, unit: Unit) -> Result<Vec<Point>> {
    let content = fs::read_to_string(path).with_path_context("read", path)?;

    let points = if is_gerber(path, &content) {
        info!("Reading Gerber outline: {}", path.display());
        parse_gerber_outline(&content, unit)
    } else {
        info!("Reading point list outline: {}", path.display());
        parse_point_list(&content)
    }
    .with_path_context("parse", path)?;

    debug!("Read {} contour point(s)", points.len());
    Ok(points)
}

/// Read, resample and normalize the outline stored at `path`
pub fn load_outline(path: &Path, unit: Unit, segments: usize, scale: f64) -> Result<Outline> {
    let contour = read_contour(path, unit)?;

    let mut outline = Outline::resample(&contour, segments)?;
    outline.anchor_at_origin();

    if scale != 1.0 {
        outline.scale(scale);
    }

    info!(
        "Outline: {} point(s), {} x {}",
        outline.points().len(),
        outline.width(),
        outline.height()
    );
    Ok(outline)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE_GERBER: &str = "\
%FSLAX46Y46*%
%MOMM*%
%ADD10C,0.100000*%
D10*
X0000000000Y0000000000D02*
X0010000000Y0000000000D01*
X0010000000Y0020000000D01*
X0000000000Y0020000000D01*
X0000000000Y0000000000D01*
M02*
";

    #[test]
    fn test_parse_point_separators() {
        assert_eq!(parse_point("1,2").unwrap(), Point::new(1.0, 2.0));
        assert_eq!(parse_point(" -1.5 , 2 ").unwrap(), Point::new(-1.5, 2.0));
        assert_eq!(parse_point("3 4.25").unwrap(), Point::new(3.0, 4.25));
        assert_eq!(parse_point("1e1,.5").unwrap(), Point::new(10.0, 0.5));
        assert!(parse_point("1,2,3").is_err());
        assert!(parse_point("x,1").is_err());
    }

    #[test]
    fn test_point_parser_is_reusable() {
        let parser = PointParser::new().unwrap();

        assert_eq!(parser.parse("1,2").unwrap(), Point::new(1.0, 2.0));
        assert_eq!(parser.parse("-3 4").unwrap(), Point::new(-3.0, 4.0));
        assert!(parser.parse("").is_err());
    }

    #[test]
    fn test_point_list_skips_comments() {
        let points = parse_point_list("# heart\n0,0\n\n10,0 # corner\n10,10\n").unwrap();

        assert_eq!(
            points,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)]
        );
    }

    #[test]
    fn test_point_list_reports_line() {
        let err = parse_point_list("0,0\nbad\n").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PcbError>(),
            Some(PcbError::InvalidOutline { reason }) if reason.starts_with("line 2")
        ));
    }

    #[test]
    fn test_gerber_outline_flips_y() {
        let points = parse_gerber_outline(SQUARE_GERBER, Unit::Metric).unwrap();

        assert_eq!(points.len(), 5);
        assert_eq!(points[0], Point::new(0.0, 0.0));
        assert_eq!(points[1], Point::new(10.0, 0.0));
        assert_eq!(points[2], Point::new(10.0, -20.0));
    }

    #[test]
    fn test_gerber_outline_converts_units() {
        let points = parse_gerber_outline(SQUARE_GERBER, Unit::Imperial).unwrap();

        assert!((points[1].x - 10.0 / 25.4).abs() < 1e-9);
    }

    #[test]
    fn test_gerber_without_draws_is_rejected() {
        let content = "%FSLAX46Y46*%\n%MOMM*%\nM02*\n";

        assert!(parse_gerber_outline(content, Unit::Metric).is_err());
    }

    #[test]
    fn test_load_outline_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.gbr");
        fs::write(&path, SQUARE_GERBER).unwrap();

        let outline = load_outline(&path, Unit::Metric, 12, 2.0).unwrap();

        assert_eq!(outline.min(), Point::new(0.0, 0.0));
        assert!((outline.width() - 20.0).abs() < 1e-9);
        assert!((outline.height() - 40.0).abs() < 1e-9);
        assert_eq!(outline.points().first(), outline.points().last());
    }

    #[test]
    fn test_missing_file_has_path_context() {
        let err = read_contour(Path::new("does/not/exist.txt"), Unit::Metric).unwrap_err();

        assert!(format!("{:#}", err).contains("does/not/exist.txt"));
    }
}
