//! Board outline: a closed polygon in board units
//!
//! The outline arrives as a traced contour from an external collaborator.
//! It is resampled at a fixed arc-length interval, then anchored at the origin
//! before the board is built on top of it.

use crate::error::{PcbError, Result};
use crate::shape::Point;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    points: Vec<Point>,
    min: Point,
    max: Point,
}

impl Outline {
    /// Build an outline from an ordered, closed point sequence
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.len() < 3 {
            return Err(PcbError::InvalidOutline {
                reason: format!("need at least 3 points, got {}", points.len()),
            }
            .into());
        }

        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(PcbError::InvalidOutline {
                reason: "outline contains non-finite coordinates".to_string(),
            }
            .into());
        }

        let mut outline = Self {
            points,
            min: Point::default(),
            max: Point::default(),
        };
        outline.compute();
        Ok(outline)
    }

    /// Sample a traced contour every `length / segments` units of arc length.
    ///
    /// The start point is always the first sample. Samples are taken while the
    /// accumulated distance stays within the contour length, so the last one may
    /// fall short of the end by less than one interval. The start point is
    /// appended once more to close the outline.
    pub fn resample(contour: &[Point], segments: usize) -> Result<Self> {
        if segments == 0 {
            return Err(PcbError::InvalidOutline {
                reason: "segment count must be at least 1".to_string(),
            }
            .into());
        }

        if contour.len() < 2 {
            return Err(PcbError::InvalidOutline {
                reason: format!("traced contour has {} point(s)", contour.len()),
            }
            .into());
        }

        let length: f64 = contour.windows(2).map(|w| distance(w[0], w[1])).sum();
        if !(length > 0.0) {
            return Err(PcbError::InvalidOutline {
                reason: "traced contour has zero length".to_string(),
            }
            .into());
        }

        let interval = length / segments as f64;
        let first = contour[0];
        let mut points = vec![first];

        let mut at = interval;
        while at <= length {
            points.push(point_at_length(contour, at));
            at += interval;
        }

        points.push(first);

        debug!(
            "Resampled contour of length {:.3} into {} points",
            length,
            points.len()
        );

        Self::new(points)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.points = self
            .points
            .iter()
            .map(|p| Point::new(p.x + dx, p.y + dy))
            .collect();
        self.compute();
    }

    pub fn scale(&mut self, ratio: f64) {
        self.points = self
            .points
            .iter()
            .map(|p| Point::new(p.x * ratio, p.y * ratio))
            .collect();
        self.compute();
    }

    /// Move the outline so its bounding box starts at (0, 0)
    pub fn anchor_at_origin(&mut self) {
        let (dx, dy) = (-self.min.x, -self.min.y);
        if dx != 0.0 || dy != 0.0 {
            self.translate(dx, dy);
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn min(&self) -> Point {
        self.min
    }

    pub fn max(&self) -> Point {
        self.max
    }

    /// Bounding box width (`max.x - min.x`)
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Bounding box height (`max.y - min.y`)
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    fn compute(&mut self) {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);

        for p in &self.points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        self.min = min;
        self.max = max;
    }
}

fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

fn point_at_length(contour: &[Point], at: f64) -> Point {
    let mut walked = 0.0;

    for w in contour.windows(2) {
        let segment = distance(w[0], w[1]);
        if segment > 0.0 && walked + segment >= at {
            let t = (at - walked) / segment;
            return Point::new(
                w[0].x + (w[1].x - w[0].x) * t,
                w[0].y + (w[1].y - w[0].y) * t,
            );
        }
        walked += segment;
    }

    contour[contour.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn square() -> Outline {
        Outline::new(vec![
            Point::new(2.0, 3.0),
            Point::new(12.0, 3.0),
            Point::new(12.0, 8.0),
            Point::new(2.0, 8.0),
            Point::new(2.0, 3.0),
        ])
        .unwrap()
    }

    fn assert_points_close(a: &[Point], b: &[Point]) {
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(b) {
            assert!((p.x - q.x).abs() < EPS && (p.y - q.y).abs() < EPS, "{:?} != {:?}", p, q);
        }
    }

    #[test]
    fn test_bounding_box() {
        let outline = square();

        assert_eq!(outline.min(), Point::new(2.0, 3.0));
        assert_eq!(outline.max(), Point::new(12.0, 8.0));
        assert_eq!(outline.width(), 10.0);
        assert_eq!(outline.height(), 5.0);
    }

    #[test]
    fn test_translate_round_trip_and_additive_min() {
        let original = square();
        let mut outline = original.clone();

        outline.translate(4.5, -1.25);
        assert!((outline.min().x - (original.min().x + 4.5)).abs() < EPS);
        assert!((outline.min().y - (original.min().y - 1.25)).abs() < EPS);

        outline.translate(-4.5, 1.25);
        assert_points_close(outline.points(), original.points());
    }

    #[test]
    fn test_scale_round_trip() {
        let original = square();
        let mut outline = original.clone();

        outline.scale(3.7);
        assert!((outline.width() - original.width() * 3.7).abs() < EPS);

        outline.scale(1.0 / 3.7);
        assert_points_close(outline.points(), original.points());
    }

    #[test]
    fn test_anchor_at_origin() {
        let mut outline = square();
        outline.anchor_at_origin();

        assert_eq!(outline.min(), Point::new(0.0, 0.0));
        assert_eq!(outline.width(), 10.0);
        assert_eq!(outline.max().y, outline.height());
    }

    #[test]
    fn test_resample_starts_at_first_point_and_closes() {
        let contour = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 0.0),
        ];

        let outline = Outline::resample(&contour, 4).unwrap();
        let points = outline.points();

        assert_eq!(points[0], Point::new(0.0, 0.0));
        assert_eq!(points[points.len() - 1], Point::new(0.0, 0.0));
        assert!((points[1].x - 10.0).abs() < EPS && points[1].y.abs() < EPS);
        assert!((points[2].x - 10.0).abs() < EPS && (points[2].y - 10.0).abs() < EPS);
    }

    #[test]
    fn test_resample_last_sample_may_fall_short() {
        // 3 units long, sampled every 0.3 units: accumulated rounding may drop
        // the final sample, but never adds one past the end.
        let contour = vec![Point::new(0.0, 0.0), Point::new(3.0, 0.0)];
        let outline = Outline::resample(&contour, 10).unwrap();
        let points = outline.points();

        // start + up to 10 samples + closing point
        assert!(points.len() >= 11 && points.len() <= 12);
        assert!(points.iter().all(|p| p.x <= 3.0 + EPS));
    }

    #[test]
    fn test_invalid_outlines() {
        assert!(Outline::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).is_err());
        assert!(Outline::resample(&[Point::new(0.0, 0.0)], 10).is_err());
        assert!(
            Outline::resample(&[Point::new(0.0, 0.0), Point::new(0.0, 0.0)], 10).is_err()
        );
        assert!(Outline::resample(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)], 0).is_err());

        let err = Outline::new(vec![]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PcbError>(),
            Some(PcbError::InvalidOutline { .. })
        ));
    }
}
