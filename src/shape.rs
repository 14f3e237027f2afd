//! Geometric primitives shared by the board model and every encoder

/// A 2D point in board units, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// How a shape is painted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Draw {
    #[default]
    Stroke,
    Fill,
    Both,
}

impl Draw {
    pub fn strokes(self) -> bool {
        matches!(self, Draw::Stroke | Draw::Both)
    }

    pub fn fills(self) -> bool {
        matches!(self, Draw::Fill | Draw::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Move,
    Line,
}

/// One vertex of a multi-segment path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStep {
    pub kind: StepKind,
    pub x: f64,
    pub y: f64,
}

impl PathStep {
    pub fn move_to(x: f64, y: f64) -> Self {
        Self {
            kind: StepKind::Move,
            x,
            y,
        }
    }

    pub fn line_to(x: f64, y: f64) -> Self {
        Self {
            kind: StepKind::Line,
            x,
            y,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    /// Axis-aligned rectangle centered on `(cx, cy)`.
    /// `radius` must not exceed half the shorter side.
    Rect {
        cx: f64,
        cy: f64,
        width: f64,
        height: f64,
        radius: Option<f64>,
    },
    Polyline {
        points: Vec<Point>,
    },
    Path {
        steps: Vec<PathStep>,
    },
}

/// A primitive plus its drawing intent
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub draw: Draw,
    pub stroke_width: f64,
}

impl Shape {
    pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;

    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            draw: Draw::default(),
            stroke_width: Self::DEFAULT_STROKE_WIDTH,
        }
    }

    pub fn circle(cx: f64, cy: f64, r: f64) -> Self {
        Self::new(ShapeKind::Circle { cx, cy, r })
    }

    pub fn rect(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::new(ShapeKind::Rect {
            cx,
            cy,
            width,
            height,
            radius: None,
        })
    }

    pub fn polyline(points: Vec<Point>) -> Self {
        Self::new(ShapeKind::Polyline { points })
    }

    pub fn path(steps: Vec<PathStep>) -> Self {
        Self::new(ShapeKind::Path { steps })
    }

    /// Round the corners of a rectangle; no effect on other primitives
    pub fn with_radius(mut self, corner: f64) -> Self {
        if let ShapeKind::Rect { radius, .. } = &mut self.kind {
            *radius = Some(corner);
        }
        self
    }

    pub fn with_draw(mut self, draw: Draw) -> Self {
        self.draw = draw;
        self
    }

    pub fn with_stroke(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    /// Short name used in logs and error messages
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ShapeKind::Circle { .. } => "circle",
            ShapeKind::Rect { .. } => "rect",
            ShapeKind::Polyline { .. } => "polyline",
            ShapeKind::Path { .. } => "path",
        }
    }
}

/// A drilled hole, `d` is the finished diameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hole {
    pub cx: f64,
    pub cy: f64,
    pub d: f64,
}

impl Hole {
    pub fn new(cx: f64, cy: f64, d: f64) -> Self {
        Self { cx, cy, d }
    }
}

/// Format a float for text output: rounded to six decimals, trailing zeros trimmed
pub fn decimal(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_defaults() {
        let shape = Shape::circle(1.0, 2.0, 3.0);

        assert_eq!(shape.draw, Draw::Stroke);
        assert_eq!(shape.stroke_width, 1.0);
        assert_eq!(shape.type_name(), "circle");
    }

    #[test]
    fn test_with_radius_only_affects_rects() {
        let rect = Shape::rect(0.0, 0.0, 2.0, 1.0).with_radius(0.25);
        assert!(matches!(
            rect.kind,
            ShapeKind::Rect {
                radius: Some(r),
                ..
            } if r == 0.25
        ));

        let circle = Shape::circle(0.0, 0.0, 1.0).with_radius(0.25);
        assert_eq!(circle, Shape::circle(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_draw_intent() {
        assert!(Draw::Stroke.strokes() && !Draw::Stroke.fills());
        assert!(!Draw::Fill.strokes() && Draw::Fill.fills());
        assert!(Draw::Both.strokes() && Draw::Both.fills());
    }

    #[test]
    fn test_decimal_formatting() {
        assert_eq!(decimal(0.1 + 0.2), "0.3");
        assert_eq!(decimal(10.0), "10");
        assert_eq!(decimal(-0.0000001), "0");
        assert_eq!(decimal(1.25), "1.25");
    }
}
