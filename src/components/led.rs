use crate::component::{Footprint, LayerSource, Produced};
use crate::shape::{Draw, Point, Shape};

/// Gap between the pads and the silkscreen marker
const SILKSCREEN_PADDING: f64 = 0.2;
const SILKSCREEN_STROKE: f64 = 0.1;

/// Two-pad surface-mount LED, pads stacked along +y
#[derive(Debug, Clone)]
pub struct Led {
    designator: String,
    point: Point,
    pad_width: f64,
    pad_height: f64,
    spacing: f64,
    radius: Option<f64>,
}

impl Led {
    pub fn new(designator: impl Into<String>, cx: f64, cy: f64) -> Self {
        Self {
            designator: designator.into(),
            point: Point::new(cx, cy),
            pad_width: 1.2,
            pad_height: 1.2,
            spacing: 0.9,
            radius: Some(0.25),
        }
    }

    pub fn with_pad(mut self, width: f64, height: f64) -> Self {
        self.pad_width = width;
        self.pad_height = height;
        self
    }

    /// Clear distance between the two pads
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Pad corner radius, `None` for square corners
    pub fn with_radius(mut self, radius: Option<f64>) -> Self {
        self.radius = radius;
        self
    }

    fn pad(&self, cy: f64) -> Shape {
        let pad = Shape::rect(self.point.x, cy, self.pad_width, self.pad_height).with_draw(Draw::Fill);

        match self.radius {
            Some(radius) => pad.with_radius(radius),
            None => pad,
        }
    }

    fn pads(&self) -> Produced<Shape> {
        let second = self.point.y + self.pad_height + self.spacing;
        vec![self.pad(self.point.y), self.pad(second)].into()
    }
}

impl LayerSource for Led {
    fn copper_top(&self) -> Option<Produced<Shape>> {
        Some(self.pads())
    }

    fn mask_top(&self) -> Option<Produced<Shape>> {
        Some(self.pads())
    }

    fn paste_top(&self) -> Option<Produced<Shape>> {
        Some(self.pads())
    }

    /// A "U" bracket around the first pad, open towards the second one
    fn silkscreen_top(&self) -> Option<Produced<Shape>> {
        let padding = SILKSCREEN_PADDING;
        let length = self.pad_height * 2.5;
        let origin_x = self.point.x - self.pad_width / 2.0;
        let origin_y = self.point.y - self.pad_height / 2.0;

        let left = origin_x - padding;
        let right = origin_x + self.pad_width + padding;
        let top = origin_y - padding;

        let points = vec![
            Point::new(left, top + length),
            Point::new(left, top),
            Point::new(right, top),
            Point::new(right, top + length),
        ];

        Some(Shape::polyline(points).with_stroke(SILKSCREEN_STROKE).into())
    }
}

impl Footprint for Led {
    fn point(&self) -> Point {
        self.point
    }

    fn designator(&self) -> &str {
        &self.designator
    }
}
