use crate::component::{Footprint, LayerSource, Produced};
use crate::shape::{Draw, Hole, Point, Shape};

/// Single through-hole pin with identical pads on both sides
#[derive(Debug, Clone)]
pub struct Connector {
    designator: String,
    point: Point,
    width: f64,
    height: f64,
    radius: Option<f64>,
    hole: f64,
}

impl Connector {
    pub fn new(designator: impl Into<String>, cx: f64, cy: f64) -> Self {
        Self {
            designator: designator.into(),
            point: Point::new(cx, cy),
            width: 1.7,
            height: 1.7,
            radius: None,
            hole: 1.0,
        }
    }

    pub fn with_pad(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_radius(mut self, radius: Option<f64>) -> Self {
        self.radius = radius;
        self
    }

    /// Finished drill diameter
    pub fn with_hole(mut self, diameter: f64) -> Self {
        self.hole = diameter;
        self
    }

    fn pad(&self) -> Option<Produced<Shape>> {
        let pad = Shape::rect(self.point.x, self.point.y, self.width, self.height).with_draw(Draw::Fill);
        let pad = match self.radius {
            Some(radius) => pad.with_radius(radius),
            None => pad,
        };
        Some(pad.into())
    }
}

impl LayerSource for Connector {
    fn copper_top(&self) -> Option<Produced<Shape>> {
        self.pad()
    }

    fn copper_bottom(&self) -> Option<Produced<Shape>> {
        self.pad()
    }

    fn mask_top(&self) -> Option<Produced<Shape>> {
        self.pad()
    }

    fn mask_bottom(&self) -> Option<Produced<Shape>> {
        self.pad()
    }

    fn paste_top(&self) -> Option<Produced<Shape>> {
        self.pad()
    }

    fn paste_bottom(&self) -> Option<Produced<Shape>> {
        self.pad()
    }

    fn holes_plated(&self) -> Option<Produced<Hole>> {
        Some(Hole::new(self.point.x, self.point.y, self.hole).into())
    }
}

impl Footprint for Connector {
    fn point(&self) -> Point {
        self.point
    }

    fn designator(&self) -> &str {
        &self.designator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeKind;

    #[test]
    fn test_pad_on_both_sides() {
        let connector = Connector::new("J1", 5.0, 6.0);

        let top: Vec<Shape> = connector.copper_top().unwrap().into_iter().collect();
        let bottom: Vec<Shape> = connector.copper_bottom().unwrap().into_iter().collect();

        assert_eq!(top, bottom);
        assert!(matches!(
            top[0].kind,
            ShapeKind::Rect { cx, cy, width, radius: None, .. } if cx == 5.0 && cy == 6.0 && width == 1.7
        ));
        assert!(connector.silkscreen_top().is_none());
    }

    #[test]
    fn test_plated_hole_at_placement() {
        let connector = Connector::new("J1", 5.0, 6.0).with_hole(0.8);
        let holes: Vec<Hole> = connector.holes_plated().unwrap().into_iter().collect();

        assert_eq!(holes, vec![Hole::new(5.0, 6.0, 0.8)]);
        assert!(connector.holes_unplated().is_none());
    }
}
