//! Routed copper traces that may change side through vias

use crate::component::{LayerSource, Produced};
use crate::error::{PcbError, Result};
use crate::layer::Side;
use crate::shape::{Draw, Hole, PathStep, Shape};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NetStep {
    /// Start a disconnected segment
    Move { x: f64, y: f64, side: Side },
    Point { x: f64, y: f64, side: Side },
    /// Side change; always bracketed by points at the same coordinate
    Via { x: f64, y: f64 },
}

/// An electrical connection routed as an ordered path of steps
#[derive(Debug, Clone)]
pub struct Net {
    side: Side,
    stroke: f64,
    via_radius: f64,
    via_hole_radius: f64,
    steps: Vec<NetStep>,
}

impl Net {
    pub const DEFAULT_STROKE: f64 = 0.2;
    pub const DEFAULT_VIA_RADIUS: f64 = 0.5;
    pub const DEFAULT_VIA_HOLE_RADIUS: f64 = 0.25;

    /// Start a net on `side`
    pub fn new(side: Side) -> Self {
        Self {
            side,
            stroke: Self::DEFAULT_STROKE,
            via_radius: Self::DEFAULT_VIA_RADIUS,
            via_hole_radius: Self::DEFAULT_VIA_HOLE_RADIUS,
            steps: Vec::new(),
        }
    }

    pub fn with_stroke(mut self, stroke: f64) -> Self {
        self.stroke = stroke;
        self
    }

    /// Set the via copper pad radius and drill radius.
    ///
    /// The drill must be strictly smaller than the pad to leave an annular ring.
    pub fn with_via(mut self, radius: f64, hole_radius: f64) -> Result<Self> {
        if !(hole_radius > 0.0) || !(hole_radius < radius) {
            return Err(PcbError::InvalidVia {
                radius,
                hole_radius,
            }
            .into());
        }

        self.via_radius = radius;
        self.via_hole_radius = hole_radius;
        Ok(self)
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.steps.push(NetStep::Move {
            x,
            y,
            side: self.side,
        });
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.steps.push(NetStep::Point {
            x,
            y,
            side: self.side,
        });
        self
    }

    /// Route to `(x, y)` on the current side, drop a via there and continue
    /// on the opposite side
    pub fn line_to_via(&mut self, x: f64, y: f64) -> &mut Self {
        self.line_to(x, y);
        self.steps.push(NetStep::Via { x, y });
        self.side = self.side.flipped();
        self.line_to(x, y)
    }

    /// Side subsequent steps are routed on
    pub fn side(&self) -> Side {
        self.side
    }

    pub fn stroke(&self) -> f64 {
        self.stroke
    }

    pub fn steps(&self) -> &[NetStep] {
        &self.steps
    }

    pub fn via_radius(&self) -> f64 {
        self.via_radius
    }

    pub fn via_hole_radius(&self) -> f64 {
        self.via_hole_radius
    }

    /// Check the step list is routable: non-empty, and every via sits between
    /// a point on the old side and a point on the new side at its coordinate
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(PcbError::MalformedNet {
                reason: "net has no steps".to_string(),
            }
            .into());
        }

        for (index, step) in self.steps.iter().enumerate() {
            let NetStep::Via { x, y } = *step else {
                continue;
            };

            let before = index.checked_sub(1).and_then(|i| self.steps.get(i));
            let after = self.steps.get(index + 1);

            match (before, after) {
                (
                    Some(NetStep::Point {
                        x: bx,
                        y: by,
                        side: from,
                    }),
                    Some(NetStep::Point {
                        x: ax,
                        y: ay,
                        side: to,
                    }),
                ) if *bx == x && *by == y && *ax == x && *ay == y && from != to => {}
                _ => {
                    return Err(PcbError::MalformedNet {
                        reason: format!(
                            "via at ({}, {}) is not bracketed by points on both sides",
                            x, y
                        ),
                    }
                    .into())
                }
            }
        }

        Ok(())
    }

    fn vias(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.steps.iter().filter_map(|step| match *step {
            NetStep::Via { x, y } => Some((x, y)),
            _ => None,
        })
    }

    /// Trace geometry on `side` plus a pad for every via.
    ///
    /// Vias go through the board, so their pads appear on both sides. The
    /// path on a side always opens with a move, also when it starts at a via.
    pub fn copper(&self, side: Side) -> Vec<Shape> {
        let mut steps: Vec<PathStep> = self
            .steps
            .iter()
            .filter_map(|step| match *step {
                NetStep::Move { x, y, side: s } if s == side => Some(PathStep::move_to(x, y)),
                NetStep::Point { x, y, side: s } if s == side => Some(PathStep::line_to(x, y)),
                _ => None,
            })
            .collect();

        if let Some(first) = steps.first_mut() {
            *first = PathStep::move_to(first.x, first.y);
        }

        let mut shapes = Vec::new();
        if !steps.is_empty() {
            shapes.push(Shape::path(steps).with_stroke(self.stroke));
        }

        shapes.extend(
            self.vias()
                .map(|(x, y)| Shape::circle(x, y, self.via_radius).with_draw(Draw::Fill)),
        );

        shapes
    }
}

impl LayerSource for Net {
    fn copper_top(&self) -> Option<Produced<Shape>> {
        Some(self.copper(Side::Top).into())
    }

    fn copper_bottom(&self) -> Option<Produced<Shape>> {
        Some(self.copper(Side::Bottom).into())
    }

    fn holes_plated(&self) -> Option<Produced<Hole>> {
        let holes: Vec<Hole> = self
            .vias()
            .map(|(x, y)| Hole::new(x, y, self.via_hole_radius * 2.0))
            .collect();
        Some(holes.into())
    }
}
