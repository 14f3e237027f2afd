//! Board document and the layout pass that gathers geometry into layers

use crate::component::{produce_holes, produce_layer, Footprint, LayerSource};
use crate::error::Result;
use crate::layer::{HoleClass, LayerKind, LayerSlot, Side};
use crate::net::Net;
use crate::outline::Outline;
use crate::shape::{Hole, Shape};
use tracing::{debug, info, warn};

/// Stroke width used to render the board edge
pub const OUTLINE_STROKE: f64 = 1.0;

/// Shapes of one layer category on both sides
#[derive(Debug, Clone, Default)]
pub struct SidePair {
    pub top: Vec<Shape>,
    pub bottom: Vec<Shape>,
}

impl SidePair {
    pub fn side(&self, side: Side) -> &[Shape] {
        match side {
            Side::Top => &self.top,
            Side::Bottom => &self.bottom,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut Vec<Shape> {
        match side {
            Side::Top => &mut self.top,
            Side::Bottom => &mut self.bottom,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Layers {
    pub paste: SidePair,
    pub mask: SidePair,
    pub silkscreen: SidePair,
    pub copper: SidePair,
}

impl Layers {
    pub fn slot(&self, slot: LayerSlot) -> &[Shape] {
        self.kind(slot.kind).side(slot.side)
    }

    fn kind(&self, kind: LayerKind) -> &SidePair {
        match kind {
            LayerKind::Paste => &self.paste,
            LayerKind::Mask => &self.mask,
            LayerKind::Silkscreen => &self.silkscreen,
            LayerKind::Copper => &self.copper,
        }
    }

    fn slot_mut(&mut self, slot: LayerSlot) -> &mut Vec<Shape> {
        let pair = match slot.kind {
            LayerKind::Paste => &mut self.paste,
            LayerKind::Mask => &mut self.mask,
            LayerKind::Silkscreen => &mut self.silkscreen,
            LayerKind::Copper => &mut self.copper,
        };
        pair.side_mut(slot.side)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Holes {
    pub plated: Vec<Hole>,
    pub unplated: Vec<Hole>,
}

impl Holes {
    pub fn class(&self, class: HoleClass) -> &[Hole] {
        match class {
            HoleClass::Plated => &self.plated,
            HoleClass::Unplated => &self.unplated,
        }
    }

    fn class_mut(&mut self, class: HoleClass) -> &mut Vec<Hole> {
        match class {
            HoleClass::Plated => &mut self.plated,
            HoleClass::Unplated => &mut self.unplated,
        }
    }
}

/// The board document: outline, placed parts, routed nets and the layer sinks
/// that `layout` fills.
///
/// `width` and `height` are taken from the outline once at construction.
/// Geometry placed outside that box is kept, not clipped.
pub struct Board {
    pub outline: Shape,
    pub layers: Layers,
    pub holes: Holes,
    pub width: f64,
    pub height: f64,
    components: Vec<Box<dyn Footprint>>,
    nets: Vec<Net>,
    laid_out: bool,
}

impl Board {
    /// Start an empty board on `outline`.
    ///
    /// An outline whose minimum is not at (0, 0) is moved there. Components
    /// and nets are not moved along, so callers place them in the anchored
    /// frame: `outline.min()` maps to the origin.
    pub fn new(outline: &Outline) -> Self {
        let mut outline = outline.clone();
        if outline.min().x != 0.0 || outline.min().y != 0.0 {
            warn!(
                "Outline anchored at origin (min was {:?}); place parts relative to it",
                outline.min()
            );
            outline.anchor_at_origin();
        }

        Self {
            outline: Shape::polyline(outline.points().to_vec()).with_stroke(OUTLINE_STROKE),
            layers: Layers::default(),
            holes: Holes::default(),
            width: outline.width(),
            height: outline.height(),
            components: Vec::new(),
            nets: Vec::new(),
            laid_out: false,
        }
    }

    pub fn add_component<F: Footprint + 'static>(&mut self, component: F) -> &mut Self {
        debug!(
            "Placing {} at ({}, {})",
            component.designator(),
            component.point().x,
            component.point().y
        );
        self.components.push(Box::new(component));
        self
    }

    pub fn add_net(&mut self, net: Net) -> &mut Self {
        self.nets.push(net);
        self
    }

    pub fn components(&self) -> &[Box<dyn Footprint>] {
        &self.components
    }

    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    /// Pull geometry out of every component and net into the layer and hole
    /// lists.
    ///
    /// Appends on every call; running it twice duplicates all geometry.
    pub fn layout(&mut self) -> Result<()> {
        if self.laid_out {
            warn!("Board layout already ran; geometry will be duplicated");
        }

        for net in &self.nets {
            net.validate()?;
        }

        let mut layers = std::mem::take(&mut self.layers);
        let mut holes = std::mem::take(&mut self.holes);

        for component in &self.components {
            collect(component.as_ref(), &mut layers, &mut holes);
        }

        for net in &self.nets {
            collect(net, &mut layers, &mut holes);
        }

        self.layers = layers;
        self.holes = holes;
        self.laid_out = true;

        info!(
            "Laid out {} component(s) and {} net(s): {} plated, {} unplated hole(s)",
            self.components.len(),
            self.nets.len(),
            self.holes.plated.len(),
            self.holes.unplated.len()
        );
        Ok(())
    }
}

fn collect<S: LayerSource + ?Sized>(source: &S, layers: &mut Layers, holes: &mut Holes) {
    for slot in LayerSlot::ALL {
        if let Some(shapes) = produce_layer(source, slot) {
            layers.slot_mut(slot).extend(shapes);
        }
    }

    for class in HoleClass::ALL {
        if let Some(drills) = produce_holes(source, class) {
            holes.class_mut(class).extend(drills);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Produced;
    use crate::components::{Connector, Led};
    use crate::shape::Point;

    fn rectangle(width: f64, height: f64) -> Outline {
        Outline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(width, 0.0),
            Point::new(width, height),
            Point::new(0.0, height),
            Point::new(0.0, 0.0),
        ])
        .unwrap()
    }

    struct CopperTopOnly;

    impl LayerSource for CopperTopOnly {
        fn copper_top(&self) -> Option<Produced<Shape>> {
            Some(Shape::circle(1.0, 1.0, 0.5).into())
        }
    }

    impl Footprint for CopperTopOnly {
        fn point(&self) -> Point {
            Point::new(1.0, 1.0)
        }

        fn designator(&self) -> &str {
            "TP1"
        }
    }

    #[test]
    fn test_board_copies_outline_size() {
        let board = Board::new(&rectangle(80.0, 40.0));

        assert_eq!((board.width, board.height), (80.0, 40.0));
        assert_eq!(board.outline.stroke_width, OUTLINE_STROKE);
    }

    #[test]
    fn test_board_anchors_offset_outline() {
        let mut outline = rectangle(20.0, 10.0);
        outline.translate(5.0, 7.0);

        let board = Board::new(&outline);

        assert_eq!((board.width, board.height), (20.0, 10.0));
        match &board.outline.kind {
            crate::shape::ShapeKind::Polyline { points } => {
                assert_eq!(points[0], Point::new(0.0, 0.0));
            }
            other => panic!("expected polyline, got {:?}", other),
        }
    }

    #[test]
    fn test_parts_stay_in_anchored_frame() {
        let mut outline = rectangle(20.0, 10.0);
        outline.translate(5.0, 7.0);
        let mut board = Board::new(&outline);

        board
            .add_component(Connector::new("J1", 1.0, 2.0))
            .layout()
            .unwrap();

        assert_eq!(board.holes.plated, vec![Hole::new(1.0, 2.0, 1.0)]);
    }

    #[test]
    fn test_single_producer_touches_single_layer() {
        let mut board = Board::new(&rectangle(10.0, 10.0));
        board.add_component(CopperTopOnly);
        board.layout().unwrap();

        for slot in LayerSlot::ALL {
            let expected = if slot == LayerSlot::new(LayerKind::Copper, Side::Top) {
                1
            } else {
                0
            };
            assert_eq!(board.layers.slot(slot).len(), expected, "{}", slot);
        }
        assert!(board.holes.plated.is_empty());
        assert!(board.holes.unplated.is_empty());
    }

    #[test]
    fn test_layout_collects_components_then_nets() {
        let mut board = Board::new(&rectangle(80.0, 40.0));
        board.add_component(Led::new("L1", 10.0, 10.0));
        board.add_component(Connector::new("J1", 30.0, 20.0));

        let mut net = Net::new(Side::Top);
        net.move_to(10.0, 10.0).line_to_via(30.0, 10.0).line_to(30.0, 20.0);
        board.add_net(net);

        board.layout().unwrap();

        // 2 LED pads + 1 connector pad + net path + via pad
        assert_eq!(board.layers.copper.top.len(), 5);
        // connector pad + net path + via pad
        assert_eq!(board.layers.copper.bottom.len(), 3);
        assert_eq!(board.layers.silkscreen.top.len(), 1);
        assert_eq!(board.holes.plated.len(), 2);
        assert_eq!(board.holes.plated[0].d, 1.0);
        assert_eq!(board.holes.plated[1].d, 0.5);
    }

    #[test]
    fn test_layout_appends_on_repeat() {
        let mut board = Board::new(&rectangle(10.0, 10.0));
        board.add_component(CopperTopOnly);

        board.layout().unwrap();
        board.layout().unwrap();

        assert_eq!(board.layers.copper.top.len(), 2);
    }

    #[test]
    fn test_layout_rejects_empty_net() {
        let mut board = Board::new(&rectangle(10.0, 10.0));
        board.add_net(Net::new(Side::Bottom));

        assert!(board.layout().is_err());
        assert!(board.layers.copper.bottom.is_empty());
    }
}
