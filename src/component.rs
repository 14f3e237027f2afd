//! Footprint contract: how placed parts contribute geometry to a board
//!
//! Every geometry source (footprints and routed nets) exposes up to eight layer
//! producers and two hole producers. A producer that is not overridden returns
//! `None`, meaning the source contributes nothing to that sink.

use crate::layer::{HoleClass, LayerKind, LayerSlot, Side};
use crate::shape::{Hole, Point, Shape};

/// Output of a producer: a single item or an ordered sequence
#[derive(Debug, Clone, PartialEq)]
pub enum Produced<T> {
    One(T),
    Many(Vec<T>),
}

macro_rules! produced_from {
    ($item:ty) => {
        impl From<$item> for Produced<$item> {
            fn from(item: $item) -> Self {
                Produced::One(item)
            }
        }

        impl From<Vec<$item>> for Produced<$item> {
            fn from(items: Vec<$item>) -> Self {
                Produced::Many(items)
            }
        }
    };
}

produced_from!(Shape);
produced_from!(Hole);

impl<T> IntoIterator for Produced<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Produced::One(item) => vec![item].into_iter(),
            Produced::Many(items) => items.into_iter(),
        }
    }
}

/// Optional per-layer and per-hole-class geometry producers
pub trait LayerSource: Send + Sync {
    fn silkscreen_top(&self) -> Option<Produced<Shape>> {
        None
    }

    fn silkscreen_bottom(&self) -> Option<Produced<Shape>> {
        None
    }

    fn paste_top(&self) -> Option<Produced<Shape>> {
        None
    }

    fn paste_bottom(&self) -> Option<Produced<Shape>> {
        None
    }

    fn mask_top(&self) -> Option<Produced<Shape>> {
        None
    }

    fn mask_bottom(&self) -> Option<Produced<Shape>> {
        None
    }

    fn copper_top(&self) -> Option<Produced<Shape>> {
        None
    }

    fn copper_bottom(&self) -> Option<Produced<Shape>> {
        None
    }

    fn holes_plated(&self) -> Option<Produced<Hole>> {
        None
    }

    fn holes_unplated(&self) -> Option<Produced<Hole>> {
        None
    }
}

/// A placed physical part
pub trait Footprint: LayerSource {
    /// Placement point `(cx, cy)`
    fn point(&self) -> Point;

    /// Reference designator, e.g. "L1"
    fn designator(&self) -> &str;
}

/// Ask `source` for its geometry on `slot`
pub fn produce_layer<S: LayerSource + ?Sized>(source: &S, slot: LayerSlot) -> Option<Produced<Shape>> {
    match (slot.kind, slot.side) {
        (LayerKind::Silkscreen, Side::Top) => source.silkscreen_top(),
        (LayerKind::Silkscreen, Side::Bottom) => source.silkscreen_bottom(),
        (LayerKind::Paste, Side::Top) => source.paste_top(),
        (LayerKind::Paste, Side::Bottom) => source.paste_bottom(),
        (LayerKind::Mask, Side::Top) => source.mask_top(),
        (LayerKind::Mask, Side::Bottom) => source.mask_bottom(),
        (LayerKind::Copper, Side::Top) => source.copper_top(),
        (LayerKind::Copper, Side::Bottom) => source.copper_bottom(),
    }
}

/// Ask `source` for the holes it drills of class `class`
pub fn produce_holes<S: LayerSource + ?Sized>(source: &S, class: HoleClass) -> Option<Produced<Hole>> {
    match class {
        HoleClass::Plated => source.holes_plated(),
        HoleClass::Unplated => source.holes_unplated(),
    }
}
