//! Layer vocabulary: board sides, manufacturing layer categories and hole classes

use std::fmt;

/// A copper side of a two-layer board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Top, Side::Bottom];

    pub fn flipped(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manufacturing layer category; each one exists on both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Silkscreen,
    Paste,
    Mask,
    Copper,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Silkscreen => "silkscreen",
            LayerKind::Paste => "paste",
            LayerKind::Mask => "mask",
            LayerKind::Copper => "copper",
        }
    }
}

/// One of the eight (category, side) geometry sinks of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerSlot {
    pub kind: LayerKind,
    pub side: Side,
}

impl LayerSlot {
    pub const fn new(kind: LayerKind, side: Side) -> Self {
        Self { kind, side }
    }

    /// Layout visits slots in exactly this order
    pub const ALL: [LayerSlot; 8] = [
        LayerSlot::new(LayerKind::Silkscreen, Side::Top),
        LayerSlot::new(LayerKind::Silkscreen, Side::Bottom),
        LayerSlot::new(LayerKind::Paste, Side::Top),
        LayerSlot::new(LayerKind::Paste, Side::Bottom),
        LayerSlot::new(LayerKind::Mask, Side::Top),
        LayerSlot::new(LayerKind::Mask, Side::Bottom),
        LayerSlot::new(LayerKind::Copper, Side::Top),
        LayerSlot::new(LayerKind::Copper, Side::Bottom),
    ];
}

impl fmt::Display for LayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind.as_str(), self.side)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoleClass {
    Plated,
    Unplated,
}

impl HoleClass {
    pub const ALL: [HoleClass; 2] = [HoleClass::Plated, HoleClass::Unplated];

    pub fn as_str(&self) -> &'static str {
        match self {
            HoleClass::Plated => "plated",
            HoleClass::Unplated => "unplated",
        }
    }
}
