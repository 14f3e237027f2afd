//! SVG preview encoder
//!
//! One document per layer, per hole class and for the board edge, plus a
//! composite `board.svg` that stacks all of them in distinct colors. Shapes
//! are painted with `currentColor` so the composite can tint each layer with a
//! plain CSS `color`.

use crate::board::Board;
use crate::error::{Result, ResultExt};
use crate::layer::{HoleClass, LayerKind, LayerSlot, Side};
use crate::output::{write_all, GeneratorInfo};
use crate::shape::{decimal, Draw, Hole, Shape, ShapeKind, StepKind};
use std::path::{Path, PathBuf};
use tracing::info;
use xmlwriter::{Indent, Options, XmlWriter};

const SVG_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;
const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

const BOARD_SUFFIX: &str = "board.svg";

/// A standalone SVG document of the set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvgLayer {
    Slot(LayerSlot),
    Edge,
    Holes(HoleClass),
}

impl SvgLayer {
    /// Every standalone document, in write order
    pub fn all() -> Vec<SvgLayer> {
        LayerSlot::ALL
            .into_iter()
            .map(SvgLayer::Slot)
            .chain([SvgLayer::Edge])
            .chain(HoleClass::ALL.into_iter().map(SvgLayer::Holes))
            .collect()
    }

    pub fn file_suffix(&self) -> String {
        match self {
            SvgLayer::Slot(slot) => format!("{}.svg", slot),
            SvgLayer::Edge => "edge.svg".to_string(),
            SvgLayer::Holes(class) => format!("holes.{}.svg", class.as_str()),
        }
    }
}

/// Stacking order and tint of the composite, bottom-most first
const COMPOSITE: [(SvgLayer, &str); 9] = [
    (
        SvgLayer::Slot(LayerSlot::new(LayerKind::Silkscreen, Side::Top)),
        "black",
    ),
    (SvgLayer::Slot(LayerSlot::new(LayerKind::Mask, Side::Top)), "#2225"),
    (SvgLayer::Slot(LayerSlot::new(LayerKind::Copper, Side::Top)), "red"),
    (
        SvgLayer::Slot(LayerSlot::new(LayerKind::Copper, Side::Bottom)),
        "blue",
    ),
    (
        SvgLayer::Slot(LayerSlot::new(LayerKind::Mask, Side::Bottom)),
        "#2225",
    ),
    (
        SvgLayer::Slot(LayerSlot::new(LayerKind::Silkscreen, Side::Bottom)),
        "yellow",
    ),
    (SvgLayer::Holes(HoleClass::Plated), "orange"),
    (SvgLayer::Holes(HoleClass::Unplated), "purple"),
    (SvgLayer::Edge, "gray"),
];

fn create_writer() -> XmlWriter {
    XmlWriter::new(Options {
        use_single_quote: false,
        indent: Indent::Spaces(2),
        attributes_indent: Indent::Spaces(2),
    })
}

fn write_draw(writer: &mut XmlWriter, shape: &Shape) {
    let (stroke, fill) = match shape.draw {
        Draw::Stroke => ("currentColor", "transparent"),
        Draw::Fill => ("transparent", "currentColor"),
        Draw::Both => ("currentColor", "currentColor"),
    };
    writer.write_attribute("stroke", stroke);
    writer.write_attribute("fill", fill);

    if shape.draw.strokes() {
        writer.write_attribute("stroke-width", &decimal(shape.stroke_width));
    }
}

fn write_shape(writer: &mut XmlWriter, shape: &Shape) {
    match &shape.kind {
        ShapeKind::Circle { cx, cy, r } => {
            writer.start_element("circle");
            writer.write_attribute("cx", &decimal(*cx));
            writer.write_attribute("cy", &decimal(*cy));
            writer.write_attribute("r", &decimal(*r));
        }
        ShapeKind::Rect {
            cx,
            cy,
            width,
            height,
            radius,
        } => {
            writer.start_element("rect");
            writer.write_attribute("x", &decimal(cx - width / 2.0));
            writer.write_attribute("y", &decimal(cy - height / 2.0));
            writer.write_attribute("width", &decimal(*width));
            writer.write_attribute("height", &decimal(*height));
            if let Some(radius) = radius {
                writer.write_attribute("rx", &decimal(*radius));
            }
        }
        ShapeKind::Polyline { points } => {
            let points = points
                .iter()
                .map(|p| format!("{},{}", decimal(p.x), decimal(p.y)))
                .collect::<Vec<_>>()
                .join(" ");
            writer.start_element("polyline");
            writer.write_attribute("points", &points);
        }
        ShapeKind::Path { steps } => {
            let d = steps
                .iter()
                .enumerate()
                .map(|(index, step)| {
                    let command = match step.kind {
                        _ if index == 0 => 'M',
                        StepKind::Move => 'M',
                        StepKind::Line => 'L',
                    };
                    format!("{} {},{}", command, decimal(step.x), decimal(step.y))
                })
                .collect::<Vec<_>>()
                .join(" ");
            writer.start_element("path");
            writer.write_attribute("d", &d);
        }
    }

    write_draw(writer, shape);
    writer.end_element();
}

fn write_hole(writer: &mut XmlWriter, hole: &Hole) {
    writer.start_element("circle");
    writer.write_attribute("cx", &decimal(hole.cx));
    writer.write_attribute("cy", &decimal(hole.cy));
    writer.write_attribute("r", &decimal(hole.d / 2.0));
    writer.write_attribute("fill", "currentColor");
    writer.end_element();
}

/// Writes the SVG set of a laid-out board
pub struct SvgWriter<'a> {
    board: &'a Board,
    info: &'a GeneratorInfo,
}

impl<'a> SvgWriter<'a> {
    pub fn new(board: &'a Board, info: &'a GeneratorInfo) -> Self {
        Self { board, info }
    }

    /// Open an `<svg>` root sized in `unit`.
    ///
    /// Nested roots pass an empty unit so they map 1:1 onto the parent's
    /// user space.
    fn start_root(&self, writer: &mut XmlWriter, unit: &str) {
        writer.start_element("svg");
        writer.write_attribute("xmlns", SVG_NAMESPACE);
        writer.write_attribute(
            "viewBox",
            &format!(
                "0 0 {} {}",
                decimal(self.board.width),
                decimal(self.board.height)
            ),
        );
        writer.write_attribute("width", &format!("{}{}", decimal(self.board.width), unit));
        writer.write_attribute("height", &format!("{}{}", decimal(self.board.height), unit));
    }

    /// Emit the `<svg>` element of one layer into `writer`
    fn write_layer(&self, writer: &mut XmlWriter, layer: SvgLayer, unit: &str) {
        self.start_root(writer, unit);
        match layer {
            SvgLayer::Slot(slot) => {
                for shape in self.board.layers.slot(slot) {
                    write_shape(writer, shape);
                }
            }
            SvgLayer::Edge => write_shape(writer, &self.board.outline),
            SvgLayer::Holes(class) => {
                for hole in self.board.holes.class(class) {
                    write_hole(writer, hole);
                }
            }
        }
        writer.end_element();
    }

    fn finish(&self, writer: XmlWriter) -> String {
        let mut result = SVG_HEADER.to_string();
        result.push('\n');
        result.push_str(&writer.end_document());
        result
    }

    fn provenance(&self, writer: &mut XmlWriter) {
        writer.write_comment(&format!(
            " {} {} for {} ",
            self.info.program, self.info.version, self.info.project
        ));
    }

    /// Render a standalone layer document
    pub fn render(&self, layer: SvgLayer) -> String {
        let mut writer = create_writer();
        self.provenance(&mut writer);
        self.write_layer(&mut writer, layer, self.info.unit.svg_suffix());
        self.finish(writer)
    }

    /// Render the composite preview with every layer nested in a tinted group
    pub fn render_board(&self) -> String {
        let mut writer = create_writer();
        self.provenance(&mut writer);
        self.start_root(&mut writer, self.info.unit.svg_suffix());

        for (layer, color) in COMPOSITE {
            writer.start_element("g");
            writer.write_attribute("style", &format!("color: {}", color));
            self.write_layer(&mut writer, layer, "");
            writer.end_element();
        }

        writer.end_element();
        self.finish(writer)
    }

    /// Render every layer document destined for `folder`, composite last
    pub fn render_all(&self, folder: &Path) -> Vec<(PathBuf, String)> {
        SvgLayer::all()
            .into_iter()
            .map(|layer| {
                (
                    self.info.file_path(folder, &layer.file_suffix()),
                    self.render(layer),
                )
            })
            .chain([(
                self.info.file_path(folder, BOARD_SUFFIX),
                self.render_board(),
            )])
            .collect()
    }

    /// Write every layer document, then the composite.
    ///
    /// `board.svg` is only written once all layer documents are on disk.
    pub fn write(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        let written = write_all(&self.render_all(folder)).with_format_context("SVG")?;

        info!("Wrote {} SVG file(s) to {}", written.len(), folder.display());
        Ok(written)
    }
}
