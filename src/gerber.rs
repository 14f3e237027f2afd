//! Gerber RS-274X encoder
//!
//! Renders every copper, mask, paste and silkscreen layer plus the board edge
//! into its own X2-attributed Gerber file. Shapes are reduced to a
//! deduplicated aperture table; rounded rectangles go through a parametric
//! aperture macro that is only defined in files that use it.

use crate::board::Board;
use crate::dedup::{Dimension, UniqueSet};
use crate::error::{PcbError, Result, ResultExt};
use crate::layer::{LayerKind, LayerSlot, Side};
use crate::output::{write_all, GeneratorInfo};
use crate::shape::{decimal, Shape, ShapeKind, StepKind};
use anyhow::Context;
use md5::{Digest, Md5};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const FORMAT: &str = "Gerber";

/// First aperture number; D00-D09 are reserved
const FIRST_APERTURE: usize = 10;

const INTEGER_DIGITS: usize = 4;
const DECIMAL_DIGITS: usize = 6;

const ROUNDED_RECT_MACRO: &str = "RoundedRect";

/// One output file of the Gerber set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GerberLayer {
    CopperTop,
    CopperBottom,
    MaskTop,
    MaskBottom,
    PasteTop,
    PasteBottom,
    SilkscreenTop,
    SilkscreenBottom,
    EdgeCuts,
}

impl GerberLayer {
    pub const ALL: [GerberLayer; 9] = [
        GerberLayer::CopperTop,
        GerberLayer::CopperBottom,
        GerberLayer::MaskTop,
        GerberLayer::MaskBottom,
        GerberLayer::PasteTop,
        GerberLayer::PasteBottom,
        GerberLayer::SilkscreenTop,
        GerberLayer::SilkscreenBottom,
        GerberLayer::EdgeCuts,
    ];

    /// File name suffix, KiCad style
    pub fn token(self) -> &'static str {
        match self {
            GerberLayer::CopperTop => "F_Cu",
            GerberLayer::CopperBottom => "B_Cu",
            GerberLayer::MaskTop => "F_Mask",
            GerberLayer::MaskBottom => "B_Mask",
            GerberLayer::PasteTop => "F_Paste",
            GerberLayer::PasteBottom => "B_Paste",
            GerberLayer::SilkscreenTop => "F_Silkscreen",
            GerberLayer::SilkscreenBottom => "B_Silkscreen",
            GerberLayer::EdgeCuts => "Edge_Cuts",
        }
    }

    /// Value of the `%TF.FileFunction` attribute
    pub fn file_function(self) -> &'static str {
        match self {
            GerberLayer::CopperTop => "Copper,L1,Top",
            GerberLayer::CopperBottom => "Copper,L2,Bot",
            GerberLayer::MaskTop => "Soldermask,Top",
            GerberLayer::MaskBottom => "Soldermask,Bot",
            GerberLayer::PasteTop => "Paste,Top",
            GerberLayer::PasteBottom => "Paste,Bot",
            GerberLayer::SilkscreenTop => "Legend,Top",
            GerberLayer::SilkscreenBottom => "Legend,Bot",
            GerberLayer::EdgeCuts => "Profile,NP",
        }
    }

    /// Soldermask artwork describes openings, so its image is negative
    pub fn polarity(self) -> &'static str {
        match self {
            GerberLayer::MaskTop | GerberLayer::MaskBottom => "Negative",
            _ => "Positive",
        }
    }

    /// Board layer the file is drawn from, `None` for the edge
    pub fn slot(self) -> Option<LayerSlot> {
        let (kind, side) = match self {
            GerberLayer::CopperTop => (LayerKind::Copper, Side::Top),
            GerberLayer::CopperBottom => (LayerKind::Copper, Side::Bottom),
            GerberLayer::MaskTop => (LayerKind::Mask, Side::Top),
            GerberLayer::MaskBottom => (LayerKind::Mask, Side::Bottom),
            GerberLayer::PasteTop => (LayerKind::Paste, Side::Top),
            GerberLayer::PasteBottom => (LayerKind::Paste, Side::Bottom),
            GerberLayer::SilkscreenTop => (LayerKind::Silkscreen, Side::Top),
            GerberLayer::SilkscreenBottom => (LayerKind::Silkscreen, Side::Bottom),
            GerberLayer::EdgeCuts => return None,
        };
        Some(LayerSlot::new(kind, side))
    }

    pub fn file_suffix(self) -> String {
        format!("{}.gbr", self.token())
    }
}

/// Aperture geometry with the position stripped, so identical pads placed
/// anywhere on the layer share one table entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Aperture {
    Circle {
        diameter: Dimension,
    },
    Rect {
        width: Dimension,
        height: Dimension,
    },
    RoundedRect {
        radius: Dimension,
        width: Dimension,
        height: Dimension,
    },
}

impl Aperture {
    fn for_shape(shape: &Shape) -> Result<Self> {
        match &shape.kind {
            ShapeKind::Circle { r, .. } => Ok(Aperture::Circle {
                diameter: Dimension::new(r * 2.0),
            }),
            ShapeKind::Rect {
                width,
                height,
                radius,
                ..
            } => match radius {
                Some(radius) if *radius > 0.0 => {
                    if radius * 2.0 > width.min(*height) {
                        return Err(unsupported(format!(
                            "corner radius {} exceeds half of a {}x{} rectangle",
                            radius, width, height
                        )));
                    }
                    Ok(Aperture::RoundedRect {
                        radius: Dimension::new(*radius),
                        width: Dimension::new(*width),
                        height: Dimension::new(*height),
                    })
                }
                Some(radius) if *radius < 0.0 => {
                    Err(unsupported(format!("negative corner radius {}", radius)))
                }
                _ => Ok(Aperture::Rect {
                    width: Dimension::new(*width),
                    height: Dimension::new(*height),
                }),
            },
            ShapeKind::Polyline { points } if points.is_empty() => {
                Err(unsupported("polyline without points".to_string()))
            }
            ShapeKind::Path { steps } if steps.is_empty() => {
                Err(unsupported("path without steps".to_string()))
            }
            ShapeKind::Polyline { .. } | ShapeKind::Path { .. } => Ok(Aperture::Circle {
                diameter: Dimension::new(shape.stroke_width),
            }),
        }
    }

    fn is_macro(&self) -> bool {
        matches!(self, Aperture::RoundedRect { .. })
    }

    fn definition(&self, code: usize) -> String {
        match self {
            Aperture::Circle { diameter } => {
                format!("%ADD{}C,{}*%", code, decimal(diameter.value()))
            }
            Aperture::Rect { width, height } => format!(
                "%ADD{}R,{}X{}*%",
                code,
                decimal(width.value()),
                decimal(height.value())
            ),
            Aperture::RoundedRect {
                radius,
                width,
                height,
            } => format!(
                "%ADD{}{},{}X{}X{}*%",
                code,
                ROUNDED_RECT_MACRO,
                decimal(radius.value()),
                decimal(width.value()),
                decimal(height.value())
            ),
        }
    }
}

fn unsupported(reason: String) -> anyhow::Error {
    PcbError::UnsupportedShape {
        format: FORMAT,
        reason,
    }
    .into()
}

/// Rounded rectangle as an inner body, four corner discs and four edge strips.
///
/// `$1` corner radius, `$2` width, `$3` height. Unary minus is avoided since
/// older readers reject it.
fn rounded_rect_macro() -> String {
    let lines = [
        format!("%AM{}*", ROUNDED_RECT_MACRO),
        "0 Rectangle with rounded corners*".to_string(),
        "0 $1 Corner radius*".to_string(),
        "0 $2 Width*".to_string(),
        "0 $3 Height*".to_string(),
        // body
        "4,1,4,$1-$2/2,$1-$3/2,$2/2-$1,$1-$3/2,$2/2-$1,$3/2-$1,$1-$2/2,$3/2-$1,$1-$2/2,$1-$3/2,0*"
            .to_string(),
        // corners
        "1,1,$1+$1,$1-$2/2,$1-$3/2*".to_string(),
        "1,1,$1+$1,$2/2-$1,$1-$3/2*".to_string(),
        "1,1,$1+$1,$2/2-$1,$3/2-$1*".to_string(),
        "1,1,$1+$1,$1-$2/2,$3/2-$1*".to_string(),
        // edges
        "21,1,$2-$1-$1,$1,0,$3/2-$1/2,0*".to_string(),
        "21,1,$2-$1-$1,$1,0,$1/2-$3/2,0*".to_string(),
        "21,1,$1,$3-$1-$1,$2/2-$1/2,0,0*".to_string(),
        "21,1,$1,$3-$1-$1,$1/2-$2/2,0,0*%".to_string(),
    ];
    lines.join("\n")
}

/// Format a coordinate in the 4.6 fixed-point notation declared by `%FSLAX46Y46*%`
pub fn coordinate(value: f64) -> Result<String> {
    let limit = 10f64.powi((INTEGER_DIGITS + DECIMAL_DIGITS) as i32);
    let scaled = (value * 10f64.powi(DECIMAL_DIGITS as i32)).round();

    if !scaled.is_finite() || scaled.abs() >= limit {
        return Err(unsupported(format!(
            "coordinate {} does not fit in {} integer digits",
            value, INTEGER_DIGITS
        )));
    }

    let scaled = scaled as i64;
    let sign = if scaled < 0 { "-" } else { "" };
    Ok(format!(
        "{}{:0width$}",
        sign,
        scaled.abs(),
        width = INTEGER_DIGITS + DECIMAL_DIGITS
    ))
}

/// Stable GUID for `%TF.ProjectId`, an MD5 name-based (version 3) UUID of the
/// project name
fn project_guid(project: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(project.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest);
    bytes[6] = (bytes[6] & 0x0f) | 0x30;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Writes the Gerber set of a laid-out board
pub struct GerberWriter<'a> {
    board: &'a Board,
    info: &'a GeneratorInfo,
}

impl<'a> GerberWriter<'a> {
    pub fn new(board: &'a Board, info: &'a GeneratorInfo) -> Self {
        Self { board, info }
    }

    fn shapes(&self, layer: GerberLayer) -> &'a [Shape] {
        match layer.slot() {
            Some(slot) => self.board.layers.slot(slot),
            None => std::slice::from_ref(&self.board.outline),
        }
    }

    fn point(&self, x: f64, y: f64) -> Result<String> {
        Ok(format!(
            "X{}Y{}",
            coordinate(x)?,
            coordinate(self.board.height - y)?
        ))
    }

    fn header(&self, layer: GerberLayer) -> Vec<String> {
        let info = self.info;
        vec![
            format!(
                "%TF.GenerationSoftware,{},{},{}*%",
                info.program, info.program, info.version
            ),
            format!(
                "%TF.CreationDate,{}*%",
                info.created.format("%Y-%m-%dT%H:%M:%S%:z")
            ),
            format!(
                "%TF.ProjectId,{},{},1*%",
                info.project,
                project_guid(&info.project)
            ),
            format!("%TF.FileFunction,{}*%", layer.file_function()),
            format!("%TF.FilePolarity,{}*%", layer.polarity()),
            format!("%FSLAX{0}{1}Y{0}{1}*%", INTEGER_DIGITS, DECIMAL_DIGITS),
            format!("G04 {} {}*", info.program, info.version),
            format!("G04 Layer {}*", layer.token()),
            format!("G04 Created {}*", info.created.format("%Y-%m-%d %H:%M:%S")),
            format!("%MO{}*%", info.unit.gerber_token()),
            "%LPD*%".to_string(),
            "G01*".to_string(),
        ]
    }

    /// Emit the draw block of a single shape
    fn draw(&self, out: &mut Vec<String>, shape: &Shape) -> Result<()> {
        match &shape.kind {
            ShapeKind::Circle { cx, cy, .. } | ShapeKind::Rect { cx, cy, .. } => {
                out.push(format!("{}D03*", self.point(*cx, *cy)?));
            }
            ShapeKind::Polyline { points } => {
                for (index, point) in points.iter().enumerate() {
                    let op = if index == 0 { "D02" } else { "D01" };
                    out.push(format!("{}{}*", self.point(point.x, point.y)?, op));
                }
            }
            ShapeKind::Path { steps } => {
                for (index, step) in steps.iter().enumerate() {
                    let op = match step.kind {
                        _ if index == 0 => "D02",
                        StepKind::Move => "D02",
                        StepKind::Line => "D01",
                    };
                    out.push(format!("{}{}*", self.point(step.x, step.y)?, op));
                }
            }
        }
        Ok(())
    }

    /// Render one Gerber file to a string
    pub fn render(&self, layer: GerberLayer) -> Result<String> {
        let shapes = self.shapes(layer);

        let mut apertures = UniqueSet::new();
        let mut plan = Vec::with_capacity(shapes.len());
        for shape in shapes {
            let aperture = Aperture::for_shape(shape)
                .with_context(|| format!("Cannot encode {} on {}", shape.type_name(), layer.token()))?;
            plan.push((apertures.insert(aperture), shape));
        }

        let mut out = self.header(layer);

        if apertures.iter().any(|(_, aperture)| aperture.is_macro()) {
            out.push(rounded_rect_macro());
        }

        for (ordinal, aperture) in apertures.iter() {
            out.push(aperture.definition(FIRST_APERTURE + ordinal));
        }

        for (object, (ordinal, shape)) in plan.into_iter().enumerate() {
            out.push(format!("D{}*", FIRST_APERTURE + ordinal));
            out.push(format!("%TO.C,X{}*%", object + 1));
            self.draw(&mut out, shape)?;
            out.push("%TD*%".to_string());
        }

        out.push("M02*".to_string());

        debug!(
            "{}: {} shape(s), {} aperture(s)",
            layer.token(),
            shapes.len(),
            apertures.len()
        );

        let mut text = out.join("\n");
        text.push('\n');
        Ok(text)
    }

    /// Render every layer file destined for `folder` without touching disk
    pub fn render_all(&self, folder: &Path) -> Result<Vec<(PathBuf, String)>> {
        GerberLayer::ALL
            .iter()
            .map(|&layer| {
                let path = self.info.file_path(folder, &layer.file_suffix());
                self.render(layer).map(|content| (path, content))
            })
            .collect::<Result<Vec<_>>>()
            .with_format_context(FORMAT)
    }

    /// Render all layers, then write them into `folder`.
    ///
    /// Nothing is written when any layer fails to render.
    pub fn write(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        let files = self.render_all(folder)?;

        let written = write_all(&files)?;
        info!("Wrote {} Gerber file(s) to {}", written.len(), folder.display());
        Ok(written)
    }
}
