//! Excellon drill file encoder

use crate::board::Board;
use crate::dedup::{Dimension, UniqueSet};
use crate::error::{PcbError, Result, ResultExt};
use crate::layer::HoleClass;
use crate::output::{write_all, GeneratorInfo};
use crate::shape::Hole;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const FORMAT: &str = "Excellon";

fn file_suffix(class: HoleClass) -> &'static str {
    match class {
        HoleClass::Plated => "PTH.drl",
        HoleClass::Unplated => "NPTH.drl",
    }
}

/// Writes one drill file per hole class, each with its own tool table
pub struct ExcellonWriter<'a> {
    board: &'a Board,
    info: &'a GeneratorInfo,
}

impl<'a> ExcellonWriter<'a> {
    pub fn new(board: &'a Board, info: &'a GeneratorInfo) -> Self {
        Self { board, info }
    }

    /// Render the drill file for `class`
    pub fn render(&self, class: HoleClass) -> Result<String> {
        let holes = self.board.holes.class(class);
        self.render_holes(holes, class)
    }

    fn render_holes(&self, holes: &[Hole], class: HoleClass) -> Result<String> {
        let mut tools = UniqueSet::new();
        let mut plan = Vec::with_capacity(holes.len());
        for hole in holes {
            if !(hole.d > 0.0) || !hole.cx.is_finite() || !hole.cy.is_finite() {
                return Err(PcbError::UnsupportedShape {
                    format: FORMAT,
                    reason: format!("hole {:?} has no drillable size or position", hole),
                }
                .into());
            }
            // tool numbers start at 1, T0 unloads
            plan.push((tools.insert(Dimension::new(hole.d)) + 1, hole));
        }

        let info = self.info;
        let mut out = vec![
            "M48".to_string(),
            format!(
                "; {} {} {} {} {}",
                info.program,
                info.version,
                info.project,
                class.as_str(),
                info.created.format("%Y-%m-%dT%H:%M:%S%:z")
            ),
            "FMAT,2".to_string(),
            info.unit.excellon_token().to_string(),
        ];

        for (ordinal, diameter) in tools.iter() {
            out.push(format!("T{}C{:.3}", ordinal + 1, diameter.value()));
        }

        out.push("%".to_string());
        out.push("G90".to_string());
        out.push("G05".to_string());

        for (tool, hole) in plan {
            out.push(format!("T{}", tool));
            out.push(format!(
                "X{:.3}Y{:.3}",
                hole.cx,
                self.board.height - hole.cy
            ));
        }

        out.push("T0".to_string());
        out.push("M30".to_string());

        debug!(
            "{} drill: {} hole(s), {} tool(s)",
            class.as_str(),
            holes.len(),
            tools.len()
        );

        let mut text = out.join("\n");
        text.push('\n');
        Ok(text)
    }

    /// Render both drill files destined for `folder`
    pub fn render_all(&self, folder: &Path) -> Result<Vec<(PathBuf, String)>> {
        HoleClass::ALL
            .iter()
            .map(|&class| {
                let path = self.info.file_path(folder, file_suffix(class));
                self.render(class).map(|content| (path, content))
            })
            .collect::<Result<Vec<_>>>()
            .with_format_context(FORMAT)
    }

    /// Render both drill files, then write them into `folder`
    pub fn write(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        let files = self.render_all(folder)?;

        let written = write_all(&files)?;
        info!("Wrote {} drill file(s) to {}", written.len(), folder.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Unit;
    use crate::outline::Outline;
    use crate::shape::Point;

    fn board() -> Board {
        let outline = Outline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(50.0, 20.0),
            Point::new(0.0, 20.0),
        ])
        .unwrap();
        Board::new(&outline)
    }

    #[test]
    fn test_tool_table_in_first_seen_order() {
        let mut board = board();
        board.holes.plated.extend([
            Hole::new(1.0, 1.0, 5.0),
            Hole::new(2.0, 2.0, 15.0),
            Hole::new(3.0, 3.0, 5.0),
        ]);
        let info = GeneratorInfo::new("drill", Unit::Metric);

        let text = ExcellonWriter::new(&board, &info)
            .render(HoleClass::Plated)
            .unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "M48");
        assert!(lines[1].starts_with("; outline2pcb"));
        assert_eq!(&lines[2..7], &["FMAT,2", "METRIC", "T1C5.000", "T2C15.000", "%"]);
        assert_eq!(&lines[7..9], &["G90", "G05"]);
        assert_eq!(
            &lines[9..15],
            &["T1", "X1.000Y19.000", "T2", "X2.000Y18.000", "T1", "X3.000Y17.000"]
        );
        assert_eq!(&lines[15..], &["T0", "M30"]);
    }

    #[test]
    fn test_each_class_has_own_tools() {
        let mut board = board();
        board.holes.plated.push(Hole::new(1.0, 1.0, 0.5));
        board.holes.unplated.push(Hole::new(4.0, 4.0, 3.2));
        let info = GeneratorInfo::new("drill", Unit::Imperial);

        let writer = ExcellonWriter::new(&board, &info);
        let npth = writer.render(HoleClass::Unplated).unwrap();

        assert!(npth.contains("INCH\nT1C3.200\n%"));
        assert!(!npth.contains("0.500"));
    }

    #[test]
    fn test_empty_class_still_renders() {
        let board = board();
        let info = GeneratorInfo::new("drill", Unit::Metric);

        let text = ExcellonWriter::new(&board, &info)
            .render(HoleClass::Unplated)
            .unwrap();

        assert!(text.contains("METRIC\n%\nG90\nG05\nT0\nM30"));
    }

    #[test]
    fn test_zero_diameter_is_rejected() {
        let mut board = board();
        board.holes.plated.push(Hole::new(1.0, 1.0, 0.0));
        let info = GeneratorInfo::new("drill", Unit::Metric);

        assert!(ExcellonWriter::new(&board, &info)
            .render(HoleClass::Plated)
            .is_err());
    }
}
