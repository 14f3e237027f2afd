//! Generation pipeline for outline2pcb
//!
//! This module drives a run from the outline file to the finished output
//! folders: outline, board, placement, layout, then the three encoders side by
//! side and the optional upload archive.

use crate::{
    archive::ArchiveCreator,
    board::Board,
    components::{Connector, Led},
    config::Config,
    error::{Result, ResultExt},
    excellon::ExcellonWriter,
    gerber::GerberWriter,
    input::load_outline,
    net::Net,
    outline::Outline,
    output::{write_all, GeneratorInfo},
    progress::ProgressTracker,
    svg::SvgWriter,
};
use anyhow::{anyhow, Context};
use std::path::PathBuf;
use std::thread::{self, ScopedJoinHandle};
use tracing::{debug, info};

/// Number of progress stages of a run without archive
const STAGES: usize = 4;

/// Files written by the three encoders
#[derive(Debug, Default)]
pub struct Outputs {
    pub gerbers: Vec<PathBuf>,
    pub drills: Vec<PathBuf>,
    pub svgs: Vec<PathBuf>,
}

/// The main generation engine
pub struct Generator {
    config: Config,
    progress_tracker: ProgressTracker,
    nets: Vec<Net>,
    outputs: Outputs,
    archive: Option<PathBuf>,
    outline_points: usize,
    components: usize,
}

impl Generator {
    /// Create a new generator with the given configuration
    pub fn new(config: Config) -> Self {
        let progress_enabled = !config.no_progress;

        Self {
            config,
            progress_tracker: ProgressTracker::new(progress_enabled),
            nets: Vec::new(),
            outputs: Outputs::default(),
            archive: None,
            outline_points: 0,
            components: 0,
        }
    }

    /// Route `net` on the generated board
    pub fn with_net(mut self, net: Net) -> Self {
        self.nets.push(net);
        self
    }

    /// Run the complete generation process
    pub fn run(&mut self) -> Result<()> {
        let start = std::time::Instant::now();
        info!("Starting generation for project {}", self.config.project);

        self.config
            .validate()
            .context("Configuration validation failed")?;

        let stages = STAGES + usize::from(self.config.zip);
        let progress = self
            .progress_tracker
            .create_stage_progress(stages, "Reading outline");

        match self.generate(&progress) {
            Ok(()) => {
                ProgressTracker::finish_progress(progress, "Generation completed");
                info!("Generation completed in {} ms", start.elapsed().as_millis());
                Ok(())
            }
            Err(e) => {
                ProgressTracker::finish_with_error(progress, "Generation failed");
                Err(e)
            }
        }
    }

    fn generate(&mut self, progress: &Option<indicatif::ProgressBar>) -> Result<()> {
        let outline = load_outline(
            &self.config.input,
            self.config.unit,
            self.config.segments,
            self.config.scale,
        )
        .context("Failed to load outline")?;
        self.outline_points = outline.points().len();
        ProgressTracker::advance(progress, "Laying out board");

        let board = self.build_board(&outline).context("Failed to lay out board")?;
        ProgressTracker::advance(progress, "Writing files");

        let info = GeneratorInfo::new(self.config.project.clone(), self.config.unit);
        self.outputs = self.encode(&board, &info)?;
        ProgressTracker::advance(progress, "Packaging");

        if self.config.zip {
            self.archive = Some(self.create_archive().context("Failed to create archive")?);
            ProgressTracker::advance(progress, "Archive created");
        }

        ProgressTracker::advance(progress, "Done");
        Ok(())
    }

    /// Build the board, place every configured part and route the nets
    pub fn build_board(&mut self, outline: &Outline) -> Result<Board> {
        let mut board = Board::new(outline);

        for (index, point) in self.config.leds.iter().enumerate() {
            board.add_component(Led::new(format!("L{}", index + 1), point.x, point.y));
        }

        for (index, point) in self.config.connectors.iter().enumerate() {
            board.add_component(Connector::new(format!("J{}", index + 1), point.x, point.y));
        }

        for net in &self.nets {
            board.add_net(net.clone());
        }

        self.components = board.components().len();
        board.layout()?;
        Ok(board)
    }

    /// Run the three encoders concurrently over the laid-out board.
    ///
    /// Every format is rendered before the first file is written, so a format
    /// that fails to encode leaves all output folders untouched.
    fn encode(&self, board: &Board, info: &GeneratorInfo) -> Result<Outputs> {
        let gerber_dir = self.config.gerber_dir();
        let svg_dir = self.config.svg_dir();

        let (gerbers, drills, svgs) = thread::scope(|scope| {
            let gerbers = scope.spawn(|| GerberWriter::new(board, info).render_all(&gerber_dir));
            let drills = scope.spawn(|| ExcellonWriter::new(board, info).render_all(&gerber_dir));
            let svgs = scope.spawn(|| anyhow::Ok(SvgWriter::new(board, info).render_all(&svg_dir)));

            (
                join(gerbers, "Gerber"),
                join(drills, "Excellon"),
                join(svgs, "SVG"),
            )
        });
        let (gerbers, drills, svgs) = (gerbers?, drills?, svgs?);
        debug!(
            "Rendered {} Gerber, {} drill and {} SVG file(s)",
            gerbers.len(),
            drills.len(),
            svgs.len()
        );

        let outputs = Outputs {
            gerbers: write_all(&gerbers).with_format_context("Gerber")?,
            drills: write_all(&drills).with_format_context("Excellon")?,
            svgs: write_all(&svgs).with_format_context("SVG")?,
        };
        info!(
            "Wrote {} file(s) to {} and {}",
            outputs.gerbers.len() + outputs.drills.len() + outputs.svgs.len(),
            gerber_dir.display(),
            svg_dir.display()
        );
        Ok(outputs)
    }

    fn create_archive(&self) -> Result<PathBuf> {
        let output = self
            .config
            .output_path
            .join(format!("{}-gerbers.zip", self.config.project));

        let files = self.outputs.gerbers.iter().chain(&self.outputs.drills);
        ArchiveCreator::create_zip(files, &output, !self.config.no_progress)
    }

    /// Every file written by the last run, archive included
    pub fn written_files(&self) -> Vec<PathBuf> {
        self.outputs
            .gerbers
            .iter()
            .chain(&self.outputs.drills)
            .chain(&self.outputs.svgs)
            .chain(self.archive.as_ref())
            .cloned()
            .collect()
    }

    /// Get statistics about the generation process
    pub fn get_generation_stats(&self) -> GenerationStats {
        GenerationStats {
            outline_points: self.outline_points,
            components: self.components,
            nets: self.nets.len(),
            gerber_files: self.outputs.gerbers.len(),
            drill_files: self.outputs.drills.len(),
            svg_files: self.outputs.svgs.len(),
            archive: self.archive.clone(),
        }
    }
}

fn join<T>(handle: ScopedJoinHandle<'_, Result<T>>, format: &str) -> Result<T> {
    debug!("Waiting for {} encoder", format);
    handle
        .join()
        .map_err(|_| anyhow!("{} encoder panicked", format))?
}

/// Statistics about the generation process
#[derive(Debug)]
pub struct GenerationStats {
    pub outline_points: usize,
    pub components: usize,
    pub nets: usize,
    pub gerber_files: usize,
    pub drill_files: usize,
    pub svg_files: usize,
    pub archive: Option<PathBuf>,
}

impl GenerationStats {
    pub fn total_files(&self) -> usize {
        self.gerber_files + self.drill_files + self.svg_files + usize::from(self.archive.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Unit;
    use crate::layer::Side;
    use crate::shape::Point;
    use std::fs;
    use tempfile::tempdir;

    fn config(input: PathBuf, output_path: PathBuf) -> Config {
        Config {
            input,
            output_path,
            scale: 1.0,
            segments: 40,
            unit: Unit::Metric,
            project: "demo".to_string(),
            leds: vec![Point::new(10.0, 10.0)],
            connectors: vec![Point::new(30.0, 20.0)],
            zip: false,
            verbose: false,
            no_progress: true,
        }
    }

    fn rectangle_input(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("outline.txt");
        fs::write(&path, "0,0\n80,0\n80,40\n0,40\n0,0\n").unwrap();
        path
    }

    #[test]
    fn test_build_board_places_parts() {
        let dir = tempdir().unwrap();
        let mut generator = Generator::new(config(rectangle_input(dir.path()), dir.path().join("out")));
        let outline = Outline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(80.0, 0.0),
            Point::new(80.0, 40.0),
            Point::new(0.0, 0.0),
        ])
        .unwrap();

        let board = generator.build_board(&outline).unwrap();

        assert_eq!(board.components().len(), 2);
        assert_eq!(board.components()[0].designator(), "L1");
        assert_eq!(board.components()[1].designator(), "J1");
        assert_eq!(board.holes.plated.len(), 1);
    }

    #[test]
    fn test_run_writes_every_format() {
        let dir = tempdir().unwrap();
        let mut net = Net::new(Side::Top);
        net.move_to(10.0, 10.0).line_to_via(20.0, 10.0).line_to(30.0, 20.0);

        let mut generator =
            Generator::new(config(rectangle_input(dir.path()), dir.path().join("out"))).with_net(net);
        generator.run().unwrap();

        let stats = generator.get_generation_stats();
        assert_eq!(stats.gerber_files, 9);
        assert_eq!(stats.drill_files, 2);
        assert_eq!(stats.svg_files, 12);
        assert_eq!(stats.components, 2);
        assert_eq!(stats.nets, 1);
        assert!(stats.archive.is_none());
        assert!(generator.written_files().iter().all(|path| path.is_file()));
    }

    #[test]
    fn test_run_with_zip() {
        let dir = tempdir().unwrap();
        let mut config = config(rectangle_input(dir.path()), dir.path().join("out"));
        config.zip = true;

        let mut generator = Generator::new(config);
        generator.run().unwrap();

        let stats = generator.get_generation_stats();
        let archive = stats.archive.clone().unwrap();
        assert_eq!(archive, dir.path().join("out").join("demo-gerbers.zip"));
        assert!(archive.is_file());
        assert_eq!(stats.total_files(), 9 + 2 + 12 + 1);
    }

    #[test]
    fn test_failed_format_writes_no_other_format() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let mut config = config(rectangle_input(dir.path()), out.clone());
        // too far out for the Gerber number format, fine for drill and SVG
        config.leds = vec![Point::new(20000.0, 10.0)];

        let mut generator = Generator::new(config);

        assert!(generator.run().is_err());
        assert_eq!(fs::read_dir(out.join("gerbers")).unwrap().count(), 0);
        assert_eq!(fs::read_dir(out.join("svg")).unwrap().count(), 0);
        assert!(generator.written_files().is_empty());
    }

    #[test]
    fn test_malformed_net_fails_before_writing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");

        let mut generator =
            Generator::new(config(rectangle_input(dir.path()), out.clone())).with_net(Net::new(Side::Bottom));

        assert!(generator.run().is_err());
        assert_eq!(fs::read_dir(out.join("gerbers")).unwrap().count(), 0);
    }
}
