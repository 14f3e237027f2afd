//! Configuration management for outline2pcb
//!
//! This module handles CLI argument parsing and application settings.

use crate::input::PointParser;
use crate::shape::Point;
use anyhow::{anyhow, bail, Context, Result};
use clap::builder::styling;
use clap::{value_parser, Arg, ArgMatches, ColorChoice, Command};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Build the CLI command
pub fn build_cli() -> Command {
    let styles = styling::Styles::styled()
        .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Blue.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default());

    Command::new("outline2pcb")
        .about("outline2pcb - Turn a board outline and placed parts into Gerber, drill and SVG files")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("Outline file: a point list (x,y per line) or a Gerber outline")
                .value_parser(value_parser!(String))
                .required(true),
        )
        .arg(
            Arg::new("output_path")
                .short('o')
                .long("output_path")
                .help("Output directory path")
                .value_parser(value_parser!(String))
                .default_value("./output"),
        )
        .arg(
            Arg::new("scale")
                .short('s')
                .long("scale")
                .help("Scale factor applied to the outline")
                .value_parser(value_parser!(f64))
                .default_value("1"),
        )
        .arg(
            Arg::new("segments")
                .long("segments")
                .help("Number of segments the outline is resampled into")
                .value_parser(value_parser!(usize))
                .default_value("100"),
        )
        .arg(
            Arg::new("unit")
                .short('u')
                .long("unit")
                .help("Unit of all coordinates (metric, mm, imperial, inch)")
                .value_parser(["metric", "mm", "imperial", "inch"])
                .default_value("metric"),
        )
        .arg(
            Arg::new("project")
                .short('p')
                .long("project")
                .help("Project name used as output file stem (defaults to the input file name)")
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("led")
                .long("led")
                .help("Place an LED at cx,cy (repeatable)")
                .value_name("CX,CY")
                .value_parser(value_parser!(String))
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("connector")
                .long("connector")
                .help("Place a through-hole connector at cx,cy (repeatable)")
                .value_name("CX,CY")
                .value_parser(value_parser!(String))
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("zip")
                .short('z')
                .long("zip")
                .help("Bundle the Gerber and drill files into a ZIP archive")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no_progress")
                .long("no-progress")
                .help("Disable progress indicators")
                .action(clap::ArgAction::SetTrue),
        )
}

/// Measurement unit of every coordinate in the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Metric,
    Imperial,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Metric => "metric",
            Unit::Imperial => "imperial",
        }
    }

    /// Operand of the Gerber `%MO` command
    pub fn gerber_token(&self) -> &'static str {
        match self {
            Unit::Metric => "MM",
            Unit::Imperial => "IN",
        }
    }

    /// Unit line of an Excellon header
    pub fn excellon_token(&self) -> &'static str {
        match self {
            Unit::Metric => "METRIC",
            Unit::Imperial => "INCH",
        }
    }

    /// CSS length suffix for SVG width and height
    pub fn svg_suffix(&self) -> &'static str {
        match self {
            Unit::Metric => "mm",
            Unit::Imperial => "in",
        }
    }
}

impl FromStr for Unit {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "metric" | "mm" => Ok(Unit::Metric),
            "imperial" | "inch" => Ok(Unit::Imperial),
            other => Err(anyhow!("Unknown unit: {}", other)),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Outline file
    pub input: PathBuf,

    /// Output directory path
    pub output_path: PathBuf,

    /// Scale factor for the outline
    pub scale: f64,

    /// Resampling resolution
    pub segments: usize,

    pub unit: Unit,

    /// Output file stem
    pub project: String,

    /// LED placements
    pub leds: Vec<Point>,

    /// Connector placements
    pub connectors: Vec<Point>,

    /// Create ZIP file for Gerber output
    pub zip: bool,

    /// Enable verbose logging
    pub verbose: bool,

    /// Disable progress bars
    pub no_progress: bool,
}

impl Config {
    /// Parse arguments and apply initial configuration
    pub fn from_args() -> Result<Self> {
        let matches = build_cli().get_matches();
        let config = Self::from_matches(&matches)?;

        // RUST_LOG takes precedence over verbose flag
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(if config.verbose { "info" } else { "warn" })
        });

        tracing_subscriber::fmt().with_env_filter(env_filter).init();

        if config.verbose {
            info!("Configuration: {:?}", config);
        }

        Ok(config)
    }

    /// Build a configuration from already parsed arguments
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let input = matches
            .get_one::<String>("input")
            .ok_or_else(|| anyhow!("Input path is required"))?;
        let input = PathBuf::from(input);

        let output_path = matches
            .get_one::<String>("output_path")
            .cloned()
            .unwrap_or_else(|| "./output".to_string());
        let output_path = PathBuf::from(output_path);

        let scale = matches.get_one::<f64>("scale").copied().unwrap_or(1.0);
        let segments = matches.get_one::<usize>("segments").copied().unwrap_or(100);

        let unit = matches
            .get_one::<String>("unit")
            .map(|u| u.parse::<Unit>())
            .transpose()?
            .unwrap_or_default();

        let project = match matches.get_one::<String>("project") {
            Some(project) => project.clone(),
            None => default_project(&input),
        };

        let leds = placements(matches, "led")?;
        let connectors = placements(matches, "connector")?;

        Ok(Config {
            input,
            output_path,
            scale,
            segments,
            unit,
            project,
            leds,
            connectors,
            zip: matches.get_flag("zip"),
            verbose: matches.get_flag("verbose"),
            no_progress: matches.get_flag("no_progress"),
        })
    }

    /// Directory receiving Gerber and drill files
    pub fn gerber_dir(&self) -> PathBuf {
        self.output_path.join("gerbers")
    }

    /// Directory receiving SVG previews
    pub fn svg_dir(&self) -> PathBuf {
        self.output_path.join("svg")
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if !self.input.exists() {
            bail!("Input path does not exist: {}", self.input.display());
        }

        if !self.input.is_file() {
            bail!("Input path is not a file: {}", self.input.display());
        }

        if !self.scale.is_finite() || self.scale <= 0.0 {
            bail!("Scale must be a positive number, got {}", self.scale);
        }

        if self.segments < 3 {
            bail!("At least 3 segments are needed, got {}", self.segments);
        }

        if self.project.is_empty() || self.project.contains(['/', '\\']) {
            bail!("Invalid project name: {:?}", self.project);
        }

        for dir in [self.gerber_dir(), self.svg_dir()] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
                info!("Created output directory: {}", dir.display());
            }
        }

        info!("Configuration validation completed successfully");
        Ok(())
    }
}

fn default_project(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("board")
        .to_string()
}

fn placements(matches: &ArgMatches, name: &str) -> Result<Vec<Point>> {
    let parser = PointParser::new()?;
    matches
        .get_many::<String>(name)
        .into_iter()
        .flatten()
        .map(|value| parser.parse(value).with_context(|| format!("Invalid --{} placement: {}", name, value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config> {
        let matches = build_cli().try_get_matches_from(args)?;
        Config::from_matches(&matches)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["outline2pcb", "--input", "shapes/heart.txt"]).unwrap();

        assert_eq!(config.input, PathBuf::from("shapes/heart.txt"));
        assert_eq!(config.output_path, PathBuf::from("./output"));
        assert_eq!(config.scale, 1.0);
        assert_eq!(config.segments, 100);
        assert_eq!(config.unit, Unit::Metric);
        assert_eq!(config.project, "heart");
        assert!(config.leds.is_empty());
        assert!(!config.zip);
    }

    #[test]
    fn test_placements_and_unit_alias() {
        let config = parse(&[
            "outline2pcb",
            "-i",
            "logo.gbr",
            "--unit",
            "inch",
            "--led",
            "10,10",
            "--led",
            "20.5, 4",
            "--connector",
            "3 4",
            "--project",
            "badge",
        ])
        .unwrap();

        assert_eq!(config.unit, Unit::Imperial);
        assert_eq!(config.leds, vec![Point::new(10.0, 10.0), Point::new(20.5, 4.0)]);
        assert_eq!(config.connectors, vec![Point::new(3.0, 4.0)]);
        assert_eq!(config.project, "badge");
        assert_eq!(config.gerber_dir(), PathBuf::from("./output/gerbers"));
    }

    #[test]
    fn test_bad_placement_is_rejected() {
        let err = parse(&["outline2pcb", "-i", "a.txt", "--led", "ten,10"]).unwrap_err();

        assert!(format!("{:#}", err).contains("--led"));
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("mm".parse::<Unit>().unwrap(), Unit::Metric);
        assert_eq!("Imperial".parse::<Unit>().unwrap(), Unit::Imperial);
        assert!("furlong".parse::<Unit>().is_err());
        assert_eq!(Unit::Imperial.gerber_token(), "IN");
        assert_eq!(Unit::Metric.excellon_token(), "METRIC");
    }

    #[test]
    fn test_validate_rejects_bad_scale() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("outline.txt");
        std::fs::write(&input, "0,0\n1,0\n1,1\n").unwrap();

        let mut config = parse(&["outline2pcb", "-i", input.to_str().unwrap()]).unwrap();
        config.output_path = dir.path().join("out");
        config.scale = 0.0;
        assert!(config.validate().is_err());

        config.scale = 2.0;
        config.validate().unwrap();
        assert!(config.gerber_dir().is_dir());
        assert!(config.svg_dir().is_dir());
    }
}
