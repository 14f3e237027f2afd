//! Shared plumbing for the file encoders: provenance and scoped file writes

use crate::config::Unit;
use crate::error::{Result, ResultExt};
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Who generated the files, when, and in which units.
///
/// Captured once per run and handed to every encoder so that their output is a
/// pure function of the board and this value.
#[derive(Debug, Clone)]
pub struct GeneratorInfo {
    pub program: String,
    pub version: String,
    pub created: DateTime<Local>,
    pub project: String,
    pub unit: Unit,
}

impl GeneratorInfo {
    pub fn new(project: impl Into<String>, unit: Unit) -> Self {
        Self {
            program: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created: Local::now(),
            project: project.into(),
            unit,
        }
    }

    pub fn with_created(mut self, created: DateTime<Local>) -> Self {
        self.created = created;
        self
    }

    /// `<project>-<suffix>` inside `folder`
    pub fn file_path(&self, folder: &Path, suffix: &str) -> PathBuf {
        folder.join(format!("{}-{}", self.project, suffix))
    }
}

/// Write `content` to `path` all-or-nothing.
///
/// The content is staged in a temporary file next to the destination and only
/// renamed into place after it was fully written and synced, so a failure
/// never leaves a truncated file under the final name.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    let folder = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(folder).with_path_context("stage", path)?;
    staged
        .write_all(content.as_bytes())
        .with_path_context("write", path)?;
    staged.as_file().sync_all().with_path_context("flush", path)?;
    staged.persist(path).with_path_context("persist", path)?;

    debug!("Written output file: {}", path.display());
    Ok(())
}

/// Write a batch of rendered files, stopping at the first failure
pub fn write_all(files: &[(PathBuf, String)]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for (path, content) in files {
        write_file(path, content)?;
        written.push(path.clone());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_file_replaces_content() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("board-F_Cu.gbr");

        write_file(&path, "first").unwrap();
        write_file(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        // only the destination remains, no staging leftovers
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_file_into_missing_folder_fails() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("missing").join("board.svg");

        let err = write_file(&path, "<svg/>").unwrap_err();

        assert!(format!("{:#}", err).contains("board.svg"));
        assert!(!path.exists());
    }

    #[test]
    fn test_file_path_uses_project_stem() {
        let info = GeneratorInfo::new("logo", Unit::Metric);

        assert_eq!(
            info.file_path(Path::new("out/gerbers"), "PTH.drl"),
            Path::new("out/gerbers/logo-PTH.drl")
        );
        assert_eq!(info.program, "outline2pcb");
    }
}
