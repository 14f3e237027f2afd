//! ZIP packaging of the fabrication files

use crate::error::{Result, ResultExt};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Archive creator for building the upload bundle
pub struct ArchiveCreator;

impl ArchiveCreator {
    /// Create a ZIP file holding `files` at its root.
    ///
    /// The archive is staged next to `output_path` and only moved into place
    /// once it was finalized.
    pub fn create_zip<P: AsRef<Path>, I: IntoIterator<Item = P>>(
        files: I,
        output_path: &Path,
        show_progress: bool,
    ) -> Result<PathBuf> {
        let files: Vec<PathBuf> = files
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();

        info!("Creating ZIP archive: {}", output_path.display());

        let folder = match output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(folder).with_path_context("create output directory", folder)?;

        let staged = NamedTempFile::new_in(folder).with_path_context("stage", output_path)?;

        let mut zip = zip::ZipWriter::new(staged);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        let progress = if show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                    .progress_chars("#>-"),
            );
            pb.set_message("Creating ZIP file...");
            Some(pb)
        } else {
            None
        };

        for file_path in &files {
            let file_name = file_path
                .file_name()
                .and_then(|name| name.to_str())
                .context("Invalid filename")?;

            zip.start_file(file_name, options)
                .context("Failed to start ZIP file entry")?;

            let content = fs::read(file_path).with_path_context("read file for ZIP", file_path)?;
            zip.write_all(&content)
                .context("Failed to write file content to ZIP")?;

            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }

        let staged = zip.finish().context("Failed to finalize ZIP file")?;
        staged
            .persist(output_path)
            .with_path_context("persist", output_path)?;

        if let Some(pb) = progress {
            pb.finish_with_message("ZIP file created successfully");
        }

        info!(
            "ZIP file created with {} entries: {}",
            files.len(),
            output_path.display()
        );
        Ok(output_path.to_path_buf())
    }
}
