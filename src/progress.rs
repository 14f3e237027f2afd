//! Progress tracking and display using indicatif

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

/// Progress tracker for generation runs; every method is a no-op when disabled
pub struct ProgressTracker {
    enabled: bool,
}

impl ProgressTracker {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Create a progress bar over `total` pipeline stages
    pub fn create_stage_progress(&self, total: usize, operation: &str) -> Option<ProgressBar> {
        if !self.enabled || total == 0 {
            return None;
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏ "),
        );
        pb.set_message(format!("{}...", operation));
        pb.enable_steady_tick(Duration::from_millis(100));

        debug!("Started progress tracking for: {}", operation);
        Some(pb)
    }

    /// Advance by one stage and show what runs next
    pub fn advance(pb: &Option<ProgressBar>, message: &str) {
        if let Some(progress) = pb {
            progress.inc(1);
            progress.set_message(message.to_string());
        }
    }

    pub fn finish_progress(pb: Option<ProgressBar>, success_message: &str) {
        if let Some(progress) = pb {
            progress.finish_with_message(success_message.to_string());
        }
    }

    pub fn finish_with_error(pb: Option<ProgressBar>, error_message: &str) {
        if let Some(progress) = pb {
            progress.abandon_with_message(format!("❌ {}", error_message));
        }
    }
}
