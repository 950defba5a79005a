//! Output formatting and progress reporting

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use ttyreel::RenderProgress;

/// Progress reporter for long-running commands; writes to stderr
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    label: String,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            label: String::new(),
            use_color,
            quiet,
        }
    }

    /// Start a progress bar; replaces any previous one
    pub fn start_progress(&mut self, total: u64, label: &str) {
        self.finish();
        self.label = label.to_string();
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(label.to_string());
        self.progress_bar = Some(pb);
    }

    /// Current bar label
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Finish and clear the current bar
    pub fn finish(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "OK".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }
}

impl RenderProgress for ProgressReporter {
    fn on_frame(&mut self, index: usize, total: usize) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_length(total as u64);
            pb.set_position(index as u64 + 1);
            pb.set_message(format!("{} frame {}/{}", self.label, index + 1, total));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_reporter_has_no_bar() {
        let mut reporter = ProgressReporter::new(false, true);
        reporter.start_progress(10, "Rendering");
        assert!(reporter.progress_bar.is_none());
        assert_eq!(reporter.label(), "Rendering");
        reporter.on_frame(3, 10);
    }

    #[test]
    fn test_bar_tracks_frames() {
        let mut reporter = ProgressReporter::new(false, false);
        reporter.start_progress(4, "Rendering");
        reporter.on_frame(1, 4);
        let pb = reporter.progress_bar.clone().unwrap();
        assert_eq!(pb.position(), 2);
        assert_eq!(pb.message(), "Rendering frame 2/4");
    }

    #[test]
    fn test_second_phase_replaces_bar() {
        let mut reporter = ProgressReporter::new(false, false);
        reporter.start_progress(4, "Rendering");
        reporter.start_progress(2, "Merging");
        reporter.on_frame(0, 2);
        let pb = reporter.progress_bar.clone().unwrap();
        assert_eq!(pb.length(), Some(2));
        assert_eq!(pb.message(), "Merging frame 1/2");
        reporter.finish();
        assert!(reporter.progress_bar.is_none());
    }
}
