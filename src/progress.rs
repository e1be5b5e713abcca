//! Step progress display

use indicatif::{ProgressBar, ProgressStyle};

use crate::bootstrap::Step;

/// Progress bar over the steps of a run.
///
/// Draws to stderr and stays hidden when stderr is not a terminal.
pub struct StepProgress {
    pb: ProgressBar,
}

impl StepProgress {
    pub fn new(total_steps: usize) -> Self {
        let pb = ProgressBar::new(total_steps as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("[{bar:30.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Self { pb }
    }

    /// Show `step` as the one currently running
    pub fn start_step(&self, step: Step) {
        self.pb.set_message(step.describe());
    }

    pub fn finish_step(&self) {
        self.pb.inc(1);
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }

    /// Leave the bar where the run stopped
    pub fn abandon(&self) {
        self.pb.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_counts_finished_steps() {
        let progress = StepProgress::new(5);
        progress.start_step(Step::ChangeDir);
        progress.finish_step();
        progress.start_step(Step::CreateEnv);
        progress.finish_step();
        assert_eq!(progress.pb.position(), 2);
        assert_eq!(progress.pb.message(), "Creating isolated environment");
        progress.abandon();
    }

    #[test]
    fn test_progress_finishes_cleanly() {
        let progress = StepProgress::new(1);
        progress.start_step(Step::InstallCore);
        progress.finish_step();
        progress.finish();
        assert!(progress.pb.is_finished());
    }
}
