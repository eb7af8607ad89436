use crate::output::OutputMode;
use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar for determinate progress
pub fn create_progress_bar(total: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("█▓░"));
    }
    pb.set_message(msg.to_string());
    pb
}

/// Progress bar for a batch, hidden in quiet mode
pub fn batch_bar(total: usize, msg: &str, mode: OutputMode) -> ProgressBar {
    if mode == OutputMode::Quiet {
        ProgressBar::hidden()
    } else {
        create_progress_bar(total as u64, msg)
    }
}

/// Print above the bar without tearing it
pub fn println(pb: &ProgressBar, mode: OutputMode, line: String) {
    if mode != OutputMode::Quiet {
        pb.suspend(|| println!("{}", line));
    }
}

/// Finish and clear progress bar
pub fn finish_and_clear(pb: &ProgressBar) {
    pb.finish_and_clear();
}
