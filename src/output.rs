use crate::fingerprint_cache::RunSummary;
use colored::*;
use std::path::Path;

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Quiet,   // Only errors
    Normal,  // Standard output
    Verbose, // Also report skipped files
}

impl OutputMode {
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            OutputMode::Quiet
        } else if verbose >= 1 {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        }
    }
}

/// Per-file status line, e.g. "Converting a/diagram.drawio"
pub fn file_line(verb: &str, file: &Path, done: bool) -> String {
    if done {
        format!("{} {}: {}", verb, file.display(), "done!".green())
    } else {
        format!("{} {}", verb, file.display())
    }
}

pub fn skipped_line(file: &Path) -> String {
    format!("{} {} (unchanged)", "Skipped".dimmed(), file.display())
}

pub fn summary_line(summary: &RunSummary) -> String {
    let stats = &summary.stats;
    let mut line = format!(
        "{} {} file(s): {} processed, {} unchanged",
        summary.command.bold(),
        stats.discovered,
        stats.processed.to_string().green(),
        stats.skipped,
    );
    if stats.untargeted > 0 {
        line.push_str(&format!(", {} without targets", stats.untargeted));
    }
    line.push_str(&format!(", {} renderer call(s)", stats.exports));
    if stats.failed_exports > 0 {
        line.push_str(&format!(", {}", format!("{} failed", stats.failed_exports).yellow()));
    }
    if let Some(elapsed) = summary.elapsed() {
        line.push_str(&format!(" in {:.1}s", elapsed.num_milliseconds() as f64 / 1000.0));
    }
    line
}

pub fn print_summary(summary: &RunSummary, mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }
    println!("{}", summary_line(summary));
}

/// Echo captured renderer output after a fatal failure
pub fn print_renderer_log(log: &str) {
    eprintln!("{}", "Renderer output:".red().bold());
    if log.trim().is_empty() {
        eprintln!("  (no output)");
    } else {
        for line in log.lines() {
            eprintln!("  {}", line);
        }
    }
}
