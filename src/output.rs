//! Output and logging.
//!
//! All user-facing messages go through a [`Reporter`] that is passed down
//! explicitly, so a run can print to the console, append to a log file, or be
//! recorded in memory by tests.

use chrono::Local;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Severity of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    /// Tag used in log files.
    pub fn log_tag(&self) -> &'static str {
        match self {
            Level::Info => "[INFO]",
            Level::Success => "[SUCCESS]",
            Level::Warning => "[WARNING]",
            Level::Error => "[ERROR]",
        }
    }
}

/// Receives every message a run produces.
pub trait Reporter {
    /// Emits one message at the given level.
    fn log(&mut self, level: Level, message: &str);

    /// Emits an unprefixed line, such as a table row.
    fn plain(&mut self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Whether per-file detail should be reported.
    fn verbose(&self) -> bool {
        false
    }

    /// Returns a progress bar for `total` steps. Hidden unless the sink draws one.
    fn progress(&self, _total: u64) -> ProgressBar {
        ProgressBar::hidden()
    }

    fn info(&mut self, message: &str) {
        self.log(Level::Info, message);
    }

    fn success(&mut self, message: &str) {
        self.log(Level::Success, message);
    }

    fn warning(&mut self, message: &str) {
        self.log(Level::Warning, message);
    }

    fn error(&mut self, message: &str) {
        self.log(Level::Error, message);
    }
}

/// Colored console output. Errors go to stderr.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn log(&mut self, level: Level, message: &str) {
        match level {
            Level::Info => println!("{} {}", "[INFO]".cyan(), message),
            Level::Success => println!("{} {}", "[✓]".green(), message),
            Level::Warning => println!("{} {}", "[!]".yellow(), message),
            Level::Error => eprintln!("{} {}", "[✗]".red(), message),
        }
    }

    fn plain(&mut self, message: &str) {
        println!("{}", message);
    }

    fn verbose(&self) -> bool {
        self.verbose
    }

    fn progress(&self, total: u64) -> ProgressBar {
        // Verbose runs print one line per file instead.
        if self.verbose {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }
}

/// Wraps another reporter and appends every message to a log file.
///
/// Lines look like `[2026-10-16 09:30:00] [SUCCESS] Moved: ...`. If the file
/// stops accepting writes a single warning goes to the inner reporter and
/// file logging is switched off.
pub struct LogFileReporter<R> {
    inner: R,
    file: Option<File>,
}

impl<R: Reporter> LogFileReporter<R> {
    /// Creates (or truncates) `path` and writes the log header.
    pub fn create(inner: R, path: &Path) -> io::Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        writeln!(
            file,
            "=== dircleaner log - {} ===\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        Ok(Self {
            inner,
            file: Some(file),
        })
    }

    /// Returns the wrapped reporter.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn append(&mut self, line: &str) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        if let Err(e) = writeln!(file, "{}", line) {
            self.file = None;
            self.inner
                .warning(&format!("Log file disabled after write error: {}", e));
        }
    }
}

impl<R: Reporter> Reporter for LogFileReporter<R> {
    fn log(&mut self, level: Level, message: &str) {
        self.inner.log(level, message);
        let line = format!(
            "[{}] {} {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level.log_tag(),
            message
        );
        self.append(&line);
    }

    fn plain(&mut self, message: &str) {
        self.inner.plain(message);
        self.append(message);
    }

    fn verbose(&self) -> bool {
        self.inner.verbose()
    }

    fn progress(&self, total: u64) -> ProgressBar {
        self.inner.progress(total)
    }
}

/// Keeps messages in memory instead of printing them.
///
/// Used by the test suites to assert on what a run reported; it is public so
/// the integration tests under `tests/` can reach it.
#[doc(hidden)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub messages: Vec<(Level, String)>,
    pub verbose: bool,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded at `level`.
    pub fn at(&self, level: Level) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    /// True when any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|(_, m)| m.contains(needle))
    }
}

impl Reporter for RecordingReporter {
    fn log(&mut self, level: Level, message: &str) {
        self.messages.push((level, message.to_string()));
    }

    fn verbose(&self) -> bool {
        self.verbose
    }
}

/// Prints a per-category file count table followed by a total row.
pub fn summary_table(
    reporter: &mut dyn Reporter,
    category_counts: &BTreeMap<String, usize>,
    total_files: usize,
) {
    let width = category_counts
        .keys()
        .map(|name| name.len())
        .max()
        .unwrap_or(0)
        .max("Category".len());

    reporter.plain(&format!("{:<width$} | Files", "Category", width = width));
    reporter.plain(&"-".repeat(width + 10));
    for (category, count) in category_counts {
        reporter.plain(&format!(
            "{:<width$} | {} {}",
            category,
            count,
            plural(*count),
            width = width
        ));
    }
    reporter.plain(&"-".repeat(width + 10));
    reporter.plain(&format!(
        "{:<width$} | {} {}",
        "Total",
        total_files,
        plural(total_files),
        width = width
    ));
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
