//! Command-line interface for dircleaner.
//!
//! This module handles:
//! - Argument parsing
//! - Loading the scan configuration
//! - The scan, plan and execute loop
//! - Aggregating per-file outcomes into a run summary

use crate::config::ScanConfig;
use crate::file_category::Category;
use crate::file_organizer::{FileOrganizer, MoveOutcome};
use crate::output::{Reporter, summary_table};
use crate::planner::{MovePlanEntry, Planner, normalize_path, same_path};
use crate::scanner::{FileScanner, ScanReport};
use clap::Parser;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Sort the files of a directory into category folders by extension.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "dircleaner", version, about)]
pub struct Options {
    /// Directory to clean (default: current directory)
    pub path: Option<PathBuf>,

    /// Preview changes without moving files
    #[arg(long)]
    pub dry_run: bool,

    /// Scan subdirectories
    #[arg(long)]
    pub recursive: bool,

    /// Show detailed information
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write all messages to this file
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Scan filter configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Options {
    /// Options for organizing `path` with everything else at its default.
    pub fn for_path(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
            ..Self::default()
        }
    }

    /// The absolute, normalized directory to organize.
    ///
    /// # Errors
    ///
    /// Returns a message when the directory does not exist.
    pub fn target_path(&self) -> Result<PathBuf, String> {
        let raw = match &self.path {
            Some(path) => path.clone(),
            None => std::env::current_dir()
                .map_err(|e| format!("Cannot determine current directory: {}", e))?,
        };
        let target = normalize_path(&raw);
        if !target.is_dir() {
            return Err(format!("Directory not found: {}", target.display()));
        }
        Ok(target)
    }
}

/// Counts collected over one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Files the scanner handed over.
    pub scanned: usize,
    /// Files the planner decided to move.
    pub planned: usize,
    /// Files actually moved.
    pub moved: usize,
    /// Files a dry run would move.
    pub previewed: usize,
    /// Entries left alone by the executor.
    pub skipped: usize,
    /// Entries whose move failed.
    pub failed: usize,
    /// Moved or previewed files per category folder.
    pub per_category: BTreeMap<String, usize>,
}

impl RunSummary {
    fn record(&mut self, category: Category, outcome: &MoveOutcome) {
        match outcome {
            MoveOutcome::Moved { .. } => self.moved += 1,
            MoveOutcome::WouldMove { .. } => self.previewed += 1,
            MoveOutcome::Skipped { .. } => self.skipped += 1,
            MoveOutcome::Failed { .. } => self.failed += 1,
        }
        if outcome.is_moved() {
            *self
                .per_category
                .entry(category.dir_name().to_string())
                .or_insert(0) += 1;
        }
    }
}

/// Runs one organization pass.
///
/// Per-file failures are reported and counted; only problems that stop the
/// whole run (bad target, unreadable root, invalid configuration) come back
/// as `Err`.
///
/// # Examples
///
/// ```no_run
/// use dircleaner::cli::{Options, run};
/// use dircleaner::output::ConsoleReporter;
/// use std::path::Path;
///
/// let mut options = Options::for_path(Path::new("/path/to/downloads"));
/// options.dry_run = true;
///
/// let summary = run(&options, &mut ConsoleReporter::new(false)).unwrap();
/// println!("{} files would move", summary.previewed);
/// ```
pub fn run(options: &Options, reporter: &mut dyn Reporter) -> Result<RunSummary, String> {
    let target = options.target_path()?;

    let config = ScanConfig::load(options.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let filters = config
        .compile_filters()
        .map_err(|e| format!("Error compiling filters: {}", e))?;
    let recursive = options.recursive || config.scan.recursive;

    reporter.info(&format!("Cleaning directory: {}", target.display()));
    reporter.info(&format!(
        "Mode: {}",
        if options.dry_run {
            "DRY RUN (no changes will be made)"
        } else {
            "LIVE"
        }
    ));
    reporter.info(&format!("Recursive: {}", recursive));

    let verbose = reporter.verbose();
    let mut scan = FileScanner::with_filters(&target, recursive, filters)
        .scan_with_progress(|count| {
            if verbose && count % 10 == 0 {
                reporter.info(&format!("Scanned {} files...", count));
            }
        })
        .map_err(|e| e.to_string())?;
    if let Some(log) = &options.log {
        exclude_log_file(&mut scan, log);
    }
    report_scan(&scan, reporter);

    let planner = Planner::new(&target);
    let plan: Vec<MovePlanEntry> = scan.files.iter().filter_map(|f| planner.plan(f)).collect();

    let mut summary = RunSummary {
        scanned: scan.files.len(),
        planned: plan.len(),
        ..RunSummary::default()
    };
    reporter.info(&format!("{} files will be organized", plan.len()));

    if options.dry_run {
        preview_plan(&plan, &mut summary, reporter);
    } else {
        execute_plan(&plan, &mut summary, reporter);
    }

    if !summary.per_category.is_empty() {
        let total = summary.moved + summary.previewed;
        summary_table(reporter, &summary.per_category, total);
    }

    if options.dry_run {
        reporter.success(&format!(
            "Dry run complete: {} would move, {} failed. No files were modified.",
            summary.previewed, summary.failed
        ));
    } else {
        reporter.info(&format!(
            "Success: {}, Failed: {}",
            summary.moved, summary.failed
        ));
        if summary.failed > 0 {
            reporter.warning("Some files could not be organized. Please review errors above.");
        }
    }

    Ok(summary)
}

fn report_scan(scan: &ScanReport, reporter: &mut dyn Reporter) {
    for (path, reason) in &scan.warnings {
        reporter.warning(&format!("Could not read {}: {}", path.display(), reason));
    }

    if reporter.verbose() {
        for path in &scan.skipped {
            reporter.info(&format!("Skipping: {}", path.display()));
        }
        if !scan.skipped.is_empty() {
            reporter.info(&format!(
                "Skipped {} hidden/temporary/excluded files",
                scan.skipped.len()
            ));
        }
        reporter.success(&format!("Scan complete: {} total files", scan.files.len()));
    }

    reporter.info(&format!("Found {} files", scan.files.len()));
}

// The run's own log file is written to while the batch executes.
fn exclude_log_file(scan: &mut ScanReport, log: &Path) {
    let log = normalize_path(log);
    if let Some(index) = scan.files.iter().position(|f| same_path(&f.path, &log)) {
        let file = scan.files.remove(index);
        scan.skipped.push(file.path);
    }
}

fn preview_plan(plan: &[MovePlanEntry], summary: &mut RunSummary, reporter: &mut dyn Reporter) {
    let mut claimed = HashSet::new();
    for entry in plan {
        let outcome = FileOrganizer::preview_claiming(entry, &mut claimed);
        match &outcome {
            MoveOutcome::WouldMove {
                source,
                destination,
            } => {
                reporter.plain(&format!("WOULD MOVE: {}", source.display()));
                reporter.plain(&format!("        TO: {}", destination.display()));
            }
            other => report_outcome(other, reporter),
        }
        summary.record(entry.category, &outcome);
    }
}

fn execute_plan(plan: &[MovePlanEntry], summary: &mut RunSummary, reporter: &mut dyn Reporter) {
    let pb = reporter.progress(plan.len() as u64);
    for entry in plan {
        let outcome = FileOrganizer::execute(entry, false);
        if reporter.verbose() || !outcome.is_moved() {
            pb.suspend(|| report_outcome(&outcome, &mut *reporter));
        }
        summary.record(entry.category, &outcome);
        pb.inc(1);
    }
    pb.finish_and_clear();
}

fn report_outcome(outcome: &MoveOutcome, reporter: &mut dyn Reporter) {
    match outcome {
        MoveOutcome::Moved {
            source,
            destination,
        } => reporter.success(&format!(
            "Moved: {} -> {}",
            source.display(),
            destination.display()
        )),
        MoveOutcome::WouldMove {
            source,
            destination,
        } => reporter.info(&format!(
            "Would move: {} -> {}",
            source.display(),
            destination.display()
        )),
        MoveOutcome::Skipped { source, reason } => {
            reporter.warning(&format!("Skipped: {} - {}", source.display(), reason))
        }
        MoveOutcome::Failed { source, error } => {
            reporter.error(&format!("Failed: {} - {}", source.display(), error))
        }
    }
}
