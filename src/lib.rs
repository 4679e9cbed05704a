//! dircleaner - sort the files of a directory into category folders
//!
//! Files are classified by extension into one of seven fixed categories
//! (Images, Documents, Videos, Audio, Archives, Code, Programs), planned into
//! `<root>/<Category>/<name>`, and moved with numbered renaming when the
//! destination name is already taken. Re-running over an organized directory
//! moves nothing.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod planner;
pub mod scanner;

pub use cli::{Options, RunSummary, run};
pub use config::{CompiledFilters, ConfigError, ScanConfig};
pub use file_category::{Category, Classifier};
pub use file_organizer::{FileOrganizer, MoveOutcome, OrganizeError};
pub use output::{ConsoleReporter, LogFileReporter, Reporter};
pub use planner::{FileDescriptor, MovePlanEntry, Planner};
pub use scanner::{FileScanner, ScanError, ScanReport};
