//! Directory enumeration.
//!
//! Produces the list of files to plan. Problems with the root itself are
//! returned before any file is listed; problems with individual entries
//! during the walk are collected as warnings and the walk carries on.

use crate::config::CompiledFilters;
use crate::planner::FileDescriptor;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Errors that prevent a scan from starting.
#[derive(Debug)]
pub enum ScanError {
    /// The root does not exist.
    RootNotFound(PathBuf),
    /// The root exists but is not a directory.
    NotADirectory(PathBuf),
    /// The root could not be read (permissions, I/O).
    RootUnreadable { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::RootNotFound(path) => write!(f, "Directory not found: {}", path.display()),
            ScanError::NotADirectory(path) => write!(f, "Not a directory: {}", path.display()),
            ScanError::RootUnreadable { path, source } => {
                write!(f, "Cannot read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::RootUnreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Everything a scan found.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Files to plan, sorted by path within each directory.
    pub files: Vec<FileDescriptor>,
    /// Files left out by the filters.
    pub skipped: Vec<PathBuf>,
    /// Entries that could not be read, with the reason.
    pub warnings: Vec<(PathBuf, String)>,
}

/// Lists regular files under a root directory.
#[derive(Debug, Clone)]
pub struct FileScanner {
    root: PathBuf,
    recursive: bool,
    filters: CompiledFilters,
}

impl FileScanner {
    /// Creates a scanner for `root` that skips hidden and temporary files.
    pub fn new(root: &Path, recursive: bool) -> Self {
        Self::with_filters(root, recursive, CompiledFilters::default())
    }

    /// Creates a scanner for `root` with custom filters.
    pub fn with_filters(root: &Path, recursive: bool, filters: CompiledFilters) -> Self {
        Self {
            root: root.to_path_buf(),
            recursive,
            filters,
        }
    }

    /// Walks the root and returns the files to organize.
    ///
    /// Symlinks are neither followed nor listed. In recursive mode hidden
    /// directories are not entered unless hidden files are enabled.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dircleaner::scanner::FileScanner;
    /// use std::path::Path;
    ///
    /// let report = FileScanner::new(Path::new("/path/to/downloads"), false).scan()?;
    /// for file in &report.files {
    ///     println!("{}", file.path.display());
    /// }
    /// # Ok::<(), dircleaner::scanner::ScanError>(())
    /// ```
    pub fn scan(&self) -> Result<ScanReport, ScanError> {
        self.scan_with_progress(|_| {})
    }

    /// Like [`scan`](Self::scan), calling `on_file` with the running count
    /// each time a file is added to the report.
    pub fn scan_with_progress(
        &self,
        mut on_file: impl FnMut(usize),
    ) -> Result<ScanReport, ScanError> {
        self.check_root()?;

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.should_visit(entry));

        let mut report = ScanReport::default();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    report.warnings.push((path, err.to_string()));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            if !self.filters.should_include(relative) {
                report.skipped.push(entry.into_path());
                continue;
            }

            match FileDescriptor::new(entry.into_path()) {
                Some(file) => {
                    report.files.push(file);
                    on_file(report.files.len());
                }
                None => report.warnings.push((
                    self.root.clone(),
                    "entry without a file name".to_string(),
                )),
            }
        }

        Ok(report)
    }

    fn check_root(&self) -> Result<(), ScanError> {
        let metadata = fs::metadata(&self.root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ScanError::RootNotFound(self.root.clone()),
            _ => ScanError::RootUnreadable {
                path: self.root.clone(),
                source: e,
            },
        })?;

        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }

        fs::read_dir(&self.root).map_err(|e| ScanError::RootUnreadable {
            path: self.root.clone(),
            source: e,
        })?;

        Ok(())
    }

    fn should_visit(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        self.filters
            .should_descend(&entry.file_name().to_string_lossy())
    }
}
