//! Move execution.
//!
//! Carries out [`MovePlanEntry`] values one at a time: creates the category
//! folder, picks a free name when the destination is taken, and renames the
//! file. Every failure is captured in the returned [`MoveOutcome`] so a batch
//! keeps going after a bad entry.

use crate::planner::MovePlanEntry;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound on numbered candidates tried for a single destination.
pub const MAX_COLLISION_ATTEMPTS: u32 = 10_000;

/// Errors that can occur while executing a move.
#[derive(Debug)]
pub enum OrganizeError {
    /// Failed to create the category directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The rename itself failed.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Every numbered candidate up to the limit already exists.
    CollisionLimitReached { path: PathBuf, attempts: u32 },
    /// The destination has no parent directory or no file name.
    InvalidDestination { path: PathBuf },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::CollisionLimitReached { path, attempts } => {
                write!(
                    f,
                    "No free name for {} after {} attempts",
                    path.display(),
                    attempts
                )
            }
            Self::InvalidDestination { path } => {
                write!(f, "Invalid destination path: {}", path.display())
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DirectoryCreationFailed { source, .. } => Some(source),
            Self::FileMoveFailure { source_error, .. } => Some(source_error),
            _ => None,
        }
    }
}

/// Result type for move execution internals.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// What happened to one plan entry.
#[derive(Debug)]
pub enum MoveOutcome {
    /// The file now lives at `destination`.
    Moved {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Preview mode: the file would be moved to `destination`.
    WouldMove {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Nothing was done, for the given reason.
    Skipped { source: PathBuf, reason: String },
    /// The move was attempted and failed.
    Failed {
        source: PathBuf,
        error: OrganizeError,
    },
}

impl MoveOutcome {
    /// The file this outcome is about.
    pub fn source(&self) -> &Path {
        match self {
            Self::Moved { source, .. }
            | Self::WouldMove { source, .. }
            | Self::Skipped { source, .. }
            | Self::Failed { source, .. } => source,
        }
    }

    /// The final destination for moved or previewed files.
    pub fn destination(&self) -> Option<&Path> {
        match self {
            Self::Moved { destination, .. } | Self::WouldMove { destination, .. } => {
                Some(destination)
            }
            _ => None,
        }
    }

    /// True for `Moved` and its preview counterpart `WouldMove`.
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. } | Self::WouldMove { .. })
    }

    /// True for `Failed`.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Executes move plan entries against the filesystem.
///
/// Assumes it is the only writer in the target tree while a batch runs: the
/// free-name check and the rename are two separate steps.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Executes one plan entry.
    ///
    /// With `preview_only` set nothing on disk changes; the outcome still
    /// reports the collision-resolved destination a live run would use.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dircleaner::file_organizer::{FileOrganizer, MoveOutcome};
    /// use dircleaner::planner::{FileDescriptor, Planner};
    /// use std::path::Path;
    ///
    /// let planner = Planner::new(Path::new("/path/to/downloads"));
    /// let file = FileDescriptor::new("/path/to/downloads/report.pdf").unwrap();
    ///
    /// if let Some(entry) = planner.plan(&file) {
    ///     match FileOrganizer::execute(&entry, false) {
    ///         MoveOutcome::Moved { destination, .. } => println!("Moved to {}", destination.display()),
    ///         MoveOutcome::Failed { error, .. } => eprintln!("Move failed: {}", error),
    ///         _ => {}
    ///     }
    /// }
    /// ```
    pub fn execute(entry: &MovePlanEntry, preview_only: bool) -> MoveOutcome {
        if preview_only {
            Self::preview_with(entry, path_is_taken)
        } else {
            Self::move_file(entry)
        }
    }

    /// Previews one entry of a batch.
    ///
    /// Names already handed out to earlier entries in `claimed` count as
    /// taken, and the name chosen here is added to it, so a batch preview
    /// matches what a sequential live run would do.
    pub fn preview_claiming(entry: &MovePlanEntry, claimed: &mut HashSet<PathBuf>) -> MoveOutcome {
        let outcome =
            Self::preview_with(entry, |path| claimed.contains(path) || path_is_taken(path));
        if let Some(destination) = outcome.destination() {
            claimed.insert(destination.to_path_buf());
        }
        outcome
    }

    fn preview_with(entry: &MovePlanEntry, is_taken: impl Fn(&Path) -> bool) -> MoveOutcome {
        if entry.source == entry.destination {
            return skipped_in_place(entry);
        }

        match resolve_collision_with(&entry.destination, is_taken) {
            Ok(destination) => MoveOutcome::WouldMove {
                source: entry.source.clone(),
                destination,
            },
            Err(error) => MoveOutcome::Failed {
                source: entry.source.clone(),
                error,
            },
        }
    }

    fn move_file(entry: &MovePlanEntry) -> MoveOutcome {
        if entry.source == entry.destination {
            return skipped_in_place(entry);
        }

        match Self::try_move(entry) {
            Ok(destination) => MoveOutcome::Moved {
                source: entry.source.clone(),
                destination,
            },
            Err(error) => MoveOutcome::Failed {
                source: entry.source.clone(),
                error,
            },
        }
    }

    fn try_move(entry: &MovePlanEntry) -> OrganizeResult<PathBuf> {
        let destination_dir =
            entry
                .destination
                .parent()
                .ok_or_else(|| OrganizeError::InvalidDestination {
                    path: entry.destination.clone(),
                })?;

        fs::create_dir_all(destination_dir).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: destination_dir.to_path_buf(),
            source: e,
        })?;

        let destination = resolve_collision(&entry.destination)?;

        fs::rename(&entry.source, &destination).map_err(|e| OrganizeError::FileMoveFailure {
            source: entry.source.clone(),
            destination: destination.clone(),
            source_error: e,
        })?;

        Ok(destination)
    }
}

fn skipped_in_place(entry: &MovePlanEntry) -> MoveOutcome {
    MoveOutcome::Skipped {
        source: entry.source.clone(),
        reason: "already at its destination".to_string(),
    }
}

/// Returns the first free path among `D`, `Dir/S (1)E`, `Dir/S (2)E`, ...
///
/// # Examples
///
/// ```no_run
/// use dircleaner::file_organizer::resolve_collision;
/// use std::path::Path;
///
/// // With "report.pdf" already present this yields ".../report (1).pdf".
/// let free = resolve_collision(Path::new("/path/to/Documents/report.pdf")).unwrap();
/// println!("{}", free.display());
/// ```
pub fn resolve_collision(desired: &Path) -> OrganizeResult<PathBuf> {
    resolve_collision_with(desired, path_is_taken)
}

fn resolve_collision_with(
    desired: &Path,
    is_taken: impl Fn(&Path) -> bool,
) -> OrganizeResult<PathBuf> {
    if !is_taken(desired) {
        return Ok(desired.to_path_buf());
    }

    let stem = desired
        .file_stem()
        .ok_or_else(|| OrganizeError::InvalidDestination {
            path: desired.to_path_buf(),
        })?;

    // Built from OS strings so names that are not valid UTF-8 keep their bytes.
    for counter in 1..=MAX_COLLISION_ATTEMPTS {
        let mut name = stem.to_os_string();
        name.push(format!(" ({})", counter));
        if let Some(ext) = desired.extension() {
            name.push(".");
            name.push(ext);
        }
        let candidate = desired.with_file_name(name);
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
    }

    Err(OrganizeError::CollisionLimitReached {
        path: desired.to_path_buf(),
        attempts: MAX_COLLISION_ATTEMPTS,
    })
}

// Dangling symlinks count as taken; `Path::exists` would follow them.
fn path_is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
