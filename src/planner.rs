//! Move planning.
//!
//! Turns a discovered file into a [`MovePlanEntry`] naming the category folder
//! it belongs in, or into nothing when the file is unrecognized or already
//! filed where it should be.

use crate::file_category::{Category, Classifier};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// A file found by the scanner.
///
/// `extension` keeps its original case and leading dot (`".JPG"`), and is
/// empty when the name has no extension. Only the final extension counts, so
/// `archive.tar.gz` carries `".gz"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Full path to the file.
    pub path: PathBuf,
    /// The file name component of `path`.
    pub name: OsString,
    /// Dot-prefixed final extension, or an empty string.
    pub extension: String,
}

impl FileDescriptor {
    /// Describes the file at `path`. Returns `None` for paths without a file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use dircleaner::planner::FileDescriptor;
    ///
    /// let file = FileDescriptor::new("/downloads/archive.tar.gz").unwrap();
    /// assert_eq!(file.extension, ".gz");
    /// assert_eq!(FileDescriptor::new("/downloads/readme").unwrap().extension, "");
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let name = path.file_name()?.to_os_string();
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        Some(Self {
            path,
            name,
            extension,
        })
    }
}

/// A decided but not yet executed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlanEntry {
    /// Where the file is now.
    pub source: PathBuf,
    /// `<target root>/<category>/<file name>`, before collision resolution.
    pub destination: PathBuf,
    /// The category that decided the destination folder.
    pub category: Category,
}

/// Decides where files should go relative to a target root.
#[derive(Debug, Clone)]
pub struct Planner<'a> {
    target_root: PathBuf,
    classifier: &'a Classifier,
}

impl Planner<'static> {
    /// Creates a planner for `target_root` using the shared classifier.
    pub fn new(target_root: &Path) -> Self {
        Self::with_classifier(target_root, Classifier::shared())
    }
}

impl<'a> Planner<'a> {
    /// Creates a planner for `target_root` using the given classifier.
    pub fn with_classifier(target_root: &Path, classifier: &'a Classifier) -> Self {
        Self {
            target_root: normalize_path(target_root),
            classifier,
        }
    }

    /// The normalized target root category folders are created under.
    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    /// Plans the move for a single file.
    ///
    /// Returns `None` when the extension is not recognized, or when the file
    /// already sits directly inside its category folder, so applying a plan
    /// and planning again never moves the same file twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use dircleaner::planner::{FileDescriptor, Planner};
    /// use std::path::Path;
    ///
    /// let planner = Planner::new(Path::new("/downloads"));
    ///
    /// let loose = FileDescriptor::new("/downloads/photo.JPG").unwrap();
    /// let entry = planner.plan(&loose).unwrap();
    /// assert_eq!(entry.destination, Path::new("/downloads/Images/photo.JPG"));
    ///
    /// let filed = FileDescriptor::new("/downloads/Images/photo.JPG").unwrap();
    /// assert!(planner.plan(&filed).is_none());
    /// ```
    pub fn plan(&self, file: &FileDescriptor) -> Option<MovePlanEntry> {
        let category = self.classifier.classify(&file.extension)?;

        let destination_dir = self.target_root.join(category.dir_name());
        let destination = destination_dir.join(&file.name);

        if let Some(parent) = file.path.parent()
            && same_path(&normalize_path(parent), &destination_dir)
        {
            return None;
        }

        Some(MovePlanEntry {
            source: file.path.clone(),
            destination,
            category,
        })
    }
}

/// Makes `path` absolute and lexically cleans it.
///
/// `.` components are dropped, `..` pops the previous component, and repeated
/// or trailing separators disappear. Symlinks are not resolved. When the
/// current directory cannot be determined a relative path is cleaned as-is.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Compares two normalized paths the way the host filesystem would.
///
/// Windows and macOS default to case-insensitive filesystems, so paths that
/// differ only in case name the same folder there.
pub fn same_path(a: &Path, b: &Path) -> bool {
    if cfg!(any(windows, target_os = "macos")) {
        a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
    } else {
        a == b
    }
}
