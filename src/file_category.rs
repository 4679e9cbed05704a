//! Extension-based file categorization.
//!
//! Every recognized extension belongs to exactly one of seven fixed categories.
//! The lookup table is built once per process from the static extension lists
//! below and never changes afterwards.
//!
//! # Examples
//!
//! ```
//! use dircleaner::file_category::{Category, Classifier};
//!
//! let classifier = Classifier::shared();
//! assert_eq!(classifier.classify(".jpg"), Some(Category::Images));
//! assert_eq!(classifier.classify(".PDF"), Some(Category::Documents));
//! assert_eq!(classifier.classify(".unknown"), None);
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

/// One of the fixed destination buckets.
///
/// The declaration order is the lookup order used when building the
/// classifier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Raster and vector images.
    Images,
    /// Text, office and spreadsheet documents.
    Documents,
    /// Video containers.
    Videos,
    /// Audio files.
    Audio,
    /// Compressed archives and disk images.
    Archives,
    /// Source code and markup.
    Code,
    /// Executables, shared libraries and installer packages.
    Programs,
}

const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".webp", ".ico", ".tiff",
];

const DOCUMENT_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".txt", ".rtf", ".odt", ".xlsx", ".xls", ".pptx", ".ppt", ".csv",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".m4v",
];

const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".flac", ".aac", ".ogg", ".m4a", ".wma"];

const ARCHIVE_EXTENSIONS: &[&str] = &[
    ".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz", ".iso",
];

const CODE_EXTENSIONS: &[&str] = &[
    ".cs", ".py", ".js", ".java", ".cpp", ".c", ".h", ".html", ".css", ".json", ".xml", ".sql",
    ".sh", ".go", ".rs", ".ts",
];

// Stored lower-case so ".AppImage" files match after case folding.
const PROGRAM_EXTENSIONS: &[&str] = &[".exe", ".dll", ".so", ".appimage", ".deb", ".rpm"];

impl Category {
    /// All categories in lookup order.
    pub const ALL: [Category; 7] = [
        Category::Images,
        Category::Documents,
        Category::Videos,
        Category::Audio,
        Category::Archives,
        Category::Code,
        Category::Programs,
    ];

    /// Returns the name of the subfolder files of this category are moved into.
    ///
    /// # Examples
    ///
    /// ```
    /// use dircleaner::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "Images");
    /// assert_eq!(Category::Programs.dir_name(), "Programs");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Documents => "Documents",
            Category::Videos => "Videos",
            Category::Audio => "Audio",
            Category::Archives => "Archives",
            Category::Code => "Code",
            Category::Programs => "Programs",
        }
    }

    /// Returns the dot-prefixed, lower-case extensions recognized for this category.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Images => IMAGE_EXTENSIONS,
            Category::Documents => DOCUMENT_EXTENSIONS,
            Category::Videos => VIDEO_EXTENSIONS,
            Category::Audio => AUDIO_EXTENSIONS,
            Category::Archives => ARCHIVE_EXTENSIONS,
            Category::Code => CODE_EXTENSIONS,
            Category::Programs => PROGRAM_EXTENSIONS,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

static SHARED: LazyLock<Classifier> = LazyLock::new(Classifier::new);

/// Maps file extensions to categories.
///
/// Lookups are case-insensitive. An extension may be given with or without
/// its leading dot.
#[derive(Debug, Clone)]
pub struct Classifier {
    extension_map: HashMap<String, Category>,
}

impl Classifier {
    /// Builds a classifier from the built-in extension tables.
    pub fn new() -> Self {
        Self::from_tables(Category::ALL.iter().map(|c| (*c, c.extensions())))
    }

    /// Returns the process-wide classifier, building it on first use.
    pub fn shared() -> &'static Classifier {
        &SHARED
    }

    /// Builds the lookup map from `(category, extensions)` tables.
    ///
    /// Tables are consumed in order; when an extension appears in more than
    /// one table the first category keeps it.
    fn from_tables<'a>(tables: impl IntoIterator<Item = (Category, &'a [&'a str])>) -> Self {
        let mut extension_map = HashMap::new();
        for (category, extensions) in tables {
            for ext in extensions {
                extension_map
                    .entry(normalize_extension(ext))
                    .or_insert(category);
            }
        }
        Self { extension_map }
    }

    /// Maps an extension to its category, or `None` when the file should stay put.
    ///
    /// # Examples
    ///
    /// ```
    /// use dircleaner::file_category::{Category, Classifier};
    ///
    /// let classifier = Classifier::default();
    /// assert_eq!(classifier.classify("gz"), Some(Category::Archives));
    /// assert_eq!(classifier.classify(".Mp3"), Some(Category::Audio));
    /// assert_eq!(classifier.classify(""), None);
    /// ```
    pub fn classify(&self, extension: &str) -> Option<Category> {
        if extension.is_empty() || extension == "." {
            return None;
        }
        self.extension_map
            .get(&normalize_extension(extension))
            .copied()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-cases an extension and ensures it carries a leading dot.
fn normalize_extension(ext: &str) -> String {
    let lower = ext.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}
