//! Integration tests for dircleaner
//!
//! These tests run the scan, plan and execute pipeline against temporary
//! directories.
//!
//! Test categories:
//! 1. Basic organization
//! 2. Idempotent re-runs
//! 3. Name collisions
//! 4. Dry-run mode
//! 5. Recursion, filtering and configuration
//! 6. Failures that must not stop a batch

use dircleaner::cli::{Options, RunSummary, run};
use dircleaner::file_organizer::{FileOrganizer, MoveOutcome};
use dircleaner::output::{Level, RecordingReporter};
use dircleaner::planner::{FileDescriptor, Planner};
use dircleaner::scanner::FileScanner;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary directory with helpers for building and inspecting file trees.
struct TestFixture {
    temp_dir: TempDir,
    /// Holds an empty config file so runs never pick up a user config.
    config_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_dir = TempDir::new().expect("Failed to create config directory");
        fs::write(config_dir.path().join("config.toml"), "")
            .expect("Failed to write empty config");
        TestFixture {
            temp_dir,
            config_dir,
        }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file (and its parent directories) with the given content.
    fn create_text_file(&self, rel_path: &str, content: &str) {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content.as_bytes())
            .expect("Failed to write file content");
    }

    fn create_files(&self, names: &[&str]) {
        for name in names {
            self.create_text_file(name, name);
        }
    }

    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.is_file(),
            "File should exist: {}",
            path.display()
        );
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    /// Count directories directly under the fixture root.
    fn count_dirs(&self) -> usize {
        fs::read_dir(self.path())
            .expect("Failed to read directory")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .count()
    }

    /// All files below the root, relative and sorted.
    fn list_files_recursive(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        Self::walk_dir(self.path(), &mut files);
        let mut relative: Vec<PathBuf> = files
            .into_iter()
            .map(|p| p.strip_prefix(self.path()).unwrap().to_path_buf())
            .collect();
        relative.sort();
        relative
    }

    fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) {
        if let Ok(entries) = fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() {
                    files.push(path);
                } else if path.is_dir() {
                    Self::walk_dir(&path, files);
                }
            }
        }
    }

    fn options(&self) -> Options {
        let mut options = Options::for_path(self.path());
        options.config = Some(self.config_dir.path().join("config.toml"));
        options
    }

    fn organize(&self) -> (RunSummary, RecordingReporter) {
        self.organize_with(self.options())
    }

    fn dry_run(&self) -> (RunSummary, RecordingReporter) {
        let mut options = self.options();
        options.dry_run = true;
        self.organize_with(options)
    }

    fn organize_with(&self, options: Options) -> (RunSummary, RecordingReporter) {
        let mut reporter = RecordingReporter::new();
        let summary = run(&options, &mut reporter).expect("run should succeed");
        (summary, reporter)
    }
}

fn rel(parts: &[&str]) -> PathBuf {
    parts.iter().collect()
}

// ============================================================================
// Test Suite 1: Basic Organization
// ============================================================================

#[test]
fn test_organize_empty_directory() {
    let fixture = TestFixture::new();

    let (summary, _) = fixture.organize();

    assert_eq!(summary.scanned, 0);
    assert_eq!(summary.moved, 0);
    assert_eq!(fixture.count_dirs(), 0, "Should have no subdirectories");
}

#[test]
fn test_organize_mixed_scenario() {
    let fixture = TestFixture::new();
    fixture.create_files(&[
        "photo.JPG",
        "report.pdf",
        "notes.txt",
        "archive.tar.gz",
        "readme",
    ]);

    let (summary, _) = fixture.organize();

    assert_eq!(summary.scanned, 5);
    assert_eq!(summary.planned, 4);
    assert_eq!(summary.moved, 4);
    assert_eq!(
        fixture.list_files_recursive(),
        vec![
            rel(&["Archives", "archive.tar.gz"]),
            rel(&["Documents", "notes.txt"]),
            rel(&["Documents", "report.pdf"]),
            rel(&["Images", "photo.JPG"]),
            rel(&["readme"]),
        ]
    );
}

#[test]
fn test_organize_every_category() {
    let fixture = TestFixture::new();
    fixture.create_files(&[
        "a.png", "b.docx", "c.mkv", "d.flac", "e.7z", "f.rs", "g.exe",
    ]);

    let (summary, _) = fixture.organize();

    assert_eq!(summary.moved, 7);
    for path in [
        "Images/a.png",
        "Documents/b.docx",
        "Videos/c.mkv",
        "Audio/d.flac",
        "Archives/e.7z",
        "Code/f.rs",
        "Programs/g.exe",
    ] {
        fixture.assert_file_exists(path);
    }
    assert_eq!(summary.per_category.len(), 7);
}

#[test]
fn test_unrecognized_files_stay_in_place() {
    let fixture = TestFixture::new();
    fixture.create_files(&["Makefile", "data.xyz"]);

    let (summary, _) = fixture.organize();

    assert_eq!(summary.planned, 0);
    fixture.assert_file_exists("Makefile");
    fixture.assert_file_exists("data.xyz");
    assert_eq!(fixture.count_dirs(), 0);
}

// ============================================================================
// Test Suite 2: Idempotent Re-runs
// ============================================================================

#[test]
fn test_second_run_moves_nothing() {
    let fixture = TestFixture::new();
    fixture.create_files(&["photo.png", "report.pdf", "song.mp3"]);

    let (first, _) = fixture.organize();
    let after_first = fixture.list_files_recursive();
    let (second, _) = fixture.organize();

    assert_eq!(first.moved, 3);
    assert_eq!(second.planned, 0);
    assert_eq!(second.moved, 0);
    assert_eq!(fixture.list_files_recursive(), after_first);
}

#[test]
fn test_recursive_rerun_leaves_category_folders_alone() {
    let fixture = TestFixture::new();
    fixture.create_files(&["Images/old.png", "Documents/old.pdf", "new.png"]);

    let mut options = fixture.options();
    options.recursive = true;
    let (summary, _) = fixture.organize_with(options);

    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.planned, 1);
    fixture.assert_file_exists("Images/old.png");
    fixture.assert_file_exists("Images/new.png");
    fixture.assert_file_exists("Documents/old.pdf");
}

// ============================================================================
// Test Suite 3: Name Collisions
// ============================================================================

#[test]
fn test_collision_gets_numbered_name() {
    let fixture = TestFixture::new();
    fixture.create_text_file("Documents/report.pdf", "original");
    fixture.create_text_file("report.pdf", "incoming");

    let (summary, _) = fixture.organize();

    assert_eq!(summary.moved, 1);
    assert_eq!(fixture.read("Documents/report.pdf"), "original");
    assert_eq!(fixture.read("Documents/report (1).pdf"), "incoming");
    fixture.assert_file_not_exists("report.pdf");
}

#[test]
fn test_collision_skips_existing_numbers() {
    let fixture = TestFixture::new();
    fixture.create_files(&["Images/pic.png", "Images/pic (1).png", "pic.png"]);

    fixture.organize();

    fixture.assert_file_exists("Images/pic (2).png");
}

#[test]
fn test_recursive_same_names_do_not_overwrite() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a/notes.txt", "from a");
    fixture.create_text_file("b/notes.txt", "from b");

    let mut options = fixture.options();
    options.recursive = true;
    let (summary, _) = fixture.organize_with(options);

    assert_eq!(summary.moved, 2);
    assert_eq!(fixture.read("Documents/notes.txt"), "from a");
    assert_eq!(fixture.read("Documents/notes (1).txt"), "from b");
}

// ============================================================================
// Test Suite 4: Dry-Run Mode
// ============================================================================

#[test]
fn test_dry_run_does_not_touch_disk() {
    let fixture = TestFixture::new();
    fixture.create_files(&["photo.png", "report.pdf"]);
    let before = fixture.list_files_recursive();

    let (summary, reporter) = fixture.dry_run();

    assert_eq!(summary.previewed, 2);
    assert_eq!(summary.moved, 0);
    assert_eq!(fixture.list_files_recursive(), before);
    assert_eq!(fixture.count_dirs(), 0, "Dry-run should not create directories");
    assert!(reporter.contains("WOULD MOVE"));
    assert!(reporter.contains("No files were modified"));
}

#[test]
fn test_dry_run_reports_live_destination() {
    let fixture = TestFixture::new();
    fixture.create_files(&["Documents/report.pdf", "report.pdf"]);

    let (_, reporter) = fixture.dry_run();

    let expected = fixture.path().join("Documents").join("report (1).pdf");
    assert!(reporter.contains(&format!("TO: {}", expected.display())));
    fixture.assert_file_exists("report.pdf");
    fixture.assert_file_not_exists("Documents/report (1).pdf");

    fixture.organize();
    fixture.assert_file_exists("Documents/report (1).pdf");
}

#[test]
fn test_dry_run_batch_matches_live_run() {
    let fixture = TestFixture::new();
    fixture.create_files(&["x/clip.mp4", "y/clip.mp4", "z/clip.mp4"]);

    let mut options = fixture.options();
    options.recursive = true;
    options.dry_run = true;
    let (_, reporter) = fixture.organize_with(options.clone());

    for name in ["clip.mp4", "clip (1).mp4", "clip (2).mp4"] {
        let expected = fixture.path().join("Videos").join(name);
        assert!(reporter.contains(&format!("TO: {}", expected.display())), "{}", name);
    }

    options.dry_run = false;
    fixture.organize_with(options);
    for name in ["Videos/clip.mp4", "Videos/clip (1).mp4", "Videos/clip (2).mp4"] {
        fixture.assert_file_exists(name);
    }
}

// ============================================================================
// Test Suite 5: Recursion, Filtering and Configuration
// ============================================================================

#[test]
fn test_top_level_only_by_default() {
    let fixture = TestFixture::new();
    fixture.create_files(&["nested/deep.png", "top.png"]);

    let (summary, _) = fixture.organize();

    assert_eq!(summary.moved, 1);
    fixture.assert_file_exists("nested/deep.png");
    fixture.assert_file_exists("Images/top.png");
}

#[test]
fn test_recursive_flattens_into_root_categories() {
    let fixture = TestFixture::new();
    fixture.create_files(&["nested/deep/track.wav", "nested/doc.odt"]);

    let mut options = fixture.options();
    options.recursive = true;
    fixture.organize_with(options);

    fixture.assert_file_exists("Audio/track.wav");
    fixture.assert_file_exists("Documents/doc.odt");
}

#[test]
fn test_hidden_and_temporary_files_are_ignored() {
    let fixture = TestFixture::new();
    fixture.create_files(&[".secret.png", "draft.docx~", "partial.tmp", "real.png"]);

    let (summary, _) = fixture.organize();

    assert_eq!(summary.scanned, 1);
    fixture.assert_file_exists(".secret.png");
    fixture.assert_file_exists("draft.docx~");
    fixture.assert_file_exists("partial.tmp");
    fixture.assert_file_exists("Images/real.png");
}

#[test]
fn test_config_file_excludes_and_enables_recursion() {
    let fixture = TestFixture::new();
    fixture.create_files(&["keep.pdf", "skip.pdf", "sub/inner.png"]);
    let config_dir = TempDir::new().unwrap();
    let config_path = config_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[scan]
recursive = true

[filters.exclude]
filenames = ["skip.pdf"]
"#,
    )
    .unwrap();

    let mut options = fixture.options();
    options.config = Some(config_path);
    let (summary, _) = fixture.organize_with(options);

    assert_eq!(summary.moved, 2);
    fixture.assert_file_exists("Documents/keep.pdf");
    fixture.assert_file_exists("skip.pdf");
    fixture.assert_file_exists("Images/inner.png");
}

#[test]
fn test_invalid_target_is_an_error() {
    let fixture = TestFixture::new();
    let options = Options::for_path(&fixture.path().join("missing"));

    let result = run(&options, &mut RecordingReporter::new());

    assert!(result.is_err());
}

// ============================================================================
// Test Suite 6: Failures That Must Not Stop a Batch
// ============================================================================

#[test]
fn test_vanished_source_fails_and_batch_continues() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.pdf", "b.pdf", "c.pdf"]);

    let report = FileScanner::new(fixture.path(), false).scan().unwrap();
    let planner = Planner::new(fixture.path());
    let plan: Vec<_> = report.files.iter().filter_map(|f| planner.plan(f)).collect();
    assert_eq!(plan.len(), 3);

    // Deleted between scan and execute.
    fs::remove_file(fixture.path().join("b.pdf")).unwrap();

    let outcomes: Vec<MoveOutcome> = plan
        .iter()
        .map(|entry| FileOrganizer::execute(entry, false))
        .collect();

    assert!(outcomes[0].is_moved());
    assert!(outcomes[1].is_failed());
    assert!(outcomes[2].is_moved());
    fixture.assert_file_exists("Documents/a.pdf");
    fixture.assert_file_exists("Documents/c.pdf");
}

#[test]
fn test_blocked_category_is_reported_per_file() {
    let fixture = TestFixture::new();
    // A file named like the category folder blocks its creation.
    fixture.create_text_file("Images", "not a directory");
    fixture.create_files(&["a.png", "b.pdf"]);

    let (summary, reporter) = fixture.organize();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.moved, 1);
    fixture.assert_file_exists("a.png");
    fixture.assert_file_exists("Documents/b.pdf");
    assert_eq!(reporter.at(Level::Error).len(), 1);
    assert!(reporter.contains("Success: 1, Failed: 1"));
}

#[test]
fn test_file_already_in_category_is_not_planned() {
    let fixture = TestFixture::new();
    fixture.create_files(&["Code/main.rs"]);

    let file = FileDescriptor::new(fixture.path().join("Code").join("main.rs")).unwrap();
    assert!(Planner::new(fixture.path()).plan(&file).is_none());
}
