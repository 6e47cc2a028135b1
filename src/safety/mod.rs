//! Pre-rename safety checks
//!
//! Nothing here renames anything. Each check returns a report listing
//! blocking errors and non-blocking warnings; callers decide what to do with
//! an unsafe report. The only side effect is the optional backup copy made
//! once a rename has passed every check.

mod checksum;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

pub use checksum::{compute_file_checksum, verify_copy};

use crate::config::SafetyConfig;
use crate::error::{Error, Result};

/// Files above this size get a warning
const LARGE_FILE_BYTES: u64 = 100 * 1024 * 1024;

/// Longest filename most filesystems accept
const MAX_NAME_BYTES: usize = 255;

/// Numbered alternatives tried before falling back to a timestamp
const MAX_ALTERNATIVES: u32 = 1000;

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyReport {
    pub safe: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub backup_path: Option<PathBuf>,
}

impl SafetyReport {
    fn ok() -> Self {
        Self {
            safe: true,
            ..Default::default()
        }
    }

    fn fail(mut self, error: String) -> Self {
        self.safe = false;
        self.errors.push(error);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FilenameValidation {
    pub valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskSpaceReport {
    pub sufficient: bool,
    pub available_space: u64,
    pub required_space: u64,
    pub warnings: Vec<String>,
}

/// A planned rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOperation {
    pub source: PathBuf,
    pub target: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub safe: bool,
    pub total_operations: usize,
    pub safe_operations: usize,
    pub unsafe_operations: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub operation_results: Vec<SafetyReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeTarget {
    pub source: PathBuf,
    pub original_target: PathBuf,
    pub alternative_target: PathBuf,
}

pub struct SafetyChecker {
    create_backups: bool,
    backup_dir: PathBuf,
}

impl SafetyChecker {
    pub fn new(config: &SafetyConfig) -> Self {
        Self {
            create_backups: config.create_backups,
            backup_dir: config.backup_dir.clone(),
        }
    }

    /// Full pre-rename check; backs the source up once every check passes
    pub fn check_rename_safety(&self, source: &Path, target: &Path) -> SafetyReport {
        let mut report = self.check_paths(source, target);
        if !report.safe || !self.create_backups {
            return report;
        }

        match self.create_backup(source) {
            Ok(path) => report.backup_path = Some(path),
            Err(e) => {
                tracing::warn!("[Safety] Backup of {} failed: {}", source.display(), e);
                report.warnings.push(format!("Failed to create backup: {}", e));
            }
        }

        report
    }

    /// Read-only checks: source, collisions, target directory, size
    pub fn check_paths(&self, source: &Path, target: &Path) -> SafetyReport {
        let report = SafetyReport::ok();

        let source_meta = match fs::metadata(source) {
            Ok(meta) => meta,
            Err(_) => {
                return report.fail(format!("Source file does not exist: {}", source.display()))
            }
        };

        if same_file(source, target) {
            return report.fail("Source and target are the same file".to_string());
        }

        if target.exists() {
            return report.fail(format!("Target file already exists: {}", target.display()));
        }

        let parent = parent_dir(target);
        let parent_meta = match fs::metadata(parent) {
            Ok(meta) => meta,
            Err(_) => {
                return report.fail(format!(
                    "Target directory does not exist: {}",
                    parent.display()
                ))
            }
        };

        if !parent_meta.is_dir() || parent_meta.permissions().readonly() {
            return report.fail(format!(
                "Target directory is not writable: {}",
                parent.display()
            ));
        }

        let mut report = report;
        let size = source_meta.len();
        if size > LARGE_FILE_BYTES {
            report.warnings.push(format!(
                "Large file detected: {:.1}MB",
                size as f64 / (1024.0 * 1024.0)
            ));
        }

        report
    }

    /// Copy `source` into the backup dir as `{stem}_{timestamp}{.ext}` and verify it
    pub fn create_backup(&self, source: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.backup_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let backup_path = self
            .backup_dir
            .join(format!("{}_{}{}", stem(source), timestamp, extension(source)));

        fs::copy(source, &backup_path)?;

        if !verify_copy(source, &backup_path)? {
            let _ = fs::remove_file(&backup_path);
            return Err(Error::Unsafe(format!(
                "Backup checksum mismatch for {}",
                source.display()
            )));
        }

        tracing::info!(
            "[Safety] Backed up {} to {}",
            source.display(),
            backup_path.display()
        );
        Ok(backup_path)
    }

    /// First free `{stem}_{n}{.ext}` next to `target`, else a timestamped name
    pub fn suggest_alternative_name(&self, target: &Path) -> PathBuf {
        let parent = parent_dir(target);
        let (stem, ext) = (stem(target), extension(target));

        for counter in 1..=MAX_ALTERNATIVES {
            let alternative = parent.join(format!("{}_{}{}", stem, counter, ext));
            if !alternative.exists() {
                return alternative;
            }
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        parent.join(format!("{}_{}{}", stem, timestamp, ext))
    }

    pub fn validate_filename(filename: &str) -> FilenameValidation {
        let mut result = FilenameValidation {
            valid: true,
            ..Default::default()
        };

        for c in INVALID_CHARS {
            if filename.contains(*c) {
                result.valid = false;
                result.errors.push(format!("Invalid character: {}", c));
            }
        }

        if filename.len() > MAX_NAME_BYTES {
            result.valid = false;
            result
                .errors
                .push(format!("Filename too long (max {} characters)", MAX_NAME_BYTES));
        }

        let base = filename
            .rsplit_once('.')
            .map(|(base, _)| base)
            .unwrap_or(filename)
            .to_uppercase();
        if RESERVED_NAMES.contains(&base.as_str()) {
            result.valid = false;
            result.errors.push(format!("Reserved name: {}", base));
        }

        if filename.starts_with([' ', '.']) || filename.ends_with([' ', '.']) {
            result
                .warnings
                .push("Filename has leading/trailing spaces or dots".to_string());
        }

        result
    }

    pub fn check_disk_space(&self, source: &Path, target_dir: &Path) -> DiskSpaceReport {
        let mut report = DiskSpaceReport {
            sufficient: true,
            ..Default::default()
        };

        let required = match fs::metadata(source) {
            Ok(meta) => meta.len(),
            Err(e) => {
                report.warnings.push(format!("Could not check disk space: {}", e));
                return report;
            }
        };
        report.required_space = required;

        match fs2::available_space(target_dir) {
            Ok(available) => {
                report.available_space = available;
                if required as f64 > available as f64 * 0.9 {
                    report.sufficient = false;
                    report.warnings.push("Low disk space warning".to_string());
                }
            }
            Err(e) => report.warnings.push(format!("Could not check disk space: {}", e)),
        }

        report
    }

    /// Checks every operation; never writes backups
    pub fn check_batch_safety(&self, operations: &[RenameOperation]) -> BatchReport {
        let mut batch = BatchReport {
            total_operations: operations.len(),
            ..Default::default()
        };

        for op in operations {
            let report = self.check_paths(&op.source, &op.target);
            if report.safe {
                batch.safe_operations += 1;
            } else {
                batch.unsafe_operations += 1;
                batch.errors.extend(report.errors.iter().cloned());
            }
            batch.warnings.extend(report.warnings.iter().cloned());
            batch.operation_results.push(report);
        }

        batch.safe = batch.unsafe_operations == 0;
        batch
    }

    /// Alternatives for every operation whose target already exists
    pub fn suggest_batch_alternatives(&self, operations: &[RenameOperation]) -> Vec<AlternativeTarget> {
        operations
            .iter()
            .filter(|op| op.target.exists())
            .map(|op| AlternativeTarget {
                source: op.source.clone(),
                original_target: op.target.clone(),
                alternative_target: self.suggest_alternative_name(&op.target),
            })
            .collect()
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

/// Both paths resolve to the same existing file
fn same_file(source: &Path, target: &Path) -> bool {
    match (fs::canonicalize(source), fs::canonicalize(target)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn checker(backup_dir: Option<&Path>) -> SafetyChecker {
        SafetyChecker::new(&SafetyConfig {
            create_backups: backup_dir.is_some(),
            backup_dir: backup_dir.map(Path::to_path_buf).unwrap_or_default(),
            ..Default::default()
        })
    }

    #[test]
    fn test_safe_rename() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "x").unwrap();

        let report = checker(None).check_rename_safety(&source, &dir.path().join("b.txt"));
        assert!(report.safe, "{:?}", report.errors);
        assert!(report.warnings.is_empty());
        assert!(report.backup_path.is_none());
    }

    #[test]
    fn test_missing_source() {
        let dir = tempdir().unwrap();
        let report = checker(None)
            .check_rename_safety(&dir.path().join("ghost.txt"), &dir.path().join("b.txt"));
        assert!(!report.safe);
        assert!(report.errors[0].starts_with("Source file does not exist"));
    }

    #[test]
    fn test_existing_target() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        let target = dir.path().join("b.txt");
        fs::write(&source, "x").unwrap();
        fs::write(&target, "y").unwrap();

        let report = checker(None).check_rename_safety(&source, &target);
        assert!(!report.safe);
        assert!(report.errors[0].starts_with("Target file already exists"));
    }

    #[test]
    fn test_same_file() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "x").unwrap();

        let dotted = dir.path().join(".").join("a.txt");
        let report = checker(None).check_rename_safety(&source, &dotted);
        assert!(!report.safe);
        assert_eq!(report.errors, vec!["Source and target are the same file"]);
    }

    #[test]
    fn test_missing_target_directory() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "x").unwrap();

        let report = checker(None).check_rename_safety(&source, &dir.path().join("nope/b.txt"));
        assert!(!report.safe);
        assert!(report.errors[0].starts_with("Target directory does not exist"));
    }

    #[test]
    fn test_backup_is_verified_copy() {
        let dir = tempdir().unwrap();
        let backups = dir.path().join("backups");
        let source = dir.path().join("report.pdf");
        fs::write(&source, "%PDF-1.4 body").unwrap();

        let report = checker(Some(&backups)).check_rename_safety(&source, &dir.path().join("q3.pdf"));
        assert!(report.safe);

        let backup = report.backup_path.unwrap();
        assert!(backup.starts_with(&backups));
        let name = backup.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("report_") && name.ends_with(".pdf"), "{}", name);
        // report_YYYYmmdd_HHMMSS.pdf
        assert_eq!(name.len(), "report_".len() + 15 + ".pdf".len());
        assert!(verify_copy(&source, &backup).unwrap());
    }

    #[test]
    fn test_alternative_names() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("notes.md");
        fs::write(&target, "").unwrap();
        fs::write(dir.path().join("notes_1.md"), "").unwrap();

        let checker = checker(None);
        assert_eq!(checker.suggest_alternative_name(&target), dir.path().join("notes_2.md"));

        let ops = vec![
            RenameOperation {
                source: dir.path().join("x.md"),
                target: target.clone(),
            },
            RenameOperation {
                source: dir.path().join("y.md"),
                target: dir.path().join("fresh.md"),
            },
        ];
        let alternatives = checker.suggest_batch_alternatives(&ops);
        assert_eq!(alternatives.len(), 1);
        assert_eq!(alternatives[0].original_target, target);
        assert_eq!(alternatives[0].alternative_target, dir.path().join("notes_2.md"));
    }

    #[test]
    fn test_validate_filename() {
        assert!(SafetyChecker::validate_filename("report_q3.pdf").valid);

        let bad = SafetyChecker::validate_filename("what?.txt");
        assert!(!bad.valid);
        assert_eq!(bad.errors, vec!["Invalid character: ?"]);

        let reserved = SafetyChecker::validate_filename("con.txt");
        assert!(!reserved.valid);
        assert_eq!(reserved.errors, vec!["Reserved name: CON"]);
        assert!(!SafetyChecker::validate_filename("LPT9").valid);

        assert!(!SafetyChecker::validate_filename(&"a".repeat(256)).valid);

        let dotted = SafetyChecker::validate_filename(".hidden ");
        assert!(dotted.valid);
        assert_eq!(dotted.warnings.len(), 1);
    }

    #[test]
    fn test_disk_space() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("small.bin");
        fs::write(&source, [0u8; 64]).unwrap();

        let report = checker(None).check_disk_space(&source, dir.path());
        assert_eq!(report.required_space, 64);
        assert!(report.sufficient);
        assert!(report.available_space > 0);
    }

    #[test]
    fn test_batch_safety() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();

        let ops = vec![
            RenameOperation {
                source: a.clone(),
                target: dir.path().join("c.txt"),
            },
            RenameOperation {
                source: a.clone(),
                target: b.clone(),
            },
        ];
        let report = checker(None).check_batch_safety(&ops);
        assert!(!report.safe);
        assert_eq!(report.total_operations, 2);
        assert_eq!(report.safe_operations, 1);
        assert_eq!(report.unsafe_operations, 1);
        assert_eq!(report.operation_results.len(), 2);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_batch_check_makes_no_backups() {
        let dir = tempdir().unwrap();
        let backups = dir.path().join("backups");
        let source = dir.path().join("a.txt");
        fs::write(&source, "a").unwrap();

        let ops = vec![RenameOperation {
            source: source.clone(),
            target: dir.path().join("c.txt"),
        }];
        let report = checker(Some(&backups)).check_batch_safety(&ops);

        assert!(report.safe);
        assert!(report.operation_results[0].backup_path.is_none());
        assert!(!backups.exists());
    }

    #[test]
    fn test_failed_check_makes_no_backup() {
        let dir = tempdir().unwrap();
        let backups = dir.path().join("backups");
        let source = dir.path().join("a.txt");
        let target = dir.path().join("b.txt");
        fs::write(&source, "a").unwrap();
        fs::write(&target, "b").unwrap();

        let report = checker(Some(&backups)).check_rename_safety(&source, &target);
        assert!(!report.safe);
        assert!(report.backup_path.is_none());
        assert!(!backups.exists());
    }
}
