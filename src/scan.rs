//! Lesson directory scanning.
//!
//! Reads one flat directory of lesson files and turns it into ordered
//! catalog entries:
//!
//! ```text
//! coursedetail.C0002.wuziqi/
//! ├── courseware.toml              # Config (one period: not a lesson)
//! ├── 01.intro.md                  # Lesson 1
//! ├── 02.board.md                  # Lesson 2
//! ├── 05.advanced.md               # Lesson 5, VIP at threshold 5
//! ├── 05.advanced.<id>.md          # Its backup (three periods: not a lesson)
//! └── board.png                    # Asset (one period: not a lesson)
//! ```
//!
//! Scanning runs in two steps. [`plan`] lists the files, orders them by
//! ordinal, keeps the two-period names, resolves titles and builds entries.
//! It never writes. [`apply_protection`] then protects every VIP lesson in
//! the plan. [`scan`] runs both.
//!
//! Files sort by ordinal, unnumbered last. Equal ordinals keep the store's
//! listing order, which is byte order of the filename.
//!
//! A lesson whose title cannot be read aborts the scan: a catalog with
//! silently missing lessons is worse than no catalog.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::CatalogEntry;
use crate::config::Settings;
use crate::naming::{self, Ordinal};
use crate::protect::{self, ProtectError, ProtectOutcome};
use crate::store::LessonStore;
use crate::title::{self, UnreadableFile};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("lesson directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("cannot list {path}: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    FileUnreadable(#[from] UnreadableFile),
    #[error(transparent)]
    Protect(#[from] ProtectError),
}

/// A file found in the lesson directory.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonFile {
    pub ordinal: Ordinal,
    pub filename: String,
    pub path: PathBuf,
}

/// An eligible lesson with its catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
    pub file: LessonFile,
    pub title: String,
    pub entry: CatalogEntry,
    /// Set by [`apply_protection`] for VIP lessons.
    pub protection: Option<ProtectOutcome>,
}

/// Result of scanning one directory.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScanReport {
    /// Eligible lessons in catalog order.
    pub lessons: Vec<Lesson>,
    /// Filenames that are not lesson files, in sort order.
    pub skipped: Vec<String>,
}

impl ScanReport {
    pub fn catalogue_list(&self) -> Vec<CatalogEntry> {
        self.lessons.iter().map(|l| l.entry.clone()).collect()
    }

    pub fn vip_count(&self) -> usize {
        self.lessons.iter().filter(|l| l.entry.is_vip).count()
    }
}

/// Every regular file directly under `dir`, ordered by ordinal.
pub fn list_files(store: &dyn LessonStore, dir: &Path) -> Result<Vec<LessonFile>, ScanError> {
    if !store.is_dir(dir) {
        return Err(ScanError::DirectoryNotFound(dir.to_path_buf()));
    }
    let names = store.list_files(dir).map_err(|source| ScanError::Listing {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<LessonFile> = names
        .into_iter()
        .map(|filename| LessonFile {
            ordinal: naming::parse_ordinal(&filename),
            path: dir.join(&filename),
            filename,
        })
        .collect();
    // Stable: equal ordinals keep listing order
    files.sort_by(|a, b| a.ordinal.cmp(&b.ordinal));
    Ok(files)
}

/// Build entries for every lesson in `dir` without modifying any file.
pub fn plan(
    store: &dyn LessonStore,
    dir: &Path,
    settings: &Settings,
) -> Result<ScanReport, ScanError> {
    let mut report = ScanReport::default();

    for file in list_files(store, dir)? {
        if !naming::is_lesson_filename(&file.filename) {
            tracing::debug!(file = %file.filename, "not a lesson file");
            report.skipped.push(file.filename);
            continue;
        }
        let title = title::resolve(store, &file.path, settings)?;
        let is_vip = file.ordinal.reaches(settings.vip_threshold);
        let entry = CatalogEntry::new(&file.ordinal, &title, &file.filename, is_vip, settings);
        tracing::debug!(file = %file.filename, course = %entry.course_name, is_vip, "lesson");

        report.lessons.push(Lesson {
            file,
            title,
            entry,
            protection: None,
        });
    }

    Ok(report)
}

/// Protect every VIP lesson in `report`, recording each outcome.
pub fn apply_protection(
    store: &dyn LessonStore,
    report: &mut ScanReport,
    settings: &Settings,
) -> Result<(), ScanError> {
    for lesson in report.lessons.iter_mut().filter(|l| l.entry.is_vip) {
        let outcome = protect::protect(store, &lesson.file.path, settings)?;
        lesson.protection = Some(outcome);
    }
    Ok(())
}

/// [`plan`] followed by [`apply_protection`].
pub fn scan(
    store: &dyn LessonStore,
    dir: &Path,
    settings: &Settings,
) -> Result<ScanReport, ScanError> {
    let mut report = plan(store, dir, settings)?;
    apply_protection(store, &mut report, settings)?;
    Ok(report)
}
