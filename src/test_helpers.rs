//! Shared test utilities.
//!
//! [`MemoryStore`] is an in-memory [`LessonStore`] so scanning and
//! protection logic can be exercised without touching the disk. Lookups
//! panic with a clear message on a miss.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let store = MemoryStore::new();
//! store.add_file("/c/01.intro.md", "# Welcome\n");
//! let report = scan(&store, Path::new("/c"), &settings).unwrap();
//! assert_eq!(course_names(&report.catalogue_list()), vec!["1.Welcome"]);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::catalog::CatalogEntry;
use crate::store::LessonStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: &str) {
        let path = path.as_ref().to_path_buf();
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in path.ancestors().skip(1) {
            dirs.insert(ancestor.to_path_buf());
        }
        self.files
            .borrow_mut()
            .insert(path, contents.as_bytes().to_vec());
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.dirs.borrow_mut().insert(path.as_ref().to_path_buf());
    }

    /// File content as UTF-8. Panics if the file does not exist.
    pub fn contents(&self, path: impl AsRef<Path>) -> String {
        let path = path.as_ref();
        let files = self.files.borrow();
        let bytes = files.get(path).unwrap_or_else(|| {
            let known: Vec<_> = files.keys().collect();
            panic!("file {} not found. Available: {known:?}", path.display())
        });
        String::from_utf8(bytes.clone()).unwrap()
    }

    pub fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        self.files.borrow().clone()
    }

    /// Number of successful backup creations and content replacements.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )
    }
}

impl LessonStore for MemoryStore {
    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.borrow().contains(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        if !self.is_dir(dir) {
            return Err(Self::not_found(dir));
        }
        let mut names: Vec<String> = self
            .files
            .borrow()
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    fn first_line(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let line = text.lines().next().unwrap_or_default();
        Ok(line.to_string())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    fn create_backup(&self, source: &Path, backup: &Path) -> io::Result<bool> {
        if self.exists(backup) {
            return Ok(false);
        }
        let bytes = self.read(source)?;
        self.files.borrow_mut().insert(backup.to_path_buf(), bytes);
        self.writes.set(self.writes.get() + 1);
        Ok(true)
    }

    fn replace_contents(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut files = self.files.borrow_mut();
        let slot = files.get_mut(path).ok_or_else(|| Self::not_found(path))?;
        *slot = contents.to_vec();
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

// =========================================================================
// On-disk fixtures
// =========================================================================

/// A temp lesson directory named `catalog_id`, filled with `files`.
///
/// Returns the temp root (keep it alive) and the lesson directory path.
pub fn lesson_dir(catalog_id: &str, files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join(catalog_id);
    std::fs::create_dir(&dir).unwrap();
    for (name, contents) in files {
        std::fs::write(dir.join(name), contents).unwrap();
    }
    (tmp, dir)
}

// =========================================================================
// Bulk extractors
// =========================================================================

pub fn course_names(entries: &[CatalogEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.course_name.as_str()).collect()
}

pub fn vip_flags(entries: &[CatalogEntry]) -> Vec<bool> {
    entries.iter().map(|e| e.is_vip).collect()
}
