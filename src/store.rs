//! Filesystem access used by the scanner, title resolver, and protector.
//!
//! Everything that touches lesson files goes through [`LessonStore`], so the
//! catalog logic runs unchanged against the real disk ([`DiskStore`]) or an
//! in-memory tree in tests.
//!
//! # Atomicity
//!
//! The two writes the protector performs are each published with a rename
//! from a temp file created in the lesson directory:
//!
//! - [`LessonStore::create_backup`] uses a no-clobber rename, so "does the
//!   backup exist?" and "create it" happen as one step and a reader never
//!   sees a partially written backup.
//! - [`LessonStore::replace_contents`] uses a plain rename over the visible
//!   file. A symlinked lesson is resolved first, so the link stays in place
//!   and its target receives the new content.

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use filetime::FileTime;
use tempfile::NamedTempFile;

pub trait LessonStore {
    fn is_dir(&self, path: &Path) -> bool;

    /// Regular file, following symlinks.
    fn is_file(&self, path: &Path) -> bool;

    fn exists(&self, path: &Path) -> bool;

    /// Names of the regular files directly inside `dir`, in byte order.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>>;

    /// First line without its line terminator; empty for an empty file.
    fn first_line(&self, path: &Path) -> io::Result<String>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Copy `source` to `backup` with its permissions and timestamps.
    ///
    /// Returns `Ok(false)` without touching anything if `backup` already
    /// exists.
    fn create_backup(&self, source: &Path, backup: &Path) -> io::Result<bool>;

    /// Replace the whole content of an existing file.
    fn replace_contents(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskStore;

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

impl LessonStore for DiskStore {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!(name = ?raw, "skipping non-UTF-8 filename"),
            }
        }
        names.sort();
        Ok(names)
    }

    fn first_line(&self, path: &Path) -> io::Result<String> {
        let mut reader = BufReader::new(fs::File::open(path)?);
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(line)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn create_backup(&self, source: &Path, backup: &Path) -> io::Result<bool> {
        if backup.exists() {
            return Ok(false);
        }
        let metadata = fs::metadata(source)?;
        let mut staged = NamedTempFile::new_in(parent_dir(backup))?;
        io::copy(&mut fs::File::open(source)?, staged.as_file_mut())?;
        staged.as_file().sync_all()?;
        staged.as_file().set_permissions(metadata.permissions())?;
        filetime::set_file_times(
            staged.path(),
            FileTime::from_last_access_time(&metadata),
            FileTime::from_last_modification_time(&metadata),
        )?;

        match staged.persist_noclobber(backup) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.error),
        }
    }

    fn replace_contents(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        // Rename over the link target, not the link itself
        let target = fs::canonicalize(path)?;
        let permissions = fs::metadata(&target)?.permissions();
        let mut staged = NamedTempFile::new_in(parent_dir(&target))?;
        staged.write_all(contents)?;
        staged.as_file().sync_all()?;
        staged.as_file().set_permissions(permissions)?;
        staged.persist(&target).map_err(|e| e.error)?;
        Ok(())
    }
}
