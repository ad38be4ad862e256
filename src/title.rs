//! Lesson title resolution.
//!
//! A lesson's title is its first line with the Markdown heading marker
//! removed: `# Welcome` → `Welcome`. A protected lesson's visible first line
//! is the sentinel, so its title is read from the first line of the backup
//! copy instead. Backups are never protected themselves, so this is at most
//! one hop.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Settings;
use crate::naming;
use crate::store::LessonStore;

#[derive(Error, Debug)]
#[error("cannot read {path}: {source}")]
pub struct UnreadableFile {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Sibling path of the backup copy for `path`.
pub fn backup_path(path: &Path, protection_id: &str) -> PathBuf {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(naming::backup_file_name(&filename, protection_id))
}

/// Strip surrounding whitespace and the leading `#` heading marker.
///
/// Trailing `#` is kept, so `# Learn C#` is `Learn C#`.
pub fn clean_title(line: &str) -> &str {
    line.trim().trim_start_matches('#').trim()
}

fn read_first_line(store: &dyn LessonStore, path: &Path) -> Result<String, UnreadableFile> {
    store.first_line(path).map_err(|source| UnreadableFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Title of the lesson at `path`, following the sentinel to its backup.
pub fn resolve(
    store: &dyn LessonStore,
    path: &Path,
    settings: &Settings,
) -> Result<String, UnreadableFile> {
    let first = read_first_line(store, path)?;
    let line = if first.trim() == settings.sentinel {
        let backup = backup_path(path, &settings.protection_id);
        tracing::debug!(lesson = %path.display(), backup = %backup.display(), "title from backup");
        read_first_line(store, &backup)?
    } else {
        first
    };
    Ok(clean_title(&line).to_string())
}
