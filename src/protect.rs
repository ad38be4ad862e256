//! VIP lesson protection.
//!
//! Protecting a lesson moves its text into a backup copy next to it
//! (`05.advanced.md` → `05.advanced.<id>.md`) and overwrites the visible
//! file with the sentinel. This is relocation, not encryption: anyone with
//! the backup has the content.
//!
//! # Idempotence
//!
//! The backup is created at most once and never rewritten. Once it exists,
//! later runs leave both files alone, so protecting a lesson any number of
//! times produces the same files as protecting it once.
//!
//! # Interrupted runs
//!
//! The backup is published before the sentinel is written. A run stopped
//! between the two leaves the backup present and the plaintext still
//! visible. When the backup exists but the visible file is not the
//! sentinel, the visible bytes are compared with the backup:
//!
//! - identical: the earlier run was cut short, so the sentinel is written
//!   now ([`ProtectOutcome::Resumed`]);
//! - different: the lesson was edited after protection. Nothing is
//!   touched and the file is reported as [`ProtectOutcome::Diverged`].

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Settings;
use crate::store::LessonStore;
use crate::title::backup_path;

#[derive(Error, Debug)]
pub enum ProtectError {
    #[error("file to protect does not exist: {0}")]
    FileMissingForProtection(PathBuf),
    #[error("IO error protecting {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What [`protect`] did to a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectOutcome {
    /// Backup created and sentinel written during this call.
    Protected { backup: PathBuf },
    /// Backup already present and the visible file holds the sentinel.
    AlreadyProtected { backup: PathBuf },
    /// Backup present, visible file still held the original; sentinel written.
    Resumed { backup: PathBuf },
    /// Backup present but the visible file holds different, non-sentinel text.
    Diverged { backup: PathBuf },
}

impl ProtectOutcome {
    pub fn backup(&self) -> &Path {
        match self {
            ProtectOutcome::Protected { backup }
            | ProtectOutcome::AlreadyProtected { backup }
            | ProtectOutcome::Resumed { backup }
            | ProtectOutcome::Diverged { backup } => backup,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProtectOutcome::Protected { .. } => "created",
            ProtectOutcome::AlreadyProtected { .. } => "exists",
            ProtectOutcome::Resumed { .. } => "resumed",
            ProtectOutcome::Diverged { .. } => "diverged",
        }
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ProtectError + '_ {
    move |source| ProtectError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn holds_sentinel(contents: &[u8], sentinel: &str) -> bool {
    std::str::from_utf8(contents).is_ok_and(|text| text.trim() == sentinel)
}

/// Ensure `path` is protected. See the module docs for the states handled.
pub fn protect(
    store: &dyn LessonStore,
    path: &Path,
    settings: &Settings,
) -> Result<ProtectOutcome, ProtectError> {
    if !store.is_file(path) {
        return Err(ProtectError::FileMissingForProtection(path.to_path_buf()));
    }
    let backup = backup_path(path, &settings.protection_id);

    if !store.exists(&backup) {
        let created = store
            .create_backup(path, &backup)
            .map_err(io_err(&backup))?;
        if created {
            store
                .replace_contents(path, settings.sentinel.as_bytes())
                .map_err(io_err(path))?;
            tracing::info!(lesson = %path.display(), backup = %backup.display(), "protected");
            return Ok(ProtectOutcome::Protected { backup });
        }
    }

    let visible = store.read(path).map_err(io_err(path))?;
    if holds_sentinel(&visible, &settings.sentinel) {
        tracing::debug!(lesson = %path.display(), "already protected");
        return Ok(ProtectOutcome::AlreadyProtected { backup });
    }

    let original = store.read(&backup).map_err(io_err(&backup))?;
    if visible == original {
        store
            .replace_contents(path, settings.sentinel.as_bytes())
            .map_err(io_err(path))?;
        tracing::info!(lesson = %path.display(), "completed interrupted protection");
        Ok(ProtectOutcome::Resumed { backup })
    } else {
        tracing::warn!(
            lesson = %path.display(),
            backup = %backup.display(),
            "lesson differs from its backup and is not the sentinel; leaving both untouched"
        );
        Ok(ProtectOutcome::Diverged { backup })
    }
}
