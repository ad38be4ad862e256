//! Catalog records and JSON export.
//!
//! The catalog is the published description of a course:
//!
//! ```json
//! {
//!     "title": "Gomoku",
//!     "product_list": [],
//!     "catalogue_list": [
//!         {
//!             "course_name": "1.Welcome",
//!             "is_vip": false,
//!             "tutorial": "https://doc.itprojects.cn/api/v1.1/course/<id>/01.intro.md",
//!             "video": "",
//!             "question_answer": "",
//!             "product_detail": "",
//!             "children": []
//!         }
//!     ]
//! }
//! ```
//!
//! Output is 4-space indented UTF-8 with non-ASCII text written literally.
//! The same catalog always serializes to the same bytes, and each export
//! replaces the previous file entirely.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Settings;
use crate::naming::Ordinal;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("cannot write catalog to {path}: {source}")]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub course_name: String,
    pub is_vip: bool,
    pub tutorial: String,
    pub video: String,
    pub question_answer: String,
    pub product_detail: String,
    pub children: Vec<CatalogEntry>,
}

impl CatalogEntry {
    /// Entry for one lesson, named `<ordinal>.<title>`.
    ///
    /// Unnumbered lessons are named `inf.<title>`.
    pub fn new(
        ordinal: &Ordinal,
        title: &str,
        filename: &str,
        is_vip: bool,
        settings: &Settings,
    ) -> Self {
        Self {
            course_name: format!("{ordinal}.{title}"),
            is_vip,
            tutorial: settings.tutorial.url(&settings.catalog_id, filename),
            video: settings.entry.video.clone(),
            question_answer: settings.entry.question_answer.clone(),
            product_detail: settings.entry.product_detail.clone(),
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub title: String,
    pub product_list: Vec<serde_json::Value>,
    pub catalogue_list: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(title: impl Into<String>, entries: Vec<CatalogEntry>) -> Self {
        Self {
            title: title.into(),
            product_list: Vec::new(),
            catalogue_list: entries,
        }
    }

    /// Serialized form written by [`export`].
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        Ok(buf)
    }
}

/// Write `catalog` to `output`, replacing any existing file.
pub fn export(catalog: &Catalog, output: &Path) -> Result<(), ExportError> {
    let json = catalog.to_json()?;
    fs::write(output, json).map_err(|source| ExportError::OutputWriteFailure {
        path: output.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %output.display(), entries = catalog.catalogue_list.len(), "catalog written");
    Ok(())
}
