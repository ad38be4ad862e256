//! # Courseware
//!
//! Builds a JSON course catalog from a directory of numbered lesson files
//! and hides the text of paid ("VIP") lessons from the visible source tree.
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan      lesson dir  →  ordered lesson files     (naming, store)
//! 2. Plan      lessons     →  titles + catalog entries (title, catalog)
//! 3. Protect   VIP lessons →  backup + sentinel        (protect)
//! 4. Export    catalog     →  <catalog_id>.json        (catalog)
//! ```
//!
//! Planning never writes, so `check` can show exactly what `build` would do.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | Leading-number ordinals, lesson filename filter, backup names |
//! | [`store`] | `LessonStore` filesystem seam and its disk implementation |
//! | [`title`] | First-line titles with sentinel fallback to the backup |
//! | [`protect`] | Idempotent backup + sentinel replacement of VIP lessons |
//! | [`scan`] | Directory listing, ordering, planning, protection pass |
//! | [`catalog`] | Catalog records and JSON export |
//! | [`config`] | `courseware.toml` loading, CLI overrides, resolved `Settings` |
//! | [`output`] | CLI output formatting |
//!
//! # Protection
//!
//! "Protection" is relocation, not cryptography. A VIP lesson
//! `05.advanced.md` is copied to `05.advanced.<protection_id>.md` and the
//! visible file is overwritten with the sentinel (`encrypt` by default).
//! The catalog still shows the real title because the title resolver follows
//! the sentinel to the backup. The backup is written once and never touched
//! again, so running a build repeatedly produces the same files and the same
//! catalog bytes.

pub mod catalog;
pub mod config;
pub mod naming;
pub mod output;
pub mod protect;
pub mod scan;
pub mod store;
pub mod title;

#[cfg(test)]
pub(crate) mod test_helpers;
