//! Filename conventions for lesson directories.
//!
//! Lessons are ordered by the decimal number their filename starts with and
//! are recognized by shape: a lesson description file is named
//! `<name>.<ext1>.<ext2>`, so its filename holds exactly two periods.
//!
//! - `01.intro.md` → ordinal 1, eligible
//! - `12.pieces.md` → ordinal 12, eligible
//! - `cover.png` → unnumbered, not eligible (one period)
//! - `05.advanced.abc123.md` → ordinal 5, not eligible (backup copy)
//!
//! Backup copies insert the protection id before the final extension, which
//! adds a third period and keeps them out of the catalog.

use std::cmp::Ordering;
use std::fmt;

/// Sort key parsed from the start of a filename.
///
/// `Number` holds the digit run with leading zeros removed (`"0"` for an
/// all-zero run), so any length is kept exactly. Numbers compare by value;
/// `Unnumbered` compares greater than every number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ordinal {
    Number(String),
    Unnumbered,
}

impl Ordinal {
    pub fn from_number(n: u64) -> Self {
        Ordinal::Number(n.to_string())
    }

    /// Whether this lesson sits at or past the VIP threshold.
    ///
    /// Unnumbered lessons compare greater than any threshold.
    pub fn reaches(&self, threshold: u64) -> bool {
        *self >= Ordinal::from_number(threshold)
    }
}

impl Ord for Ordinal {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // Without leading zeros, a longer run is a larger value
            (Ordinal::Number(a), Ordinal::Number(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Ordinal::Number(_), Ordinal::Unnumbered) => Ordering::Less,
            (Ordinal::Unnumbered, Ordinal::Number(_)) => Ordering::Greater,
            (Ordinal::Unnumbered, Ordinal::Unnumbered) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Ordinal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `Number` prints its digits; `Unnumbered` prints `inf`.
impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ordinal::Number(digits) => f.write_str(digits),
            Ordinal::Unnumbered => f.write_str("inf"),
        }
    }
}

/// Parse the longest leading run of ASCII digits.
pub fn parse_ordinal(filename: &str) -> Ordinal {
    let end = filename
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(filename.len());
    let digits = &filename[..end];
    if digits.is_empty() {
        return Ordinal::Unnumbered;
    }
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        Ordinal::Number("0".to_string())
    } else {
        Ordinal::Number(significant.to_string())
    }
}

/// Lesson description files have exactly two periods in their name.
pub fn is_lesson_filename(filename: &str) -> bool {
    filename.matches('.').count() == 2
}

/// `05.advanced.md` + `abc123` → `05.advanced.abc123.md`.
///
/// A name without an extension gets the id appended: `notes` → `notes.abc123`.
pub fn backup_file_name(filename: &str, protection_id: &str) -> String {
    match filename.rfind('.') {
        Some(dot) if dot > 0 => {
            let (base, ext) = filename.split_at(dot);
            format!("{base}.{protection_id}{ext}")
        }
        _ => format!("{filename}.{protection_id}"),
    }
}
