//! CLI output formatting.
//!
//! Output leads with what the catalog will say, positional index and title,
//! with filesystem details as indented context lines:
//!
//! ```text
//! Lessons
//! 001 Welcome
//!     Source: 01.intro.md
//! 002 Deep Dive [vip]
//!     Source: 05.advanced.md
//!     Backup: 05.advanced.abc123.md (created)
//!
//! Skipped
//!     board.png
//!
//! Catalog: 2 lessons, 1 vip → ../coursedetail.C0002.json
//! ```
//!
//! `format_*` functions return lines and do no I/O; `print_*` wrappers write
//! them to stdout.

use std::path::Path;

use crate::scan::ScanReport;

fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Lessons and skipped files. `dry_run` labels VIP lessons that a build
/// would protect instead of showing protection results.
pub fn format_scan_report(report: &ScanReport, dry_run: bool) -> Vec<String> {
    let mut lines = vec!["Lessons".to_string()];

    if report.lessons.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }

    for (i, lesson) in report.lessons.iter().enumerate() {
        let tag = if lesson.entry.is_vip { " [vip]" } else { "" };
        lines.push(format!("{} {}{}", format_index(i + 1), lesson.title, tag));
        lines.push(format!("{}Source: {}", indent(1), lesson.file.filename));
        match &lesson.protection {
            Some(outcome) => lines.push(format!(
                "{}Backup: {} ({})",
                indent(1),
                file_name(outcome.backup()),
                outcome.label()
            )),
            None if dry_run && lesson.entry.is_vip => {
                lines.push(format!("{}Protect: on build", indent(1)))
            }
            None => {}
        }
    }

    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for name in &report.skipped {
            lines.push(format!("{}{}", indent(1), name));
        }
    }

    lines
}

pub fn format_export(report: &ScanReport, output: &Path) -> String {
    let count = report.lessons.len();
    let noun = if count == 1 { "lesson" } else { "lessons" };
    format!(
        "Catalog: {} {}, {} vip → {}",
        count,
        noun,
        report.vip_count(),
        output.display()
    )
}

pub fn print_scan_report(report: &ScanReport, dry_run: bool) {
    for line in format_scan_report(report, dry_run) {
        println!("{}", line);
    }
}

pub fn print_export(report: &ScanReport, output: &Path) {
    println!();
    println!("{}", format_export(report, output));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::scan;
    use crate::test_helpers::MemoryStore;

    fn report(dry_run: bool) -> ScanReport {
        let store = MemoryStore::new();
        store.add_file("/c/01.intro.md", "# Welcome\n");
        store.add_file("/c/05.advanced.md", "# Deep Dive\n");
        store.add_file("/c/board.png", "png");
        let settings = Settings::new("course", "abc123", 5);
        if dry_run {
            scan::plan(&store, Path::new("/c"), &settings).unwrap()
        } else {
            scan::scan(&store, Path::new("/c"), &settings).unwrap()
        }
    }

    #[test]
    fn build_report_lines() {
        let lines = format_scan_report(&report(false), false);
        assert_eq!(
            lines,
            vec![
                "Lessons",
                "001 Welcome",
                "    Source: 01.intro.md",
                "002 Deep Dive [vip]",
                "    Source: 05.advanced.md",
                "    Backup: 05.advanced.abc123.md (created)",
                "",
                "Skipped",
                "    board.png",
            ]
        );
    }

    #[test]
    fn dry_run_marks_pending_protection() {
        let lines = format_scan_report(&report(true), true);
        assert!(lines.contains(&"    Protect: on build".to_string()));
        assert!(!lines.iter().any(|l| l.contains("Backup:")));
    }

    #[test]
    fn empty_report_says_none() {
        let lines = format_scan_report(&ScanReport::default(), false);
        assert_eq!(lines, vec!["Lessons", "    (none)"]);
    }

    #[test]
    fn export_summary() {
        let line = format_export(&report(false), Path::new("out/course.json"));
        assert_eq!(line, "Catalog: 2 lessons, 1 vip → out/course.json");
    }
}
