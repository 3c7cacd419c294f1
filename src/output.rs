//! CLI output formatting for all commands.
//!
//! Output is grouped by content type and leads with each document's key; file
//! paths are secondary, shown on indented `Source:` lines. Warnings about
//! individual files go through `tracing` as they happen; these functions only
//! summarize.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! page
//! 001 About (cached)
//!     Source: page/About.docx
//! post
//! 001 Hello World (new)
//!     Source: post/Hello World.docx
//! 002 Draft (failed)
//!     Source: post/Draft.docx
//!     Error: unmapped paragraph style 'Sidebar'
//!
//! Misplaced
//!     stray.docx
//!
//! Scanned 1 new, 1 cached, 1 failed (3 total)
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html (1 post)
//! post
//! 001 Hello World → post/hello-world.html
//!
//! Skipped (template missing)
//!     About (page.html)
//!
//! Assets → public/assets/ (3 files)
//! Generated 1 page
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::context::PUBLIC_ASSETS_DIR;
use crate::generate::GenerateReport;
use crate::project::{ClearReport, InitReport};
use crate::scan::{Outcome, ScanReport};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn outcome_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Added => "new",
        Outcome::Reused => "cached",
        Outcome::Reparsed => "changed",
        Outcome::Failed(_) => "failed",
    }
}

// ============================================================================
// scan
// ============================================================================

/// Format the scan summary: documents per type, misplaced files, totals.
pub fn format_scan_output(report: &ScanReport) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_type: Option<&str> = None;
    let mut position = 0;

    for doc in &report.documents {
        if current_type != Some(doc.doc_type.as_str()) {
            lines.push(doc.doc_type.clone());
            current_type = Some(doc.doc_type.as_str());
            position = 0;
        }
        position += 1;
        lines.push(format!(
            "{} {} ({})",
            format_index(position),
            doc.key,
            outcome_label(&doc.outcome)
        ));
        lines.push(format!("{}Source: {}", indent(1), display_path(&doc.path)));
        if let Outcome::Failed(reason) = &doc.outcome {
            lines.push(format!("{}Error: {}", indent(1), reason));
        }
    }

    if !report.misplaced.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Misplaced".to_string());
        for path in &report.misplaced {
            lines.push(format!("{}{}", indent(1), display_path(path)));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!("Scanned {}", report.stats));
    lines
}

pub fn print_scan_output(report: &ScanReport) {
    for line in format_scan_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// generate
// ============================================================================

/// Format the generate summary: index, pages per type, skips, assets.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(index) = &report.index {
        lines.push(format!(
            "Home → {} ({})",
            display_path(index),
            plural(report.listed, "post")
        ));
    }

    let mut current_type: Option<&str> = None;
    let mut position = 0;
    for page in &report.pages {
        if current_type != Some(page.doc_type.as_str()) {
            lines.push(page.doc_type.clone());
            current_type = Some(page.doc_type.as_str());
            position = 0;
        }
        position += 1;
        lines.push(format!(
            "{} {} → {}",
            format_index(position),
            page.key,
            display_path(&page.path)
        ));
    }

    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped (template missing)".to_string());
        for skipped in &report.skipped {
            lines.push(format!(
                "{}{} ({}.html)",
                indent(1),
                skipped.key,
                skipped.template
            ));
        }
    }

    lines.push(String::new());
    match report.assets_copied {
        Some(n) => lines.push(format!("Assets → {}/ ({})", PUBLIC_ASSETS_DIR, plural(n, "file"))),
        None => lines.push("Assets: none in theme".to_string()),
    }
    lines.push(format!("Generated {}", plural(report.pages.len(), "page")));
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// init / clear / clearcontent
// ============================================================================

pub fn format_init_output(report: &InitReport) -> Vec<String> {
    let mut lines = Vec::new();
    if report.config_written {
        lines.push("Wrote config.toml".to_string());
    } else {
        lines.push("Found config.toml".to_string());
    }
    for dir in &report.created {
        lines.push(format!("{}created {}/", indent(1), display_path(dir)));
    }
    for dir in &report.existing {
        lines.push(format!("{}exists  {}/", indent(1), display_path(dir)));
    }
    lines.push("Project ready. Add documents under the input directory's post/ or page/.".to_string());
    lines
}

pub fn print_init_output(report: &InitReport) {
    for line in format_init_output(report) {
        println!("{}", line);
    }
}

pub fn format_clear_output(report: &ClearReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .removed
        .iter()
        .map(|p| format!("removed {}", display_path(p)))
        .collect();
    lines.extend(
        report
            .recreated
            .iter()
            .map(|p| format!("recreated {}/", display_path(p))),
    );
    if lines.is_empty() {
        lines.push("Nothing to remove".to_string());
    }
    lines
}

pub fn print_clear_output(report: &ClearReport) {
    for line in format_clear_output(report) {
        println!("{}", line);
    }
}
