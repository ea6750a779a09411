//! CLI output formatting for every command.
//!
//! Output is **information-centric, not file-centric**: each chapter leads
//! with its positional index and title, with source and manuscript paths
//! shown as indented context lines.
//!
//! # Output Format
//!
//! ## Nav
//!
//! ```text
//! Chapters
//! 001 Preface (sample)
//!     Source: preface/preface.md
//! 002 The NetworkX API (sample, notebook)
//!     Source: 01-introduction/02-networkx-intro.ipynb
//! ```
//!
//! ## Build
//!
//! ```text
//! 001 Preface → preface/preface.md/index.md
//! 002 The NetworkX API → 01-introduction/02-networkx-intro.md/index.md
//!     images/01-introduction_02-networkx-intro_md_3_0.png
//!
//! Manifest: manuscript/Book.txt
//! Wrote 2 chapters, 1 image
//! ```
//!
//! ## Diagnostics
//!
//! ```text
//! manuscript/01-intro/01-graphs.md/index.md:9: raw HTML: <em>left</em>
//! 1 issue found
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::BookConfig;
use crate::generate::BuildReport;
use crate::nav::BookPlan;
use crate::types::slash_path;
use crate::validate::Diagnostic;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

// ============================================================================
// Nav
// ============================================================================

/// Format the resolved chapter list.
///
/// Tags in parentheses mark sample chapters and notebooks.
pub fn format_chapter_list(plan: &BookPlan, config: &BookConfig) -> Vec<String> {
    let mut lines = vec!["Chapters".to_string()];

    for (i, chapter) in plan.chapters.iter().enumerate() {
        let mut tags = Vec::new();
        if config.is_sample(&chapter.title) {
            tags.push("sample");
        }
        if chapter.is_notebook() {
            tags.push("notebook");
        }
        let suffix = if tags.is_empty() {
            String::new()
        } else {
            format!(" ({})", tags.join(", "))
        };
        lines.push(format!("{} {}{}", format_index(i + 1), chapter.title, suffix));
        lines.push(format!("    Source: {}", slash_path(&chapter.path)));
    }

    if plan.chapters.is_empty() {
        lines.push("    (none)".to_string());
    }
    lines
}

/// Print the chapter list to stdout.
pub fn print_chapter_list(plan: &BookPlan, config: &BookConfig) {
    for line in format_chapter_list(plan, config) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format the build summary: one line per chapter with its manuscript
/// entry, extracted images indented underneath.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, chapter) in report.chapters.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            chapter.chapter.title,
            slash_path(&chapter.entry)
        ));
        for image in &chapter.images {
            lines.push(format!("    {}/{}", crate::markua::IMAGES_DIR, image));
        }
    }

    lines.push(String::new());
    lines.push(format!("Manifest: {}", report.manifest_path.display()));
    lines.push(format!(
        "Wrote {}, {}",
        plural(report.chapters.len(), "chapter"),
        plural(report.image_count(), "image")
    ));
    lines
}

/// Print the build summary to stdout.
pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Format validation findings as `<path>:<line>: <rule>: <text>`.
///
/// Paths are shown relative to `base` when they live under it.
pub fn format_diagnostics(diagnostics: &[Diagnostic], base: &Path) -> Vec<String> {
    if diagnostics.is_empty() {
        return vec!["No issues found".to_string()];
    }

    let mut lines: Vec<String> = diagnostics
        .iter()
        .map(|d| {
            let path = d.path.strip_prefix(base).unwrap_or(&d.path);
            format!(
                "{}:{}: {}: {}",
                slash_path(path),
                d.line_number,
                d.rule,
                d.line.trim()
            )
        })
        .collect();
    lines.push(format!("{} found", plural(diagnostics.len(), "issue")));
    lines
}

/// Print validation findings to stdout.
pub fn print_diagnostics(diagnostics: &[Diagnostic], base: &Path) {
    for line in format_diagnostics(diagnostics, base) {
        println!("{}", line);
    }
}
