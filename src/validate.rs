//! Diagnostic scan of written chapter files.
//!
//! After the manuscript is written, every chapter file is re-read line by
//! line looking for markup Markua does not support. Findings are reported,
//! never raised: a flagged manuscript still builds and the exit code stays
//! zero. The patterns are literal:
//!
//! | Rule | Trigger |
//! |---|---|
//! | [`Rule::StrayTableIndent`] | line starts with `"    \|"` |
//! | [`Rule::UnconvertedAdmonition`] | line starts with `???` |
//! | [`Rule::RawHtml`] | line contains one of [`HTML_TAG_OPENERS`] |
//! | [`Rule::MalformedTable`] | line contains `" '\|   \|"` |

use crate::types::CHAPTER_FILE;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Raw HTML openers that Markua renders as literal text.
pub const HTML_TAG_OPENERS: &[&str] = &["<li", "<ul", "<ol", "<span", "<p", "<em"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    StrayTableIndent,
    UnconvertedAdmonition,
    RawHtml,
    MalformedTable,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rule::StrayTableIndent => "stray table indent",
            Rule::UnconvertedAdmonition => "unconverted admonition",
            Rule::RawHtml => "raw HTML",
            Rule::MalformedTable => "malformed table",
        };
        f.write_str(label)
    }
}

/// One flagged line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: PathBuf,
    /// 1-based line number.
    pub line_number: usize,
    pub line: String,
    pub rule: Rule,
}

/// Whether a line contains any of the unsupported HTML openers.
pub fn has_html(line: &str) -> bool {
    HTML_TAG_OPENERS.iter().any(|tag| line.contains(tag))
}

/// Every rule a single line trips, in rule order.
pub fn check_line(line: &str) -> Vec<Rule> {
    let mut rules = Vec::new();
    if line.starts_with("    |") {
        rules.push(Rule::StrayTableIndent);
    }
    if line.starts_with("???") {
        rules.push(Rule::UnconvertedAdmonition);
    }
    if has_html(line) {
        rules.push(Rule::RawHtml);
    }
    if line.contains(" '|   |") {
        rules.push(Rule::MalformedTable);
    }
    rules
}

/// Check text that was read from `path`.
pub fn check_text(path: &Path, text: &str) -> Vec<Diagnostic> {
    text.lines()
        .enumerate()
        .flat_map(|(i, line)| {
            check_line(line).into_iter().map(move |rule| Diagnostic {
                path: path.to_path_buf(),
                line_number: i + 1,
                line: line.to_string(),
                rule,
            })
        })
        .collect()
}

/// Re-read a written file and check every line.
pub fn validate_file(path: &Path) -> std::io::Result<Vec<Diagnostic>> {
    let text = fs::read_to_string(path)?;
    Ok(check_text(path, &text))
}

/// Check a list of files in order.
pub fn validate_files(paths: &[PathBuf]) -> std::io::Result<Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    for path in paths {
        diagnostics.extend(validate_file(path)?);
    }
    Ok(diagnostics)
}

/// Check every chapter file under an existing manuscript directory.
///
/// Files are visited in sorted path order.
pub fn validate_manuscript(dir: &Path) -> std::io::Result<Vec<Diagnostic>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::other)?;
        if entry.file_type().is_file() && entry.file_name() == CHAPTER_FILE {
            files.push(entry.into_path());
        }
    }
    validate_files(&files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn clean_line_has_no_findings() {
        assert!(check_line("| a | b |").is_empty());
        assert!(check_line("Plain prose with a < b comparison").is_empty());
    }

    #[test]
    fn stray_table_indent_only_at_line_start() {
        assert_eq!(check_line("    |a|b|"), vec![Rule::StrayTableIndent]);
        assert!(check_line("x    |a|").is_empty());
    }

    #[test]
    fn unconverted_admonition_flagged() {
        assert_eq!(check_line("??? note \"Tip\""), vec![Rule::UnconvertedAdmonition]);
    }

    #[test]
    fn html_openers_flagged() {
        for line in ["<ul>", "text <span class=x>", "<p>para</p>", "<em>hi</em>", "<ol>", "<li>"] {
            assert_eq!(check_line(line), vec![Rule::RawHtml], "line: {line}");
        }
        // <pre> starts with <p too
        assert!(has_html("<pre>"));
        assert!(!has_html("<div>"));
    }

    #[test]
    fn malformed_table_flagged() {
        assert_eq!(check_line("x '|   | y"), vec![Rule::MalformedTable]);
    }

    #[test]
    fn line_can_trip_several_rules() {
        assert_eq!(
            check_line("    | <span>x</span> '|   |"),
            vec![Rule::StrayTableIndent, Rule::RawHtml, Rule::MalformedTable]
        );
    }

    #[test]
    fn check_text_reports_line_numbers() {
        let diags = check_text(Path::new("a/index.md"), "ok\n<ul>\nok\n??? warn\n");
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].line_number, 2);
        assert_eq!(diags[0].rule, Rule::RawHtml);
        assert_eq!(diags[1].line_number, 4);
        assert_eq!(diags[1].line, "??? warn");
    }

    #[test]
    fn validate_file_missing_is_error() {
        assert!(validate_file(Path::new("/nonexistent/index.md")).is_err());
    }

    #[test]
    fn validate_manuscript_walks_chapter_files() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("01-intro/a.md");
        let b = tmp.path().join("02-more/b.md");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("index.md"), "# A\n\n<p>leftover</p>\n").unwrap();
        fs::write(b.join("index.md"), "# B\n\n    |x|\n").unwrap();
        // Not a chapter file, never checked
        fs::write(tmp.path().join("Book.txt"), "<ul>\n").unwrap();

        let diags = validate_manuscript(tmp.path()).unwrap();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].path, a.join("index.md"));
        assert_eq!(diags[0].rule, Rule::RawHtml);
        assert_eq!(diags[1].path, b.join("index.md"));
        assert_eq!(diags[1].rule, Rule::StrayTableIndent);
    }
}
