//! Cell source rewrites applied before a notebook is executed.
//!
//! These are literal line and substring matches, not a parser. Each one
//! targets a known pattern in the book's notebooks whose output would not
//! survive conversion to Markua as-is:
//!
//! | Rewrite | Before | After |
//! |---|---|---|
//! | markdown tables | `df.head()` | `print(df.head().to_markdown())` |
//! | raw HTML | `render_html(obj)` | `obj` |
//! | commented snippets | `HTML(anim(...))` | `# HTML(anim(...))` |
//! | admonitions | `??? note "Title"` + indented body | `*Note:*` + dedented body |

use super::model::{CellType, Notebook};
use crate::config::NotebookConfig;

const INDENT: &str = "    ";

/// Rewrite settings, taken from the `[notebook]` config table.
#[derive(Debug, Clone, Default)]
pub struct Rewrites {
    /// Line suffixes whose value should print as a markdown table.
    pub markdown_calls: Vec<String>,
    /// Snippets commented out before execution.
    pub comment_out: Vec<String>,
}

impl Rewrites {
    pub fn from_config(config: &NotebookConfig) -> Self {
        Self {
            markdown_calls: config.markdown_calls.clone(),
            comment_out: config.comment_out.clone(),
        }
    }
}

/// Rewrite every cell in place. Code cells get the code rewrites, markdown
/// cells the admonition rewrite.
pub fn rewrite_cells(notebook: &mut Notebook, rewrites: &Rewrites) {
    for cell in &mut notebook.cells {
        let src = cell.source();
        let new_src = match cell.cell_type {
            CellType::Code => {
                let src = comment_out_snippets(src, &rewrites.comment_out);
                let src = replace_dataframe_with_markdown(&src, &rewrites.markdown_calls);
                replace_render_html_with_raw(&src)
            }
            CellType::Markdown => replace_admonition(src),
            CellType::Raw => continue,
        };
        cell.source.0 = new_src;
    }
}

/// Prefix every occurrence of each snippet with `# `.
pub fn comment_out_snippets(src: &str, snippets: &[String]) -> String {
    snippets
        .iter()
        .filter(|s| !s.is_empty())
        .fold(src.to_string(), |acc, snippet| {
            acc.replace(snippet.as_str(), &format!("# {snippet}"))
        })
}

/// Wrap lines ending with one of `suffixes` in `print(<line>.to_markdown())`.
///
/// Every line is emitted followed by `\n`.
pub fn replace_dataframe_with_markdown(src: &str, suffixes: &[String]) -> String {
    let mut out = String::with_capacity(src.len());
    for line in src.split('\n') {
        if suffixes.iter().any(|s| line.ends_with(s.as_str())) {
            out.push_str(&format!("print({line}.to_markdown())"));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

/// Unwrap `render_html(...)` calls that start a line.
///
/// `render_html` is removed, then the first and last character (the call's
/// parentheses) are dropped. Every line is emitted followed by `\n`.
pub fn replace_render_html_with_raw(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    for line in src.split('\n') {
        if line.starts_with("render_html") {
            let stripped = line.replace("render_html", "");
            let mut chars = stripped.chars();
            chars.next();
            chars.next_back();
            out.push_str(chars.as_str());
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

/// Turn a `???` admonition block into a plain note paragraph.
///
/// Identity unless `src` starts with `???`. Otherwise the `???` line becomes
/// `*Note:*`, each line loses one 4-space indent, and every line is emitted
/// followed by `\n`.
///
/// Only the leading indent goes: deeper indentation and four-space runs
/// inside a line are kept, so nested code blocks survive.
pub fn replace_admonition(src: &str) -> String {
    if !src.starts_with("???") {
        return src.to_string();
    }

    let mut out = String::with_capacity(src.len());
    for line in src.split('\n') {
        let line = if line.starts_with("???") {
            "*Note:*"
        } else {
            line.strip_prefix(INDENT).unwrap_or(line)
        };
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::model::MultilineString;

    fn calls() -> Vec<String> {
        NotebookConfig::default().markdown_calls
    }

    #[test]
    fn head_is_printed_as_markdown() {
        assert_eq!(
            replace_dataframe_with_markdown("df.head()", &calls()),
            "print(df.head().to_markdown())\n"
        );
    }

    #[test]
    fn only_matching_lines_are_wrapped() {
        assert_eq!(
            replace_dataframe_with_markdown("another_thing\ndf2.head()", &calls()),
            "another_thing\nprint(df2.head().to_markdown())\n"
        );
    }

    #[test]
    fn describe_and_custom_calls_are_wrapped() {
        let out = replace_dataframe_with_markdown(
            "stats.describe()\nfind_connected_persons(G, 'p2', 'c10')",
            &calls(),
        );
        assert!(out.contains("print(stats.describe().to_markdown())"));
        assert!(out.contains("print(find_connected_persons(G, 'p2', 'c10').to_markdown())"));
    }

    #[test]
    fn head_with_arguments_is_not_wrapped() {
        let out = replace_dataframe_with_markdown("df.head(10)", &calls());
        assert_eq!(out, "df.head(10)\n");
    }

    #[test]
    fn render_html_wrapper_is_stripped() {
        assert_eq!(
            replace_render_html_with_raw("render_html(viz)\nx = 1"),
            "viz\nx = 1\n"
        );
    }

    #[test]
    fn indented_render_html_is_untouched() {
        assert_eq!(
            replace_render_html_with_raw("    render_html(viz)"),
            "    render_html(viz)\n"
        );
    }

    #[test]
    fn bare_render_html_becomes_empty() {
        assert_eq!(replace_render_html_with_raw("render_html"), "\n");
    }

    #[test]
    fn snippet_is_commented_out() {
        let snippets = NotebookConfig::default().comment_out;
        let src = "anim = make()\nHTML(anim(G2, msg, n_frames=4).to_html5_video())";
        assert_eq!(
            comment_out_snippets(src, &snippets),
            "anim = make()\n# HTML(anim(G2, msg, n_frames=4).to_html5_video())"
        );
    }

    #[test]
    fn admonition_identity_without_marker() {
        let text = "Plain paragraph\n    indented code";
        assert_eq!(replace_admonition(text), text);
    }

    #[test]
    fn admonition_marker_not_at_start_is_identity() {
        let text = "Intro\n??? note \"Later\"\n    body";
        assert_eq!(replace_admonition(text), text);
    }

    #[test]
    fn admonition_becomes_note() {
        let text = "??? note \"Geospatial Viz\"\n\n    As the creator of `nxviz`,\n    I would recommend pysal.\n";
        assert_eq!(
            replace_admonition(text),
            "*Note:*\n\nAs the creator of `nxviz`,\nI would recommend pysal.\n\n"
        );
    }

    #[test]
    fn admonition_strips_exactly_one_indent() {
        let out = replace_admonition("??? tip\n        nested code");
        assert_eq!(out, "*Note:*\n    nested code\n");
    }

    #[test]
    fn admonition_keeps_inner_four_space_runs() {
        let out = replace_admonition("??? tip\n    x =    1");
        assert_eq!(out, "*Note:*\nx =    1\n");
    }

    #[test]
    fn rewrite_cells_targets_cell_types() {
        let mut nb: Notebook = serde_json::from_value(serde_json::json!({
            "cells": [
                {"cell_type": "markdown", "metadata": {}, "source": "??? note\n    body"},
                {"cell_type": "code", "metadata": {}, "outputs": [], "execution_count": null,
                 "source": "df.head()"},
                {"cell_type": "raw", "metadata": {}, "source": "df.head()"},
                {"cell_type": "markdown", "metadata": {}, "source": "See df.head()"}
            ],
            "metadata": {},
            "nbformat": 4,
            "nbformat_minor": 5
        }))
        .unwrap();

        rewrite_cells(&mut nb, &Rewrites::from_config(&NotebookConfig::default()));

        assert_eq!(nb.cells[0].source, MultilineString::from("*Note:*\nbody\n"));
        assert!(nb.cells[1].source().starts_with("print(df.head().to_markdown())\n"));
        assert_eq!(nb.cells[2].source(), "df.head()");
        assert_eq!(nb.cells[3].source(), "See df.head()");
    }
}
