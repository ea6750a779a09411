//! Executed notebook → markdown.
//!
//! Layout mirrors what Jupyter's own markdown export produces, which is
//! what the Markua post-processing expects to find:
//!
//! ~~~text
//! Markdown cell text, verbatim.
//!
//! ```python
//! df.head()
//! ```
//!
//!     stream and text/plain output, indented four spaces
//!
//! ![png](output_3_0.png)
//! ~~~
//!
//! Rich outputs render the first MIME type found in [`DISPLAY_PRIORITY`].
//! Images are pulled out into the resource map under
//! `output_<cell>_<index>.<ext>` and referenced by that name.

use super::backend::NotebookError;
use super::model::{Cell, CellType, MimeBundle, Notebook, Output, mime_text};
use crate::types::RenderedChapter;
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::Regex;
use std::sync::LazyLock;

/// MIME types in the order they are preferred for display.
pub const DISPLAY_PRIORITY: &[&str] = &[
    "text/html",
    "text/markdown",
    "image/svg+xml",
    "text/latex",
    "image/png",
    "image/jpeg",
    "text/plain",
];

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap());

/// Render a notebook to markdown, extracting image outputs.
pub fn export_markdown(notebook: &Notebook) -> Result<RenderedChapter, NotebookError> {
    let language = notebook.language();
    let mut rendered = RenderedChapter::default();
    let mut blocks: Vec<String> = Vec::new();

    for (cell_index, cell) in notebook.cells.iter().enumerate() {
        match cell.cell_type {
            CellType::Markdown | CellType::Raw => {
                let text = cell.source().trim_end_matches('\n');
                if !text.is_empty() {
                    blocks.push(text.to_string());
                }
            }
            CellType::Code => {
                export_code_cell(cell, cell_index, language, &mut blocks, &mut rendered)?;
            }
        }
    }

    rendered.body = blocks.join("\n\n");
    rendered.body.push('\n');
    Ok(rendered)
}

fn export_code_cell(
    cell: &Cell,
    cell_index: usize,
    language: &str,
    blocks: &mut Vec<String>,
    rendered: &mut RenderedChapter,
) -> Result<(), NotebookError> {
    let code = cell.source().trim_end_matches('\n');
    if !code.is_empty() {
        blocks.push(format!("```{language}\n{code}\n```"));
    }

    for (output_index, output) in cell.outputs().iter().enumerate() {
        let block = match output {
            Output::Stream { text, .. } => Some(indent(&text.0)),
            Output::Error { traceback, .. } => {
                let joined = traceback.join("\n");
                Some(indent(&ANSI_ESCAPE.replace_all(&joined, "")))
            }
            Output::DisplayData { data, .. } | Output::ExecuteResult { data, .. } => {
                let name = format!("output_{cell_index}_{output_index}");
                export_bundle(data, &name, rendered)?
            }
        };
        if let Some(block) = block.filter(|b| !b.trim().is_empty()) {
            blocks.push(block);
        }
    }
    Ok(())
}

/// Render the preferred entry of a MIME bundle. Images are stored in
/// `rendered.outputs` under `<stem>.<ext>`.
fn export_bundle(
    data: &MimeBundle,
    stem: &str,
    rendered: &mut RenderedChapter,
) -> Result<Option<String>, NotebookError> {
    let Some((mime, value)) = DISPLAY_PRIORITY
        .iter()
        .find_map(|mime| data.get(*mime).map(|v| (*mime, v)))
    else {
        return Ok(None);
    };
    let Some(text) = mime_text(value) else {
        return Ok(None);
    };

    let block = match mime {
        "text/html" | "text/markdown" | "text/latex" => text.trim_end_matches('\n').to_string(),
        "text/plain" => indent(&text),
        "image/svg+xml" => {
            let name = format!("{stem}.svg");
            rendered.outputs.insert(name.clone(), text.into_bytes());
            format!("![svg]({name})")
        }
        _ => {
            // image/png, image/jpeg
            let (kind, ext) = if mime == "image/png" {
                ("png", "png")
            } else {
                ("jpeg", "jpg")
            };
            let name = format!("{stem}.{ext}");
            let compact: String = text.split_whitespace().collect();
            let bytes = BASE64_STANDARD
                .decode(compact)
                .map_err(|source| NotebookError::Base64 {
                    name: name.clone(),
                    source,
                })?;
            rendered.outputs.insert(name.clone(), bytes);
            format!("![{kind}]({name})")
        }
    };
    Ok(Some(block))
}

/// Indent every non-empty line by four spaces.
fn indent(text: &str) -> String {
    text.trim_end_matches('\n')
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("    {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
