//! Notebook rendering: rewrite → execute → strip counts → export.
//!
//! The module is split into:
//! - **Model**: nbformat v4 types ([`Notebook`], [`Cell`], [`Output`])
//! - **Rewrite**: literal cell-source rewrites applied before execution
//! - **Backend**: [`NotebookBackend`] trait + [`JupyterBackend`]
//! - **Export**: executed notebook → markdown body + extracted images

pub mod backend;
pub mod export;
pub mod jupyter;
pub mod model;
pub mod rewrite;

pub use backend::{ExecuteParams, NotebookBackend, NotebookError};
pub use export::export_markdown;
pub use jupyter::JupyterBackend;
pub use model::{Cell, CellType, Notebook, Output, strip_execution_count};
pub use rewrite::Rewrites;

use crate::types::RenderedChapter;
use std::path::Path;

/// Read a notebook file.
pub fn read_notebook(path: &Path) -> Result<Notebook, NotebookError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Render a notebook to markdown.
///
/// With a backend, cells are rewritten and then executed before export.
/// Without one, the notebook is exported from its stored outputs and only
/// the markdown-cell rewrites apply, since code changes would have no
/// effect without a run.
pub fn nb_to_markdown(
    mut notebook: Notebook,
    backend: Option<(&dyn NotebookBackend, &ExecuteParams)>,
    rewrites: &Rewrites,
) -> Result<RenderedChapter, NotebookError> {
    match backend {
        Some((backend, params)) => {
            rewrite::rewrite_cells(&mut notebook, rewrites);
            notebook = backend.execute(&notebook, params)?;
        }
        None => {
            for cell in &mut notebook.cells {
                if cell.cell_type == CellType::Markdown {
                    cell.source.0 = rewrite::replace_admonition(cell.source());
                }
            }
        }
    }

    strip_execution_count(&mut notebook);
    export_markdown(&notebook)
}
