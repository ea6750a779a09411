//! Notebook execution backend trait and shared types.
//!
//! The [`NotebookBackend`] trait has one operation: run every cell of a
//! notebook against a kernel and hand back the notebook with its outputs
//! filled in. The production implementation is
//! [`JupyterBackend`](super::jupyter::JupyterBackend), which shells out to
//! `jupyter nbconvert`.

use super::model::Notebook;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotebookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Notebook JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("Notebook execution failed: {0}")]
    ExecutionFailed(String),
    #[error("Invalid base64 in {name}: {source}")]
    Base64 {
        name: String,
        source: base64::DecodeError,
    },
}

/// Parameters for one notebook execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteParams {
    /// Kernel name as registered with Jupyter.
    pub kernel: String,
    /// Per-cell timeout in seconds.
    pub timeout_secs: u64,
    /// Directory the kernel starts in, so relative data paths resolve the
    /// same way they do when the notebook is opened by hand.
    pub working_dir: PathBuf,
}

/// Trait for notebook execution backends.
pub trait NotebookBackend {
    /// Execute all cells and return the executed notebook.
    fn execute(&self, notebook: &Notebook, params: &ExecuteParams)
    -> Result<Notebook, NotebookError>;
}
