//! `jupyter nbconvert` execution backend.
//!
//! The notebook is piped in as JSON and the executed notebook read back
//! from stdout, so nothing is written next to the sources:
//!
//! ```text
//! jupyter nbconvert --to notebook --execute --stdin --stdout \
//!     --ExecutePreprocessor.kernel_name=<kernel> \
//!     --ExecutePreprocessor.timeout=<secs>
//! ```
//!
//! A cell error, a timeout, or a missing kernel makes `nbconvert` exit
//! non-zero; its stderr becomes the [`NotebookError::ExecutionFailed`]
//! message.

use super::backend::{ExecuteParams, NotebookBackend, NotebookError};
use super::model::Notebook;
use std::io::Write;
use std::process::{Command, Stdio};

#[derive(Debug, Clone)]
pub struct JupyterBackend {
    program: String,
}

impl Default for JupyterBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl JupyterBackend {
    pub fn new() -> Self {
        Self::with_program("jupyter")
    }

    /// Use a specific `jupyter` executable (e.g. one inside a virtualenv).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments passed to the `jupyter` executable.
    pub fn command_args(params: &ExecuteParams) -> Vec<String> {
        vec![
            "nbconvert".to_string(),
            "--to".to_string(),
            "notebook".to_string(),
            "--execute".to_string(),
            "--stdin".to_string(),
            "--stdout".to_string(),
            format!("--ExecutePreprocessor.kernel_name={}", params.kernel),
            format!("--ExecutePreprocessor.timeout={}", params.timeout_secs),
        ]
    }
}

impl NotebookBackend for JupyterBackend {
    fn execute(
        &self,
        notebook: &Notebook,
        params: &ExecuteParams,
    ) -> Result<Notebook, NotebookError> {
        let input = serde_json::to_vec(notebook)?;

        let mut child = Command::new(&self.program)
            .args(Self::command_args(params))
            .current_dir(&params.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| NotebookError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from a separate thread so a chatty stderr can't block us
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| NotebookError::ExecutionFailed("stdin not captured".into()))?;
        let writer = std::thread::spawn(move || stdin.write_all(&input));

        let output = child.wait_with_output()?;
        let write_result = writer
            .join()
            .map_err(|_| NotebookError::ExecutionFailed("stdin writer panicked".into()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NotebookError::ExecutionFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        write_result?;

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}
