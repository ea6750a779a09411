//! Shared types passed between pipeline stages.
//!
//! These live for a single run: the chapter list is built from the nav,
//! each chapter is rendered, post-processed and written, then dropped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File every chapter is written to inside its own directory.
pub const CHAPTER_FILE: &str = "index.md";

/// One entry of the flattened navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Title as written in the nav (also the chapter heading).
    pub title: String,
    /// Source path relative to the docs directory.
    pub path: PathBuf,
}

impl Chapter {
    pub fn new(title: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
        }
    }

    /// Whether the source is a Jupyter notebook.
    pub fn is_notebook(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("ipynb"))
    }

    /// Chapter directory inside the manuscript: the source path with a `.md`
    /// suffix (`01-intro/graphs.ipynb` → `01-intro/graphs.md`).
    pub fn output_dir(&self) -> PathBuf {
        self.path.with_extension("md")
    }

    /// Manifest entry for this chapter, relative to the manuscript root.
    pub fn manifest_entry(&self) -> PathBuf {
        self.output_dir().join(CHAPTER_FILE)
    }
}

/// A chapter body plus the binary resources extracted while rendering it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedChapter {
    pub body: String,
    /// Resource name (`output_3_0.png`) → bytes.
    pub outputs: BTreeMap<String, Vec<u8>>,
}

impl RenderedChapter {
    /// A markdown chapter: text only, no resources.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            outputs: BTreeMap::new(),
        }
    }
}

/// Render a path with forward slashes regardless of platform.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
