//! Manuscript generation.
//!
//! Stage 2 of the build. Takes the ordered chapter list from [`nav`](crate::nav)
//! and writes a Leanpub manuscript:
//!
//! ```text
//! manuscript/
//! ├── Book.txt                               # One chapter file per line, in order
//! ├── images/
//! │   └── 01-introduction_02-networkx-intro_md_3_0.png
//! ├── preface/preface.md/
//! │   └── index.md
//! └── 01-introduction/02-networkx-intro.md/
//!     └── index.md
//! ```
//!
//! Each chapter is loaded (notebooks rendered through
//! [`notebook`](crate::notebook), anything else read as plain markdown),
//! post-processed by [`markua`](crate::markua), then written. The first
//! failure aborts the run; nothing is retried.

use crate::config::{self, BookConfig};
use crate::markua::{self, IMAGES_DIR};
use crate::nav::{self, BookPlan, NavError};
use crate::notebook::{self, ExecuteParams, NotebookBackend, NotebookError, Rewrites};
use crate::types::{CHAPTER_FILE, Chapter, RenderedChapter, slash_path};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Manifest file the platform reads chapter order from.
pub const MANIFEST_FILE: &str = "Book.txt";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Navigation error: {0}")]
    Nav(#[from] NavError),
    #[error("Failed to read chapter source {path}: {source}")]
    Source {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Notebook {path}: {source}")]
    Notebook {
        path: PathBuf,
        source: NotebookError,
    },
}

/// Build-time switches from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Run notebooks before export. When false, stored outputs are used.
    pub execute: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { execute: true }
    }
}

/// What was written for one chapter.
#[derive(Debug, Clone)]
pub struct ChapterReport {
    pub chapter: Chapter,
    /// Manifest entry, relative to the manuscript root.
    pub entry: PathBuf,
    /// Image file names written into `images/`.
    pub images: Vec<String>,
}

/// Result of a full manuscript build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub chapters: Vec<ChapterReport>,
}

impl BuildReport {
    /// Absolute paths of every chapter file written, in manifest order.
    pub fn written_files(&self) -> Vec<PathBuf> {
        self.chapters
            .iter()
            .map(|c| self.output_dir.join(&c.entry))
            .collect()
    }

    pub fn image_count(&self) -> usize {
        self.chapters.iter().map(|c| c.images.len()).sum()
    }
}

/// Load config and nav for a project, then build its manuscript.
pub fn build(
    project_root: &Path,
    output_dir: &Path,
    backend: &dyn NotebookBackend,
    options: BuildOptions,
) -> Result<BuildReport, GenerateError> {
    let config = config::load_config(project_root)?;
    let plan = nav::resolve_chapters(project_root, &config)?;
    build_manuscript(&plan, output_dir, &config, backend, options)
}

/// Render, post-process and write every chapter, then the manifest.
pub fn build_manuscript(
    plan: &BookPlan,
    output_dir: &Path,
    config: &BookConfig,
    backend: &dyn NotebookBackend,
    options: BuildOptions,
) -> Result<BuildReport, GenerateError> {
    let images_dir = output_dir.join(IMAGES_DIR);
    fs::create_dir_all(&images_dir)?;

    let executor = options.execute.then_some(backend);
    let mut chapters = Vec::with_capacity(plan.chapters.len());

    for chapter in &plan.chapters {
        tracing::info!(chapter = %chapter.title, path = %chapter.path.display(), "Processing chapter");

        let rendered = render_chapter(chapter, &plan.docs_root, config, executor)?;
        let processed = markua::postprocess(chapter, rendered, config);
        chapters.push(write_chapter(output_dir, chapter, &processed)?);
    }

    let entries: Vec<PathBuf> = chapters.iter().map(|c| c.entry.clone()).collect();
    let manifest_path = write_manifest(output_dir, &entries)?;

    Ok(BuildReport {
        output_dir: output_dir.to_path_buf(),
        manifest_path,
        chapters,
    })
}

/// Load one chapter's source and render it to markdown.
///
/// Notebooks run through `backend` when one is given; markdown pages are
/// read verbatim and carry no resources.
pub fn render_chapter(
    chapter: &Chapter,
    docs_root: &Path,
    config: &BookConfig,
    backend: Option<&dyn NotebookBackend>,
) -> Result<RenderedChapter, GenerateError> {
    let source_path = docs_root.join(&chapter.path);

    if !chapter.is_notebook() {
        let text = fs::read_to_string(&source_path).map_err(|source| GenerateError::Source {
            path: source_path.clone(),
            source,
        })?;
        return Ok(RenderedChapter::text(text));
    }

    let notebook_err = |source: NotebookError| GenerateError::Notebook {
        path: source_path.clone(),
        source,
    };
    let nb = notebook::read_notebook(&source_path).map_err(notebook_err)?;
    let params = ExecuteParams {
        kernel: config.notebook.kernel.clone(),
        timeout_secs: config.notebook.timeout_secs,
        working_dir: source_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| docs_root.to_path_buf()),
    };
    let rewrites = Rewrites::from_config(&config.notebook);

    notebook::nb_to_markdown(nb, backend.map(|b| (b, &params)), &rewrites).map_err(notebook_err)
}

/// Write a processed chapter and its images.
pub fn write_chapter(
    output_dir: &Path,
    chapter: &Chapter,
    processed: &RenderedChapter,
) -> Result<ChapterReport, GenerateError> {
    let chapter_dir = output_dir.join(chapter.output_dir());
    fs::create_dir_all(&chapter_dir)?;
    fs::write(chapter_dir.join(CHAPTER_FILE), &processed.body)?;

    let images_dir = output_dir.join(IMAGES_DIR);
    let mut images = Vec::with_capacity(processed.outputs.len());
    for (name, bytes) in &processed.outputs {
        tracing::debug!(image = %name, "Writing image");
        fs::write(images_dir.join(name), bytes)?;
        images.push(name.clone());
    }

    Ok(ChapterReport {
        chapter: chapter.clone(),
        entry: chapter.manifest_entry(),
        images,
    })
}

/// Write `Book.txt`: one entry per line, `/`-separated, in chapter order.
pub fn write_manifest(output_dir: &Path, entries: &[PathBuf]) -> std::io::Result<PathBuf> {
    let book_txt: String = entries
        .iter()
        .map(|e| format!("{}\n", slash_path(e)))
        .collect();
    let manifest_path = output_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, book_txt)?;
    Ok(manifest_path)
}
