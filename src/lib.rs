//! # Bookbuilder
//!
//! Turns an MkDocs book (markdown pages and Jupyter notebooks ordered by the
//! `nav` tree of `mkdocs.yml`) into a Leanpub manuscript written in Markua.
//!
//! # Architecture: Staged Pipeline
//!
//! ```text
//! 1. Nav        mkdocs.yml  →  ordered chapter list   (preface, exclusions)
//! 2. Render     chapter     →  markdown + images      (notebooks executed)
//! 3. Markua     markdown    →  Markua body            (heading, math, tables)
//! 4. Write      chapters    →  manuscript/ + Book.txt
//! 5. Validate   manuscript  →  diagnostics            (never fails the build)
//! ```
//!
//! Every stage is a function of the previous stage's output, so each can be
//! tested without the others. Notebook execution sits behind the
//! [`notebook::NotebookBackend`] trait; tests use a recording mock instead
//! of a live Jupyter kernel.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `bookbuilder.toml` loading: stock defaults merged with the project file, then validated |
//! | [`nav`] | Stage 1: parses `mkdocs.yml` and flattens its nav into chapters |
//! | [`notebook`] | Stage 2: nbformat model, pre-execution rewrites, Jupyter backend, markdown export |
//! | [`markua`] | Stage 3: Markua post-processing of every chapter body |
//! | [`generate`] | Stage 4: drives stages 2–3 per chapter and writes the manuscript |
//! | [`validate`] | Stage 5: line-based scan for markup Markua cannot render |
//! | [`types`] | Shared types (`Chapter`, `RenderedChapter`) |
//! | [`output`] | CLI output formatting |
//!
//! # Manuscript Layout
//!
//! Each chapter is written to `<source path with .md suffix>/index.md`, so
//! `01-introduction/02-networkx-intro.ipynb` becomes
//! `01-introduction/02-networkx-intro.md/index.md`. Extracted images share
//! one `images/` directory and are namespaced by chapter path. `Book.txt`
//! lists the chapter files in reading order.

pub mod config;
pub mod generate;
pub mod markua;
pub mod nav;
pub mod notebook;
pub mod output;
pub mod types;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
