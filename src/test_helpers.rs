//! Shared test utilities for the bookbuilder test suite.
//!
//! The fixture project under `fixtures/book/` is a small mkdocs book with a
//! preface, one markdown chapter, one notebook chapter, and a web-only
//! welcome page that the default exclusion list drops.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let plan = nav::resolve_chapters(tmp.path(), &BookConfig::default()).unwrap();
//! assert_eq!(chapter_titles(&plan), vec!["Preface", "Introduction to Graphs", "The NetworkX API"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::generate::MANIFEST_FILE;
use crate::nav::BookPlan;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/book/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/book");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Extractors
// =========================================================================

/// All chapter titles in book order.
pub fn chapter_titles(plan: &BookPlan) -> Vec<&str> {
    plan.chapters.iter().map(|c| c.title.as_str()).collect()
}

/// Lines of the written `Book.txt`. Panics if it is missing.
pub fn manifest_lines(output_dir: &Path) -> Vec<String> {
    let path = output_dir.join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    content.lines().map(str::to_string).collect()
}

/// Contents of a written chapter file, by manifest entry. Panics if missing.
pub fn read_output(output_dir: &Path, entry: &str) -> String {
    let path = output_dir.join(entry);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}
