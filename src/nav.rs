//! Chapter ordering from the MkDocs navigation tree.
//!
//! Stage 1 of the build. The book's reading order is whatever `mkdocs.yml`
//! says it is:
//!
//! ```yaml
//! docs_dir: docs
//! nav:
//!   - Welcome: index.md
//!   - Introduction:
//!       - Introduction to Graphs: 01-introduction/01-graphs.md
//!       - The NetworkX API: 01-introduction/02-networkx-intro.ipynb
//!   - 02-algorithms/paths.ipynb
//! ```
//!
//! The tree is flattened depth-first into [`Chapter`]s. Sections contribute
//! only their children; a bare path gets a title derived from its file stem;
//! external links (`http://`, `https://`) are skipped since they have no
//! source to convert.
//!
//! After flattening, the preface entry is prepended and excluded titles are
//! removed. Paths that are absolute or contain `..` are rejected, as are
//! chapters that would share a manuscript directory or an image prefix.

use crate::config::{BookConfig, PrefaceConfig};
use crate::markua::image_prefix;
use crate::types::Chapter;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("No `nav` section in {0}")]
    MissingNav(PathBuf),
    #[error("Unsupported nav entry: {0}")]
    InvalidEntry(String),
    #[error("Chapter source listed twice in nav: {0}")]
    DuplicateChapter(PathBuf),
    #[error("Chapters {first} and {second} share image prefix `{prefix}`")]
    ImagePrefixCollision {
        first: PathBuf,
        second: PathBuf,
        prefix: String,
    },
    #[error("Chapter path must stay inside the docs directory: {0}")]
    OutsideDocs(PathBuf),
}

/// A node of the MkDocs navigation tree.
#[derive(Debug, Clone, PartialEq)]
pub enum NavItem {
    /// A page. `title` is `None` for bare-path entries.
    Page { title: Option<String>, path: String },
    /// A titled group of further items.
    Section { title: String, children: Vec<NavItem> },
}

/// The parts of `mkdocs.yml` the build cares about. Everything else in the
/// file (theme, plugins, extensions) is ignored.
#[derive(Debug, Deserialize)]
struct RawMkDocs {
    #[serde(default)]
    docs_dir: Option<String>,
    #[serde(default)]
    nav: Option<serde_yaml::Value>,
}

/// Parsed MkDocs project.
#[derive(Debug, Clone)]
pub struct MkDocs {
    /// Directory chapter paths are relative to.
    pub docs_dir: PathBuf,
    pub nav: Vec<NavItem>,
}

/// Ordered chapter list plus where their sources live.
#[derive(Debug, Clone)]
pub struct BookPlan {
    pub docs_root: PathBuf,
    pub chapters: Vec<Chapter>,
}

/// Read and parse an `mkdocs.yml`.
pub fn load_mkdocs(path: &Path) -> Result<MkDocs, NavError> {
    let content = fs::read_to_string(path).map_err(|source| NavError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mkdocs(&content, path)
}

/// Parse `mkdocs.yml` content. `origin` is only used in error messages.
pub fn parse_mkdocs(content: &str, origin: &Path) -> Result<MkDocs, NavError> {
    let raw: RawMkDocs = serde_yaml::from_str(content)?;
    let nav_value = raw
        .nav
        .ok_or_else(|| NavError::MissingNav(origin.to_path_buf()))?;
    Ok(MkDocs {
        docs_dir: PathBuf::from(raw.docs_dir.unwrap_or_else(|| "docs".to_string())),
        nav: parse_nav(&nav_value)?,
    })
}

/// Convert the raw YAML `nav` value into a typed tree, preserving order.
pub fn parse_nav(value: &serde_yaml::Value) -> Result<Vec<NavItem>, NavError> {
    let items = value
        .as_sequence()
        .ok_or_else(|| NavError::InvalidEntry(format!("nav must be a list, got {value:?}")))?;

    let mut nav = Vec::new();
    for item in items {
        parse_nav_item(item, &mut nav)?;
    }
    Ok(nav)
}

fn parse_nav_item(item: &serde_yaml::Value, out: &mut Vec<NavItem>) -> Result<(), NavError> {
    match item {
        serde_yaml::Value::String(path) => out.push(NavItem::Page {
            title: None,
            path: path.clone(),
        }),
        // `- Title: target` is a single-key mapping; take every key in order
        serde_yaml::Value::Mapping(map) => {
            for (key, target) in map {
                let title = key
                    .as_str()
                    .ok_or_else(|| NavError::InvalidEntry(format!("non-string title {key:?}")))?
                    .to_string();
                match target {
                    serde_yaml::Value::String(path) => out.push(NavItem::Page {
                        title: Some(title),
                        path: path.clone(),
                    }),
                    serde_yaml::Value::Sequence(_) => out.push(NavItem::Section {
                        title,
                        children: parse_nav(target)?,
                    }),
                    other => {
                        return Err(NavError::InvalidEntry(format!("{title}: {other:?}")));
                    }
                }
            }
        }
        other => return Err(NavError::InvalidEntry(format!("{other:?}"))),
    }
    Ok(())
}

/// Flatten the nav tree into `(title, path)` chapters, depth-first, in
/// document order.
pub fn flatten(nav: &[NavItem]) -> Vec<Chapter> {
    let mut chapters = Vec::new();
    flatten_recursive(nav, &mut chapters);
    chapters
}

fn flatten_recursive(items: &[NavItem], chapters: &mut Vec<Chapter>) {
    for item in items {
        match item {
            NavItem::Page { title, path } => {
                if is_external(path) {
                    continue;
                }
                let title = title.clone().unwrap_or_else(|| title_from_path(path));
                chapters.push(Chapter::new(title, path));
            }
            NavItem::Section { children, .. } => flatten_recursive(children, chapters),
        }
    }
}

fn is_external(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Title for a bare nav path: the file stem with any `NN-` ordering prefix
/// dropped and dashes/underscores shown as spaces.
///
/// - `"01-introduction/02-networkx-intro.ipynb"` → `"networkx intro"`
/// - `"appendix/glossary.md"` → `"glossary"`
pub fn title_from_path(path: &str) -> String {
    let stem = Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match stem.split_once('-') {
        Some((prefix, rest)) if prefix.parse::<u32>().is_ok() => rest.to_string(),
        _ => stem,
    };
    name.replace(['-', '_'], " ")
}

/// Prepend the preface entry, if enabled.
pub fn with_preface(mut chapters: Vec<Chapter>, preface: &PrefaceConfig) -> Vec<Chapter> {
    if preface.enabled {
        chapters.insert(0, Chapter::new(&preface.title, &preface.path));
    }
    chapters
}

/// Drop chapters whose title exactly matches one of `titles`.
pub fn exclude(chapters: Vec<Chapter>, titles: &[String]) -> Vec<Chapter> {
    chapters
        .into_iter()
        .filter(|ch| !titles.iter().any(|t| *t == ch.title))
        .collect()
}

/// Reject chapter lists where two entries would write to the same
/// manuscript directory or the same image names.
///
/// Image prefixes flatten `/` and `.` to `_`, so `a/b_c.ipynb` and
/// `a_b/c.ipynb` collide there even though their directories differ.
pub fn ensure_unique(chapters: &[Chapter]) -> Result<(), NavError> {
    let mut dirs = HashSet::new();
    let mut prefixes: HashMap<String, &Path> = HashMap::new();
    for ch in chapters {
        if !dirs.insert(ch.output_dir()) {
            return Err(NavError::DuplicateChapter(ch.path.clone()));
        }
        let prefix = image_prefix(&ch.path);
        if let Some(first) = prefixes.get(&prefix) {
            return Err(NavError::ImagePrefixCollision {
                first: first.to_path_buf(),
                second: ch.path.clone(),
                prefix,
            });
        }
        prefixes.insert(prefix, &ch.path);
    }
    Ok(())
}

/// Reject chapter paths that are absolute or climb out with `..`; their
/// output would land outside the manuscript directory.
pub fn ensure_relative(chapters: &[Chapter]) -> Result<(), NavError> {
    for ch in chapters {
        let escapes = ch.path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(NavError::OutsideDocs(ch.path.clone()));
        }
    }
    Ok(())
}

/// Resolve the full, ordered chapter list for a project.
pub fn resolve_chapters(project_root: &Path, config: &BookConfig) -> Result<BookPlan, NavError> {
    let mkdocs = load_mkdocs(&project_root.join(&config.mkdocs))?;
    let chapters = with_preface(flatten(&mkdocs.nav), &config.preface);
    let chapters = exclude(chapters, &config.exclude);
    ensure_relative(&chapters)?;
    ensure_unique(&chapters)?;

    Ok(BookPlan {
        docs_root: project_root.join(&mkdocs.docs_dir),
        chapters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{chapter_titles, setup_fixtures};

    const NAV: &str = r#"
site_name: Network Analysis Made Simple
theme:
  name: material
nav:
  - Welcome: index.md
  - Introduction:
      - Introduction to Graphs: 01-introduction/01-graphs.md
      - The NetworkX API: 01-introduction/02-networkx-intro.ipynb
  - Algorithms:
      - Hubs:
          - Degree: 02-algorithms/01-hubs.ipynb
      - Paths: 02-algorithms/02-paths.ipynb
  - 03-appendix/01-further_reading.md
  - Source: https://github.com/example/book
"#;

    fn parsed() -> MkDocs {
        parse_mkdocs(NAV, Path::new("mkdocs.yml")).unwrap()
    }

    fn titles(chapters: &[Chapter]) -> Vec<&str> {
        chapters.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn docs_dir_defaults_to_docs() {
        assert_eq!(parsed().docs_dir, PathBuf::from("docs"));
    }

    #[test]
    fn docs_dir_read_from_config() {
        let mkdocs =
            parse_mkdocs("docs_dir: book\nnav:\n  - A: a.md\n", Path::new("mkdocs.yml")).unwrap();
        assert_eq!(mkdocs.docs_dir, PathBuf::from("book"));
    }

    #[test]
    fn missing_nav_is_error() {
        let result = parse_mkdocs("site_name: x\n", Path::new("mkdocs.yml"));
        assert!(matches!(result, Err(NavError::MissingNav(_))));
    }

    #[test]
    fn invalid_yaml_is_error() {
        let result = parse_mkdocs("nav: [unclosed", Path::new("mkdocs.yml"));
        assert!(matches!(result, Err(NavError::Yaml(_))));
    }

    #[test]
    fn numeric_target_is_invalid_entry() {
        let result = parse_mkdocs("nav:\n  - Broken: 42\n", Path::new("mkdocs.yml"));
        assert!(matches!(result, Err(NavError::InvalidEntry(_))));
    }

    #[test]
    fn flatten_is_depth_first_in_document_order() {
        let chapters = flatten(&parsed().nav);
        assert_eq!(
            titles(&chapters),
            vec![
                "Welcome",
                "Introduction to Graphs",
                "The NetworkX API",
                "Degree",
                "Paths",
                "further reading",
            ]
        );
        assert_eq!(
            chapters[2].path,
            PathBuf::from("01-introduction/02-networkx-intro.ipynb")
        );
    }

    #[test]
    fn flatten_yields_one_chapter_per_leaf() {
        // 7 leaves, one of them an external link
        assert_eq!(flatten(&parsed().nav).len(), 6);
    }

    #[test]
    fn preface_is_prepended() {
        let chapters = with_preface(flatten(&parsed().nav), &PrefaceConfig::default());
        assert_eq!(chapters.len(), 7);
        assert_eq!(chapters[0], Chapter::new("Preface", "preface/preface.md"));
        assert_eq!(chapters[1].title, "Welcome");
    }

    #[test]
    fn disabled_preface_is_not_prepended() {
        let preface = PrefaceConfig {
            enabled: false,
            ..PrefaceConfig::default()
        };
        let chapters = with_preface(flatten(&parsed().nav), &preface);
        assert_eq!(chapters[0].title, "Welcome");
    }

    #[test]
    fn exclude_removes_exact_titles_preserving_order() {
        let chapters = flatten(&parsed().nav);
        let excluded = exclude(
            chapters,
            &["Welcome".to_string(), "Degree".to_string(), "paths".to_string()],
        );
        assert_eq!(
            titles(&excluded),
            vec![
                "Introduction to Graphs",
                "The NetworkX API",
                "Paths",
                "further reading",
            ]
        );
    }

    #[test]
    fn exclude_with_no_titles_is_identity() {
        let chapters = flatten(&parsed().nav);
        assert_eq!(exclude(chapters.clone(), &[]), chapters);
    }

    #[test]
    fn duplicate_source_is_error() {
        let chapters = vec![
            Chapter::new("A", "intro/a.md"),
            Chapter::new("B", "intro/b.ipynb"),
            Chapter::new("A again", "intro/a.md"),
        ];
        let result = ensure_unique(&chapters);
        assert!(matches!(result, Err(NavError::DuplicateChapter(p)) if p == Path::new("intro/a.md")));
    }

    #[test]
    fn notebook_and_markdown_with_same_stem_collide() {
        // Both would be written to intro/a.md/index.md
        let chapters = vec![
            Chapter::new("A", "intro/a.md"),
            Chapter::new("A notebook", "intro/a.ipynb"),
        ];
        assert!(ensure_unique(&chapters).is_err());
    }

    #[test]
    fn flattened_image_prefix_collision_is_error() {
        // Different directories, both namespaced as a_b_c_md_
        let chapters = vec![
            Chapter::new("One", "a/b_c.ipynb"),
            Chapter::new("Two", "a_b/c.ipynb"),
        ];
        assert_ne!(chapters[0].output_dir(), chapters[1].output_dir());
        match ensure_unique(&chapters) {
            Err(NavError::ImagePrefixCollision {
                first,
                second,
                prefix,
            }) => {
                assert_eq!(first, PathBuf::from("a/b_c.ipynb"));
                assert_eq!(second, PathBuf::from("a_b/c.ipynb"));
                assert_eq!(prefix, "a_b_c_md_");
            }
            other => panic!("expected prefix collision, got {other:?}"),
        }
    }

    #[test]
    fn distinct_chapters_are_unique() {
        let chapters = vec![
            Chapter::new("A", "intro/a.md"),
            Chapter::new("B", "intro/b.ipynb"),
            Chapter::new("C", "algorithms/a.ipynb"),
        ];
        assert!(ensure_unique(&chapters).is_ok());
    }

    #[test]
    fn parent_dir_path_is_rejected() {
        let chapters = vec![Chapter::new("Ok", "intro/a.md"), Chapter::new("Up", "../x.md")];
        let result = ensure_relative(&chapters);
        assert!(matches!(result, Err(NavError::OutsideDocs(p)) if p == Path::new("../x.md")));
    }

    #[test]
    fn nested_parent_dir_is_rejected() {
        let chapters = vec![Chapter::new("Sneaky", "intro/../../x.md")];
        assert!(matches!(ensure_relative(&chapters), Err(NavError::OutsideDocs(_))));
    }

    #[test]
    fn absolute_path_is_rejected() {
        let chapters = vec![Chapter::new("Abs", "/abs/x.md")];
        assert!(matches!(ensure_relative(&chapters), Err(NavError::OutsideDocs(_))));
    }

    #[test]
    fn relative_paths_pass() {
        let chapters = vec![
            Chapter::new("A", "intro/a.md"),
            Chapter::new("B", "./b.ipynb"),
        ];
        assert!(ensure_relative(&chapters).is_ok());
    }

    #[test]
    fn resolve_chapters_rejects_escaping_nav_entry() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(
            tmp.path().join("mkdocs.yml"),
            "nav:\n  - Intro: intro.md\n  - Outside: ../outside.md\n",
        )
        .unwrap();
        let result = resolve_chapters(tmp.path(), &BookConfig::default());
        assert!(matches!(result, Err(NavError::OutsideDocs(_))));
    }

    #[test]
    fn title_from_path_strips_number_prefix() {
        assert_eq!(title_from_path("01-introduction/02-networkx-intro.ipynb"), "networkx intro");
        assert_eq!(title_from_path("appendix/glossary.md"), "glossary");
        assert_eq!(title_from_path("wip-notes.md"), "wip notes");
    }

    #[test]
    fn resolve_chapters_from_fixture_project() {
        let tmp = setup_fixtures();
        let config = BookConfig::default();
        let plan = resolve_chapters(tmp.path(), &config).unwrap();

        assert_eq!(plan.docs_root, tmp.path().join("docs"));
        assert_eq!(
            chapter_titles(&plan),
            vec!["Preface", "Introduction to Graphs", "The NetworkX API"]
        );
    }

    #[test]
    fn resolve_chapters_missing_mkdocs_is_io_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = resolve_chapters(tmp.path(), &BookConfig::default());
        assert!(matches!(result, Err(NavError::Io { .. })));
    }
}
