//! nbformat v4 notebook types.
//!
//! Only the fields the build reads or rewrites are typed. Everything else on
//! a cell (`id`, `metadata`, `execution_count`, `attachments`) rides along in
//! `rest` so a notebook survives the trip through `nbconvert` unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A notebook document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub nbformat: u32,
    pub nbformat_minor: u32,
}

impl Notebook {
    /// Language of code cells, from `metadata.language_info.name`.
    pub fn language(&self) -> &str {
        self.metadata
            .get("language_info")
            .and_then(|info| info.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("python")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Markdown,
    Code,
    Raw,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellType,
    pub source: MultilineString,
    /// Present on code cells only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Output>>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Cell {
    pub fn source(&self) -> &str {
        &self.source.0
    }

    pub fn outputs(&self) -> &[Output] {
        self.outputs.as_deref().unwrap_or_default()
    }
}

/// A cell output, tagged by `output_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    Stream {
        name: String,
        text: MultilineString,
    },
    DisplayData {
        data: MimeBundle,
        #[serde(default)]
        metadata: Map<String, Value>,
    },
    ExecuteResult {
        data: MimeBundle,
        #[serde(default)]
        metadata: Map<String, Value>,
        #[serde(default)]
        execution_count: Option<u32>,
    },
    Error {
        ename: String,
        evalue: String,
        #[serde(default)]
        traceback: Vec<String>,
    },
}

/// MIME type → payload. Text payloads are strings or lists of strings;
/// `application/json` payloads are arbitrary JSON.
pub type MimeBundle = BTreeMap<String, Value>;

/// Text payload of a bundle entry, joining the list-of-lines form.
pub fn mime_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(lines) => lines
            .iter()
            .map(|l| l.as_str())
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.concat()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// nbformat multi-line string: either one string or a list of lines.
/// Always serialized back as a single string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMultiline", into = "String")]
pub struct MultilineString(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMultiline {
    One(String),
    Lines(Vec<String>),
}

impl From<RawMultiline> for MultilineString {
    fn from(raw: RawMultiline) -> Self {
        match raw {
            RawMultiline::One(s) => Self(s),
            RawMultiline::Lines(lines) => Self(lines.concat()),
        }
    }
}

impl From<MultilineString> for String {
    fn from(s: MultilineString) -> Self {
        s.0
    }
}

impl From<&str> for MultilineString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Clear execution counts on code cells and `execute_result` outputs so the
/// exported text does not depend on how often the notebook was run.
pub fn strip_execution_count(notebook: &mut Notebook) {
    for cell in &mut notebook.cells {
        if cell.cell_type != CellType::Code {
            continue;
        }
        cell.rest.insert("execution_count".to_string(), Value::Null);
        for output in cell.outputs.iter_mut().flatten() {
            if let Output::ExecuteResult {
                execution_count, ..
            } = output
            {
                *execution_count = None;
            }
        }
    }
}
