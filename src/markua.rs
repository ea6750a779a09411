//! Markua (Leanpub Flavoured Markdown) post-processing.
//!
//! Every chapter body, whether it came from a notebook or a markdown page,
//! goes through the same sequence:
//!
//! 1. `# <title>` heading prepended
//! 2. `{sample: true}` marker prepended for sample chapters
//! 3. extracted image references renamed into the shared `images/` directory
//! 4. the first pair of `$$`/`$` math delimiters turned into `{$$}`…`{/$$}`
//! 5. four-space indents in front of table pipes removed
//!
//! All rewrites are literal string operations.

use crate::config::BookConfig;
use crate::types::{Chapter, RenderedChapter, slash_path};
use std::collections::BTreeMap;
use std::path::Path;

/// Prefix of resource names produced by the notebook exporter.
pub const OUTPUT_PREFIX: &str = "output_";
/// Manuscript-relative directory holding every extracted image.
pub const IMAGES_DIR: &str = "images";

const SAMPLE_MARKER: &str = "{sample: true}\n\n";
const MATH_OPEN: &str = "{$$}";
const MATH_CLOSE: &str = "{/$$}";

/// Run the full post-processing sequence on a rendered chapter.
///
/// Returns the final body together with the resources renamed to their
/// names inside `images/`.
pub fn postprocess(
    chapter: &Chapter,
    rendered: RenderedChapter,
    config: &BookConfig,
) -> RenderedChapter {
    let mut text = chapter_heading(&chapter.title, &rendered.body);
    if config.is_sample(&chapter.title) {
        text = sample_marker(&text);
    }

    let prefix = image_prefix(&chapter.path);
    let text = rename_image_refs(&text, rendered.outputs.keys(), &prefix);

    let delimiters = math_delimiter_count(&text);
    if delimiters == 1 || delimiters > 2 {
        tracing::warn!(
            chapter = %chapter.title,
            delimiters,
            "only the first math delimiter pair is converted"
        );
    }
    let text = mdlatex_to_lfmlatex(&text);
    let text = replace_markdown_table_tabs(&text);

    let outputs = rename_outputs(rendered.outputs, &prefix);
    RenderedChapter {
        body: text,
        outputs,
    }
}

/// Prefix the chapter heading.
pub fn chapter_heading(title: &str, body: &str) -> String {
    format!("# {title}\n\n{body}")
}

/// Prefix the platform's sample-chapter marker.
pub fn sample_marker(body: &str) -> String {
    format!("{SAMPLE_MARKER}{body}")
}

/// Per-chapter image namespace: the chapter path with a `.md` suffix, `/`
/// and `.` replaced by `_`, plus a trailing `_`.
///
/// `01-intro/02-networkx.ipynb` → `01-intro_02-networkx_md_`
pub fn image_prefix(path: &Path) -> String {
    let md = slash_path(&path.with_extension("md"));
    format!("{}_", md.replace(['/', '.'], "_"))
}

/// Name of an extracted resource inside `images/`.
pub fn renamed_output(name: &str, prefix: &str) -> String {
    name.replacen(OUTPUT_PREFIX, prefix, 1)
}

/// Point every `](output_…)` reference at its renamed file in `images/`.
/// Only names in `outputs` are touched, so prose mentioning `output_` is
/// left alone.
pub fn rename_image_refs<'a>(
    body: &str,
    outputs: impl IntoIterator<Item = &'a String>,
    prefix: &str,
) -> String {
    outputs.into_iter().fold(body.to_string(), |text, name| {
        text.replace(
            &format!("]({name})"),
            &format!("]({IMAGES_DIR}/{})", renamed_output(name, prefix)),
        )
    })
}

fn rename_outputs(outputs: BTreeMap<String, Vec<u8>>, prefix: &str) -> BTreeMap<String, Vec<u8>> {
    outputs
        .into_iter()
        .map(|(name, bytes)| (renamed_output(&name, prefix), bytes))
        .collect()
}

/// Byte offsets and lengths of math delimiters, left to right. `$$` counts
/// as one delimiter, a lone `$` as another.
fn math_delimiters(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let len = if bytes.get(i + 1) == Some(&b'$') { 2 } else { 1 };
            found.push((i, len));
            i += len;
        } else {
            i += 1;
        }
    }
    found
}

/// Number of math delimiters in `text`.
pub fn math_delimiter_count(text: &str) -> usize {
    math_delimiters(text).len()
}

/// Convert the first math delimiter into `{$$}` and the second into
/// `{/$$}`, whether each is `$$` or `$`.
///
/// - `"a $$ b $ c"` → `"a {$$} b {/$$} c"`
/// - `"$$x$$"` → `"{$$}x{/$$}"`
///
/// Text with fewer than two delimiters is returned unchanged, and anything
/// after the second delimiter is left as is.
pub fn mdlatex_to_lfmlatex(text: &str) -> String {
    let delimiters = math_delimiters(text);
    let &[(open, open_len), (close, close_len), ..] = delimiters.as_slice() else {
        return text.to_string();
    };

    let mut out = String::with_capacity(text.len() + MATH_OPEN.len() + MATH_CLOSE.len());
    out.push_str(&text[..open]);
    out.push_str(MATH_OPEN);
    out.push_str(&text[open + open_len..close]);
    out.push_str(MATH_CLOSE);
    out.push_str(&text[close + close_len..]);
    out
}

/// Remove the four-space indent in front of every table pipe, anywhere in
/// the text.
pub fn replace_markdown_table_tabs(body: &str) -> String {
    body.replace("    |", "|")
}
