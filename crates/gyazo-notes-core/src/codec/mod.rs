//! Note codec: image record <-> markdown note text.
//!
//! A note is a front-matter block fenced by `---` lines followed by a
//! markdown body. Front-matter is always regenerated from the latest record;
//! the body belongs to the user except for the OCR block, which is a tagged
//! region the codec owns and replaces in place.

mod front_matter;
mod path;

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::ImageRecord;

pub use front_matter::{quote, unquote, FrontMatter};
pub use path::{disambiguated_note_path, is_note_path, note_path};

use front_matter::{write_entries, Value};

/// Front-matter fence line.
pub const DELIMITER: &str = "---";
/// Front-matter key linking a note back to its image.
pub const SOURCE_ID_KEY: &str = "gyazo_id";
/// Value written to the `category` field.
pub const CATEGORY: &str = "gyazo";
/// Opening tag of the managed OCR region.
pub const OCR_START: &str = "<!-- gyazo-ocr:start -->";
/// Closing tag of the managed OCR region.
pub const OCR_END: &str = "<!-- gyazo-ocr:end -->";

static SOURCE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*gyazo_id:[ \t]*(\S.*?)\s*$").expect("valid regex"));

/// Note text split at the front-matter fence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteParts {
    /// Lines between the fences, without the fences themselves
    pub front_matter: String,
    /// Everything after the closing fence, leading blank lines removed
    pub body: String,
}

/// Render a brand-new note for `record`.
#[must_use]
pub fn render(record: &ImageRecord) -> String {
    compose(&render_front_matter(record), &render_body(record))
}

/// Refresh an existing note with the latest state of `record`.
///
/// Front-matter is replaced wholesale. The body is kept verbatim apart from
/// the OCR region, which is replaced when present and appended otherwise, so
/// merging the same record twice is a no-op.
#[must_use]
pub fn merge(existing: &str, record: &ImageRecord) -> String {
    let parts = split_content(existing);
    let body = match record.ocr_text() {
        Some(text) => upsert_ocr_block(&parts.body, &text),
        None => parts.body,
    };
    compose(&render_front_matter(record), &body)
}

/// Split note text into front-matter and body.
///
/// Text that does not open with a `---` line, or never closes the block, is
/// returned whole as the body.
#[must_use]
pub fn split_content(text: &str) -> NoteParts {
    let unfenced = || NoteParts {
        front_matter: String::new(),
        body: text.to_string(),
    };

    let Some(rest) = strip_opening_fence(text) else {
        return unfenced();
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == DELIMITER {
            let front_matter = rest[..offset].trim_end_matches(['\n', '\r']).to_string();
            let body = rest[offset + line.len()..]
                .trim_start_matches(['\n', '\r'])
                .to_string();
            return NoteParts { front_matter, body };
        }
        offset += line.len();
    }

    unfenced()
}

/// Image id recorded in a note, if it is a managed note.
#[must_use]
pub fn extract_source_id(text: &str) -> Option<String> {
    let parts = split_content(text);
    if let Some(id) = FrontMatter::parse(&parts.front_matter).get(SOURCE_ID_KEY) {
        let id = id.trim();
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }

    SOURCE_ID_RE
        .captures(text)
        .map(|captures| unquote(&captures[1]))
        .filter(|id| !id.is_empty())
}

/// Front-matter entries of a note, in file order, quoted values unescaped.
#[must_use]
pub fn parse_front_matter(text: &str) -> FrontMatter {
    FrontMatter::parse(&split_content(text).front_matter)
}

/// Front-matter lines for `record`, in the fixed field order.
#[must_use]
pub fn render_front_matter(record: &ImageRecord) -> String {
    let created_at = record.created_at_rfc3339();
    let created = record.created_at.format("%Y-%m-%d").to_string();
    let app = record.app();
    let title = record.title();
    let source_url = record.source_url();
    let description = record.description();
    let ocr_locale = record.ocr_locale();

    let mut entries = vec![
        ("category", Value::Plain(CATEGORY)),
        (SOURCE_ID_KEY, Value::Plain(record.id.as_str())),
        ("created_at", Value::Plain(created_at.as_str())),
        ("created", Value::Plain(created.as_str())),
        ("type", Value::Plain(record.image_type.as_str())),
        ("permalink_url", Value::Plain(record.permalink_url.as_str())),
        ("url", Value::Plain(record.content_url.as_str())),
        ("thumb_url", Value::Plain(record.thumb_url.as_str())),
    ];
    if let Some(app) = app.as_deref() {
        entries.push(("app", Value::Quoted(app)));
    }
    if let Some(title) = title.as_deref() {
        entries.push(("title", Value::Quoted(title)));
    }
    if let Some(source_url) = source_url.as_deref() {
        entries.push(("source_url", Value::Quoted(source_url)));
    }
    if let Some(description) = description.as_deref() {
        entries.push(("description", Value::Quoted(description)));
    }
    if let Some(ocr_locale) = ocr_locale.as_deref() {
        entries.push(("ocr_locale", Value::Plain(ocr_locale)));
    }

    write_entries(&entries)
}

fn render_body(record: &ImageRecord) -> String {
    let title = record.display_title();
    let mut body = String::new();

    let _ = writeln!(body, "# {title}");
    let _ = writeln!(body);
    let _ = writeln!(body, "![{title}]({})", record.content_url);
    if !record.permalink_url.is_empty() {
        let _ = writeln!(body);
        let _ = writeln!(body, "[View on Gyazo]({})", record.permalink_url);
    }
    if let Some(description) = record.description() {
        let _ = writeln!(body);
        let _ = writeln!(body, "## Description");
        let _ = writeln!(body);
        let _ = writeln!(body, "{description}");
    }
    if let Some(text) = record.ocr_text() {
        let _ = writeln!(body);
        let _ = writeln!(body, "{}", ocr_block(&text));
    }

    body
}

fn ocr_block(text: &str) -> String {
    format!("{OCR_START}\n## OCR\n\n{text}\n{OCR_END}")
}

/// Replace the last complete OCR region, or append one.
fn upsert_ocr_block(body: &str, text: &str) -> String {
    let block = ocr_block(text);

    if let Some(start) = body.rfind(OCR_START) {
        if let Some(end_offset) = body[start..].find(OCR_END) {
            let end = start + end_offset + OCR_END.len();
            let mut output = String::with_capacity(body.len() + block.len());
            output.push_str(&body[..start]);
            output.push_str(&block);
            output.push_str(&body[end..]);
            return output;
        }
    }

    let mut output = body.to_string();
    if !output.is_empty() {
        if !output.ends_with('\n') {
            output.push('\n');
        }
        if !output.ends_with("\n\n") {
            output.push('\n');
        }
    }
    output.push_str(&block);
    output.push('\n');
    output
}

fn compose(front_matter: &str, body: &str) -> String {
    format!("{DELIMITER}\n{front_matter}\n{DELIMITER}\n\n{body}")
}

fn strip_opening_fence(text: &str) -> Option<&str> {
    let first_end = text.find('\n')?;
    let first = text[..first_end].trim_end_matches('\r');
    (first == DELIMITER).then(|| &text[first_end + 1..])
}
