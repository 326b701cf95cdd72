//! Note file naming

use std::path::{Path, PathBuf};

use crate::models::ImageRecord;
use crate::util::sanitize_file_component;

const NOTE_PREFIX: &str = "Gyazo";
const NOTE_EXTENSION: &str = "md";
/// Byte budget for the app and title part of a file name. Leaves room for the
/// prefix, timestamp, a disambiguating id and the extension under the
/// 255-byte name limit of common filesystems.
const MAX_LABEL_BYTES: usize = 160;

/// Derived location of the note for `record` inside `dir`.
///
/// `<dir>/Gyazo <YYYY-MM-DD>_<HHMMSS>[ <app>][ <title>].md`, with the image id
/// standing in when neither app nor title survives sanitizing.
#[must_use]
pub fn note_path(dir: &Path, record: &ImageRecord) -> PathBuf {
    dir.join(format!("{}.{NOTE_EXTENSION}", note_stem(record)))
}

/// Fallback location used when [`note_path`] already belongs to another image.
#[must_use]
pub fn disambiguated_note_path(dir: &Path, record: &ImageRecord) -> PathBuf {
    dir.join(format!(
        "{} {}.{NOTE_EXTENSION}",
        note_stem(record),
        sanitize_file_component(&record.id)
    ))
}

fn note_stem(record: &ImageRecord) -> String {
    let mut stem = format!(
        "{NOTE_PREFIX} {}",
        record.created_at.format("%Y-%m-%d_%H%M%S")
    );

    let labels = [record.app(), record.title()]
        .into_iter()
        .flatten()
        .map(|label| sanitize_file_component(&label))
        .filter(|label| !label.is_empty())
        .collect::<Vec<_>>();

    stem.push(' ');
    if labels.is_empty() {
        stem.push_str(&sanitize_file_component(&record.id));
    } else {
        let joined = labels.join(" ");
        stem.push_str(truncate_on_char_boundary(&joined, MAX_LABEL_BYTES).trim_end());
    }
    stem
}

fn truncate_on_char_boundary(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Whether `path` looks like a markdown note.
pub fn is_note_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case(NOTE_EXTENSION))
}
