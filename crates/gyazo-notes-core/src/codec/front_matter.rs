//! Minimal YAML-style front-matter reader/writer.
//!
//! Only flat `key: value` pairs are produced by the codec, so this stays a
//! hand-rolled line parser instead of pulling in a YAML crate.

use std::fmt::Write as _;

/// Ordered key/value pairs from a front-matter block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    entries: Vec<(String, String)>,
}

impl FrontMatter {
    /// Parse the text between the `---` delimiters.
    ///
    /// Lines without a `key:` prefix are ignored; quoted values are unescaped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    return None;
                }
                let (key, value) = trimmed.split_once(':')?;
                let key = key.trim();
                if key.is_empty() || key.contains(char::is_whitespace) {
                    return None;
                }
                Some((key.to_string(), unquote(value)))
            })
            .collect();
        Self { entries }
    }

    /// Value of the first entry named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A value as it will be written into the block.
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    /// Written as-is (ids, dates, URLs the service produced)
    Plain(&'a str),
    /// Free text; double-quoted and escaped
    Quoted(&'a str),
}

/// Render `key: value` lines in the given order, without delimiters.
#[must_use]
pub fn write_entries(entries: &[(&str, Value<'_>)]) -> String {
    let mut output = String::new();
    for (index, (key, value)) in entries.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }
        let _ = match value {
            Value::Plain(raw) => write!(output, "{key}: {raw}"),
            Value::Quoted(raw) => write!(output, "{key}: {}", quote(raw)),
        };
    }
    output
}

/// Wrap a value in double quotes, escaping backslashes, quotes and newlines.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Remove surrounding quotes from a value, undoing [`quote`] escapes.
pub fn unquote(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        let inner = &value[1..value.len() - 1];
        let mut output = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                output.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => output.push('\n'),
                Some('r') => output.push('\r'),
                Some('t') => output.push('\t'),
                Some(other) => output.push(other),
                None => output.push('\\'),
            }
        }
        output
    } else if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        value[1..value.len() - 1].replace("''", "'")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_keeps_order_and_colons_in_values() {
        let front = FrontMatter::parse(
            "category: gyazo\ncreated_at: 2024-01-05T10:30:00Z\nurl: https://i.gyazo.com/a.png",
        );
        assert_eq!(front.len(), 3);
        assert_eq!(
            front.keys().collect::<Vec<_>>(),
            vec!["category", "created_at", "url"]
        );
        assert_eq!(front.get("created_at"), Some("2024-01-05T10:30:00Z"));
        assert_eq!(front.get("url"), Some("https://i.gyazo.com/a.png"));
    }

    #[test]
    fn parse_skips_comments_and_junk() {
        let front = FrontMatter::parse("# comment\n\nnot a pair\nkey with space: x\nok: yes");
        assert_eq!(front.len(), 1);
        assert_eq!(front.get("ok"), Some("yes"));
    }

    #[test]
    fn quote_round_trips_special_characters() {
        let raw = "He said \"hi\"\nC:\\path\ttab";
        assert_eq!(unquote(&quote(raw)), raw);
    }

    #[test]
    fn unquote_handles_single_quotes() {
        assert_eq!(unquote("'it''s'"), "it's");
        assert_eq!(unquote("  plain "), "plain");
    }

    #[test]
    fn write_entries_quotes_only_free_text() {
        let rendered = write_entries(&[
            ("gyazo_id", Value::Plain("abc")),
            ("title", Value::Quoted("A: \"B\"")),
        ]);
        assert_eq!(rendered, "gyazo_id: abc\ntitle: \"A: \\\"B\\\"\"");
    }
}
