use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::escape::decode_json_string;
use crate::types::RefValue;

/// `id:"escaped text` at a line start. The value capture walks escaped pairs
/// and stops at the first bare quote, which for huge JSON-bearing records can
/// land before the record's true end; raw text records exist to carry those
/// bodies exactly and overwrite whatever this scan extracted.
static QUOTED_RECORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|\n)([A-Za-z0-9]+):"((?:[^"\\]|\\.)*)"#).expect("quoted record pattern")
});

/// `id:Thexlen,` at a line start, announcing a run of raw payload text whose
/// character count is the hex length field.
static RAW_TEXT_RECORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\n)([A-Za-z0-9]+):T([0-9a-fA-F]+),").expect("raw text record pattern")
});

/// Identifier → value map built from one decoded buffer.
///
/// Values are classified on insertion: a `$` marker makes a reference,
/// anything else is literal text. Duplicate identifiers keep the last write.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    entries: HashMap<String, RefValue>,
}

impl ReferenceTable {
    /// Scan the decoded buffer for both record shapes.
    ///
    /// Quoted records are collected first and unescaped; raw text records
    /// second, taken verbatim. A raw text record therefore replaces a quoted
    /// record with the same identifier.
    #[must_use]
    pub fn build(decoded: &str) -> Self {
        let mut entries = HashMap::new();

        for caps in QUOTED_RECORD.captures_iter(decoded) {
            let (Some(id), Some(escaped)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let value = decode_json_string(escaped.as_str())
                .unwrap_or_else(|| escaped.as_str().to_string());
            entries.insert(id.as_str().to_string(), RefValue::classify(&value));
        }

        for caps in RAW_TEXT_RECORD.captures_iter(decoded) {
            let (Some(whole), Some(id), Some(hex)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let Some(size) = parse_hex_len(hex.as_str()) else {
                continue;
            };
            let Some(value) = take_chars(&decoded[whole.end()..], size) else {
                continue;
            };
            entries.insert(id.as_str().to_string(), RefValue::classify(value));
        }

        log::debug!("Reference table holds {} entries", entries.len());
        Self { entries }
    }

    /// Look up an identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RefValue> {
        self.entries.get(id)
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the buffer held no reference records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse the hex length field. Zero is treated as absent: the emitter never
/// declares empty raw text, so a zero field is a scan artifact.
fn parse_hex_len(hex: &str) -> Option<usize> {
    let size = usize::from_str_radix(hex, 16).ok()?;
    (size > 0).then_some(size)
}

/// Slice exactly `count` characters off the front of `rest`, or `None` when
/// the buffer ends first. The length field counts characters, not bytes.
fn take_chars(rest: &str, count: usize) -> Option<&str> {
    let mut indices = rest.char_indices();
    for _ in 0..count {
        indices.next()?;
    }
    let end = indices.next().map_or(rest.len(), |(idx, _)| idx);
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn literal(table: &ReferenceTable, id: &str) -> String {
        match table.get(id) {
            Some(RefValue::Literal(text)) => text.clone(),
            other => panic!("expected literal for {id}, got {other:?}"),
        }
    }

    #[test]
    fn collects_quoted_records() {
        let table = ReferenceTable::build("1:\"alpha\"\n2:\"beta \\\"quoted\\\"\"\n");
        assert_eq!(table.len(), 2);
        assert_eq!(literal(&table, "1"), "alpha");
        assert_eq!(literal(&table, "2"), "beta \"quoted\"");
    }

    #[test]
    fn records_must_start_a_line() {
        let table = ReferenceTable::build("x1:\"first\" mid2:\"ignored\"\n3:\"third\"");
        assert_eq!(table.len(), 2);
        assert!(table.get("2").is_none());
        assert_eq!(literal(&table, "3"), "third");
    }

    #[test]
    fn buffer_start_counts_as_line_start() {
        let table = ReferenceTable::build("7:\"lead\"");
        assert_eq!(literal(&table, "7"), "lead");
    }

    #[test]
    fn raw_text_record_takes_exact_char_count() {
        // 0x5 = 5 chars, the rest of the buffer stays untouched.
        let table = ReferenceTable::build("a:T5,hello world");
        assert_eq!(literal(&table, "a"), "hello");
    }

    #[test]
    fn raw_text_length_is_chars_not_bytes() {
        let table = ReferenceTable::build("a:T3,é🎉x trailer");
        assert_eq!(literal(&table, "a"), "é🎉x");
    }

    #[test]
    fn truncated_raw_text_record_is_dropped() {
        let table = ReferenceTable::build("a:Tff,short");
        assert!(table.get("a").is_none());
    }

    #[test]
    fn zero_length_raw_text_record_is_dropped() {
        let table = ReferenceTable::build("a:T0,rest");
        assert!(table.get("a").is_none());
    }

    #[test]
    fn raw_text_overwrites_quoted_record_with_same_id() {
        let table = ReferenceTable::build("a:\"from quoted\"\na:T8,raw body tail");
        assert_eq!(literal(&table, "a"), "raw body");
    }

    #[test]
    fn later_quoted_record_wins_among_duplicates() {
        let table = ReferenceTable::build("a:\"first\"\na:\"second\"");
        assert_eq!(literal(&table, "a"), "second");
    }

    #[test]
    fn dollar_values_are_stored_as_references() {
        let table = ReferenceTable::build("a:\"$b\"\nb:\"end\"");
        assert_eq!(table.get("a"), Some(&RefValue::Reference("b".to_string())));
        assert_eq!(literal(&table, "b"), "end");
    }

    #[test]
    fn malformed_escape_falls_back_to_raw_capture() {
        // A capture that is not valid JSON keeps its escaped form.
        let table = ReferenceTable::build("a:\"bad \\u00zz tail\"");
        assert_eq!(literal(&table, "a"), "bad \\u00zz tail");
    }

    #[test]
    fn hex_length_parses_base_16() {
        assert_eq!(parse_hex_len("10"), Some(16));
        assert_eq!(parse_hex_len("ff"), Some(255));
        assert_eq!(parse_hex_len("0"), None);
        assert_eq!(parse_hex_len("zz"), None);
    }

    #[test]
    fn take_chars_boundaries() {
        assert_eq!(take_chars("abc", 3), Some("abc"));
        assert_eq!(take_chars("abc", 4), None);
        assert_eq!(take_chars("", 1), None);
    }
}
