use serde::{Deserialize, Serialize};

/// A value carried by a reference record or a file descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefValue {
    /// Literal text, used as-is
    Literal(String),

    /// Pointer to another identifier, leading `$` stripped
    Reference(String),
}

impl RefValue {
    /// Classify a raw protocol value: a leading `$` marks a reference.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        match raw.strip_prefix('$') {
            Some(id) => Self::Reference(id.to_string()),
            None => Self::Literal(raw.to_string()),
        }
    }

    /// The original protocol spelling: `$id` for references, the text
    /// itself for literals.
    #[must_use]
    pub fn as_data_ref(&self) -> String {
        match self {
            Self::Literal(text) => text.clone(),
            Self::Reference(id) => format!("${id}"),
        }
    }
}

/// One extractable file announced in the decoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Path-like name relative to the virtual project root
    pub name: String,

    /// Literal content (still escaped) or a pointer into the reference table
    pub data: RefValue,
}

/// A file whose content was fully resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Path-like name relative to the virtual project root
    pub name: String,

    /// Final content, line endings normalized to `\n`
    pub content: String,

    /// UTF-8 length of `content`
    pub bytes: usize,
}

impl ResolvedFile {
    /// Wrap resolved content, recording its byte length.
    #[must_use]
    pub fn new(name: impl Into<String>, content: String) -> Self {
        let bytes = content.len();
        Self {
            name: name.into(),
            content,
            bytes,
        }
    }
}

/// A descriptor whose data pointer could not be resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnresolvedRef {
    /// File name from the descriptor
    pub name: String,

    /// The data pointer as it appeared in the payload, `$` marker included
    pub data_ref: String,
}

impl UnresolvedRef {
    /// Render as `name ($ref)` for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} ({})", self.name, self.data_ref)
    }
}

/// Outcome of decoding one preview page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Extraction {
    /// Resolved files, in first-appearance order
    pub files: Vec<ResolvedFile>,

    /// Descriptors that survived scanning but failed resolution
    pub unresolved: Vec<UnresolvedRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_splits_on_dollar_marker() {
        assert_eq!(
            RefValue::classify("$1a"),
            RefValue::Reference("1a".to_string())
        );
        assert_eq!(
            RefValue::classify("plain text"),
            RefValue::Literal("plain text".to_string())
        );
    }

    #[test]
    fn classify_only_strips_one_marker() {
        assert_eq!(
            RefValue::classify("$$nested"),
            RefValue::Reference("$nested".to_string())
        );
    }

    #[test]
    fn data_ref_round_trips_the_marker() {
        assert_eq!(RefValue::classify("$2b").as_data_ref(), "$2b");
        assert_eq!(RefValue::classify("text").as_data_ref(), "text");
    }

    #[test]
    fn resolved_file_counts_utf8_bytes() {
        let file = ResolvedFile::new("a.txt", "héllo".to_string());
        assert_eq!(file.bytes, 6);
    }

    #[test]
    fn unresolved_describe_format() {
        let missing = UnresolvedRef {
            name: "app/page.tsx".to_string(),
            data_ref: "$42".to_string(),
        };
        assert_eq!(missing.describe(), "app/page.tsx ($42)");
    }
}
