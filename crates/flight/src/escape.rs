//! String unescaping helpers shared across the decode pipeline.

/// Decode a JSON string body (the text between the quotes) into its literal
/// value.
///
/// Returns `None` when the text is not a well-formed JSON string, which in
/// practice means a payload truncated mid-escape or an unescaped interior
/// quote.
#[must_use]
pub fn decode_json_string(escaped: &str) -> Option<String> {
    let quoted = format!("\"{escaped}\"");
    serde_json::from_str(&quoted).ok()
}

/// Rewrite the escaped punctuation preview markup uses for URLs so link
/// scanning sees literal characters.
///
/// Handles only the sequences the pages actually emit; this is not a general
/// unescape. `&` and `=` appear lowercased only, the others in
/// either case.
#[must_use]
pub fn normalize_escapes(markup: &str) -> String {
    markup
        .replace("\\u0026", "&")
        .replace("\\u003d", "=")
        .replace("\\u002f", "/")
        .replace("\\u002F", "/")
        .replace("\\u003a", ":")
        .replace("\\u003A", ":")
        .replace("\\/", "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_common_escapes() {
        assert_eq!(
            decode_json_string(r#"line1\nline2\t\"quoted\""#),
            Some("line1\nline2\t\"quoted\"".to_string())
        );
    }

    #[test]
    fn decodes_unicode_escapes() {
        assert_eq!(
            decode_json_string(r"snowman \u2603"),
            Some("snowman \u{2603}".to_string())
        );
    }

    #[test]
    fn decodes_surrogate_pairs() {
        assert_eq!(
            decode_json_string(r"\ud83d\ude00"),
            Some("\u{1f600}".to_string())
        );
    }

    #[test]
    fn rejects_truncated_escape() {
        assert_eq!(decode_json_string(r"cut \u00"), None);
        assert_eq!(decode_json_string("trailing backslash \\"), None);
    }

    #[test]
    fn rejects_unescaped_interior_quote() {
        assert_eq!(decode_json_string(r#"a"b"#), None);
    }

    #[test]
    fn rejects_raw_control_characters() {
        assert_eq!(decode_json_string("raw\nnewline"), None);
    }

    #[test]
    fn empty_string_is_valid() {
        assert_eq!(decode_json_string(""), Some(String::new()));
    }

    #[test]
    fn normalizes_url_punctuation() {
        assert_eq!(
            normalize_escapes(r"https:\/\/preview-a.example/path?x=1&y:2"),
            "https://preview-a.example/path?x=1&y:2"
        );
    }

    #[test]
    fn normalize_leaves_other_escapes_alone() {
        assert_eq!(normalize_escapes(r"A\n"), r"A\n");
    }
}
