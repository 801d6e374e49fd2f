use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ExtractError, Result};
use crate::escape::decode_json_string;

/// One `self.__next_f.push([1,"…"])` statement per match; the capture is the
/// still-escaped payload. Lazy repetition stops the match at the first `"])`.
static PUSH_STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"self\.__next_f\.push\(\[1,"((?s:.)*?)"\]\)"#).expect("push statement pattern")
});

/// Collect every flight payload chunk from rendered preview markup and
/// concatenate them, in document order, into one decoded buffer.
///
/// Chunks whose payload is not a well-formed JSON string (typically cut
/// mid-escape by the renderer) are skipped; the survivors keep their
/// relative order because records may straddle chunk boundaries.
pub fn collect_flight_chunks(html: &str) -> Result<String> {
    let mut decoded = String::new();
    let mut chunks = 0usize;

    for caps in PUSH_STATEMENT.captures_iter(html) {
        let Some(payload) = caps.get(1).and_then(|m| decode_json_string(m.as_str())) else {
            continue;
        };
        decoded.push_str(&payload);
        chunks += 1;
    }

    if chunks == 0 {
        return Err(ExtractError::NoFlightChunks);
    }

    log::debug!("Collected {chunks} flight chunks ({} bytes decoded)", decoded.len());
    Ok(decoded)
}
