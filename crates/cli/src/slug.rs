use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

const MAX_SLUG_LEN: usize = 80;

static NON_ALNUM_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^a-z0-9]+").expect("slug pattern"));

/// Sanitize arbitrary text into a directory-safe slug: lowercase, non
/// alphanumeric runs collapsed to single dashes, trimmed, capped at 80.
#[must_use]
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    let dashed = NON_ALNUM_RUN.replace_all(&lowered, "-");
    dashed
        .trim_matches('-')
        .chars()
        .take(MAX_SLUG_LEN)
        .collect()
}

/// Derive the output directory slug.
///
/// An explicit override must survive sanitization; otherwise the last path
/// segment of the source URL is used, then its host, then a timestamped
/// fallback so the extraction always lands somewhere.
pub fn derive_slug(source_url: &Url, explicit: Option<&str>) -> Result<String> {
    if let Some(raw) = explicit {
        let clean = slugify(raw);
        if clean.is_empty() {
            anyhow::bail!("The provided --slug becomes empty after sanitization.");
        }
        return Ok(clean);
    }

    let candidate = source_url
        .path_segments()
        .and_then(|segments| segments.filter(|segment| !segment.is_empty()).next_back())
        .or_else(|| source_url.host_str())
        .unwrap_or_default();

    let clean = slugify(candidate);
    if clean.is_empty() {
        return Ok(format!("v0-{}", unix_millis()));
    }
    Ok(clean)
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
