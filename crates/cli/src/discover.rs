use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Url};

use v0_flight::normalize_escapes;

use crate::fetch;
use crate::playwright;

/// Requested discovery strategy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Method {
    /// HTTP parsing first, Playwright as fallback
    Auto,
    /// Template page fetch and markup scan only
    Http,
    /// Browser automation only
    Playwright,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Http => "http",
            Self::Playwright => "playwright",
        }
    }
}

/// How the preview URL was actually obtained.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DiscoveryMethod {
    /// The input URL already pointed at the preview host
    Direct,
    /// Found in the template page markup
    Http,
    /// Observed in a live browser session
    Playwright,
}

impl DiscoveryMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Http => "http",
            Self::Playwright => "playwright",
        }
    }
}

impl std::fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved preview URL plus the strategy that produced it.
#[derive(Debug)]
pub struct Discovery {
    pub preview_url: String,
    pub method: DiscoveryMethod,
}

/// Preview link already carrying the `?mql=true&__v0=` query, suffix and all.
static PREVIEW_WITH_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https://preview-[^"'\\\s]+\.vusercontent\.net/\?mql=true&__v0=[^"'\\\s]*"#)
        .expect("preview query pattern")
});

/// Bare preview host link; the query still has to be appended.
static PREVIEW_BARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https://preview-[^"'\\\s]+\.vusercontent\.net/?"#)
        .expect("bare preview pattern")
});

/// `originalHost=...` attribute naming the preview host.
static ORIGINAL_HOST_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)originalHost=([a-z0-9-]+\.vusercontent\.net)").expect("host attr pattern")
});

/// `"originalHost":"..."` JSON field naming the preview host.
static ORIGINAL_HOST_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)"originalHost":"([a-z0-9-]+\.vusercontent\.net)""#)
        .expect("host json pattern")
});

/// Pull a preview link out of arbitrary text, preferring a link that already
/// carries the query.
pub(crate) fn preview_link_in(text: &str) -> Option<String> {
    if let Some(found) = PREVIEW_WITH_QUERY.find(text) {
        return Some(found.as_str().to_string());
    }
    PREVIEW_BARE
        .find(text)
        .map(|found| with_preview_query(found.as_str()))
}

/// Append the preview query, normalizing the trailing slash first.
pub(crate) fn with_preview_query(url: &str) -> String {
    let base = url.strip_suffix('/').unwrap_or(url);
    format!("{base}/?mql=true&__v0=")
}

/// Scan fetched template page markup for the preview URL.
///
/// Escaped punctuation is normalized first so links inside inline JSON match.
/// When no direct link is present, an `originalHost` field still names the
/// preview host and the URL is synthesized from it.
pub fn preview_url_from_template_html(html: &str) -> Option<String> {
    let normalized = normalize_escapes(html);

    if let Some(url) = preview_link_in(&normalized) {
        return Some(url);
    }

    let host = ORIGINAL_HOST_ATTR
        .captures(&normalized)
        .or_else(|| ORIGINAL_HOST_JSON.captures(&normalized))
        .and_then(|caps| caps.get(1))?;
    Some(format!("https://{}/?mql=true&__v0=", host.as_str()))
}

/// Resolve the machine-renderable preview URL for a source URL.
///
/// A URL already on the preview host is returned as-is. Otherwise the
/// template page is fetched and scanned; under `auto` a scan miss falls back
/// to browser automation, under `http` it is fatal.
pub async fn resolve_preview_url(
    client: &Client,
    source_url: &Url,
    method: Method,
) -> Result<Discovery> {
    if source_url
        .host_str()
        .is_some_and(|host| host.ends_with("vusercontent.net"))
    {
        return Ok(Discovery {
            preview_url: source_url.to_string(),
            method: DiscoveryMethod::Direct,
        });
    }

    if matches!(method, Method::Http | Method::Auto) {
        let template_html = fetch::fetch_text(client, source_url.as_str()).await?;
        if let Some(preview_url) = preview_url_from_template_html(&template_html) {
            return Ok(Discovery {
                preview_url,
                method: DiscoveryMethod::Http,
            });
        }
        if method == Method::Http {
            anyhow::bail!(
                "Could not discover preview URL via HTTP parsing. Retry with --method auto or --method playwright."
            );
        }
        log::info!("No preview link in template markup, falling back to Playwright");
    }

    let preview_url = playwright::discover_preview_url(source_url.as_str()).await?;
    Ok(Discovery {
        preview_url,
        method: DiscoveryMethod::Playwright,
    })
}
