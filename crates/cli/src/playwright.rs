use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as AnyhowContext, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use crate::discover;

const DISCOVERY_ATTEMPTS: usize = 8;
const POLL_DELAY: Duration = Duration::from_millis(750);

/// Page-side snippet listing every iframe src.
const LIST_IFRAMES: &str =
    "() => Array.from(document.querySelectorAll('iframe')).map((f) => f.src)";

/// Page-side snippet grepping the live DOM for preview hosts.
const GREP_PREVIEW_HOSTS: &str = r"() => (document.documentElement.innerHTML.match(/preview-[a-z0-9-]+\.vusercontent\.net/gi) || []).slice(0, 3)";

static PREVIEW_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)preview-[a-z0-9-]+\.vusercontent\.net").expect("preview host pattern")
});

/// Locate the Playwright wrapper script: `PWCLI` wins, then
/// `$CODEX_HOME/skills/playwright/scripts/playwright_cli.sh` with `~/.codex`
/// as the default home.
fn wrapper_path() -> PathBuf {
    if let Ok(path) = std::env::var("PWCLI") {
        return PathBuf::from(path);
    }

    let home = std::env::var("CODEX_HOME").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".codex")
    });
    home.join("skills")
        .join("playwright")
        .join("scripts")
        .join("playwright_cli.sh")
}

/// Run one wrapper command, returning combined stdout and stderr.
///
/// With `allow_failure` a non-zero exit still yields the output; a failed
/// spawn is always an error.
async fn run_wrapper(wrapper: &Path, args: &[&str], allow_failure: bool) -> Result<String> {
    let output = Command::new(wrapper)
        .args(args)
        .output()
        .await
        .with_context(|| format!("Failed to run {}", wrapper.display()))?;

    let combined = format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    if !allow_failure && !output.status.success() {
        anyhow::bail!(
            "Playwright command failed: {}\n{}",
            args.join(" "),
            combined.trim()
        );
    }

    Ok(combined)
}

/// Discover the preview URL by rendering the template page in a browser and
/// watching for the preview iframe to attach.
///
/// Polls up to [`DISCOVERY_ATTEMPTS`] times: first the iframe srcs, then a
/// DOM grep for preview hosts (the iframe can lag behind the host hint).
pub async fn discover_preview_url(template_url: &str) -> Result<String> {
    let wrapper = wrapper_path();
    if !wrapper.exists() {
        anyhow::bail!(
            "Playwright wrapper not found at {}. Set PWCLI or install the Playwright skill before using --method playwright.",
            wrapper.display()
        );
    }

    // Start from a clean browser; a stale session is tolerated.
    run_wrapper(&wrapper, &["close-all"], true).await?;
    run_wrapper(&wrapper, &["open", template_url], false).await?;

    let mut last_output = String::new();
    for attempt in 1..=DISCOVERY_ATTEMPTS {
        let iframe_output = run_wrapper(&wrapper, &["eval", LIST_IFRAMES], false).await?;
        if let Some(preview_url) = discover::preview_link_in(&iframe_output) {
            run_wrapper(&wrapper, &["close-all"], true).await?;
            return Ok(preview_url);
        }

        let hint_output = run_wrapper(&wrapper, &["eval", GREP_PREVIEW_HOSTS], false).await?;
        if let Some(host) = PREVIEW_HOST.find(&hint_output) {
            run_wrapper(&wrapper, &["close-all"], true).await?;
            return Ok(format!("https://{}/?mql=true&__v0=", host.as_str()));
        }
        last_output = hint_output;

        log::debug!("No preview iframe yet (attempt {attempt}/{DISCOVERY_ATTEMPTS})");
        tokio::time::sleep(POLL_DELAY).await;
    }

    run_wrapper(&wrapper, &["close-all"], true).await?;
    anyhow::bail!(
        "Playwright ran but no preview iframe URL was detected. Last output snippet: {}",
        snippet(&last_output)
    )
}

/// Collapse whitespace and cap the diagnostic snippet at 220 characters.
fn snippet(output: &str) -> String {
    let collapsed = output.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(220).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn snippet_collapses_and_caps() {
        let noisy = format!("line one\n\n\tline   two {}", "x".repeat(300));
        let shortened = snippet(&noisy);
        assert!(shortened.starts_with("line one line two xxx"));
        assert_eq!(shortened.chars().count(), 220);
    }

    #[test]
    fn snippet_of_short_output_is_unchanged() {
        assert_eq!(snippet("already short"), "already short");
    }

    #[test]
    fn preview_host_regex_matches_inside_eval_output() {
        let eval_output = r#"["preview-abc-12.vusercontent.net","other.example.com"]"#;
        let found = PREVIEW_HOST.find(eval_output).expect("host match");
        assert_eq!(found.as_str(), "preview-abc-12.vusercontent.net");
    }
}
