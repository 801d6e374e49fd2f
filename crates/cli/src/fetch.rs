use anyhow::{Context as AnyhowContext, Result};
use reqwest::Client;
use tokio::process::Command;

/// Build the shared HTTP client: rustls TLS, redirects followed.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .context("Failed to build HTTP client")
}

/// Fetch a document as text, falling back to `curl -sL` when the in-process
/// request fails. Both failures are reported together so the cause of each
/// attempt stays visible.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let fetch_err = match fetch_with_client(client, url).await {
        Ok(text) => return Ok(text),
        Err(err) => err,
    };
    log::debug!("In-process fetch failed for {url}: {fetch_err:#}");

    match fetch_with_curl(url).await {
        Ok(text) => Ok(text),
        Err(curl_err) => {
            anyhow::bail!("Failed to fetch {url}. fetch={fetch_err:#}. curl={curl_err:#}")
        }
    }
}

async fn fetch_with_client(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("HTTP {} while fetching {url}", status.as_u16());
    }

    response
        .text()
        .await
        .with_context(|| format!("Failed to read body of {url}"))
}

async fn fetch_with_curl(url: &str) -> Result<String> {
    let output = Command::new("curl")
        .args(["-sL", url])
        .output()
        .await
        .context("Failed to spawn curl")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.trim();
        if detail.is_empty() {
            anyhow::bail!("curl {}", output.status);
        }
        anyhow::bail!("{detail}");
    }

    let body = String::from_utf8_lossy(&output.stdout);
    if body.is_empty() {
        anyhow::bail!("curl returned an empty body");
    }
    Ok(body.into_owned())
}
