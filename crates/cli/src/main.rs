use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, ValueEnum};
use std::env;
use std::path::PathBuf;

use discover::Method;

mod discover;
mod fetch;
mod manifest;
mod output;
mod playwright;
mod slug;

#[derive(Parser)]
#[command(name = "v0-extract")]
#[command(about = "Extract template source files from a v0.app preview page", long_about = None)]
#[command(version)]
struct Cli {
    /// v0 template page or direct preview URL (*.vusercontent.net)
    url: String,

    /// Output root; files land under <out>/<slug>/
    #[arg(long, default_value = "output/v0")]
    out: PathBuf,

    /// Directory name override (sanitized; derived from the URL by default)
    #[arg(long)]
    slug: Option<String>,

    /// Preview URL discovery method
    #[arg(long, value_enum, default_value = "auto")]
    method: MethodFlag,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long)]
    quiet: bool,
}

#[derive(Copy, Clone, ValueEnum)]
enum MethodFlag {
    Auto,
    Http,
    Playwright,
}

impl MethodFlag {
    const fn as_domain(self) -> Method {
        match self {
            Self::Auto => Method::Auto,
            Self::Http => Method::Http,
            Self::Playwright => Method::Playwright,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        eprintln!("Retry tips:");
        eprintln!("- Use --method auto for HTTP-first with Playwright fallback.");
        eprintln!("- Use --method playwright if template parsing is unstable.");
        eprintln!("- Ensure the URL is a v0 template page or preview URL.");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let source_url =
        reqwest::Url::parse(&cli.url).with_context(|| format!("Invalid URL: {}", cli.url))?;

    let slug = slug::derive_slug(&source_url, cli.slug.as_deref())?;
    let output_root = if cli.out.is_absolute() {
        cli.out.clone()
    } else {
        env::current_dir()
            .context("Failed to resolve current directory")?
            .join(&cli.out)
    };
    let output_dir = output_root.join(&slug);

    let method = cli.method.as_domain();
    let client = fetch::build_client()?;
    let discovery = discover::resolve_preview_url(&client, &source_url, method).await?;
    log::info!(
        "Preview URL ({}): {}",
        discovery.method,
        discovery.preview_url
    );

    let preview_html = fetch::fetch_text(&client, &discovery.preview_url).await?;
    let extraction = v0_flight::extract_files(&preview_html)?;

    let written = output::write_files(&output_dir, &extraction.files)?;
    let manifest = manifest::ExtractionManifest::new(
        source_url.as_str(),
        &discovery,
        method,
        &output_dir,
        &written,
        &extraction.unresolved,
    );
    let manifest_path = manifest::write_manifest(&output_dir, &manifest)?;

    println!("Extracted {} file(s) to {}", written.len(), output_dir.display());
    for file in &written {
        println!("- {} ({} bytes)", file.name, file.bytes);
    }
    if !extraction.unresolved.is_empty() {
        let missing: Vec<String> = extraction
            .unresolved
            .iter()
            .map(v0_flight::UnresolvedRef::describe)
            .collect();
        println!("Warning: unresolved references -> {}", missing.join(", "));
    }
    println!("Metadata: {}", manifest_path.display());

    Ok(())
}
