use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as AnyhowContext, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use v0_flight::UnresolvedRef;

use crate::discover::{Discovery, Method};
use crate::output::WrittenFile;

/// Per-file entry in the manifest.
#[derive(Debug, Serialize)]
pub struct ManifestFile {
    pub name: String,
    pub bytes: usize,
}

/// Extraction metadata persisted as `metadata.json` next to the files.
///
/// Field names are camelCase on disk so the manifest reads like the preview
/// payload it describes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionManifest {
    pub source_url: String,
    pub preview_url: String,
    pub requested_method: String,
    pub discover_method: String,
    pub extracted_at: String,
    pub output_dir: String,
    pub file_count: usize,
    pub files: Vec<ManifestFile>,
    pub unresolved_references: Vec<String>,
}

impl ExtractionManifest {
    pub fn new(
        source_url: &str,
        discovery: &Discovery,
        requested: Method,
        output_dir: &Path,
        written: &[WrittenFile],
        unresolved: &[UnresolvedRef],
    ) -> Self {
        Self {
            source_url: source_url.to_string(),
            preview_url: discovery.preview_url.clone(),
            requested_method: requested.as_str().to_string(),
            discover_method: discovery.method.as_str().to_string(),
            extracted_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            output_dir: output_dir.display().to_string(),
            file_count: written.len(),
            files: written
                .iter()
                .map(|file| ManifestFile {
                    name: file.name.clone(),
                    bytes: file.bytes,
                })
                .collect(),
            unresolved_references: unresolved.iter().map(UnresolvedRef::describe).collect(),
        }
    }
}

/// Write the manifest into the output directory, returning its path.
pub fn write_manifest(output_dir: &Path, manifest: &ExtractionManifest) -> Result<PathBuf> {
    let path = output_dir.join("metadata.json");
    let body =
        serde_json::to_string_pretty(manifest).context("Failed to serialize metadata")?;
    fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
