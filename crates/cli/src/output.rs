use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context as AnyhowContext, Result};
use v0_flight::ResolvedFile;

/// One file persisted to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub name: String,
    pub bytes: usize,
    pub path: PathBuf,
}

/// Join a decoded file name onto the output directory, rejecting names that
/// would escape it.
///
/// Decoded names use `/`, but `\` is treated as a separator for the
/// traversal check as well.
fn safe_output_path(base_dir: &Path, file_name: &str) -> Result<PathBuf> {
    let trimmed = file_name.trim_start_matches(['/', '\\']);
    if trimmed.is_empty() {
        anyhow::bail!("Unsafe output path rejected: {file_name}");
    }
    if trimmed.split(['/', '\\']).any(|step| step == "..") {
        anyhow::bail!("Unsafe output path rejected: {file_name}");
    }

    let rel = Path::new(trimmed);
    let mut has_component = false;
    for component in rel.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::ParentDir => {
                anyhow::bail!("Unsafe output path rejected: {file_name}");
            }
            Component::CurDir => {}
            Component::Normal(_) => has_component = true,
        }
    }
    if !has_component {
        anyhow::bail!("Unsafe output path rejected: {file_name}");
    }

    Ok(base_dir.join(rel))
}

/// Write resolved files under `base_dir`, creating directories as needed.
pub fn write_files(base_dir: &Path, files: &[ResolvedFile]) -> Result<Vec<WrittenFile>> {
    fs::create_dir_all(base_dir)
        .with_context(|| format!("Failed to create {}", base_dir.display()))?;

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = safe_output_path(base_dir, &file.name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::debug!("Wrote {} ({} bytes)", path.display(), file.bytes);

        written.push(WrittenFile {
            name: file.name.clone(),
            bytes: file.bytes,
            path,
        });
    }

    Ok(written)
}
