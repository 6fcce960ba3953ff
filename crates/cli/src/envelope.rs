// Envelope files: one JSON-encoded document per file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use docket_engine::AnyDocument;

pub fn read(path: &Path) -> Result<AnyDocument> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read envelope `{}`", path.display()))?;
    let value = serde_json::from_str(&contents)
        .with_context(|| format!("`{}` is not valid JSON", path.display()))?;
    AnyDocument::from_value(value)
        .with_context(|| format!("`{}` is not a docket envelope", path.display()))
}

/// Replace `path` with `document` via a sibling temp file and rename, so a
/// failed write never leaves a partial envelope behind.
pub fn write(path: &Path, document: &AnyDocument) -> Result<()> {
    let mut encoded = serde_json::to_vec_pretty(document).context("failed to encode envelope")?;
    encoded.push(b'\n');

    let tmp = temp_path(path);
    fs::write(&tmp, &encoded)
        .with_context(|| format!("failed to write temp envelope `{}`", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| {
        format!("failed to move `{}` into place at `{}`", tmp.display(), path.display())
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
