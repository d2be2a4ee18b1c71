//! Deployment manifest document writer.

use crate::manifest::DeploymentManifest;
use crate::DeployError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Write the manifest document to `path` atomically: temp file in the
/// destination directory, then rename.
pub fn write_manifest(manifest: &DeploymentManifest, path: &Path) -> Result<(), DeployError> {
    let json = serde_json::to_string_pretty(manifest)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| DeployError::Io(e.error))?;

    info!("wrote deployment manifest to {}", path.display());
    Ok(())
}

impl DeploymentManifest {
    /// Write to the configured `source_path`.
    pub fn write(&self) -> Result<(), DeployError> {
        let path = self
            .source_path
            .as_deref()
            .ok_or(DeployError::MissingSourcePath)?;
        write_manifest(self, path)
    }
}
