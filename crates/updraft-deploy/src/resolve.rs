//! Source-path resolution and file info population.

use crate::manifest::DeploymentManifest;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha1::{Digest, Sha1};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

fn resolve_one(source_path: &str, search_paths: &[&Path]) -> Option<PathBuf> {
    let source = Path::new(source_path);
    if source.is_absolute() {
        return source.is_file().then(|| source.to_path_buf());
    }
    for base in search_paths {
        let candidate = base.join(source);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

fn file_info(path: &Path) -> Option<(u64, String)> {
    match fs::read(path) {
        Ok(data) => {
            let mut hasher = Sha1::new();
            hasher.update(&data);
            let hash = STANDARD.encode(hasher.finalize());
            Some((data.len() as u64, hash))
        }
        Err(e) => {
            warn!("cannot read {} for file info: {e}", path.display());
            None
        }
    }
}

impl DeploymentManifest {
    /// Resolve every reference's source path against the search
    /// directories, first match wins. References that resolve nowhere are
    /// left unresolved — the manifest still ships them, without file info.
    pub fn resolve_files(&mut self, search_paths: &[&Path]) {
        for reference in &mut self.file_references {
            reference.resolved_path = resolve_one(&reference.source_path, search_paths);
            if reference.resolved_path.is_none() {
                debug!("file reference '{}' did not resolve", reference.source_path);
            }
        }
        for reference in &mut self.assembly_references {
            reference.resolved_path = resolve_one(&reference.source_path, search_paths);
            if reference.resolved_path.is_none() {
                debug!(
                    "assembly reference '{}' did not resolve",
                    reference.source_path
                );
            }
        }
    }

    /// Fill size and digest for every resolved reference. Unresolved
    /// references are skipped.
    pub fn update_file_info(&mut self) {
        for reference in &mut self.file_references {
            if let Some((size, hash)) = reference.resolved_path.as_deref().and_then(file_info) {
                reference.size = Some(size);
                reference.hash = Some(hash);
            }
        }
        for reference in &mut self.assembly_references {
            if let Some((size, hash)) = reference.resolved_path.as_deref().and_then(file_info) {
                reference.size = Some(size);
                reference.hash = Some(hash);
            }
        }
    }
}
