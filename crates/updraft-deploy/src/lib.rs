//! Deployment manifest toolchain for Updraft.
//!
//! This crate owns the deployment-manifest object graph
//! (`DeploymentManifest` and its reference collections), resolution of
//! reference source paths against search directories, size/digest
//! population for resolved files, and the manifest writer. Callers
//! populate the model, then invoke resolve/update/write — the toolchain
//! makes no decisions about manifest content.

pub mod manifest;
pub mod resolve;
pub mod writer;

pub use manifest::{AssemblyIdentity, AssemblyReference, DeploymentManifest, FileReference};
pub use writer::write_manifest;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("deployment manifest I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("deployment manifest serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("deployment manifest has no source path and no explicit output path was given")]
    MissingSourcePath,
}
