//! The deployment-manifest object graph.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identity block naming the deployed application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyIdentity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_architecture: Option<String>,
}

/// A file shipped by the deployment.
///
/// `source_path` is the path as handed in by the producer, usually
/// relative; [`DeploymentManifest::resolve_files`] turns it into
/// `resolved_path`, and [`DeploymentManifest::update_file_info`] fills
/// `size`/`hash` from the resolved file. The resolved path never appears
/// in the written document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    pub source_path: String,
    /// Target group/subpath the installer copies the file into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Base64 SHA-1 content digest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip)]
    pub resolved_path: Option<PathBuf>,
}

impl FileReference {
    pub fn new(source_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            ..Self::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// An assembly shipped by the deployment. Same resolution and digesting
/// rules as a [`FileReference`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReference {
    pub source_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip)]
    pub resolved_path: Option<PathBuf>,
}

impl AssemblyReference {
    pub fn new(source_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            ..Self::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// The deployment manifest document model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentManifest {
    pub product: String,
    pub publisher: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub assembly_identity: AssemblyIdentity,
    /// Oldest installed version this deployment upgrades.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_required_version: Option<String>,
    pub deployment_url: String,
    /// Free-form support/metadata URL field. Producers are known to
    /// overload it; this crate stores whatever it is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_references: Vec<FileReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assembly_references: Vec<AssemblyReference>,
    /// Where the document is written when no explicit path is passed to
    /// the writer. Not part of the document itself.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}
