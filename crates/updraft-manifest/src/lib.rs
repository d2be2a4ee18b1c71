//! Update manifest construction engine for Updraft.
//!
//! This crate defines the manifest model (`ManifestModel`), the ordered
//! reference lists for files and assemblies (`ReferenceList`), content
//! validation (`validate_file`), update-location normalization, the
//! precondition pipeline gating every build, and the two interchangeable
//! manifest encodings: the markup document (`XmlManifestFile`) and the
//! deployment toolchain format (`DeployManifestFile`). Both are driven
//! through the [`UpdateManifest`] trait, so front-ends stay
//! format-agnostic.

pub mod deploy;
pub mod location;
pub mod manifest;
pub mod preflight;
pub mod reference;
pub mod types;
pub mod validate;
pub mod xml;

pub use deploy::{decode_support_url, encode_support_url, DeployManifestFile};
pub use location::normalize_location;
pub use manifest::{ManifestModel, PostUpdateCommand, UpdateManifest};
pub use reference::{AssemblyReference, FileReference, Named, ReferenceList};
pub use types::{AppVersion, BuildStatus, CopyMethod, Platform, VersionError};
pub use validate::{validate_file, Validation};
pub use xml::XmlManifestFile;

use thiserror::Error;

/// Failures that escape a build as hard errors. Missing preconditions are
/// not errors — they come back as [`BuildStatus`] values.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("deployment toolchain error: {0}")]
    Deploy(#[from] updraft_deploy::DeployError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_error_display_io() {
        let e = ManifestError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(e.to_string().contains("denied"));
    }

    #[test]
    fn manifest_error_wraps_deploy_errors() {
        let e = ManifestError::Deploy(updraft_deploy::DeployError::MissingSourcePath);
        assert!(e.to_string().contains("deployment"));
    }

    // Both encoders are reachable behind the trait, so front-ends can
    // pick a format at runtime.
    #[test]
    fn encoders_are_object_safe() {
        let manifests: Vec<Box<dyn UpdateManifest>> = vec![
            Box::new(XmlManifestFile::new("/tmp")),
            Box::new(DeployManifestFile::new("/tmp")),
        ];
        assert_eq!(manifests.len(), 2);
    }
}
