//! The deployment-toolchain manifest encoding.
//!
//! This encoder maps the model onto [`updraft_deploy`]'s object graph and
//! delegates file resolution and digesting to that crate. The deployment
//! object has no field for a post-update command, so the command is packed
//! into the support-URL field as `executable;targetPath;arguments;deleteFlag`
//! — a deliberate overload of an otherwise unused field, kept behind the
//! [`encode_support_url`]/[`decode_support_url`] pair so consumers of the
//! written manifest can undo it.

use crate::manifest::{ManifestModel, PostUpdateCommand, UpdateManifest};
use crate::preflight;
use crate::reference::{AssemblyReference, FileReference};
use crate::types::BuildStatus;
use crate::ManifestError;
use std::path::{Path, PathBuf};
use tracing::info;
use updraft_deploy::{write_manifest, AssemblyIdentity, DeploymentManifest};

const DEFAULT_MANIFEST_FILENAME: &str = "update.manifest";

/// Pack a post-update command into the support-URL field.
///
/// Unset segments render as empty strings; the delete flag renders as
/// `true`/`false`.
pub fn encode_support_url(command: &PostUpdateCommand) -> String {
    format!(
        "{};{};{};{}",
        command.executable,
        command.target_path.as_deref().unwrap_or_default(),
        command.arguments.as_deref().unwrap_or_default(),
        command.delete_after_run
    )
}

/// Undo [`encode_support_url`]. Returns `None` unless the value has
/// exactly four segments and a non-empty executable. The delete flag also
/// accepts `True`/`False`, the spelling older producers emitted.
pub fn decode_support_url(value: &str) -> Option<PostUpdateCommand> {
    let segments: Vec<&str> = value.split(';').collect();
    let [executable, target_path, arguments, delete] = segments.as_slice() else {
        return None;
    };
    if executable.is_empty() {
        return None;
    }
    let delete_after_run = match delete.to_ascii_lowercase().as_str() {
        "true" => true,
        "false" => false,
        _ => return None,
    };
    let mut command = PostUpdateCommand::new(*executable).with_delete_after_run(delete_after_run);
    if !target_path.is_empty() {
        command = command.with_target_path(*target_path);
    }
    if !arguments.is_empty() {
        command = command.with_arguments(*arguments);
    }
    Some(command)
}

/// An update manifest rendered through the deployment toolchain.
///
/// Unlike the markup encoding, references are handed over unvalidated and
/// the toolchain computes size/digest during the build — and assembly
/// references are fully supported.
#[derive(Debug)]
pub struct DeployManifestFile {
    root_path: PathBuf,
    manifest_file_name: Option<String>,
    model: ManifestModel,
}

impl DeployManifestFile {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            manifest_file_name: None,
            model: ManifestModel::new(),
        }
    }

    /// Like [`DeployManifestFile::new`], with a default output file name
    /// used when `create_document` is called without a path. A relative
    /// name resolves against the root path.
    pub fn with_file_name(root_path: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            manifest_file_name: Some(file_name.into()),
            model: ManifestModel::new(),
        }
    }

    fn document_path(&self) -> PathBuf {
        match &self.manifest_file_name {
            Some(name) => {
                let path = PathBuf::from(name);
                if path.is_absolute() {
                    path
                } else {
                    self.root_path.join(path)
                }
            }
            None => self.root_path.join(DEFAULT_MANIFEST_FILENAME),
        }
    }

    fn to_deployment(&self) -> DeploymentManifest {
        let model = &self.model;
        DeploymentManifest {
            product: model.product.clone(),
            publisher: model.publisher.clone(),
            description: model.description.clone().filter(|d| !d.is_empty()),
            assembly_identity: AssemblyIdentity {
                name: model.product.clone(),
                version: model.new_version.as_ref().map(ToString::to_string),
                processor_architecture: Some(model.platform.to_string()),
            },
            minimum_required_version: model.target_version.as_ref().map(ToString::to_string),
            deployment_url: model.normalized_location(),
            support_url: model
                .post_update_command
                .as_ref()
                .filter(|c| !c.executable.is_empty())
                .map(encode_support_url),
            file_references: model.files.iter().map(to_deploy_file).collect(),
            assembly_references: model.assemblies.iter().map(to_deploy_assembly).collect(),
            source_path: Some(self.document_path()),
        }
    }
}

fn to_deploy_file(reference: &FileReference) -> updraft_deploy::FileReference {
    updraft_deploy::FileReference {
        source_path: reference.name.clone(),
        group: reference.destination.clone(),
        size: reference.size,
        hash: reference.digest.clone(),
        resolved_path: None,
    }
}

fn to_deploy_assembly(reference: &AssemblyReference) -> updraft_deploy::AssemblyReference {
    updraft_deploy::AssemblyReference {
        source_path: reference.name.clone(),
        group: reference.destination.clone(),
        size: reference.size,
        hash: reference.digest.clone(),
        resolved_path: None,
    }
}

impl UpdateManifest for DeployManifestFile {
    fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn model(&self) -> &ManifestModel {
        &self.model
    }

    fn model_mut(&mut self) -> &mut ManifestModel {
        &mut self.model
    }

    fn add_assembly_reference(&mut self, name: &str, destination: Option<&str>) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        Some(self
            .model
            .assemblies
            .push(AssemblyReference::new(name, destination)))
    }

    fn assembly_reference_index(&self, name: &str) -> Option<usize> {
        self.model.assemblies.index_of(name)
    }

    fn remove_assembly_reference_at(&mut self, index: usize) -> bool {
        self.model.assemblies.remove_at(index)
    }

    fn remove_assembly_reference(&mut self, name: &str) -> bool {
        self.model.assemblies.remove_named(name)
    }

    fn clear_assembly_references(&mut self) {
        self.model.assemblies.clear();
    }

    fn assembly_list_len(&self) -> usize {
        self.model.assemblies.len()
    }

    fn assembly_list_capacity(&self) -> usize {
        self.model.assemblies.capacity()
    }

    fn set_assembly_list_capacity(&mut self, capacity: usize) {
        self.model.assemblies.set_capacity(capacity);
    }

    fn create_document(&mut self, path: Option<&Path>) -> Result<BuildStatus, ManifestError> {
        let status = preflight::check(&self.root_path, &self.model);
        if !status.is_success() {
            return Ok(status);
        }

        self.ensure_post_update_command_reference();

        let mut deployment = self.to_deployment();
        deployment.resolve_files(&[self.root_path.as_path()]);
        if self.model.use_validation {
            deployment.update_file_info();
        }

        match path.filter(|p| !p.as_os_str().is_empty()) {
            Some(p) => write_manifest(&deployment, p)?,
            None => deployment.write()?,
        }

        info!("wrote deployment manifest for '{}'", self.model.product);
        Ok(BuildStatus::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AppVersion, CopyMethod, Platform};
    use std::fs;

    fn ready_manifest(root: &Path) -> DeployManifestFile {
        let mut manifest = DeployManifestFile::new(root);
        manifest.model_mut().product = "Editor".to_owned();
        manifest.model_mut().publisher = "Acme".to_owned();
        manifest.model_mut().update_location = "host\\updates".to_owned();
        manifest.model_mut().copy_method = CopyMethod::Http;
        manifest.model_mut().new_version = Some("2.0.1".parse::<AppVersion>().unwrap());
        manifest
    }

    #[test]
    fn support_url_roundtrip() {
        let command = PostUpdateCommand::new("setup.exe")
            .with_arguments("/quiet /norestart")
            .with_target_path("tools")
            .with_delete_after_run(true);
        let encoded = encode_support_url(&command);
        assert_eq!(encoded, "setup.exe;tools;/quiet /norestart;true");
        assert_eq!(decode_support_url(&encoded).unwrap(), command);
    }

    #[test]
    fn support_url_renders_unset_segments_empty() {
        let command = PostUpdateCommand::new("setup.exe");
        assert_eq!(encode_support_url(&command), "setup.exe;;;false");
        assert_eq!(decode_support_url("setup.exe;;;false").unwrap(), command);
    }

    #[test]
    fn decode_accepts_dotnet_boolean_spelling() {
        let command = decode_support_url("run.exe;;;True").unwrap();
        assert!(command.delete_after_run);
    }

    #[test]
    fn decode_rejects_malformed_values() {
        assert_eq!(decode_support_url("not-a-command"), None);
        assert_eq!(decode_support_url(";;;false"), None);
        assert_eq!(decode_support_url("a;b;c;maybe"), None);
        assert_eq!(decode_support_url("a;b;c;d;e"), None);
    }

    #[test]
    fn document_maps_identity_and_location() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = ready_manifest(dir.path());
        manifest.model_mut().platform = Platform::X64;
        manifest.model_mut().target_version = Some("1.5".parse::<AppVersion>().unwrap());
        manifest.model_mut().description = Some("bugfix release".to_owned());

        let status = manifest.create_document(None).unwrap();
        assert!(status.is_success());

        let text = fs::read_to_string(dir.path().join("update.manifest")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["product"], "Editor");
        assert_eq!(doc["publisher"], "Acme");
        assert_eq!(doc["description"], "bugfix release");
        assert_eq!(doc["assembly_identity"]["name"], "Editor");
        assert_eq!(doc["assembly_identity"]["version"], "2.0.1");
        assert_eq!(doc["assembly_identity"]["processor_architecture"], "x64");
        assert_eq!(doc["minimum_required_version"], "1.5");
        assert_eq!(doc["deployment_url"], "http://host/updates");
    }

    #[test]
    fn toolchain_populates_file_info_when_validation_enabled() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.exe"), b"hello world").unwrap();

        let mut manifest = ready_manifest(dir.path());
        manifest.add_file_reference("app.exe", Some("bin")).unwrap();
        // the engine-side reference carries no validation data
        assert_eq!(manifest.model().files.get(0).unwrap().size, None);

        manifest.create_document(None).unwrap();

        let text = fs::read_to_string(dir.path().join("update.manifest")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        let file = &doc["file_references"][0];
        assert_eq!(file["source_path"], "app.exe");
        assert_eq!(file["group"], "bin");
        assert_eq!(file["size"], 11);
        assert_eq!(file["hash"], "Kq5sNclPz7QV2+lfQIuc6R7oRu0=");
    }

    #[test]
    fn validation_disabled_ships_references_without_file_info() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.exe"), b"hello world").unwrap();

        let mut manifest = ready_manifest(dir.path());
        manifest.model_mut().use_validation = false;
        manifest.add_file_reference("app.exe", None).unwrap();
        manifest.create_document(None).unwrap();

        let text = fs::read_to_string(dir.path().join("update.manifest")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(doc["file_references"][0].get("size").is_none());
        assert!(doc["file_references"][0].get("hash").is_none());
    }

    #[test]
    fn command_is_encoded_and_its_executable_shipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = ready_manifest(dir.path());
        manifest.set_post_update_command(
            PostUpdateCommand::new("setup.exe").with_target_path("tools"),
        );
        manifest.create_document(None).unwrap();

        let text = fs::read_to_string(dir.path().join("update.manifest")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["support_url"], "setup.exe;tools;;false");
        assert_eq!(doc["file_references"][0]["source_path"], "setup.exe");
        assert_eq!(doc["file_references"][0]["group"], "tools");
    }

    #[test]
    fn assembly_references_are_fully_supported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lib.dll"), b"dll bytes").unwrap();

        let mut manifest = ready_manifest(dir.path());
        assert_eq!(manifest.add_assembly_reference("lib.dll", None), Some(0));
        assert_eq!(manifest.assembly_reference_index("LIB.DLL"), Some(0));
        assert_eq!(manifest.assembly_list_len(), 1);
        manifest.set_assembly_list_capacity(8);
        assert!(manifest.assembly_list_capacity() >= 8);

        manifest.create_document(None).unwrap();
        let text = fs::read_to_string(dir.path().join("update.manifest")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["assembly_references"][0]["source_path"], "lib.dll");
        assert_eq!(doc["assembly_references"][0]["size"], 9);

        assert!(manifest.remove_assembly_reference("lib.dll"));
        assert_eq!(manifest.assembly_list_len(), 0);
    }

    #[test]
    fn explicit_path_overrides_the_configured_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = ready_manifest(dir.path());
        let out = dir.path().join("custom.manifest");
        manifest.create_document(Some(&out)).unwrap();
        assert!(out.exists());
        assert!(!dir.path().join("update.manifest").exists());
    }

    #[test]
    fn relative_configured_name_resolves_under_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = DeployManifestFile::with_file_name(dir.path(), "release.manifest");
        manifest.model_mut().product = "App".to_owned();
        manifest.model_mut().publisher = "Acme".to_owned();
        manifest.model_mut().update_location = "u".to_owned();
        manifest.model_mut().new_version = Some("1.0".parse::<AppVersion>().unwrap());

        manifest.create_document(None).unwrap();
        assert!(dir.path().join("release.manifest").exists());
    }

    #[test]
    fn precondition_order_matches_the_markup_encoder() {
        let mut manifest = DeployManifestFile::new("");
        assert_eq!(
            manifest.create_document(None).unwrap(),
            BuildStatus::RootPathNotSpecified
        );

        let dir = tempfile::tempdir().unwrap();
        let mut manifest = DeployManifestFile::new(dir.path());
        manifest.model_mut().product = "App".to_owned();
        manifest.model_mut().publisher = "Acme".to_owned();
        assert_eq!(
            manifest.create_document(None).unwrap(),
            BuildStatus::NewVersionNotSpecified
        );
    }
}
