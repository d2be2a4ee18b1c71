//! The in-memory manifest aggregate and the engine surface shared by both
//! manifest encodings.

use crate::location::normalize_location;
use crate::reference::{AssemblyReference, FileReference, ReferenceList};
use crate::types::{AppVersion, BuildStatus, CopyMethod, Platform};
use crate::ManifestError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An executable the installer runs after the update is applied.
///
/// Construct with [`PostUpdateCommand::new`] and the `with_*` methods;
/// omitted fields default to unset/false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUpdateCommand {
    pub executable: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
    #[serde(default)]
    pub delete_after_run: bool,
}

impl PostUpdateCommand {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            ..Self::default()
        }
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }

    pub fn with_target_path(mut self, target_path: impl Into<String>) -> Self {
        self.target_path = Some(target_path.into());
        self
    }

    pub fn with_delete_after_run(mut self, delete: bool) -> Self {
        self.delete_after_run = delete;
        self
    }
}

/// The mutable manifest aggregate: application identity, transport,
/// reference lists, and the optional post-update command.
///
/// Owned by a manifest file instance; encoders only ever read it during a
/// single `create_document` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestModel {
    pub product: String,
    pub publisher: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub platform: Platform,
    /// Minimum installed version the update applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_version: Option<AppVersion>,
    /// Version the update brings the application to. Required for a build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_version: Option<AppVersion>,
    #[serde(default)]
    pub copy_method: CopyMethod,
    /// Raw location as supplied by the caller, normalized at encode time.
    pub update_location: String,
    #[serde(default = "default_use_validation")]
    pub use_validation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_update_command: Option<PostUpdateCommand>,
    #[serde(default)]
    pub files: ReferenceList<FileReference>,
    #[serde(default)]
    pub assemblies: ReferenceList<AssemblyReference>,
}

fn default_use_validation() -> bool {
    true
}

impl Default for ManifestModel {
    fn default() -> Self {
        Self {
            product: String::new(),
            publisher: String::new(),
            description: None,
            platform: Platform::default(),
            target_version: None,
            new_version: None,
            copy_method: CopyMethod::default(),
            update_location: String::new(),
            use_validation: true,
            post_update_command: None,
            files: ReferenceList::new(),
            assemblies: ReferenceList::new(),
        }
    }
}

impl ManifestModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update location after copy-method-aware normalization; the value
    /// both encoders embed.
    pub fn normalized_location(&self) -> String {
        normalize_location(&self.update_location, self.copy_method)
    }

    /// Set (or replace) the post-update command. At most one exists.
    pub fn set_post_update_command(&mut self, command: PostUpdateCommand) {
        self.post_update_command = Some(command);
    }

    pub fn clear_post_update_command(&mut self) {
        self.post_update_command = None;
    }
}

/// An update manifest file being assembled: the engine surface the
/// front-end drives.
///
/// Two encodings implement this: [`XmlManifestFile`](crate::XmlManifestFile)
/// (the hierarchical markup format) and
/// [`DeployManifestFile`](crate::DeployManifestFile) (the deployment
/// toolchain format). The assembly operations are provided as fixed no-ops
/// here — the markup format has no assembly concept — and only the
/// deployment encoding overrides them.
pub trait UpdateManifest {
    /// Directory the shipped files live under; relative reference names
    /// resolve against it.
    fn root_path(&self) -> &Path;

    fn model(&self) -> &ManifestModel;

    fn model_mut(&mut self) -> &mut ManifestModel;

    /// Run the precondition pipeline and, on success, encode and write
    /// the manifest document.
    ///
    /// Unmet preconditions come back as an `Ok` status in the documented
    /// order; only I/O failures while writing the document are `Err`.
    /// `path` falls back to the configured manifest file name, then to
    /// the encoding's default.
    fn create_document(&mut self, path: Option<&Path>) -> Result<BuildStatus, ManifestError>;

    /// Add a file reference by root-relative name. Returns the new index,
    /// or `None` for an empty name.
    fn add_file_reference(&mut self, name: &str, destination: Option<&str>) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        Some(self.model_mut().files.push(FileReference::new(name, destination)))
    }

    fn file_reference_index(&self, name: &str) -> Option<usize> {
        self.model().files.index_of(name)
    }

    fn remove_file_reference_at(&mut self, index: usize) -> bool {
        self.model_mut().files.remove_at(index)
    }

    fn remove_file_reference(&mut self, name: &str) -> bool {
        self.model_mut().files.remove_named(name)
    }

    fn clear_file_references(&mut self) {
        self.model_mut().files.clear();
    }

    fn file_list_len(&self) -> usize {
        self.model().files.len()
    }

    fn file_list_capacity(&self) -> usize {
        self.model().files.capacity()
    }

    fn set_file_list_capacity(&mut self, capacity: usize) {
        self.model_mut().files.set_capacity(capacity);
    }

    fn add_assembly_reference(&mut self, _name: &str, _destination: Option<&str>) -> Option<usize> {
        None
    }

    fn assembly_reference_index(&self, _name: &str) -> Option<usize> {
        None
    }

    fn remove_assembly_reference_at(&mut self, _index: usize) -> bool {
        false
    }

    fn remove_assembly_reference(&mut self, _name: &str) -> bool {
        false
    }

    fn clear_assembly_references(&mut self) {}

    fn assembly_list_len(&self) -> usize {
        0
    }

    fn assembly_list_capacity(&self) -> usize {
        0
    }

    fn set_assembly_list_capacity(&mut self, _capacity: usize) {}

    fn set_post_update_command(&mut self, command: PostUpdateCommand) {
        self.model_mut().set_post_update_command(command);
    }

    /// The installer payload must include the program it is told to run:
    /// when a post-update command is set and its executable is not yet a
    /// file reference, add one with the command's target path as
    /// destination. Called by `create_document` after the preconditions
    /// pass.
    fn ensure_post_update_command_reference(&mut self) {
        let Some(command) = self.model().post_update_command.clone() else {
            return;
        };
        if command.executable.is_empty() {
            return;
        }
        if self.file_reference_index(&command.executable).is_none() {
            self.add_file_reference(&command.executable, command.target_path.as_deref());
        }
    }
}
