//! The hierarchical markup manifest encoding.
//!
//! Element and attribute names are fixed identifiers understood by the
//! updater that consumes the document; they are not configurable.

use crate::manifest::{ManifestModel, UpdateManifest};
use crate::preflight;
use crate::reference::FileReference;
use crate::types::BuildStatus;
use crate::validate::validate_file;
use crate::ManifestError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

const DEFAULT_MANIFEST_FILENAME: &str = "update.xml";

/// An update manifest rendered as the markup document format.
///
/// File references added while `use_validation` is set are sized and
/// digested immediately; flipping the flag later never revisits
/// already-added references. Assembly references are not part of this
/// format — the assembly operations inherited from [`UpdateManifest`]
/// stay no-ops.
#[derive(Debug)]
pub struct XmlManifestFile {
    root_path: PathBuf,
    manifest_file_name: Option<String>,
    model: ManifestModel,
}

impl XmlManifestFile {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            manifest_file_name: None,
            model: ManifestModel::new(),
        }
    }

    /// Like [`XmlManifestFile::new`], with a default output file name used
    /// when `create_document` is called without a path.
    pub fn with_file_name(root_path: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            manifest_file_name: Some(file_name.into()),
            model: ManifestModel::new(),
        }
    }

    fn render(&self) -> String {
        let model = &self.model;
        let mut doc = String::new();
        doc.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        doc.push_str("<!--Updater Manifest File-->\n");

        doc.push_str(&format!(
            "<UpdaterManifestFile Product=\"{}\" Publisher=\"{}\" Platform=\"{}\"",
            escape(&model.product),
            escape(&model.publisher),
            model.platform
        ));
        if let Some(target) = &model.target_version {
            doc.push_str(&format!(" ApplicationTargetVersion=\"{target}\""));
        }
        doc.push_str(">\n");

        if let Some(description) = &model.description {
            if !description.is_empty() {
                doc.push_str(&format!(
                    "  <Description>{}</Description>\n",
                    escape(description)
                ));
            }
        }

        doc.push_str(&format!(
            "  <UpdateLocation>{}</UpdateLocation>\n",
            escape(&model.normalized_location())
        ));

        if let Some(new_version) = &model.new_version {
            doc.push_str(&format!(
                "  <ApplicationNewVersion>{new_version}</ApplicationNewVersion>\n"
            ));
        }

        if let Some(command) = &model.post_update_command {
            doc.push_str(&format!(
                "  <PostUpdateCommand File=\"{}\" TargetPath=\"{}\" Parameters=\"{}\" Delete=\"{}\"/>\n",
                escape(&command.executable),
                escape(command.target_path.as_deref().unwrap_or_default()),
                escape(command.arguments.as_deref().unwrap_or_default()),
                command.delete_after_run
            ));
        }

        if !model.files.is_empty() {
            doc.push_str("  <Files>\n");
            for file in model.files.iter() {
                doc.push_str(&render_item(file));
            }
            doc.push_str("  </Files>\n");
        }

        doc.push_str("</UpdaterManifestFile>\n");
        doc
    }
}

fn render_item(file: &FileReference) -> String {
    let mut item = format!("    <Item Name=\"{}\"", escape(&file.name));
    if let Some(destination) = &file.destination {
        if !destination.is_empty() {
            item.push_str(&format!(" TargetPath=\"{}\"", escape(destination)));
        }
    }
    if let Some(size) = file.size {
        item.push_str(&format!(" Size=\"{size}\""));
    }
    if let Some(digest) = &file.digest {
        item.push_str(&format!(" Hash=\"{}\"", escape(digest)));
    }
    item.push_str("/>\n");
    item
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Atomic write: temp file in the destination directory, then rename.
fn write_document(path: &Path, bytes: &[u8]) -> Result<(), ManifestError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ManifestError::Io(e.error))?;
    Ok(())
}

impl UpdateManifest for XmlManifestFile {
    fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn model(&self) -> &ManifestModel {
        &self.model
    }

    fn model_mut(&mut self) -> &mut ManifestModel {
        &mut self.model
    }

    /// Validating add: while `use_validation` is set, size and digest are
    /// computed now, against the file as it exists on disk at this moment.
    fn add_file_reference(&mut self, name: &str, destination: Option<&str>) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        let mut reference = FileReference::new(name, destination);
        if self.model.use_validation {
            if let Some(validation) = validate_file(&self.root_path, name) {
                reference.size = Some(validation.size);
                reference.digest = Some(validation.digest);
            }
        }
        Some(self.model.files.push(reference))
    }

    fn create_document(&mut self, path: Option<&Path>) -> Result<BuildStatus, ManifestError> {
        let status = preflight::check(&self.root_path, &self.model);
        if !status.is_success() {
            return Ok(status);
        }

        self.ensure_post_update_command_reference();
        let document = self.render();

        let target = path
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .or_else(|| self.manifest_file_name.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST_FILENAME));
        write_document(&target, document.as_bytes())?;

        info!("wrote markup manifest to {}", target.display());
        Ok(BuildStatus::Success)
    }
}
