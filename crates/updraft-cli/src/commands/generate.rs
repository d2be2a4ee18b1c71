use super::{json_pretty, spin_fail, spin_ok, spinner, EXIT_PRECONDITION, EXIT_SUCCESS};
use crate::scan::{scan_root, split_masks, ScanOptions};
use crate::settings::Settings;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tracing::warn;
use updraft_manifest::{
    AppVersion, CopyMethod, DeployManifestFile, ManifestModel, Platform, PostUpdateCommand,
    UpdateManifest, XmlManifestFile,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Markup manifest document (`update.xml`).
    Xml,
    /// Deployment toolchain manifest (`update.manifest`).
    Deploy,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Update source folder the shipped files live under.
    #[arg(long)]
    pub root: Option<String>,

    /// Manifest format to produce.
    #[arg(long, value_enum)]
    pub format: Option<Format>,

    /// Include masks, semicolon separated (e.g. "*.exe;*.dll").
    #[arg(long)]
    pub include: Option<String>,

    /// Exclude masks, semicolon separated.
    #[arg(long)]
    pub exclude: Option<String>,

    /// Recurse into subfolders.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub recursive: Option<bool>,

    /// Compute size and content digest for discovered files.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub validate: Option<bool>,

    /// Target subpath the installer copies discovered files into.
    #[arg(long)]
    pub target_path: Option<String>,

    /// Product (application) identifier.
    #[arg(long)]
    pub product: Option<String>,

    /// Publisher identifier.
    #[arg(long)]
    pub publisher: Option<String>,

    /// Human-readable update description.
    #[arg(long)]
    pub description: Option<String>,

    /// Platform the update applies to (any, x86, x64, ia64).
    #[arg(long)]
    pub platform: Option<String>,

    /// Minimum installed version the update applies to.
    #[arg(long)]
    pub target_version: Option<String>,

    /// Version the update brings the application to.
    #[arg(long)]
    pub new_version: Option<String>,

    /// Where installers fetch the update package from.
    #[arg(long)]
    pub location: Option<String>,

    /// Transport for the update package (file, http, ftp).
    #[arg(long)]
    pub copy_method: Option<String>,

    /// Executable to run after the update is applied.
    #[arg(long)]
    pub run: Option<String>,

    /// Arguments for the post-update executable.
    #[arg(long)]
    pub run_args: Option<String>,

    /// Target subpath of the post-update executable.
    #[arg(long)]
    pub run_path: Option<String>,

    /// Delete the post-update executable after it ran.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub delete_after_run: Option<bool>,

    /// Default manifest file name, remembered across runs.
    #[arg(long)]
    pub manifest_name: Option<String>,

    /// Write the manifest to this exact path (not remembered).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Settings file to load defaults from and save back to.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Skip loading and saving persisted settings.
    #[arg(long, default_value_t = false)]
    pub no_settings: bool,
}

fn override_string(target: &mut String, value: Option<&String>) {
    if let Some(v) = value {
        target.clone_from(v);
    }
}

fn override_bool(target: &mut bool, value: Option<bool>) {
    if let Some(v) = value {
        *target = v;
    }
}

fn apply_overrides(settings: &mut Settings, args: &GenerateArgs) {
    override_string(&mut settings.root_folder, args.root.as_ref());
    override_string(&mut settings.include_mask, args.include.as_ref());
    override_string(&mut settings.exclude_mask, args.exclude.as_ref());
    override_bool(&mut settings.include_subfolders, args.recursive);
    override_bool(&mut settings.use_validation, args.validate);
    override_string(&mut settings.target_path, args.target_path.as_ref());
    override_string(&mut settings.product, args.product.as_ref());
    override_string(&mut settings.publisher, args.publisher.as_ref());
    override_string(&mut settings.description, args.description.as_ref());
    override_string(&mut settings.platform, args.platform.as_ref());
    override_string(&mut settings.target_version, args.target_version.as_ref());
    override_string(&mut settings.new_version, args.new_version.as_ref());
    override_string(&mut settings.update_location, args.location.as_ref());
    override_string(&mut settings.copy_method, args.copy_method.as_ref());
    override_string(&mut settings.run_command, args.run.as_ref());
    override_string(&mut settings.run_arguments, args.run_args.as_ref());
    override_string(&mut settings.run_path, args.run_path.as_ref());
    override_bool(&mut settings.delete_after_run, args.delete_after_run);
    override_string(&mut settings.manifest_file_name, args.manifest_name.as_ref());
    if let Some(format) = args.format {
        settings.format = match format {
            Format::Xml => "xml".to_owned(),
            Format::Deploy => "deploy".to_owned(),
        };
    }
}

fn resolve_format(settings: &Settings) -> Format {
    if settings.format.eq_ignore_ascii_case("deploy") {
        Format::Deploy
    } else {
        Format::Xml
    }
}

/// Lenient version parsing: a malformed value means "unset".
fn parse_version(value: &str) -> Option<AppVersion> {
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("ignoring malformed version '{value}': {e}");
            None
        }
    }
}

fn populate(model: &mut ManifestModel, settings: &Settings) {
    model.use_validation = settings.use_validation;
    model.product.clone_from(&settings.product);
    model.publisher.clone_from(&settings.publisher);
    model.description = (!settings.description.is_empty()).then(|| settings.description.clone());
    model.platform = settings.platform.parse().unwrap_or(Platform::Any);
    model.copy_method = settings.copy_method.parse().unwrap_or(CopyMethod::File);
    model.target_version = parse_version(&settings.target_version);
    model.new_version = parse_version(&settings.new_version);
    model.update_location.clone_from(&settings.update_location);

    if !settings.run_command.is_empty() {
        let mut command = PostUpdateCommand::new(&settings.run_command)
            .with_delete_after_run(settings.delete_after_run);
        if !settings.run_arguments.is_empty() {
            command = command.with_arguments(&settings.run_arguments);
        }
        if !settings.run_path.is_empty() {
            command = command.with_target_path(&settings.run_path);
        }
        model.set_post_update_command(command);
    }
}

fn open_manifest(format: Format, settings: &Settings) -> Box<dyn UpdateManifest> {
    let root = settings.root_folder.clone();
    let name = &settings.manifest_file_name;
    match (format, name.is_empty()) {
        (Format::Xml, true) => Box::new(XmlManifestFile::new(root)),
        (Format::Xml, false) => Box::new(XmlManifestFile::with_file_name(root, name)),
        (Format::Deploy, true) => Box::new(DeployManifestFile::new(root)),
        (Format::Deploy, false) => Box::new(DeployManifestFile::with_file_name(root, name)),
    }
}

pub fn run(args: &GenerateArgs, json: bool) -> Result<u8, String> {
    let mut settings = if args.no_settings {
        Settings::default()
    } else {
        Settings::load(args.settings.as_deref()).map_err(|e| e.to_string())?
    };
    apply_overrides(&mut settings, args);
    if !args.no_settings {
        // A failed save is not worth aborting the build over.
        if let Err(e) = settings.save(args.settings.as_deref()) {
            warn!("could not save settings: {e}");
        }
    }

    let format = resolve_format(&settings);
    let mut manifest = open_manifest(format, &settings);
    populate(manifest.model_mut(), &settings);

    let pb = if json {
        None
    } else {
        Some(spinner("scanning update root..."))
    };

    let root = PathBuf::from(&settings.root_folder);
    if root.is_dir() {
        let options = ScanOptions {
            include: split_masks(&settings.include_mask),
            exclude: split_masks(&settings.exclude_mask),
            recursive: settings.include_subfolders,
        };
        let files = match scan_root(&root, &options) {
            Ok(files) => files,
            Err(e) => {
                if let Some(ref pb) = pb {
                    spin_fail(pb, "scan failed");
                }
                return Err(format!("invalid file mask: {e}"));
            }
        };
        let destination = (!settings.target_path.is_empty()).then_some(settings.target_path.as_str());
        for name in &files {
            manifest.add_file_reference(name, destination);
        }
    }

    if let Some(ref pb) = pb {
        pb.set_message("writing manifest...");
    }
    let status = match manifest.create_document(args.output.as_deref()) {
        Ok(status) => status,
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "manifest write failed");
            }
            return Err(e.to_string());
        }
    };

    if let Some(ref pb) = pb {
        if status.is_success() {
            spin_ok(pb, "manifest created");
        } else {
            spin_fail(pb, &status.to_string());
        }
    }

    if json {
        let payload = serde_json::json!({
            "status": status,
            "code": status.code(),
            "file_references": manifest.file_list_len(),
        });
        println!("{}", json_pretty(&payload)?);
    } else if status.is_success() {
        println!(
            "manifest created with {} file reference(s)",
            manifest.file_list_len()
        );
    } else {
        eprintln!(
            "{} {status} (error {})",
            console::style("can't create manifest:").red().bold(),
            status.code()
        );
    }

    Ok(if status.is_success() {
        EXIT_SUCCESS
    } else {
        EXIT_PRECONDITION
    })
}
