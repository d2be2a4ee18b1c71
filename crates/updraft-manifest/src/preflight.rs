//! Required-field checks gating manifest production.

use crate::manifest::ManifestModel;
use crate::types::BuildStatus;
use std::path::Path;
use tracing::debug;

/// Run the precondition pipeline over a model about to be encoded.
///
/// The checks run in a fixed order and the first unmet one wins; callers
/// depend on that, so the order here is a contract, not an implementation
/// detail: root path set, product, publisher, new version, update
/// location, root path present on disk.
pub fn check(root_path: &Path, model: &ManifestModel) -> BuildStatus {
    if root_path.as_os_str().is_empty() {
        return BuildStatus::RootPathNotSpecified;
    }
    if model.product.is_empty() {
        return BuildStatus::ProductNotSpecified;
    }
    if model.publisher.is_empty() {
        return BuildStatus::PublisherNotSpecified;
    }
    if model.new_version.is_none() {
        return BuildStatus::NewVersionNotSpecified;
    }
    if model.update_location.is_empty() {
        return BuildStatus::UpdateLocationNotSpecified;
    }
    if !root_path.is_dir() {
        return BuildStatus::RootPathNotFound;
    }
    debug!("preconditions passed for product '{}'", model.product);
    BuildStatus::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppVersion;
    use std::path::PathBuf;

    fn complete_model() -> ManifestModel {
        let mut model = ManifestModel::new();
        model.product = "App".to_owned();
        model.publisher = "Acme".to_owned();
        model.new_version = Some("1.0.0".parse::<AppVersion>().unwrap());
        model.update_location = "http://host/u".to_owned();
        model
    }

    #[test]
    fn empty_root_wins_even_with_everything_else_unset() {
        let model = ManifestModel::new();
        assert_eq!(
            check(Path::new(""), &model),
            BuildStatus::RootPathNotSpecified
        );
    }

    #[test]
    fn product_checked_before_publisher() {
        let model = ManifestModel::new();
        assert_eq!(
            check(Path::new("/tmp"), &model),
            BuildStatus::ProductNotSpecified
        );
    }

    #[test]
    fn publisher_missing_reports_minus_three() {
        let mut model = complete_model();
        model.publisher.clear();
        let status = check(Path::new("/tmp"), &model);
        assert_eq!(status, BuildStatus::PublisherNotSpecified);
        assert_eq!(status.code(), -3);
    }

    #[test]
    fn new_version_checked_before_location() {
        let mut model = complete_model();
        model.new_version = None;
        model.update_location.clear();
        assert_eq!(
            check(Path::new("/tmp"), &model),
            BuildStatus::NewVersionNotSpecified
        );
    }

    #[test]
    fn location_checked_before_root_existence() {
        let mut model = complete_model();
        model.update_location.clear();
        let missing = PathBuf::from("/no/such/directory/updraft");
        assert_eq!(
            check(&missing, &model),
            BuildStatus::UpdateLocationNotSpecified
        );
    }

    #[test]
    fn missing_root_directory_is_the_last_check() {
        let model = complete_model();
        let missing = PathBuf::from("/no/such/directory/updraft");
        assert_eq!(check(&missing, &model), BuildStatus::RootPathNotFound);
    }

    #[test]
    fn complete_model_passes() {
        let dir = tempfile::tempdir().unwrap();
        let model = complete_model();
        assert_eq!(check(dir.path(), &model), BuildStatus::Success);
    }

    #[test]
    fn target_version_is_not_required() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = complete_model();
        model.target_version = None;
        assert_eq!(check(dir.path(), &model), BuildStatus::Success);
    }
}
