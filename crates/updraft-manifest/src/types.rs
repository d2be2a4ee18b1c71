//! Shared value types: transport method, target platform, build status
//! codes, and application version numbers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How the update package is fetched by the installer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyMethod {
    /// Plain filesystem copy from a local or UNC path.
    #[default]
    File,
    Http,
    Ftp,
}

impl CopyMethod {
    /// URL scheme name used when prefixing an update location.
    pub fn scheme(self) -> &'static str {
        match self {
            CopyMethod::File => "file",
            CopyMethod::Http => "http",
            CopyMethod::Ftp => "ftp",
        }
    }

    /// Network transports get slash normalization and a scheme prefix;
    /// local file copy never does.
    pub fn is_network(self) -> bool {
        matches!(self, CopyMethod::Http | CopyMethod::Ftp)
    }
}

impl fmt::Display for CopyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

impl FromStr for CopyMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(CopyMethod::File),
            "http" => Ok(CopyMethod::Http),
            "ftp" => Ok(CopyMethod::Ftp),
            other => Err(format!("unknown copy method: {other}")),
        }
    }
}

/// Processor platform the update applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[default]
    Any,
    X86,
    X64,
    Ia64,
}

impl Platform {
    /// Text form used in both manifest encodings.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Any => "Any",
            Platform::X86 => "x86",
            Platform::X64 => "x64",
            Platform::Ia64 => "ia64",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Ok(Platform::Any),
            "x86" => Ok(Platform::X86),
            "x64" => Ok(Platform::X64),
            "ia64" => Ok(Platform::Ia64),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// Outcome of a `create_document` call.
///
/// Preconditions are reported by value in a fixed order; callers can rely
/// on receiving the *first* unmet precondition, never an aggregate. The
/// numeric codes are part of the manifest tooling contract and are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    Success,
    RootPathNotSpecified,
    ProductNotSpecified,
    PublisherNotSpecified,
    UpdateLocationNotSpecified,
    NewVersionNotSpecified,
    RootPathNotFound,
}

impl BuildStatus {
    /// Stable integer code: `0` for success, `-1..=-6` per failed check.
    pub fn code(self) -> i32 {
        match self {
            BuildStatus::Success => 0,
            BuildStatus::RootPathNotSpecified => -1,
            BuildStatus::ProductNotSpecified => -2,
            BuildStatus::PublisherNotSpecified => -3,
            BuildStatus::UpdateLocationNotSpecified => -4,
            BuildStatus::NewVersionNotSpecified => -5,
            BuildStatus::RootPathNotFound => -6,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, BuildStatus::Success)
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            BuildStatus::Success => "manifest created",
            BuildStatus::RootPathNotSpecified => "root path not specified",
            BuildStatus::ProductNotSpecified => "product not specified",
            BuildStatus::PublisherNotSpecified => "publisher not specified",
            BuildStatus::UpdateLocationNotSpecified => "update location not specified",
            BuildStatus::NewVersionNotSpecified => "new application version not specified",
            BuildStatus::RootPathNotFound => "root path not found on disk",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("version must have 2 to 4 dot-separated components, got {0}")]
    ComponentCount(usize),
    #[error("invalid version component '{0}'")]
    InvalidComponent(String),
}

/// Application version number: 2 to 4 dot-separated numeric components.
///
/// The model only ever stores parsed values; front-ends are expected to
/// run `FromStr` on raw input and treat a parse failure as "unset".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppVersion {
    components: Vec<u32>,
}

impl AppVersion {
    pub fn new(components: &[u32]) -> Result<Self, VersionError> {
        if !(2..=4).contains(&components.len()) {
            return Err(VersionError::ComponentCount(components.len()));
        }
        Ok(Self {
            components: components.to_vec(),
        })
    }
}

impl FromStr for AppVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if !(2..=4).contains(&parts.len()) {
            return Err(VersionError::ComponentCount(parts.len()));
        }
        let mut components = Vec::with_capacity(parts.len());
        for part in parts {
            let n: u32 = part
                .parse()
                .map_err(|_| VersionError::InvalidComponent(part.to_owned()))?;
            components.push(n);
        }
        Ok(Self { components })
    }
}

impl TryFrom<String> for AppVersion {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AppVersion> for String {
    fn from(v: AppVersion) -> Self {
        v.to_string()
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for c in &self.components {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{c}")?;
            first = false;
        }
        Ok(())
    }
}
