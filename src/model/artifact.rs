//! Versioned artifacts: one release of a plugin or of the platform core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uc_version::VersionNumber;

use super::java::JavaVersion;

/// Whether an artifact is a plugin release or a core release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Plugin,
    Core,
}

/// Identity of an artifact: group, name, version and optional classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId {
    pub group: String,
    pub name: String,
    pub version: VersionNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

impl ArtifactId {
    pub fn new(group: impl Into<String>, name: impl Into<String>, version: VersionNumber) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version,
            classifier: None,
        }
    }

    /// `group:name:version`, the coordinate string used in release history.
    pub fn gav(&self) -> String {
        format!("{}:{}:{}", self.group, self.name, self.version)
    }
}

/// A dependency declared by a plugin release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: VersionNumber,
    #[serde(default)]
    pub optional: bool,
}

/// One immutable versioned release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,

    pub kind: ArtifactKind,

    /// Where the artifact bytes live
    pub url: String,

    /// SHA-256 of the artifact bytes, hex encoded
    pub checksum: String,

    pub released_at: DateTime<Utc>,

    /// Minimum core version the release runs on
    pub required_core: VersionNumber,

    /// Oldest version whose configuration this release still reads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatible_since: Option<VersionNumber>,

    /// Whether the release is marked safe for sandboxed use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox_safe: Option<bool>,

    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    /// Display name, when the data source knows one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_java_version: Option<JavaVersion>,

    #[serde(default)]
    pub labels: Vec<String>,
}

impl Artifact {
    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn version(&self) -> &VersionNumber {
        &self.id.version
    }

    /// Pre-release artifacts carry a version qualifier.
    pub fn is_prerelease(&self) -> bool {
        self.id.version.is_prerelease()
    }
}
