//! Output documents handed to rendering.
//!
//! Field names follow the update-center JSON format (camelCase). Maps are
//! `BTreeMap` so serialized key order never depends on insertion order.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uc_version::VersionNumber;

use crate::model::{Artifact, Dependency, JavaVersion};

/// Format version of every document; bumped on incompatible changes.
pub const UPDATE_CENTER_VERSION: &str = "1";

/// Name of the core record in `update-center.json`.
pub const CORE_NAME: &str = "core";

/// The latest release of one plugin, with display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginRecord {
    pub name: String,
    pub version: VersionNumber,
    pub title: String,
    /// Documentation page
    pub wiki: String,
    pub url: String,
    pub sha256: String,
    pub gav: String,
    pub release_timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<VersionNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_timestamp: Option<DateTime<Utc>>,
    pub required_core: VersionNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatible_since_version: Option<VersionNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox_status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_java_version: Option<JavaVersion>,
    pub dependencies: Vec<Dependency>,
    pub labels: Vec<String>,
}

/// The current core release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreRecord {
    pub name: String,
    pub version: VersionNumber,
    pub url: String,
    pub sha256: String,
    pub build_date: NaiveDate,
}

impl CoreRecord {
    pub fn from_artifact(artifact: &Artifact) -> Self {
        Self {
            name: CORE_NAME.to_string(),
            version: artifact.version().clone(),
            url: artifact.url.clone(),
            sha256: artifact.checksum.clone(),
            build_date: artifact.released_at.date_naive(),
        }
    }
}

/// One release in the history. `title` and `wiki` are only present for
/// recent releases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRelease {
    pub gav: String,
    pub version: VersionNumber,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryDay {
    pub date: NaiveDate,
    pub releases: Vec<HistoryRelease>,
}

/// Requirement metadata for one plugin version in `plugin-versions.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub name: String,
    pub version: VersionNumber,
    pub url: String,
    pub sha256: String,
    pub gav: String,
    pub build_date: NaiveDate,
    pub required_core: VersionNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatible_since_version: Option<VersionNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox_status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_java_version: Option<JavaVersion>,
    pub dependencies: Vec<Dependency>,
}

impl VersionRecord {
    pub fn from_artifact(artifact: &Artifact) -> Self {
        Self {
            name: artifact.name().to_string(),
            version: artifact.version().clone(),
            url: artifact.url.clone(),
            sha256: artifact.checksum.clone(),
            gav: artifact.id.gav(),
            build_date: artifact.released_at.date_naive(),
            required_core: artifact.required_core.clone(),
            compatible_since_version: artifact.compatible_since.clone(),
            sandbox_status: artifact.sandbox_safe,
            minimum_java_version: artifact.minimum_java_version.clone(),
            dependencies: artifact.dependencies.clone(),
        }
    }
}

/// What a security warning applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    Core,
    Plugin,
}

/// Affected version range of a warning. `pattern` is a regular expression
/// over version strings, evaluated by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedVersions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_version: Option<String>,
    pub pattern: String,
}

/// A published security advisory, passed through to clients unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub id: String,
    /// Plugin name, or `core`
    pub name: String,
    pub message: String,
    pub url: String,
    #[serde(default)]
    pub versions: Vec<AffectedVersions>,
}

/// Plugin name to version text to requirement metadata.
pub type PluginVersionMap = BTreeMap<String, BTreeMap<String, VersionRecord>>;

/// `update-center.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCenter {
    pub update_center_version: String,
    pub id: String,
    pub connection_check_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core: Option<CoreRecord>,
    #[serde(default)]
    pub warnings: Vec<SecurityWarning>,
    pub plugins: BTreeMap<String, PluginRecord>,
}

/// `plugin-versions.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginVersions {
    pub update_center_version: String,
    pub plugins: PluginVersionMap,
}

/// `release-history.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseHistory {
    pub release_history: Vec<HistoryDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationUrl {
    pub url: String,
}

/// `plugin-documentation-urls.json`: plugin name to documentation page.
pub type DocumentationUrls = BTreeMap<String, DocumentationUrl>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{core, plugin};

    #[test]
    fn test_core_record() {
        let record = CoreRecord::from_artifact(&core("2.440.1"));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["name"], "core");
        assert_eq!(json["version"], "2.440.1");
        assert_eq!(json["buildDate"], "2024-03-01");
    }

    #[test]
    fn test_version_record_field_names() {
        let mut artifact = plugin("git", "5.0");
        artifact.compatible_since = Some(VersionNumber::parse("4.0").unwrap());

        let json = serde_json::to_value(VersionRecord::from_artifact(&artifact)).unwrap();
        assert_eq!(json["requiredCore"], "2.361.4");
        assert_eq!(json["compatibleSinceVersion"], "4.0");
        assert_eq!(json["gav"], "org.example.plugins:git:5.0");
        assert!(json.get("sandboxStatus").is_none());
    }

    #[test]
    fn test_history_release_omits_absent_metadata() {
        let release = HistoryRelease {
            gav: "org.example.plugins:git:5.0".to_string(),
            version: VersionNumber::parse("5.0").unwrap(),
            timestamp: 0,
            url: "https://plugins.jenkins.io/git".to_string(),
            title: None,
            wiki: None,
        };
        let json = serde_json::to_value(&release).unwrap();
        assert!(json.get("title").is_none());
        assert!(json.get("wiki").is_none());
    }

    #[test]
    fn test_security_warning_shape() {
        let warning: SecurityWarning = serde_json::from_value(serde_json::json!({
            "type": "plugin",
            "id": "SECURITY-123",
            "name": "foo",
            "message": "Stored XSS",
            "url": "https://www.jenkins.io/security/advisory/2024-01-10/",
            "versions": [{"lastVersion": "1.1", "pattern": "1[.][01](|[.-].*)"}]
        }))
        .unwrap();

        assert_eq!(warning.kind, WarningKind::Plugin);
        assert_eq!(warning.versions[0].last_version.as_deref(), Some("1.1"));

        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["type"], "plugin");
        assert_eq!(json["versions"][0]["lastVersion"], "1.1");
    }
}
