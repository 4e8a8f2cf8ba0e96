//! Descriptor directory scanning
//!
//! Walks a directory tree for `*.json` artifact descriptors, one artifact per
//! file. Descriptors that cannot be read or are missing metadata are skipped
//! and reported as [`ArtifactResolutionError`]s; a descriptor carrying a
//! malformed version string aborts the scan.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uc_version::{MalformedVersionError, VersionNumber};
use walkdir::WalkDir;

use super::memory::MemoryRepository;
use super::{ArtifactRepository, ArtifactResolutionError, Listing};
use crate::model::{
    Artifact, ArtifactId, ArtifactKind, CatalogEntry, CoreReleases, Dependency, JavaVersion,
};

/// File extension of artifact descriptors.
pub const DESCRIPTOR_EXTENSION: &str = "json";

/// Fatal scan errors.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Descriptor directory not found: {0}")]
    RootNotFound(PathBuf),

    #[error("{location}: {source}")]
    MalformedVersion {
        location: String,
        #[source]
        source: MalformedVersionError,
    },
}

/// On-disk shape of one artifact descriptor.
///
/// Required fields are optional here so a missing one is reported per item
/// instead of as an opaque parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    #[serde(default)]
    pub kind: Option<ArtifactKind>,
    pub group: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub classifier: Option<String>,
    pub url: Option<String>,
    pub sha256: Option<String>,
    pub released_at: Option<String>,
    #[serde(default)]
    pub required_core: Option<String>,
    #[serde(default)]
    pub compatible_since: Option<String>,
    #[serde(default)]
    pub sandbox_safe: Option<bool>,
    #[serde(default)]
    pub minimum_java_version: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub documentation_url: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencyDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyDescriptor {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub optional: bool,
}

enum DescriptorError {
    Resolution(ArtifactResolutionError),
    Version(MalformedVersionError),
}

impl From<MalformedVersionError> for DescriptorError {
    fn from(e: MalformedVersionError) -> Self {
        DescriptorError::Version(e)
    }
}

impl From<ArtifactResolutionError> for DescriptorError {
    fn from(e: ArtifactResolutionError) -> Self {
        DescriptorError::Resolution(e)
    }
}

fn required(value: Option<String>, location: &str, field: &str) -> Result<String, ArtifactResolutionError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ArtifactResolutionError::MissingField {
            location: location.to_string(),
            field: field.to_string(),
        }),
    }
}

fn invalid(location: &str, reason: impl Into<String>) -> ArtifactResolutionError {
    ArtifactResolutionError::InvalidDescriptor {
        location: location.to_string(),
        reason: reason.into(),
    }
}

impl ArtifactDescriptor {
    /// Read and decode one descriptor file.
    pub fn load(path: &Path, location: &str) -> Result<Self, ArtifactResolutionError> {
        let content = fs::read_to_string(path).map_err(|e| ArtifactResolutionError::Unreadable {
            location: location.to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| invalid(location, e.to_string()))
    }

    fn into_artifact(self, location: &str) -> Result<Artifact, DescriptorError> {
        let kind = self.kind.unwrap_or(ArtifactKind::Plugin);
        let group = required(self.group, location, "group")?;
        let name = required(self.name, location, "name")?;
        let version = required(self.version, location, "version")?;
        let url = required(self.url, location, "url")?;
        let checksum = required(self.sha256, location, "sha256")?;
        let released_at = required(self.released_at, location, "released_at")?;

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid(
                location,
                "name must contain only alphanumeric characters, dashes, dots and underscores",
            )
            .into());
        }

        if checksum.len() != 64 || !checksum.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid(location, "sha256 must be 64 hex characters").into());
        }

        let released_at = DateTime::parse_from_rfc3339(&released_at)
            .map_err(|e| invalid(location, format!("released_at: {}", e)))?
            .with_timezone(&Utc);

        let version = VersionNumber::parse(&version)?;
        let required_core = match (self.required_core, kind) {
            (Some(core), _) => VersionNumber::parse(&core)?,
            (None, ArtifactKind::Core) => version.clone(),
            (None, ArtifactKind::Plugin) => {
                return Err(ArtifactResolutionError::MissingField {
                    location: location.to_string(),
                    field: "required_core".to_string(),
                }
                .into())
            }
        };
        let compatible_since = self
            .compatible_since
            .as_deref()
            .map(VersionNumber::parse)
            .transpose()?;
        let minimum_java_version = self
            .minimum_java_version
            .as_deref()
            .map(JavaVersion::parse)
            .transpose()?;

        let dependencies = self
            .dependencies
            .into_iter()
            .map(|d| {
                Ok(Dependency {
                    version: VersionNumber::parse(&d.version)?,
                    name: d.name,
                    optional: d.optional,
                })
            })
            .collect::<Result<Vec<_>, MalformedVersionError>>()?;

        Ok(Artifact {
            id: ArtifactId {
                group,
                name,
                version,
                classifier: self.classifier,
            },
            kind,
            url,
            checksum: checksum.to_ascii_lowercase(),
            released_at,
            required_core,
            compatible_since,
            sandbox_safe: self.sandbox_safe,
            dependencies,
            title: self.title.filter(|t| !t.trim().is_empty()),
            documentation_url: self.documentation_url.filter(|u| !u.trim().is_empty()),
            minimum_java_version,
            labels: self.labels,
        })
    }
}

/// Artifact source backed by a directory of descriptor files.
#[derive(Debug, Clone)]
pub struct DescriptorRepository {
    root: PathBuf,
    inner: MemoryRepository,
}

impl DescriptorRepository {
    /// Scan `root` recursively. Files are visited in sorted order, so the
    /// same tree always yields the same repository.
    pub fn scan(root: &Path) -> Result<Self, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }

        let mut artifacts = Vec::new();
        let mut plugin_failures = Vec::new();
        let mut core_failures = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let location = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string());
                    plugin_failures.push(ArtifactResolutionError::Unreadable {
                        location,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(DESCRIPTOR_EXTENSION)
            {
                continue;
            }

            let location = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();

            let descriptor = match ArtifactDescriptor::load(path, &location) {
                Ok(d) => d,
                Err(failure) => {
                    plugin_failures.push(failure);
                    continue;
                }
            };

            let is_core = descriptor.kind == Some(ArtifactKind::Core);
            match descriptor.into_artifact(&location) {
                Ok(artifact) => {
                    debug!(artifact = %artifact.id.gav(), %location, "loaded descriptor");
                    artifacts.push(artifact);
                }
                Err(DescriptorError::Resolution(failure)) => {
                    if is_core {
                        core_failures.push(failure);
                    } else {
                        plugin_failures.push(failure);
                    }
                }
                Err(DescriptorError::Version(source)) => {
                    return Err(ScanError::MalformedVersion { location, source });
                }
            }
        }

        info!(
            root = %root.display(),
            artifacts = artifacts.len(),
            failures = plugin_failures.len() + core_failures.len(),
            "scanned descriptor directory"
        );

        let mut inner = MemoryRepository::new(artifacts);
        for failure in plugin_failures {
            inner = inner.with_plugin_failure(failure);
        }
        for failure in core_failures {
            inner = inner.with_core_failure(failure);
        }

        Ok(Self {
            root: root.to_path_buf(),
            inner,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactRepository for DescriptorRepository {
    fn plugin_entries(&self) -> Listing<Vec<CatalogEntry>> {
        self.inner.plugin_entries()
    }

    fn core_releases(&self) -> Listing<CoreReleases> {
        self.inner.core_releases()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, value: serde_json::Value) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    fn plugin_descriptor(name: &str, version: &str) -> serde_json::Value {
        json!({
            "group": "org.example.plugins",
            "name": name,
            "version": version,
            "url": format!("https://repo.example.org/{name}/{version}/{name}.hpi"),
            "sha256": "ab".repeat(32),
            "released_at": "2024-04-02T10:00:00Z",
            "required_core": "2.361.4",
            "dependencies": [{"name": "scm-api", "version": "2.6.5", "optional": true}]
        })
    }

    #[test]
    fn test_scan_loads_plugins_and_core() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "plugins/git/4.11.0.json", plugin_descriptor("git", "4.11.0"));
        write(dir.path(), "plugins/git/5.0.json", plugin_descriptor("git", "5.0"));
        write(
            dir.path(),
            "core/2.401.1.json",
            json!({
                "kind": "core",
                "group": "org.example.main",
                "name": "core-war",
                "version": "2.401.1",
                "url": "https://repo.example.org/war/2.401.1/core.war",
                "sha256": "CD".repeat(32),
                "released_at": "2024-04-01T00:00:00Z"
            }),
        );

        let repo = DescriptorRepository::scan(dir.path()).unwrap();

        let plugins = repo.plugin_entries();
        assert!(plugins.failures.is_empty());
        assert_eq!(plugins.value.len(), 1);
        assert_eq!(plugins.value[0].len(), 2);
        let latest = plugins.value[0].latest().unwrap();
        assert_eq!(latest.version().as_str(), "5.0");
        assert!(latest.dependencies[0].optional);

        let core = repo.core_releases().value;
        let latest_core = core.latest().unwrap();
        assert_eq!(latest_core.version().as_str(), "2.401.1");
        assert_eq!(latest_core.required_core.as_str(), "2.401.1");
        assert_eq!(latest_core.checksum, "cd".repeat(32));
    }

    #[test]
    fn test_bad_descriptors_are_per_item_failures() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "good.json", plugin_descriptor("good", "1.0"));
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let mut missing_url = plugin_descriptor("nourl", "1.0");
        missing_url.as_object_mut().unwrap().remove("url");
        write(dir.path(), "nourl.json", missing_url);

        let mut bad_date = plugin_descriptor("baddate", "1.0");
        bad_date["released_at"] = json!("yesterday");
        write(dir.path(), "baddate.json", bad_date);

        fs::write(dir.path().join("README.txt"), "ignored").unwrap();

        let repo = DescriptorRepository::scan(dir.path()).unwrap();
        let listing = repo.plugin_entries();

        let names: Vec<&str> = listing.value.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["good"]);
        assert_eq!(listing.failures.len(), 3);

        let locations: Vec<&str> = listing.failures.iter().map(|f| f.location()).collect();
        assert_eq!(locations, vec!["baddate.json", "broken.json", "nourl.json"]);
        assert!(matches!(
            listing.failures[2],
            ArtifactResolutionError::MissingField { ref field, .. } if field == "url"
        ));
    }

    #[test]
    fn test_malformed_version_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "good.json", plugin_descriptor("good", "1.0"));
        write(dir.path(), "bad.json", plugin_descriptor("bad", "1..0"));

        let err = DescriptorRepository::scan(dir.path()).unwrap_err();
        match err {
            ScanError::MalformedVersion { location, source } => {
                assert_eq!(location, "bad.json");
                assert_eq!(source.input(), "1..0");
            }
            other => panic!("expected MalformedVersion, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            DescriptorRepository::scan(&missing),
            Err(ScanError::RootNotFound(_))
        ));
    }
}
