use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use uc_version::VersionNumber;

use crate::catalog::{AssembledCatalog, PluginRecord};
use crate::config::ConfigSource;
use crate::output::{OutputError, WrittenFile};
use crate::repository::ArtifactResolutionError;

/// Schema version for build_summary.json
pub const BUILD_SUMMARY_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for build_summary.json
pub const BUILD_SUMMARY_SCHEMA_ID: &str = "update-center/build_summary@1";

pub const BUILD_SUMMARY_FILE: &str = "build_summary.json";

/// A per-item failure as recorded in the summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub location: String,
    pub message: String,
}

impl From<&ArtifactResolutionError> for FailureRecord {
    fn from(err: &ArtifactResolutionError) -> Self {
        Self {
            location: err.location().to_string(),
            message: err.to_string(),
        }
    }
}

/// Build summary (build_summary.json)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSummary {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When the summary was created
    pub created_at: DateTime<Utc>,

    /// Update center identifier
    pub id: String,

    pub plugin_count: usize,

    /// Latest core version, absent when no core release remained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_version: Option<VersionNumber>,

    /// SHA-256 of the JCS form of the plugin catalog
    pub catalog_sha256: String,

    /// Files written, in write order
    pub files: Vec<WrittenFile>,

    /// Per-item failures met during the build
    pub failures: Vec<FailureRecord>,

    /// Config sources in precedence order
    pub config_sources: Vec<ConfigSource>,
}

impl BuildSummary {
    /// Summary of a catalog that has not been written yet. The catalog digest
    /// is the only fallible part, so it is settled before any file exists.
    pub fn new(
        catalog: &AssembledCatalog,
        config_sources: Vec<ConfigSource>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, OutputError> {
        Ok(Self {
            schema_version: BUILD_SUMMARY_SCHEMA_VERSION,
            schema_id: BUILD_SUMMARY_SCHEMA_ID.to_string(),
            created_at,
            id: catalog.update_center.id.clone(),
            plugin_count: catalog.plugin_count(),
            core_version: catalog.latest_core().map(|core| core.version.clone()),
            catalog_sha256: catalog_digest(&catalog.update_center.plugins)?,
            files: Vec::new(),
            failures: catalog.failures.iter().map(FailureRecord::from).collect(),
            config_sources,
        })
    }

    /// Record the files a build wrote.
    pub fn with_files(mut self, files: Vec<WrittenFile>) -> Self {
        self.files = files;
        self
    }

    /// SHA-256 recorded for a written file
    pub fn file_digest(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.sha256.as_str())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }
}

/// SHA-256 hex digest of the RFC 8785 (JCS) form of the plugin catalog.
///
/// Independent of pretty printing, so two runs over the same artifacts agree.
pub fn catalog_digest(plugins: &BTreeMap<String, PluginRecord>) -> Result<String, OutputError> {
    let jcs_bytes = serde_json_canonicalizer::to_vec(plugins)
        .map_err(|e| OutputError::Canonicalize(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&jcs_bytes);
    Ok(hex::encode(hasher.finalize()))
}
