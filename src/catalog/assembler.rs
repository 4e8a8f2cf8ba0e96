//! Turns a decorated repository into the documents rendering consumes.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::metadata::{plugin_site_url, MetadataResolver, PluginMetadata};
use super::records::{
    CoreRecord, DocumentationUrl, DocumentationUrls, HistoryDay, HistoryRelease, PluginRecord,
    PluginVersionMap, PluginVersions, ReleaseHistory, SecurityWarning, UpdateCenter, VersionRecord,
    UPDATE_CENTER_VERSION,
};
use crate::model::{Artifact, CatalogEntry, CoreReleases, ReleaseHistoryBucket};
use crate::repository::{ArtifactRepository, ArtifactResolutionError, Listing};

/// Releases newer than this carry title and documentation URL in history.
pub const RECENT_RELEASE_DAYS: i64 = 31;

/// Settings the assembler needs that are not part of the artifact set.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembleOptions {
    pub id: String,
    pub connection_check_url: String,
    pub release_history: bool,
    pub plugin_versions: bool,
    /// Published in `update-center.json` as given
    pub warnings: Vec<SecurityWarning>,
}

/// Everything one build produces, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledCatalog {
    pub update_center: UpdateCenter,
    pub plugin_versions: Option<PluginVersions>,
    pub release_history: Option<ReleaseHistory>,
    pub documentation_urls: DocumentationUrls,
    /// Per-item failures, each reported once
    pub failures: Vec<ArtifactResolutionError>,
}

impl AssembledCatalog {
    pub fn plugin_count(&self) -> usize {
        self.update_center.plugins.len()
    }

    pub fn latest_core(&self) -> Option<&CoreRecord> {
        self.update_center.core.as_ref()
    }
}

/// Queries a (usually decorated) repository and builds the catalog views.
///
/// `now` anchors the release-history recency window.
pub struct CatalogAssembler<R, M> {
    repository: R,
    metadata: M,
    now: DateTime<Utc>,
}

impl<R: ArtifactRepository, M: MetadataResolver> CatalogAssembler<R, M> {
    pub fn new(repository: R, metadata: M, now: DateTime<Utc>) -> Self {
        Self {
            repository,
            metadata,
            now,
        }
    }

    /// Latest release of every plugin. Plugins whose metadata cannot be
    /// resolved are left out and reported.
    pub fn plugin_catalog(&self) -> Listing<Vec<PluginRecord>> {
        let (entries, mut failures) = self.repository.plugin_entries().into_parts();
        let records = self.plugin_records(&entries, &mut failures);
        Listing::with_failures(records, failures)
    }

    /// Highest remaining core release, if any.
    pub fn core_release(&self) -> Listing<Option<CoreRecord>> {
        self.repository
            .core_releases()
            .map(|releases| latest_core(&releases))
    }

    /// Releases by day, most recent first.
    pub fn release_history(&self) -> Listing<Vec<HistoryDay>> {
        let (buckets, mut failures) = self.repository.releases_by_date().into_parts();
        let days = self.history_days(&buckets, &mut failures);
        Listing::with_failures(days, failures)
    }

    /// Every remaining version of every plugin.
    pub fn plugin_versions(&self) -> Listing<PluginVersionMap> {
        self.repository
            .plugin_entries()
            .map(|entries| version_map(&entries))
    }

    /// Plugin name to documentation page, for plugins in the catalog.
    pub fn documentation_urls(&self) -> Listing<DocumentationUrls> {
        self.plugin_catalog().map(|records| documentation_urls(&records))
    }

    /// Build every document, querying each repository view once.
    pub fn assemble(&self, options: &AssembleOptions) -> AssembledCatalog {
        let mut failures = Vec::new();

        info!("gathering plugins");
        let (entries, entry_failures) = self.repository.plugin_entries().into_parts();
        record_failures(&mut failures, entry_failures);

        let mut metadata_failures = Vec::new();
        let records = self.plugin_records(&entries, &mut metadata_failures);
        record_failures(&mut failures, metadata_failures);
        info!(plugins = records.len(), "plugins listed");

        info!("finding latest core");
        let (releases, core_failures) = self.repository.core_releases().into_parts();
        record_failures(&mut failures, core_failures);
        let core = latest_core(&releases);
        match &core {
            Some(core) => info!(version = %core.version, "latest core"),
            None => info!("no core releases remain"),
        }

        let plugin_versions = options.plugin_versions.then(|| PluginVersions {
            update_center_version: UPDATE_CENTER_VERSION.to_string(),
            plugins: version_map(&entries),
        });

        let release_history = if options.release_history {
            info!("building release history");
            let (buckets, history_failures) = self.repository.releases_by_date().into_parts();
            let mut resolve_failures = Vec::new();
            let days = self.history_days(&buckets, &mut resolve_failures);
            record_failures(&mut failures, history_failures);
            record_failures(&mut failures, resolve_failures);
            Some(ReleaseHistory {
                release_history: days,
            })
        } else {
            None
        };

        let documentation_urls = documentation_urls(&records);

        let update_center = UpdateCenter {
            update_center_version: UPDATE_CENTER_VERSION.to_string(),
            id: options.id.clone(),
            connection_check_url: options.connection_check_url.clone(),
            core,
            warnings: options.warnings.clone(),
            plugins: records
                .into_iter()
                .map(|record| (record.name.clone(), record))
                .collect(),
        };

        AssembledCatalog {
            update_center,
            plugin_versions,
            release_history,
            documentation_urls,
            failures,
        }
    }

    fn plugin_records(
        &self,
        entries: &[CatalogEntry],
        failures: &mut Vec<ArtifactResolutionError>,
    ) -> Vec<PluginRecord> {
        let mut records = Vec::with_capacity(entries.len());

        for entry in entries {
            let Some(latest) = entry.latest() else {
                continue;
            };

            match self.metadata.resolve(latest) {
                Ok(metadata) => {
                    debug!(plugin = entry.name(), version = %latest.version(), "latest");
                    records.push(plugin_record(entry, latest, metadata));
                }
                Err(err) => failures.push(err),
            }
        }

        records
    }

    fn history_days(
        &self,
        buckets: &[ReleaseHistoryBucket],
        failures: &mut Vec<ArtifactResolutionError>,
    ) -> Vec<HistoryDay> {
        let oldest = self.now - Duration::days(RECENT_RELEASE_DAYS);

        buckets
            .iter()
            .map(|bucket| HistoryDay {
                date: bucket.date,
                releases: bucket
                    .releases
                    .iter()
                    .map(|artifact| {
                        let mut release = history_release(artifact);
                        if artifact.released_at > oldest {
                            let metadata = match self.metadata.resolve(artifact) {
                                Ok(metadata) => metadata,
                                Err(err) => {
                                    failures.push(err);
                                    PluginMetadata {
                                        title: artifact.name().to_string(),
                                        documentation_url: String::new(),
                                    }
                                }
                            };
                            release.title = Some(metadata.title);
                            release.wiki = Some(metadata.documentation_url);
                        }
                        release
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Append failures not already recorded, logging each once.
fn record_failures(
    recorded: &mut Vec<ArtifactResolutionError>,
    new: Vec<ArtifactResolutionError>,
) {
    for failure in new {
        if !recorded.contains(&failure) {
            warn!(location = failure.location(), "{}", failure);
            recorded.push(failure);
        }
    }
}

fn latest_core(releases: &CoreReleases) -> Option<CoreRecord> {
    releases
        .latest()
        .map(|artifact| CoreRecord::from_artifact(artifact))
}

fn plugin_record(entry: &CatalogEntry, latest: &Artifact, metadata: PluginMetadata) -> PluginRecord {
    let previous = entry.previous();

    PluginRecord {
        name: entry.name().to_string(),
        version: latest.version().clone(),
        title: metadata.title,
        wiki: metadata.documentation_url,
        url: latest.url.clone(),
        sha256: latest.checksum.clone(),
        gav: latest.id.gav(),
        release_timestamp: latest.released_at,
        previous_version: previous.map(|a| a.version().clone()),
        previous_timestamp: previous.map(|a| a.released_at),
        required_core: latest.required_core.clone(),
        compatible_since_version: latest.compatible_since.clone(),
        sandbox_status: latest.sandbox_safe,
        minimum_java_version: latest.minimum_java_version.clone(),
        dependencies: latest.dependencies.clone(),
        labels: latest.labels.clone(),
    }
}

fn history_release(artifact: &Artifact) -> HistoryRelease {
    HistoryRelease {
        gav: artifact.id.gav(),
        version: artifact.version().clone(),
        timestamp: artifact.released_at.timestamp_millis(),
        url: plugin_site_url(artifact.name()),
        title: None,
        wiki: None,
    }
}

fn version_map(entries: &[CatalogEntry]) -> PluginVersionMap {
    entries
        .iter()
        .map(|entry| {
            let versions: BTreeMap<String, VersionRecord> = entry
                .artifacts()
                .map(|artifact| {
                    (
                        artifact.version().to_string(),
                        VersionRecord::from_artifact(artifact),
                    )
                })
                .collect();
            (entry.name().to_string(), versions)
        })
        .collect()
}

fn documentation_urls(records: &[PluginRecord]) -> DocumentationUrls {
    records
        .iter()
        .map(|record| {
            (
                record.name.clone(),
                DocumentationUrl {
                    url: record.wiki.clone(),
                },
            )
        })
        .collect()
}
