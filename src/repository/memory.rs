//! In-memory artifact source.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::{ArtifactRepository, ArtifactResolutionError, Listing};
use crate::model::{Artifact, ArtifactKind, CatalogEntry, CoreReleases};

/// An artifact source built from artifacts already in memory.
///
/// Failures registered with [`with_plugin_failure`](Self::with_plugin_failure)
/// and [`with_core_failure`](Self::with_core_failure) are replayed on every
/// call, standing in for descriptors that could not be resolved.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    plugins: Vec<CatalogEntry>,
    core: CoreReleases,
    plugin_failures: Vec<ArtifactResolutionError>,
    core_failures: Vec<ArtifactResolutionError>,
}

impl MemoryRepository {
    pub fn new<I>(artifacts: I) -> Self
    where
        I: IntoIterator<Item = Artifact>,
    {
        let mut plugins: BTreeMap<String, CatalogEntry> = BTreeMap::new();
        let mut core = CoreReleases::new();

        for artifact in artifacts {
            let gav = artifact.id.gav();
            let artifact = Arc::new(artifact);
            let inserted = match artifact.kind {
                ArtifactKind::Plugin => plugins
                    .entry(artifact.name().to_string())
                    .or_insert_with(|| CatalogEntry::new(artifact.name()))
                    .insert(Arc::clone(&artifact)),
                ArtifactKind::Core => core.insert(artifact),
            };
            if !inserted {
                debug!(artifact = %gav, "duplicate version ignored");
            }
        }

        Self {
            plugins: plugins.into_values().collect(),
            core,
            plugin_failures: Vec::new(),
            core_failures: Vec::new(),
        }
    }

    pub fn with_plugin_failure(mut self, failure: ArtifactResolutionError) -> Self {
        self.plugin_failures.push(failure);
        self
    }

    pub fn with_core_failure(mut self, failure: ArtifactResolutionError) -> Self {
        self.core_failures.push(failure);
        self
    }
}

impl ArtifactRepository for MemoryRepository {
    fn plugin_entries(&self) -> Listing<Vec<CatalogEntry>> {
        Listing::with_failures(self.plugins.clone(), self.plugin_failures.clone())
    }

    fn core_releases(&self) -> Listing<CoreReleases> {
        Listing::with_failures(self.core.clone(), self.core_failures.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{core, plugin};

    #[test]
    fn test_entries_sorted_by_name() {
        let repo = MemoryRepository::new(vec![
            plugin("zeta", "1.0"),
            plugin("alpha", "1.0"),
            plugin("alpha", "2.0"),
            core("2.0.1"),
        ]);

        let entries = repo.plugin_entries().value;
        let names: Vec<&str> = entries.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(entries[0].len(), 2);
        assert_eq!(repo.core_releases().value.len(), 1);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let repo = MemoryRepository::new(vec![plugin("b", "1.0"), plugin("a", "1.0")]);
        assert_eq!(repo.plugin_entries(), repo.plugin_entries());
    }

    #[test]
    fn test_failures_replayed() {
        let failure = ArtifactResolutionError::Unreadable {
            location: "broken.json".to_string(),
            reason: "truncated".to_string(),
        };
        let repo = MemoryRepository::new(vec![plugin("a", "1.0")]).with_plugin_failure(failure.clone());

        let listing = repo.plugin_entries();
        assert_eq!(listing.value.len(), 1);
        assert_eq!(listing.failures, vec![failure]);
        assert!(repo.core_releases().failures.is_empty());
    }
}
