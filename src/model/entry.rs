//! Catalog entries: every known version of one plugin, and the core release set.

use std::collections::BTreeMap;
use std::sync::Arc;

use uc_version::VersionNumber;

use super::artifact::Artifact;

/// All remaining versions of one plugin.
///
/// `latest()` is read off the map on demand, so it always reflects whatever
/// filtering produced this entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    name: String,
    versions: BTreeMap<VersionNumber, Arc<Artifact>>,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            versions: BTreeMap::new(),
        }
    }

    /// Build an entry from artifacts of a single plugin.
    ///
    /// When two artifacts compare equal (`1.0` and `1.0.0`), the first one wins.
    pub fn from_artifacts<I>(name: impl Into<String>, artifacts: I) -> Self
    where
        I: IntoIterator<Item = Arc<Artifact>>,
    {
        let mut entry = Self::new(name);
        for artifact in artifacts {
            entry.insert(artifact);
        }
        entry
    }

    /// Add a version. Returns `false` when an equal version was already present.
    pub(crate) fn insert(&mut self, artifact: Arc<Artifact>) -> bool {
        let version = artifact.version().clone();
        if self.versions.contains_key(&version) {
            return false;
        }
        self.versions.insert(version, artifact);
        true
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Versions in ascending order.
    pub fn versions(&self) -> &BTreeMap<VersionNumber, Arc<Artifact>> {
        &self.versions
    }

    pub fn artifacts(&self) -> impl DoubleEndedIterator<Item = &Arc<Artifact>> {
        self.versions.values()
    }

    pub fn get(&self, version: &VersionNumber) -> Option<&Arc<Artifact>> {
        self.versions.get(version)
    }

    /// Highest remaining version.
    pub fn latest(&self) -> Option<&Arc<Artifact>> {
        self.versions.values().next_back()
    }

    /// Second highest remaining version.
    pub fn previous(&self) -> Option<&Arc<Artifact>> {
        self.versions.values().rev().nth(1)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// A new entry holding only the versions `keep` accepts, or `None` if
    /// nothing survives. The receiver is left untouched.
    pub fn retain<F>(&self, keep: F) -> Option<CatalogEntry>
    where
        F: Fn(&Artifact) -> bool,
    {
        let versions: BTreeMap<_, _> = self
            .versions
            .iter()
            .filter(|(_, artifact)| keep(artifact))
            .map(|(version, artifact)| (version.clone(), Arc::clone(artifact)))
            .collect();

        if versions.is_empty() {
            None
        } else {
            Some(CatalogEntry {
                name: self.name.clone(),
                versions,
            })
        }
    }
}

/// Core releases, iterated most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreReleases {
    releases: BTreeMap<VersionNumber, Arc<Artifact>>,
}

impl CoreReleases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_artifacts<I>(artifacts: I) -> Self
    where
        I: IntoIterator<Item = Arc<Artifact>>,
    {
        let mut releases = Self::new();
        for artifact in artifacts {
            releases.insert(artifact);
        }
        releases
    }

    pub(crate) fn insert(&mut self, artifact: Arc<Artifact>) -> bool {
        let version = artifact.version().clone();
        if self.releases.contains_key(&version) {
            return false;
        }
        self.releases.insert(version, artifact);
        true
    }

    /// Releases in descending version order.
    pub fn iter(&self) -> impl Iterator<Item = (&VersionNumber, &Arc<Artifact>)> {
        self.releases.iter().rev()
    }

    /// Versions in descending order.
    pub fn versions(&self) -> impl Iterator<Item = &VersionNumber> {
        self.releases.keys().rev()
    }

    /// The most recent release.
    pub fn latest(&self) -> Option<&Arc<Artifact>> {
        self.releases.values().next_back()
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    pub fn retain<F>(&self, keep: F) -> CoreReleases
    where
        F: Fn(&Artifact) -> bool,
    {
        CoreReleases {
            releases: self
                .releases
                .iter()
                .filter(|(_, artifact)| keep(artifact))
                .map(|(version, artifact)| (version.clone(), Arc::clone(artifact)))
                .collect(),
        }
    }
}
