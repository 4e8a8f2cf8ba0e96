//! Artifact repository contract
//!
//! Every data source and every filter implements [`ArtifactRepository`].
//! Filters wrap an inner repository and recompute their view on each call;
//! none of them hold mutable state.
//!
//! Per-item failures ride alongside the result in a [`Listing`] instead of
//! failing the call, so one unreadable descriptor never hides the rest of the
//! catalog.

mod descriptor;
mod memory;

pub use descriptor::{
    ArtifactDescriptor, DependencyDescriptor, DescriptorRepository, ScanError, DESCRIPTOR_EXTENSION,
};
pub use memory::MemoryRepository;

use crate::model::{group_by_release_date, CatalogEntry, CoreReleases, ReleaseHistoryBucket};

/// A per-item failure: one artifact could not be resolved and was left out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtifactResolutionError {
    #[error("{location}: unreadable: {reason}")]
    Unreadable { location: String, reason: String },

    #[error("{location}: invalid descriptor: {reason}")]
    InvalidDescriptor { location: String, reason: String },

    #[error("{location}: missing required field '{field}'")]
    MissingField { location: String, field: String },

    #[error("{location}: metadata unavailable: {reason}")]
    Metadata { location: String, reason: String },
}

impl ArtifactResolutionError {
    /// File path or coordinate of the artifact that failed.
    pub fn location(&self) -> &str {
        match self {
            ArtifactResolutionError::Unreadable { location, .. }
            | ArtifactResolutionError::InvalidDescriptor { location, .. }
            | ArtifactResolutionError::MissingField { location, .. }
            | ArtifactResolutionError::Metadata { location, .. } => location,
        }
    }
}

/// A result plus the per-item failures met while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub value: T,
    pub failures: Vec<ArtifactResolutionError>,
}

impl<T> Listing<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            failures: Vec::new(),
        }
    }

    pub fn with_failures(value: T, failures: Vec<ArtifactResolutionError>) -> Self {
        Self { value, failures }
    }

    /// Transform the value, carrying failures through unchanged.
    pub fn map<U, F>(self, f: F) -> Listing<U>
    where
        F: FnOnce(T) -> U,
    {
        Listing {
            value: f(self.value),
            failures: self.failures,
        }
    }

    pub fn into_parts(self) -> (T, Vec<ArtifactResolutionError>) {
        (self.value, self.failures)
    }
}

/// The operations every artifact source and filter provides.
///
/// Results are freshly built on every call and ordered deterministically:
/// plugin entries by name, core releases by descending version, history
/// buckets by descending date.
pub trait ArtifactRepository {
    /// One entry per plugin, holding only versions that survived filtering.
    /// Entries with no versions are never returned.
    fn plugin_entries(&self) -> Listing<Vec<CatalogEntry>>;

    /// Core releases, most recent first.
    fn core_releases(&self) -> Listing<CoreReleases>;

    /// Plugin releases grouped by release day, most recent day first.
    ///
    /// Sources derive it from [`plugin_entries`](Self::plugin_entries).
    /// Filters that drop versions narrow their inner repository's history
    /// with the same test instead of regrouping their own entries.
    fn releases_by_date(&self) -> Listing<Vec<ReleaseHistoryBucket>> {
        self.plugin_entries()
            .map(|entries| group_by_release_date(&entries))
    }
}

impl<R: ArtifactRepository + ?Sized> ArtifactRepository for Box<R> {
    fn plugin_entries(&self) -> Listing<Vec<CatalogEntry>> {
        (**self).plugin_entries()
    }

    fn core_releases(&self) -> Listing<CoreReleases> {
        (**self).core_releases()
    }

    fn releases_by_date(&self) -> Listing<Vec<ReleaseHistoryBucket>> {
        (**self).releases_by_date()
    }
}

impl<R: ArtifactRepository + ?Sized> ArtifactRepository for &R {
    fn plugin_entries(&self) -> Listing<Vec<CatalogEntry>> {
        (**self).plugin_entries()
    }

    fn core_releases(&self) -> Listing<CoreReleases> {
        (**self).core_releases()
    }

    fn releases_by_date(&self) -> Listing<Vec<ReleaseHistoryBucket>> {
        (**self).releases_by_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_map_keeps_failures() {
        let failure = ArtifactResolutionError::Unreadable {
            location: "foo.json".to_string(),
            reason: "permission denied".to_string(),
        };
        let listing = Listing::with_failures(vec![1, 2, 3], vec![failure.clone()]);

        let mapped = listing.map(|v| v.len());

        assert_eq!(mapped.value, 3);
        assert_eq!(mapped.failures, vec![failure]);
    }

    #[test]
    fn test_failure_location() {
        let failure = ArtifactResolutionError::MissingField {
            location: "plugins/foo.json".to_string(),
            field: "url".to_string(),
        };
        assert_eq!(failure.location(), "plugins/foo.json");
        assert!(failure.to_string().contains("'url'"));
    }
}
