//! Repository filters
//!
//! Each filter wraps one [`ArtifactRepository`] and implements the same
//! contract, narrowing what the inner repository returns:
//!
//! - [`Truncate`]: keep the first N plugin entries
//! - [`ExperimentalFilter`]: keep only pre-release or only stable plugin versions
//! - [`StableCoreOnly`]: keep only three-component core releases
//! - [`VersionCap`]: drop plugin and core versions above a cap
//! - [`PredicateFilter`]: drop plugin versions an [`ArtifactPredicate`] rejects
//!
//! Filters never edit what the inner repository returned; they build new,
//! smaller collections. Plugin entries left without versions are dropped.
//!
//! Release history is narrowed from the inner repository's history, not
//! rebuilt from the filtered entries, so whatever an inner filter did to the
//! history (such as [`Truncate`] leaving it whole) holds for the whole chain.
//!
//! [`ArtifactRepository`]: crate::repository::ArtifactRepository

mod experimental;
mod predicate;
mod stable_core;
mod truncate;
mod version_cap;

pub use experimental::{ExperimentalFilter, ExperimentalMode, ReleaseChannel};
pub use predicate::{AllOf, ArtifactPredicate, Compatibility, PredicateFilter};
pub use stable_core::{StableCoreOnly, STABLE_CORE_COMPONENTS};
pub use truncate::Truncate;
pub use version_cap::VersionCap;

use crate::model::{Artifact, CatalogEntry, ReleaseHistoryBucket};

/// Keep the versions `keep` accepts in every entry, dropping emptied entries.
pub(crate) fn retain_versions<F>(entries: &[CatalogEntry], keep: F) -> Vec<CatalogEntry>
where
    F: Fn(&Artifact) -> bool,
{
    entries
        .iter()
        .filter_map(|entry| entry.retain(&keep))
        .collect()
}

/// Keep the releases `keep` accepts on every day, dropping emptied days.
pub(crate) fn retain_history<F>(buckets: &[ReleaseHistoryBucket], keep: F) -> Vec<ReleaseHistoryBucket>
where
    F: Fn(&Artifact) -> bool,
{
    buckets
        .iter()
        .filter_map(|bucket| {
            let releases: Vec<_> = bucket
                .releases
                .iter()
                .filter(|artifact| keep(artifact))
                .cloned()
                .collect();
            (!releases.is_empty()).then(|| ReleaseHistoryBucket {
                date: bucket.date,
                releases,
            })
        })
        .collect()
}
