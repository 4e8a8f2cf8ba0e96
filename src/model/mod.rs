//! Catalog data model
//!
//! Artifacts, per-plugin catalog entries, core release sets and the release
//! history buckets. Everything here is immutable once built; filters produce
//! new values instead of editing these in place.

mod artifact;
mod entry;
mod history;
mod java;

pub use artifact::{Artifact, ArtifactId, ArtifactKind, Dependency};
pub use entry::{CatalogEntry, CoreReleases};
pub use history::{group_by_release_date, ReleaseHistoryBucket};
pub use java::JavaVersion;

#[cfg(test)]
pub(crate) use artifact::fixtures;
