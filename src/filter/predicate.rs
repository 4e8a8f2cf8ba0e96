//! Per-artifact predicates and the filter that applies them to plugin versions.

use std::fmt;

use tracing::debug;
use uc_version::VersionNumber;

use super::{retain_history, retain_versions};
use crate::model::{Artifact, CatalogEntry, CoreReleases, JavaVersion, ReleaseHistoryBucket};
use crate::repository::{ArtifactRepository, Listing};

/// Decides whether a single artifact stays in the catalog.
pub trait ArtifactPredicate {
    fn keep(&self, artifact: &Artifact) -> bool;

    /// Short label for logs.
    fn describe(&self) -> String {
        "custom predicate".to_string()
    }
}

impl<F> ArtifactPredicate for F
where
    F: Fn(&Artifact) -> bool,
{
    fn keep(&self, artifact: &Artifact) -> bool {
        self(artifact)
    }
}

/// Runtime compatibility checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// Keep releases that run on this Java version. Releases that declare no
    /// minimum are kept.
    MinimumJava(JavaVersion),
    /// Keep releases whose required core is at most this version.
    RequiredCoreAtMost(VersionNumber),
}

impl ArtifactPredicate for Compatibility {
    fn keep(&self, artifact: &Artifact) -> bool {
        match self {
            Compatibility::MinimumJava(java) => artifact
                .minimum_java_version
                .as_ref()
                .map_or(true, |required| required <= java),
            Compatibility::RequiredCoreAtMost(core) => &artifact.required_core <= core,
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compatibility::MinimumJava(java) => write!(f, "runs on java {}", java),
            Compatibility::RequiredCoreAtMost(core) => write!(f, "requires core <= {}", core),
        }
    }
}

/// Conjunction: an artifact is kept only if every predicate keeps it.
/// An empty conjunction keeps everything.
#[derive(Default)]
pub struct AllOf(pub Vec<Box<dyn ArtifactPredicate>>);

impl AllOf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, predicate: impl ArtifactPredicate + 'static) -> Self {
        self.0.push(Box::new(predicate));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ArtifactPredicate for AllOf {
    fn keep(&self, artifact: &Artifact) -> bool {
        self.0.iter().all(|p| p.keep(artifact))
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.0.iter().map(|p| p.describe()).collect();
        if parts.is_empty() {
            "all".to_string()
        } else {
            parts.join(" and ")
        }
    }
}

/// Drops plugin versions the predicate rejects. Core releases pass through.
pub struct PredicateFilter<R, P> {
    base: R,
    predicate: P,
}

impl<R: ArtifactRepository, P: ArtifactPredicate> PredicateFilter<R, P> {
    pub fn new(base: R, predicate: P) -> Self {
        Self { base, predicate }
    }
}

impl<R: ArtifactRepository, P: ArtifactPredicate> ArtifactRepository for PredicateFilter<R, P> {
    fn plugin_entries(&self) -> Listing<Vec<CatalogEntry>> {
        self.base.plugin_entries().map(|entries| {
            let kept = retain_versions(&entries, |a| self.predicate.keep(a));
            debug!(
                predicate = %self.predicate.describe(),
                before = entries.len(),
                after = kept.len(),
                "applied predicate"
            );
            kept
        })
    }

    fn core_releases(&self) -> Listing<CoreReleases> {
        self.base.core_releases()
    }

    fn releases_by_date(&self) -> Listing<Vec<ReleaseHistoryBucket>> {
        self.base
            .releases_by_date()
            .map(|buckets| retain_history(&buckets, |a| self.predicate.keep(a)))
    }
}
