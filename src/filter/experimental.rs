//! Experimental (pre-release) versus stable plugin versions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{retain_history, retain_versions};
use crate::model::{Artifact, CatalogEntry, CoreReleases, ReleaseHistoryBucket};
use crate::repository::{ArtifactRepository, Listing};

/// Release channel of a single version. Every version is in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseChannel {
    /// Qualified versions (`1.1-beta`, `2.0-rc1`)
    Experimental,
    /// Unqualified versions
    Stable,
}

impl ReleaseChannel {
    pub fn of(artifact: &Artifact) -> Self {
        if artifact.is_prerelease() {
            ReleaseChannel::Experimental
        } else {
            ReleaseChannel::Stable
        }
    }
}

/// Experimental-version handling selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperimentalMode {
    /// No filtering
    #[default]
    Any,
    ExperimentalOnly,
    NoExperimental,
}

impl ExperimentalMode {
    /// Channel to keep, or `None` when nothing is filtered.
    pub fn channel(self) -> Option<ReleaseChannel> {
        match self {
            ExperimentalMode::Any => None,
            ExperimentalMode::ExperimentalOnly => Some(ReleaseChannel::Experimental),
            ExperimentalMode::NoExperimental => Some(ReleaseChannel::Stable),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExperimentalMode::Any => "any",
            ExperimentalMode::ExperimentalOnly => "experimental-only",
            ExperimentalMode::NoExperimental => "no-experimental",
        }
    }
}

impl fmt::Display for ExperimentalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperimentalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(ExperimentalMode::Any),
            "experimental-only" => Ok(ExperimentalMode::ExperimentalOnly),
            "no-experimental" => Ok(ExperimentalMode::NoExperimental),
            other => Err(format!(
                "unknown experimental mode '{}' (expected any, experimental-only or no-experimental)",
                other
            )),
        }
    }
}

/// Keeps only plugin versions in one release channel.
///
/// Core releases pass through.
#[derive(Debug, Clone)]
pub struct ExperimentalFilter<R> {
    base: R,
    keep: ReleaseChannel,
}

impl<R: ArtifactRepository> ExperimentalFilter<R> {
    pub fn new(base: R, keep: ReleaseChannel) -> Self {
        Self { base, keep }
    }

    pub fn experimental_only(base: R) -> Self {
        Self::new(base, ReleaseChannel::Experimental)
    }

    pub fn no_experimental(base: R) -> Self {
        Self::new(base, ReleaseChannel::Stable)
    }
}

impl<R: ArtifactRepository> ArtifactRepository for ExperimentalFilter<R> {
    fn plugin_entries(&self) -> Listing<Vec<CatalogEntry>> {
        self.base.plugin_entries().map(|entries| {
            let kept = retain_versions(&entries, |a| ReleaseChannel::of(a) == self.keep);
            debug!(channel = ?self.keep, before = entries.len(), after = kept.len(), "filtered release channel");
            kept
        })
    }

    fn core_releases(&self) -> Listing<CoreReleases> {
        self.base.core_releases()
    }

    fn releases_by_date(&self) -> Listing<Vec<ReleaseHistoryBucket>> {
        self.base
            .releases_by_date()
            .map(|buckets| retain_history(&buckets, |a| ReleaseChannel::of(a) == self.keep))
    }
}
