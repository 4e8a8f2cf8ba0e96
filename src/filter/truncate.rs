use tracing::debug;

use crate::model::{CatalogEntry, CoreReleases, ReleaseHistoryBucket};
use crate::repository::{ArtifactRepository, Listing};

/// Keeps at most `limit` plugin entries, the first ones in the inner order.
///
/// Meant for dry runs and tests. Core releases and release history come
/// straight from the inner repository.
#[derive(Debug, Clone)]
pub struct Truncate<R> {
    base: R,
    limit: usize,
}

impl<R: ArtifactRepository> Truncate<R> {
    pub fn new(base: R, limit: usize) -> Self {
        Self { base, limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl<R: ArtifactRepository> ArtifactRepository for Truncate<R> {
    fn plugin_entries(&self) -> Listing<Vec<CatalogEntry>> {
        self.base.plugin_entries().map(|entries| {
            let total = entries.len();
            let kept: Vec<_> = entries.into_iter().take(self.limit).collect();
            debug!(total, kept = kept.len(), "truncated plugin entries");
            kept
        })
    }

    fn core_releases(&self) -> Listing<CoreReleases> {
        self.base.core_releases()
    }

    fn releases_by_date(&self) -> Listing<Vec<ReleaseHistoryBucket>> {
        self.base.releases_by_date()
    }
}
