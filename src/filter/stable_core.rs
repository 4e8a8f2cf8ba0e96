use tracing::debug;

use crate::model::{CatalogEntry, CoreReleases, ReleaseHistoryBucket};
use crate::repository::{ArtifactRepository, Listing};

/// Component count of a long-term-support core version (`2.401.1`).
pub const STABLE_CORE_COMPONENTS: usize = 3;

/// Keeps only long-term-support core releases.
///
/// Weekly releases have two components (`2.402`) and are dropped. Plugin
/// entries pass through.
#[derive(Debug, Clone)]
pub struct StableCoreOnly<R> {
    base: R,
}

impl<R: ArtifactRepository> StableCoreOnly<R> {
    pub fn new(base: R) -> Self {
        Self { base }
    }
}

impl<R: ArtifactRepository> ArtifactRepository for StableCoreOnly<R> {
    fn plugin_entries(&self) -> Listing<Vec<CatalogEntry>> {
        self.base.plugin_entries()
    }

    fn core_releases(&self) -> Listing<CoreReleases> {
        self.base.core_releases().map(|releases| {
            let kept =
                releases.retain(|a| a.version().component_count() == STABLE_CORE_COMPONENTS);
            debug!(before = releases.len(), after = kept.len(), "kept stable core releases");
            kept
        })
    }

    fn releases_by_date(&self) -> Listing<Vec<ReleaseHistoryBucket>> {
        self.base.releases_by_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::testing::{core_versions, plugin_versions, repository};

    #[test]
    fn test_drops_weekly_releases() {
        let repo = StableCoreOnly::new(repository(&[], &["1.600.1", "1.601", "2.0.1"]));
        assert_eq!(core_versions(&repo), vec!["2.0.1", "1.600.1"]);
    }

    #[test]
    fn test_kept_have_three_components_dropped_do_not() {
        let base = repository(&[], &["1", "1.600", "1.600.1", "1.600.1.2", "2.0.1-rc1", "2.0.1"]);
        let kept = core_versions(&StableCoreOnly::new(&base));

        for version in core_versions(&base) {
            let components = uc_version::VersionNumber::parse(&version).unwrap().component_count();
            assert_eq!(kept.contains(&version), components == 3, "{version}");
        }
    }

    #[test]
    fn test_plugins_pass_through() {
        let base = repository(&[("foo", &["1.0", "1.1"])], &["2.0"]);
        let filtered = StableCoreOnly::new(&base);
        assert_eq!(plugin_versions(&filtered), plugin_versions(&base));
        assert!(core_versions(&filtered).is_empty());
    }
}
