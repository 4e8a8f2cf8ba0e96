use tracing::debug;
use uc_version::VersionNumber;

use super::{retain_history, retain_versions};
use crate::model::{CatalogEntry, CoreReleases, ReleaseHistoryBucket};
use crate::repository::{ArtifactRepository, Listing};

/// Drops plugin versions above `plugin_cap` and core releases above `core_cap`.
///
/// When only the plugin cap is given, the core cap takes the same value.
/// Apply this last in a chain so that "latest" is chosen among versions that
/// satisfy the cap. Capping twice with the same bounds changes nothing.
#[derive(Debug, Clone)]
pub struct VersionCap<R> {
    base: R,
    plugin_cap: Option<VersionNumber>,
    core_cap: Option<VersionNumber>,
}

impl<R: ArtifactRepository> VersionCap<R> {
    pub fn new(base: R, plugin_cap: Option<VersionNumber>, core_cap: Option<VersionNumber>) -> Self {
        // TODO: confirm with release maintainers whether an unset core cap
        // should really inherit the plugin cap.
        let core_cap = core_cap.or_else(|| plugin_cap.clone());
        Self {
            base,
            plugin_cap,
            core_cap,
        }
    }

    pub fn plugin_cap(&self) -> Option<&VersionNumber> {
        self.plugin_cap.as_ref()
    }

    pub fn core_cap(&self) -> Option<&VersionNumber> {
        self.core_cap.as_ref()
    }
}

impl<R: ArtifactRepository> ArtifactRepository for VersionCap<R> {
    fn plugin_entries(&self) -> Listing<Vec<CatalogEntry>> {
        let listing = self.base.plugin_entries();
        let Some(cap) = &self.plugin_cap else {
            return listing;
        };

        listing.map(|entries| {
            let kept = retain_versions(&entries, |a| a.version() <= cap);
            debug!(cap = %cap, before = entries.len(), after = kept.len(), "capped plugin versions");
            kept
        })
    }

    fn core_releases(&self) -> Listing<CoreReleases> {
        let listing = self.base.core_releases();
        let Some(cap) = &self.core_cap else {
            return listing;
        };

        listing.map(|releases| releases.retain(|a| a.version() <= cap))
    }

    fn releases_by_date(&self) -> Listing<Vec<ReleaseHistoryBucket>> {
        let listing = self.base.releases_by_date();
        let Some(cap) = &self.plugin_cap else {
            return listing;
        };

        listing.map(|buckets| retain_history(&buckets, |a| a.version() <= cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::testing::{core_versions, plugin_versions, repository};
    use crate::filter::ExperimentalFilter;
    use crate::model::fixtures::plugin;
    use crate::repository::MemoryRepository;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn v(s: &str) -> VersionNumber {
        VersionNumber::parse(s).unwrap()
    }

    fn base() -> crate::repository::MemoryRepository {
        repository(
            &[
                ("bar", &["1.6", "2.0"]),
                ("foo", &["1.0", "1.1-beta", "2.0"]),
                ("qux", &["1.5", "1.5.0.1"]),
            ],
            &["1.4", "1.5", "1.5.1", "1.6"],
        )
    }

    #[test]
    fn test_plugin_cap_keeps_versions_at_or_below() {
        let capped = VersionCap::new(base(), Some(v("1.5")), None);
        assert_eq!(
            plugin_versions(&capped),
            vec![
                ("foo".to_string(), vec!["1.0".to_string(), "1.1-beta".to_string()]),
                ("qux".to_string(), vec!["1.5".to_string()]),
            ]
        );
    }

    #[test]
    fn test_entry_absent_iff_all_versions_above_cap() {
        let cap = v("1.5");
        let original = plugin_versions(&base());
        let capped = plugin_versions(&VersionCap::new(base(), Some(cap.clone()), None));

        for (name, versions) in original {
            let all_above = versions.iter().all(|s| v(s) > cap);
            let present = capped.iter().any(|(n, _)| *n == name);
            assert_eq!(present, !all_above, "{name}");
        }
        for (_, versions) in &capped {
            assert!(versions.iter().all(|s| v(s) <= cap));
        }
    }

    #[test]
    fn test_latest_follows_cap() {
        let capped = VersionCap::new(base(), Some(v("1.5")), None);
        let entries = capped.plugin_entries().value;
        let foo = entries.iter().find(|e| e.name() == "foo").unwrap();
        assert_eq!(foo.latest().unwrap().version().as_str(), "1.1-beta");
    }

    #[test]
    fn test_no_experimental_after_cap() {
        let chain = ExperimentalFilter::no_experimental(VersionCap::new(base(), Some(v("1.5")), None));
        let entries = chain.plugin_entries().value;
        let foo = entries.iter().find(|e| e.name() == "foo").unwrap();
        assert_eq!(foo.len(), 1);
        assert_eq!(foo.latest().unwrap().version().as_str(), "1.0");
    }

    #[test]
    fn test_core_cap_defaults_to_plugin_cap() {
        let capped = VersionCap::new(base(), Some(v("1.5")), None);
        assert_eq!(capped.core_cap(), Some(&v("1.5")));
        assert_eq!(core_versions(&capped), vec!["1.5", "1.4"]);
    }

    #[test]
    fn test_explicit_core_cap_wins() {
        let capped = VersionCap::new(base(), Some(v("1.5")), Some(v("1.5.1")));
        assert_eq!(core_versions(&capped), vec!["1.5.1", "1.5", "1.4"]);
    }

    #[test]
    fn test_core_cap_alone_leaves_plugins() {
        let capped = VersionCap::new(base(), None, Some(v("1.4")));
        assert_eq!(plugin_versions(&capped), plugin_versions(&base()));
        assert_eq!(core_versions(&capped), vec!["1.4"]);
    }

    #[test]
    fn test_capping_twice_is_idempotent() {
        let once = VersionCap::new(base(), Some(v("1.5")), Some(v("1.5.1")));
        let twice = VersionCap::new(
            VersionCap::new(base(), Some(v("1.5")), Some(v("1.5.1"))),
            Some(v("1.5")),
            Some(v("1.5.1")),
        );
        assert_eq!(once.plugin_entries(), twice.plugin_entries());
        assert_eq!(once.core_releases(), twice.core_releases());
    }

    #[test]
    fn test_cap_below_everything_is_empty_not_error() {
        let capped = VersionCap::new(base(), Some(v("0.1")), None);
        assert!(capped.plugin_entries().value.is_empty());
        assert!(capped.core_releases().value.is_empty());
    }

    #[test]
    fn test_history_drops_days_left_empty() {
        let mut old = plugin("foo", "1.0");
        old.released_at = Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap();
        let repo = MemoryRepository::new(vec![old, plugin("foo", "2.0")]);

        let capped = VersionCap::new(repo, Some(v("1.5")), None);
        let days: Vec<NaiveDate> = capped.releases_by_date().value.iter().map(|b| b.date).collect();

        assert_eq!(days, vec![NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()]);
    }
}
