//! Release history grouped by calendar day.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;

use super::artifact::Artifact;
use super::entry::CatalogEntry;

/// Every release made on one UTC calendar day, ordered by plugin name then version.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseHistoryBucket {
    pub date: NaiveDate,
    pub releases: Vec<Arc<Artifact>>,
}

/// Group every version of every entry by release day, most recent day first.
pub fn group_by_release_date(entries: &[CatalogEntry]) -> Vec<ReleaseHistoryBucket> {
    let mut days: BTreeMap<NaiveDate, Vec<Arc<Artifact>>> = BTreeMap::new();

    for entry in entries {
        for artifact in entry.artifacts() {
            days.entry(artifact.released_at.date_naive())
                .or_default()
                .push(Arc::clone(artifact));
        }
    }

    days.into_iter()
        .rev()
        .map(|(date, mut releases)| {
            releases.sort_by(|a, b| {
                a.name()
                    .cmp(b.name())
                    .then_with(|| a.version().cmp(b.version()))
            });
            ReleaseHistoryBucket { date, releases }
        })
        .collect()
}
