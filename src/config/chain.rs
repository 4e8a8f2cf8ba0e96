//! Decorator chain construction from a [`CatalogConfig`].

use tracing::{info, warn};

use super::CatalogConfig;
use crate::filter::{
    AllOf, ExperimentalFilter, PredicateFilter, StableCoreOnly, Truncate, VersionCap,
};
use crate::repository::ArtifactRepository;

/// Wrap `base` in the decorators `config` asks for.
///
/// Order is fixed: compatibility predicates, truncation, experimental split,
/// core stability, version cap. The cap goes last so "latest" is chosen among
/// versions that survived every other restriction.
pub fn build_chain<'a, R>(base: R, config: &CatalogConfig) -> Box<dyn ArtifactRepository + 'a>
where
    R: ArtifactRepository + 'a,
{
    let mut chain: Box<dyn ArtifactRepository + 'a> = Box::new(base);

    let predicates = config.predicates();
    if predicates.is_empty() {
        warn!("no target java version; compatibility filters not applied");
    } else {
        let all = predicates
            .into_iter()
            .fold(AllOf::new(), |all, predicate| all.with(predicate));
        if let Some(java) = &config.java_version {
            info!(java = %java, "filtering plugins for java compatibility");
        }
        chain = Box::new(PredicateFilter::new(chain, all));
    }

    if let Some(limit) = config.max_plugins {
        chain = Box::new(Truncate::new(chain, limit));
    }

    if let Some(channel) = config.experimental.channel() {
        chain = Box::new(ExperimentalFilter::new(chain, channel));
    }

    if config.stable_core {
        chain = Box::new(StableCoreOnly::new(chain));
    }

    if config.plugin_cap.is_some() || config.core_cap.is_some() {
        chain = Box::new(VersionCap::new(
            chain,
            config.plugin_cap.clone(),
            config.core_cap.clone(),
        ));
    }

    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::testing::{core_versions, history_names, plugin_versions, repository};
    use crate::model::fixtures::{core, plugin};
    use crate::model::JavaVersion;
    use crate::repository::MemoryRepository;
    use serde_json::json;

    fn config(overrides: serde_json::Value) -> CatalogConfig {
        CatalogConfig::build(None, Some(json!({ "filter": overrides }))).unwrap()
    }

    fn base() -> MemoryRepository {
        repository(
            &[
                ("bar", &["1.6", "2.0"]),
                ("foo", &["1.0", "1.1-beta", "2.0"]),
            ],
            &["1.600.1", "1.601", "2.0.1"],
        )
    }

    #[test]
    fn test_default_config_is_passthrough() {
        let chain = build_chain(base(), &CatalogConfig::defaults().unwrap());
        assert_eq!(plugin_versions(&chain), plugin_versions(&base()));
        assert_eq!(core_versions(&chain), core_versions(&base()));
    }

    #[test]
    fn test_cap_then_no_experimental() {
        let chain = build_chain(
            base(),
            &config(json!({"plugin_cap": "1.5", "experimental": "no-experimental"})),
        );
        assert_eq!(
            plugin_versions(&chain),
            vec![("foo".to_string(), vec!["1.0".to_string()])]
        );
        // core cap follows the plugin cap
        assert!(core_versions(&chain).is_empty());
    }

    #[test]
    fn test_stable_core_with_core_cap() {
        let chain = build_chain(
            base(),
            &config(json!({"stable_core": true, "core_cap": "2.0"})),
        );
        assert_eq!(core_versions(&chain), vec!["1.600.1"]);
        assert_eq!(plugin_versions(&chain), plugin_versions(&base()));
    }

    #[test]
    fn test_truncate_applies_before_cap() {
        // "bar" is dropped by the cap after truncation kept only it.
        let chain = build_chain(base(), &config(json!({"max_plugins": 1, "plugin_cap": "1.5"})));
        assert!(plugin_versions(&chain).is_empty());
    }

    #[test]
    fn test_truncation_leaves_history_whole_under_every_filter() {
        let outer = [
            json!({}),
            json!({"experimental": "no-experimental"}),
            json!({"experimental": "experimental-only"}),
            json!({"stable_core": true}),
            json!({"plugin_cap": "9.0"}),
            json!({"java_version": "21"}),
        ];

        for filter in outer {
            let whole = build_chain(base(), &config(filter.clone()));

            let mut truncated_filter = filter.clone();
            truncated_filter["max_plugins"] = json!(1);
            let truncated = build_chain(base(), &config(truncated_filter));

            assert!(plugin_versions(&truncated).len() <= 1, "{filter}");
            assert_eq!(history_names(&truncated), history_names(&whole), "{filter}");
        }
    }

    #[test]
    fn test_truncated_history_keeps_dropped_entries() {
        let chain = build_chain(
            base(),
            &config(json!({"max_plugins": 1, "experimental": "no-experimental"})),
        );
        assert_eq!(
            history_names(&chain),
            vec![vec!["bar", "bar", "foo", "foo"]]
        );
    }

    #[test]
    fn test_java_filter() {
        let mut modern = plugin("baz", "2.0");
        modern.minimum_java_version = Some(JavaVersion::parse("17").unwrap());
        let repo = MemoryRepository::new(vec![plugin("baz", "1.0"), modern, core("2.0.1")]);

        let chain = build_chain(repo, &config(json!({"java_version": "11"})));
        assert_eq!(
            plugin_versions(&chain),
            vec![("baz".to_string(), vec!["1.0".to_string()])]
        );
    }

    #[test]
    fn test_fresh_config_per_run() {
        let capped = config(json!({"plugin_cap": "1.5"}));
        let _ = build_chain(base(), &capped);

        let chain = build_chain(base(), &CatalogConfig::defaults().unwrap());
        assert_eq!(plugin_versions(&chain), plugin_versions(&base()));
    }
}
