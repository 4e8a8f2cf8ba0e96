//! Build orchestration
//!
//! One build:
//! - Scan the descriptor directory and load security warnings
//! - Wrap the scan in the configured decorator chain
//! - Assemble the catalog documents and the build summary
//! - Write them
//!
//! Everything up to the last step is [`prepare_build`], which touches no
//! files, so fatal errors (config, malformed version, missing source, bad
//! warnings, canonicalization) leave nothing behind.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::io;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, info_span, warn};
use uc_version::VersionNumber;

use crate::catalog::{
    load_warnings, AssembleOptions, AssembledCatalog, CatalogAssembler, DescriptorMetadata,
    WarningsError,
};
use crate::config::{build_chain, BatchEntry, CatalogConfig, ConfigError};
use crate::output::{OutputError, OutputWriter};
use crate::repository::{ArtifactRepository, ArtifactResolutionError, DescriptorRepository, ScanError};
use crate::summary::{BuildSummary, BUILD_SUMMARY_FILE};

/// Process exit codes
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const IO: i32 = 1;
    pub const CONFIG: i32 = 2;
    pub const MALFORMED_VERSION: i32 = 3;
}

/// Fatal build errors
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error("security warnings: {0}")]
    Warnings(#[from] WarningsError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("batch line {line}: {source}")]
    BatchLine {
        line: usize,
        #[source]
        source: Box<BuildError>,
    },
}

impl BuildError {
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::Config(_) | BuildError::Warnings(_) => exit_code::CONFIG,
            BuildError::Scan(ScanError::MalformedVersion { .. }) => exit_code::MALFORMED_VERSION,
            BuildError::Scan(ScanError::RootNotFound(_)) => exit_code::IO,
            BuildError::Output(_) | BuildError::Io(_) => exit_code::IO,
            BuildError::BatchLine { source, .. } => source.exit_code(),
        }
    }
}

impl From<&CatalogConfig> for AssembleOptions {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            id: config.id.clone(),
            connection_check_url: config.connection_check_url.clone(),
            release_history: !config.skip_release_history,
            plugin_versions: !config.skip_plugin_versions,
            warnings: Vec::new(),
        }
    }
}

/// A build computed in full whose files have not been written.
#[derive(Debug)]
pub struct PreparedBuild {
    catalog: AssembledCatalog,
    summary: BuildSummary,
    writer: OutputWriter,
}

impl PreparedBuild {
    pub fn catalog(&self) -> &AssembledCatalog {
        &self.catalog
    }

    /// Summary without the written-file list.
    pub fn summary(&self) -> &BuildSummary {
        &self.summary
    }

    /// Write the documents, then the summary listing them.
    pub fn write(self) -> Result<BuildSummary, BuildError> {
        let files = self.writer.write_catalog(&self.catalog)?;
        let summary = self.summary.with_files(files);
        summary.write_to_file(&self.writer.dir().join(BUILD_SUMMARY_FILE))?;

        info!(
            plugins = summary.plugin_count,
            core = summary.core_version.as_ref().map(|v| v.as_str()).unwrap_or("none"),
            "build complete"
        );
        Ok(summary)
    }
}

/// Everything up to writing: scan, filter, assemble, summarize.
pub fn prepare_build(config: &CatalogConfig, now: DateTime<Utc>) -> Result<PreparedBuild, BuildError> {
    let source = DescriptorRepository::scan(&config.source_dir)?;

    let mut options = AssembleOptions::from(config);
    if let Some(dir) = &config.resources_dir {
        options.warnings = load_warnings(dir)?;
    }

    let chain = build_chain(&source, config);
    log_chain(config);

    let assembler = CatalogAssembler::new(chain, DescriptorMetadata, now);
    let catalog = assembler.assemble(&options);
    if !catalog.failures.is_empty() {
        warn!(count = catalog.failures.len(), "some artifacts were skipped");
    }

    let summary = BuildSummary::new(&catalog, config.sources.clone(), now)?;

    Ok(PreparedBuild {
        catalog,
        summary,
        writer: OutputWriter::new(&config.output_dir, config.pretty),
    })
}

/// Run one build and write its outputs under `config.output_dir`.
pub fn run_build(config: &CatalogConfig, now: DateTime<Utc>) -> Result<BuildSummary, BuildError> {
    let _span = info_span!("build", id = %config.id, www = %config.output_dir.display()).entered();
    prepare_build(config, now)?.write()
}

/// Run every batch line as an independent build.
///
/// All lines are resolved before the first build starts, so a bad line fails
/// the batch without partial output.
pub fn run_batch(entries: &[BatchEntry], now: DateTime<Utc>) -> Result<Vec<BuildSummary>, BuildError> {
    let configs = entries
        .iter()
        .map(|entry| {
            entry.args.resolve().map_err(|e| BuildError::BatchLine {
                line: entry.line,
                source: Box::new(e.into()),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(builds = configs.len(), "running batch");

    entries
        .iter()
        .zip(&configs)
        .map(|(entry, config)| {
            run_build(config, now).map_err(|e| BuildError::BatchLine {
                line: entry.line,
                source: Box::new(e),
            })
        })
        .collect()
}

/// One plugin in a listing: its latest version after filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedPlugin {
    pub name: String,
    pub group: String,
    pub latest: VersionNumber,
}

/// Latest core and latest plugin versions after filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginListing {
    pub latest_core: Option<VersionNumber>,
    pub plugins: Vec<ListedPlugin>,
    /// Plugin failures, then core failures
    pub failures: Vec<ArtifactResolutionError>,
}

impl PluginListing {
    /// Distinct plugin group ids, sorted.
    pub fn group_ids(&self) -> BTreeSet<&str> {
        self.plugins.iter().map(|p| p.group.as_str()).collect()
    }

    /// Latest core on the first line, then `name<TAB>version` per plugin.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(core) = &self.latest_core {
            let _ = writeln!(out, "{}", core);
        }
        for plugin in &self.plugins {
            let _ = writeln!(out, "{}\t{}", plugin.name, plugin.latest);
        }
        out
    }
}

/// List plugins without writing anything.
pub fn list_plugins(config: &CatalogConfig) -> Result<PluginListing, BuildError> {
    let source = DescriptorRepository::scan(&config.source_dir)?;
    let chain = build_chain(&source, config);
    Ok(listing(&chain))
}

pub fn listing(repository: &dyn ArtifactRepository) -> PluginListing {
    let (entries, mut failures) = repository.plugin_entries().into_parts();
    let (releases, core_failures) = repository.core_releases().into_parts();
    failures.extend(core_failures);
    for failure in &failures {
        warn!(location = failure.location(), "{}", failure);
    }

    let latest_core = releases.latest().map(|core| core.version().clone());

    let plugins = entries
        .iter()
        .filter_map(|entry| {
            entry.latest().map(|latest| ListedPlugin {
                name: entry.name().to_string(),
                group: latest.id.group.clone(),
                latest: latest.version().clone(),
            })
        })
        .collect();

    PluginListing {
        latest_core,
        plugins,
        failures,
    }
}

fn log_chain(config: &CatalogConfig) {
    info!(
        max_plugins = ?config.max_plugins,
        experimental = %config.experimental,
        stable_core = config.stable_core,
        plugin_cap = ?config.plugin_cap.as_ref().map(|v| v.as_str()),
        core_cap = ?config.effective_core_cap().map(|v| v.as_str()),
        "repository filters"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::testing::repository;
    use uc_version::MalformedVersionError;

    #[test]
    fn test_build_error_exit_codes() {
        let config = BuildError::Config(ConfigError::Validation("bad".to_string()));
        assert_eq!(config.exit_code(), exit_code::CONFIG);

        let malformed = BuildError::Scan(ScanError::MalformedVersion {
            location: "plugins/foo.json".to_string(),
            source: MalformedVersionError::Empty,
        });
        assert_eq!(malformed.exit_code(), exit_code::MALFORMED_VERSION);

        let io = BuildError::Io(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert_eq!(io.exit_code(), exit_code::IO);

        let nested = BuildError::BatchLine {
            line: 3,
            source: Box::new(malformed),
        };
        assert_eq!(nested.exit_code(), exit_code::MALFORMED_VERSION);
        assert!(nested.to_string().starts_with("batch line 3"));
    }

    #[test]
    fn test_listing_render() {
        let repo = repository(&[("foo", &["1.0", "2.0"]), ("bar", &["0.1"])], &["2.0.1", "2.1"]);
        let listing = listing(&repo);

        assert_eq!(listing.render(), "2.1\nbar\t0.1\nfoo\t2.0\n");
        assert_eq!(
            listing.group_ids().into_iter().collect::<Vec<_>>(),
            vec!["org.example.plugins"]
        );
    }

    #[test]
    fn test_listing_keeps_core_failures() {
        let failure = |location: &str| ArtifactResolutionError::Unreadable {
            location: location.to_string(),
            reason: "permission denied".to_string(),
        };
        let repo = repository(&[("foo", &["1.0"])], &["2.1"])
            .with_plugin_failure(failure("plugins/bad.json"))
            .with_core_failure(failure("core/bad.json"));

        let listing = listing(&repo);

        let locations: Vec<&str> = listing.failures.iter().map(|f| f.location()).collect();
        assert_eq!(locations, vec!["plugins/bad.json", "core/bad.json"]);
        assert_eq!(listing.render(), "2.1\nfoo\t1.0\n");
    }

    #[test]
    fn test_assemble_options_follow_skip_flags() {
        let mut config = CatalogConfig::defaults().unwrap();
        config.skip_release_history = true;

        let options = AssembleOptions::from(&config);
        assert!(!options.release_history);
        assert!(options.plugin_versions);
        assert_eq!(options.id, "default");
    }
}
