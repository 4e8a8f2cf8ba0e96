//! Catalog assembly
//!
//! [`CatalogAssembler`] drives the outermost repository of a decorator chain
//! and produces the plugin catalog, the current core release and the release
//! history, plus the plugin-versions and documentation-URL supplements.
//! Security warnings are read from the resources directory and published
//! as they are.

mod assembler;
mod metadata;
mod records;
mod warnings;

pub use assembler::{AssembleOptions, AssembledCatalog, CatalogAssembler, RECENT_RELEASE_DAYS};
pub use metadata::{
    plugin_site_url, DescriptorMetadata, MetadataResolver, PluginMetadata, PLUGIN_SITE_URL,
};
pub use records::{
    AffectedVersions, CoreRecord, DocumentationUrl, DocumentationUrls, HistoryDay, HistoryRelease,
    PluginRecord, PluginVersionMap, PluginVersions, ReleaseHistory, SecurityWarning, UpdateCenter,
    VersionRecord, WarningKind, CORE_NAME, UPDATE_CENTER_VERSION,
};
pub use warnings::{load_warnings, WarningsError, WARNINGS_FILE};
