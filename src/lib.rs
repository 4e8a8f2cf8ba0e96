//! Update center catalog builder
//!
//! Builds the metadata a plugin-based platform's update center serves: the
//! latest release of every plugin, the current core release and the release
//! history, after a configurable chain of repository filters.
//!
//! Data flows leaf to root:
//! - [`repository`]: the [`ArtifactRepository`] contract and its data sources
//! - [`filter`]: decorators that narrow what a repository returns
//! - [`config`]: layered configuration and decorator chain construction
//! - [`catalog`]: assembles the output documents from the outermost decorator
//! - [`output`] and [`summary`]: write the documents and the build summary

pub mod catalog;
pub mod config;
pub mod filter;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod repository;
pub mod summary;

pub use catalog::{AssembledCatalog, CatalogAssembler, DescriptorMetadata, MetadataResolver};
pub use config::{build_chain, BuildArgs, CatalogConfig, ConfigError};
pub use model::{Artifact, CatalogEntry, CoreReleases, ReleaseHistoryBucket};
pub use pipeline::{list_plugins, prepare_build, run_batch, run_build, BuildError, PreparedBuild};
pub use repository::{ArtifactRepository, ArtifactResolutionError, DescriptorRepository, Listing, MemoryRepository};
pub use uc_version::{MalformedVersionError, VersionNumber};
