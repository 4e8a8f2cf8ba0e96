//! Catalog configuration
//!
//! Three layers merge into one [`CatalogConfig`] per run:
//! 1. Built-in defaults
//! 2. Optional TOML config file (`--config`)
//! 3. Command-line flags
//!
//! The config is immutable once built. Batch runs build a fresh one per line.

mod args;
mod chain;
mod defaults;
mod effective;
mod merge;

pub use args::{parse_arguments, read_arguments_file, BatchEntry, BuildArgs};
pub use chain::build_chain;
pub use defaults::{BuiltinDefaults, DEFAULT_CONNECTION_CHECK_URL, DEFAULT_ID};
pub use effective::{CatalogConfig, ConfigError, ConfigOrigin, ConfigSource};
pub use merge::{deep_merge, merge_layers};
