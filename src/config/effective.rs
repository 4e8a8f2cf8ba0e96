//! Effective catalog configuration with provenance
//!
//! Layers are merged as JSON values, then the merged document is validated
//! into a typed, immutable [`CatalogConfig`]. A config is built fresh for every
//! run and never shared between runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use uc_version::{MalformedVersionError, VersionNumber};

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use crate::filter::{Compatibility, ExperimentalMode};
use crate::model::JavaVersion;

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Merged document shape. Unknown keys are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    id: String,
    connection_check_url: String,
    source: RawSource,
    output: RawOutput,
    filter: RawFilter,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSource {
    dir: PathBuf,
    resources_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutput {
    dir: PathBuf,
    pretty: bool,
    skip_release_history: bool,
    skip_plugin_versions: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFilter {
    max_plugins: Option<i64>,
    experimental: String,
    stable_core: bool,
    plugin_cap: Option<String>,
    core_cap: Option<String>,
    java_version: Option<String>,
}

/// Validated settings for one catalog build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogConfig {
    /// Keep at most this many plugin entries
    pub max_plugins: Option<usize>,

    pub experimental: ExperimentalMode,

    /// Keep only three-component core releases
    pub stable_core: bool,

    pub plugin_cap: Option<VersionNumber>,

    /// Core cap as configured. See [`CatalogConfig::effective_core_cap`].
    pub core_cap: Option<VersionNumber>,

    /// Target Java version for compatibility filtering
    pub java_version: Option<JavaVersion>,

    pub id: String,

    pub connection_check_url: String,

    pub pretty: bool,

    pub skip_release_history: bool,

    pub skip_plugin_versions: bool,

    pub output_dir: PathBuf,

    pub source_dir: PathBuf,

    /// Directory holding `warnings.json`; no warnings are published without it
    pub resources_dir: Option<PathBuf>,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl CatalogConfig {
    /// Build from built-in defaults, an optional TOML file and CLI overrides.
    ///
    /// A config file that was named but cannot be read is an error.
    pub fn build(config_path: Option<&Path>, cli_overrides: Option<Value>) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        // Layer 1: Built-in defaults
        layers.push(BuiltinDefaults::default().to_value());
        sources.push(ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        });

        // Layer 2: Config file
        if let Some(path) = config_path {
            let (value, digest) = load_toml_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        // Layer 3: CLI overrides
        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        let raw: RawConfig =
            serde_json::from_value(merged).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Self::validate(raw, sources)
    }

    /// Built-in defaults only.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::build(None, None)
    }

    fn validate(raw: RawConfig, sources: Vec<ConfigSource>) -> Result<Self, ConfigError> {
        let max_plugins = match raw.filter.max_plugins {
            Some(n) if n < 0 => {
                return Err(ConfigError::Validation(format!(
                    "filter.max_plugins must be >= 0, got {}",
                    n
                )))
            }
            Some(n) => Some(usize::try_from(n).map_err(|e| ConfigError::Validation(e.to_string()))?),
            None => None,
        };

        let experimental: ExperimentalMode = raw
            .filter
            .experimental
            .parse()
            .map_err(|e: String| ConfigError::Validation(format!("filter.experimental: {}", e)))?;

        let plugin_cap = parse_optional_version("filter.plugin_cap", raw.filter.plugin_cap)?;
        let core_cap = parse_optional_version("filter.core_cap", raw.filter.core_cap)?;

        let java_version = raw
            .filter
            .java_version
            .map(|text| {
                JavaVersion::parse(&text).map_err(|source| ConfigError::InvalidVersion {
                    key: "filter.java_version".to_string(),
                    source,
                })
            })
            .transpose()?;

        if raw.id.trim().is_empty() {
            return Err(ConfigError::Validation("id must not be empty".to_string()));
        }

        Ok(Self {
            max_plugins,
            experimental,
            stable_core: raw.filter.stable_core,
            plugin_cap,
            core_cap,
            java_version,
            id: raw.id,
            connection_check_url: raw.connection_check_url,
            pretty: raw.output.pretty,
            skip_release_history: raw.output.skip_release_history,
            skip_plugin_versions: raw.output.skip_plugin_versions,
            output_dir: raw.output.dir,
            source_dir: raw.source.dir,
            resources_dir: raw.source.resources_dir,
            sources,
        })
    }

    /// Core cap in force: the configured one, else the plugin cap.
    pub fn effective_core_cap(&self) -> Option<&VersionNumber> {
        self.core_cap.as_ref().or(self.plugin_cap.as_ref())
    }

    /// Compatibility predicates, in application order.
    pub fn predicates(&self) -> Vec<Compatibility> {
        self.java_version
            .iter()
            .cloned()
            .map(Compatibility::MinimumJava)
            .collect()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn parse_optional_version(key: &str, text: Option<String>) -> Result<Option<VersionNumber>, ConfigError> {
    text.map(|text| {
        VersionNumber::parse(&text).map_err(|source| ConfigError::InvalidVersion {
            key: key.to_string(),
            source,
        })
    })
    .transpose()
}

/// Load and parse a TOML file, returning the value and digest
fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
    let bytes = fs::read(path).map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8(bytes)
        .map_err(|e| ConfigError::Parse(format!("{}: invalid UTF-8: {}", path.display(), e)))?;

    let toml_value: toml::Value = toml::from_str(&contents)
        .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;

    Ok((toml_to_json(toml_value), digest))
}

fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Configuration errors. All of them abort the run before any output.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("invalid version for {key}: {source}")]
    InvalidVersion {
        key: String,
        #[source]
        source: MalformedVersionError,
    },
}
