//! Built-in defaults (layer 1)
//!
//! Every key the catalog configuration understands has a value here, so the
//! merged document is always complete before validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Update center identifier used when none is configured
pub const DEFAULT_ID: &str = "default";

/// URL clients probe to decide whether they are online
pub const DEFAULT_CONNECTION_CHECK_URL: &str = "http://www.google.com/";

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    pub id: String,

    pub connection_check_url: String,

    /// Descriptor directory (default: "descriptors")
    pub source_dir: String,

    /// Directory holding `warnings.json` (default: none, no warnings)
    pub resources_dir: Option<String>,

    /// Output directory (default: "www")
    pub output_dir: String,

    /// Indent JSON output (default: false)
    pub pretty: bool,

    pub skip_release_history: bool,

    pub skip_plugin_versions: bool,

    /// Experimental mode (default: "any")
    pub experimental: String,

    /// Keep only LTS core releases (default: false)
    pub stable_core: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            id: DEFAULT_ID.to_string(),
            connection_check_url: DEFAULT_CONNECTION_CHECK_URL.to_string(),
            source_dir: "descriptors".to_string(),
            resources_dir: None,
            output_dir: "www".to_string(),
            pretty: false,
            skip_release_history: false,
            skip_plugin_versions: false,
            experimental: "any".to_string(),
            stable_core: false,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging.
    ///
    /// Optional keys (`max_plugins`, caps, `java_version`) are present as null.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "connection_check_url": self.connection_check_url,
            "source": {
                "dir": self.source_dir,
                "resources_dir": self.resources_dir
            },
            "output": {
                "dir": self.output_dir,
                "pretty": self.pretty,
                "skip_release_history": self.skip_release_history,
                "skip_plugin_versions": self.skip_plugin_versions
            },
            "filter": {
                "max_plugins": null,
                "experimental": self.experimental,
                "stable_core": self.stable_core,
                "plugin_cap": null,
                "core_cap": null,
                "java_version": null
            }
        })
    }
}
