//! Output files
//!
//! Every document is rendered to memory first; nothing is written until all
//! of them rendered, so a serialization failure leaves the output directory
//! untouched.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::AssembledCatalog;

pub const UPDATE_CENTER_ACTUAL: &str = "update-center.actual.json";
pub const UPDATE_CENTER_JSONP: &str = "update-center.json";
pub const UPDATE_CENTER_HTML: &str = "update-center.json.html";
pub const PLUGIN_VERSIONS: &str = "plugin-versions.json";
pub const RELEASE_HISTORY: &str = "release-history.json";
pub const DOCUMENTATION_URLS: &str = "plugin-documentation-urls.json";
pub const LATEST_CORE_TXT: &str = "latestCore.txt";
pub const PLUGIN_COUNT_TXT: &str = "pluginCount.txt";

/// A file written to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenFile {
    /// Path relative to the output directory
    pub name: String,
    pub sha256: String,
    pub bytes: u64,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("JCS canonicalization error: {0}")]
    Canonicalize(String),
}

/// Wrap a rendered document in the JSONP callback clients load.
pub fn jsonp(json: &str) -> String {
    format!("updateCenter.post(\n{}\n);", json)
}

/// Wrap a rendered document in a page that posts it to the parent window.
pub fn post_message_html(json: &str) -> String {
    format!(
        "\u{FEFF}<!DOCTYPE html><html><head><meta http-equiv='Content-Type' content='text/html;charset=UTF-8' /></head><body><script>window.onload = function () {{ window.parent.postMessage(JSON.stringify(\n{}\n),'*'); }};</script></body></html>",
        json
    )
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Renders catalog documents and writes them under one directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
    pretty: bool,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            dir: dir.into(),
            pretty,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn render_json<T: Serialize>(&self, value: &T) -> Result<String, OutputError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }

    /// File names and contents for a catalog, in write order.
    pub fn render(&self, catalog: &AssembledCatalog) -> Result<Vec<(&'static str, String)>, OutputError> {
        let mut files = Vec::new();

        let update_center = self.render_json(&catalog.update_center)?;
        files.push((UPDATE_CENTER_JSONP, jsonp(&update_center)));
        files.push((UPDATE_CENTER_HTML, post_message_html(&update_center)));
        files.push((UPDATE_CENTER_ACTUAL, update_center));

        // Always compact, matching what plugin sites fetch.
        files.push((
            DOCUMENTATION_URLS,
            serde_json::to_string(&catalog.documentation_urls)?,
        ));

        if let Some(versions) = &catalog.plugin_versions {
            files.push((PLUGIN_VERSIONS, self.render_json(versions)?));
        }
        if let Some(history) = &catalog.release_history {
            files.push((RELEASE_HISTORY, self.render_json(history)?));
        }
        if let Some(core) = catalog.latest_core() {
            files.push((LATEST_CORE_TXT, core.version.to_string()));
        }
        files.push((PLUGIN_COUNT_TXT, catalog.plugin_count().to_string()));

        Ok(files)
    }

    /// Render everything, then write it.
    pub fn write_catalog(&self, catalog: &AssembledCatalog) -> Result<Vec<WrittenFile>, OutputError> {
        let rendered = self.render(catalog)?;

        fs::create_dir_all(&self.dir).map_err(|source| OutputError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let written = rendered
            .into_iter()
            .map(|(name, contents)| self.write(name, contents.as_bytes()))
            .collect::<Result<Vec<_>, _>>()?;

        info!(dir = %self.dir.display(), files = written.len(), "wrote catalog");
        Ok(written)
    }

    /// Write one file under the output directory.
    pub fn write(&self, name: &str, contents: &[u8]) -> Result<WrittenFile, OutputError> {
        let path = self.dir.join(name);
        fs::write(&path, contents).map_err(|source| OutputError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = contents.len(), "wrote file");

        Ok(WrittenFile {
            name: name.to_string(),
            sha256: sha256_hex(contents),
            bytes: contents.len() as u64,
        })
    }
}
