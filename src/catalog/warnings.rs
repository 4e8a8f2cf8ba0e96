//! Security warnings published alongside the catalog.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::records::SecurityWarning;

/// File read from the resources directory.
pub const WARNINGS_FILE: &str = "warnings.json";

#[derive(Debug, Error)]
pub enum WarningsError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read `warnings.json` from `resources_dir`. A missing or malformed file
/// fails the build; a warning is never dropped silently.
pub fn load_warnings(resources_dir: &Path) -> Result<Vec<SecurityWarning>, WarningsError> {
    let path = resources_dir.join(WARNINGS_FILE);
    let text = fs::read_to_string(&path).map_err(|source| WarningsError::Read {
        path: path.clone(),
        source,
    })?;
    let warnings: Vec<SecurityWarning> =
        serde_json::from_str(&text).map_err(|source| WarningsError::Malformed {
            path: path.clone(),
            source,
        })?;

    info!(path = %path.display(), warnings = warnings.len(), "loaded security warnings");
    Ok(warnings)
}
