//! Build summary (build_summary.json)
//!
//! Records what one build produced so successive runs can be compared
//! without diffing the full documents.

mod build_summary;

pub use build_summary::{
    catalog_digest, BuildSummary, FailureRecord, BUILD_SUMMARY_FILE, BUILD_SUMMARY_SCHEMA_ID,
    BUILD_SUMMARY_SCHEMA_VERSION,
};
