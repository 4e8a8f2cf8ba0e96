//! Display metadata for plugin releases (title, documentation page).

use crate::model::Artifact;
use crate::repository::ArtifactResolutionError;

/// Base of the per-plugin documentation site.
pub const PLUGIN_SITE_URL: &str = "https://plugins.jenkins.io/";

/// Documentation page for a plugin on the plugin site.
pub fn plugin_site_url(name: &str) -> String {
    format!("{}{}", PLUGIN_SITE_URL, name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMetadata {
    pub title: String,
    pub documentation_url: String,
}

/// Supplies display metadata for a release. Implementations may be remote
/// and slow, which is why release history only asks for recent releases.
pub trait MetadataResolver {
    fn resolve(&self, artifact: &Artifact) -> Result<PluginMetadata, ArtifactResolutionError>;
}

impl<M: MetadataResolver + ?Sized> MetadataResolver for &M {
    fn resolve(&self, artifact: &Artifact) -> Result<PluginMetadata, ArtifactResolutionError> {
        (**self).resolve(artifact)
    }
}

/// Reads metadata carried by the descriptor itself.
///
/// A missing or blank title falls back to the plugin name, a missing
/// documentation URL to the plugin site page.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorMetadata;

impl MetadataResolver for DescriptorMetadata {
    fn resolve(&self, artifact: &Artifact) -> Result<PluginMetadata, ArtifactResolutionError> {
        let title = artifact
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| artifact.name())
            .to_string();

        let documentation_url = artifact
            .documentation_url
            .clone()
            .unwrap_or_else(|| plugin_site_url(artifact.name()));

        Ok(PluginMetadata {
            title,
            documentation_url,
        })
    }
}
