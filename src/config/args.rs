//! Command-line build options (layer 3) and batch argument files.

use clap::{Args, Parser};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use super::{CatalogConfig, ConfigError};

/// Options accepted by `build` and by each line of a batch arguments file.
#[derive(Debug, Clone, Default, Args)]
pub struct BuildArgs {
    /// Descriptor directory to scan
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Directory holding warnings.json
    #[arg(long, value_name = "DIR")]
    pub resources_dir: Option<PathBuf>,

    /// Output directory for generated files
    #[arg(long, value_name = "DIR")]
    pub www: Option<PathBuf>,

    /// TOML config file layered over the built-in defaults
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Keep at most N plugins (for dry runs)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub max_plugins: Option<i64>,

    /// Keep only pre-release plugin versions
    #[arg(long)]
    pub experimental_only: bool,

    /// Drop pre-release plugin versions
    #[arg(long)]
    pub no_experimental: bool,

    /// Keep only LTS (three-component) core releases
    #[arg(long)]
    pub stable_core: bool,

    /// Drop plugin versions above this version
    #[arg(long, value_name = "VERSION")]
    pub cap: Option<String>,

    /// Drop core releases above this version (defaults to --cap)
    #[arg(long, value_name = "VERSION")]
    pub cap_core: Option<String>,

    /// Drop plugin versions that need a newer Java than this
    #[arg(long, value_name = "VERSION")]
    pub java_version: Option<String>,

    /// Update center identifier
    #[arg(long)]
    pub id: Option<String>,

    /// URL clients use to check connectivity
    #[arg(long, value_name = "URL")]
    pub connection_check_url: Option<String>,

    /// Indent JSON output
    #[arg(long)]
    pub pretty: bool,

    #[arg(long)]
    pub skip_release_history: bool,

    #[arg(long)]
    pub skip_plugin_versions: bool,
}

impl BuildArgs {
    /// Only the options actually given, shaped like the config document.
    pub fn to_overrides(&self) -> Result<Value, ConfigError> {
        let mut root = Map::new();
        let mut filter = Map::new();
        let mut output = Map::new();

        if self.experimental_only && self.no_experimental {
            return Err(ConfigError::Validation(
                "--experimental-only and --no-experimental are mutually exclusive".to_string(),
            ));
        }
        if self.experimental_only {
            filter.insert("experimental".into(), json!("experimental-only"));
        }
        if self.no_experimental {
            filter.insert("experimental".into(), json!("no-experimental"));
        }
        if self.stable_core {
            filter.insert("stable_core".into(), json!(true));
        }
        if let Some(n) = self.max_plugins {
            filter.insert("max_plugins".into(), json!(n));
        }
        if let Some(cap) = &self.cap {
            filter.insert("plugin_cap".into(), json!(cap));
        }
        if let Some(cap) = &self.cap_core {
            filter.insert("core_cap".into(), json!(cap));
        }
        if let Some(java) = &self.java_version {
            filter.insert("java_version".into(), json!(java));
        }

        if let Some(www) = &self.www {
            output.insert("dir".into(), json!(www.to_string_lossy()));
        }
        if self.pretty {
            output.insert("pretty".into(), json!(true));
        }
        if self.skip_release_history {
            output.insert("skip_release_history".into(), json!(true));
        }
        if self.skip_plugin_versions {
            output.insert("skip_plugin_versions".into(), json!(true));
        }

        let mut source = Map::new();
        if let Some(dir) = &self.source {
            source.insert("dir".into(), json!(dir.to_string_lossy()));
        }
        if let Some(dir) = &self.resources_dir {
            source.insert("resources_dir".into(), json!(dir.to_string_lossy()));
        }
        if !source.is_empty() {
            root.insert("source".into(), Value::Object(source));
        }
        if let Some(id) = &self.id {
            root.insert("id".into(), json!(id));
        }
        if let Some(url) = &self.connection_check_url {
            root.insert("connection_check_url".into(), json!(url));
        }
        if !filter.is_empty() {
            root.insert("filter".into(), Value::Object(filter));
        }
        if !output.is_empty() {
            root.insert("output".into(), Value::Object(output));
        }

        Ok(Value::Object(root))
    }

    /// Layer these options over the defaults and the named config file.
    pub fn resolve(&self) -> Result<CatalogConfig, ConfigError> {
        CatalogConfig::build(self.config.as_deref(), Some(self.to_overrides()?))
    }
}

#[derive(Debug, Parser)]
#[command(name = "batch-line", no_binary_name = true)]
struct BatchLine {
    #[command(flatten)]
    args: BuildArgs,
}

/// One invocation read from a batch arguments file.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    /// 1-based line number in the arguments file
    pub line: usize,
    pub args: BuildArgs,
}

/// Read a batch arguments file: one build per line, blank lines and `#`
/// comments skipped. Every line is parsed before any build runs, so a typo
/// on the last line fails the batch up front.
pub fn read_arguments_file(path: &Path) -> Result<Vec<BatchEntry>, ConfigError> {
    let contents =
        fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
    parse_arguments(&contents)
}

pub fn parse_arguments(contents: &str) -> Result<Vec<BatchEntry>, ConfigError> {
    let mut entries = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let tokens = split_line(trimmed)
            .map_err(|e| ConfigError::Parse(format!("line {}: {}", index + 1, e)))?;
        let parsed = BatchLine::try_parse_from(tokens)
            .map_err(|e| ConfigError::Parse(format!("line {}: {}", index + 1, e)))?;

        entries.push(BatchEntry {
            line: index + 1,
            args: parsed.args,
        });
    }

    Ok(entries)
}

/// Split on whitespace, honoring single and double quotes.
fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {} quote", q));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ExperimentalMode;
    use uc_version::VersionNumber;

    #[test]
    fn test_empty_args_override_nothing() {
        let overrides = BuildArgs::default().to_overrides().unwrap();
        assert_eq!(overrides, json!({}));
    }

    #[test]
    fn test_overrides_shape() {
        let args = BuildArgs {
            cap: Some("2.361".to_string()),
            no_experimental: true,
            www: Some(PathBuf::from("out")),
            id: Some("stable".to_string()),
            ..Default::default()
        };

        assert_eq!(
            args.to_overrides().unwrap(),
            json!({
                "id": "stable",
                "filter": {"plugin_cap": "2.361", "experimental": "no-experimental"},
                "output": {"dir": "out"}
            })
        );
    }

    #[test]
    fn test_source_and_resources_share_section() {
        let args = BuildArgs {
            source: Some(PathBuf::from("descriptors")),
            resources_dir: Some(PathBuf::from("resources")),
            ..Default::default()
        };

        assert_eq!(
            args.to_overrides().unwrap(),
            json!({"source": {"dir": "descriptors", "resources_dir": "resources"}})
        );
        let config = args.resolve().unwrap();
        assert_eq!(config.resources_dir, Some(PathBuf::from("resources")));
        assert_eq!(config.source_dir, PathBuf::from("descriptors"));
    }

    #[test]
    fn test_conflicting_experimental_flags() {
        let args = BuildArgs {
            experimental_only: true,
            no_experimental: true,
            ..Default::default()
        };
        assert!(matches!(args.to_overrides(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_split_line() {
        assert_eq!(
            split_line(r#"--id "stable lts" --cap 2.361"#).unwrap(),
            vec!["--id", "stable lts", "--cap", "2.361"]
        );
        assert!(split_line("--id 'open").is_err());
    }

    #[test]
    fn test_parse_arguments() {
        let contents = "\
# weekly
--www out/current

--www out/stable --cap 2.361 --stable-core
";
        let entries = parse_arguments(contents).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].line, 2);
        assert_eq!(entries[1].line, 4);

        let stable = entries[1].args.resolve().unwrap();
        assert_eq!(stable.plugin_cap, Some(VersionNumber::parse("2.361").unwrap()));
        assert!(stable.stable_core);
        assert_eq!(stable.output_dir, PathBuf::from("out/stable"));
    }

    #[test]
    fn test_lines_do_not_inherit() {
        let contents = "--cap 2.361 --no-experimental\n--www out/plain\n";
        let entries = parse_arguments(contents).unwrap();

        let second = entries[1].args.resolve().unwrap();
        assert_eq!(second.plugin_cap, None);
        assert_eq!(second.experimental, ExperimentalMode::Any);
    }

    #[test]
    fn test_unknown_flag_names_line() {
        let err = parse_arguments("--www out\n--bogus\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
