//! Shared helpers for integration tests: descriptor trees on disk.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use update_center::CatalogConfig;

/// A temporary workspace with a descriptor directory and an output directory.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("descriptors")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn descriptors(&self) -> PathBuf {
        self.dir.path().join("descriptors")
    }

    pub fn www(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write_raw(&self, rel: &str, contents: &str) {
        let path = self.descriptors().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn write_descriptor(&self, rel: &str, value: &Value) {
        self.write_raw(rel, &serde_json::to_string_pretty(value).unwrap());
    }

    /// A plugin release; `extra` keys are merged over the defaults.
    pub fn plugin(&self, name: &str, version: &str, released_at: &str, extra: Value) -> &Self {
        let mut descriptor = json!({
            "group": "org.example.plugins",
            "name": name,
            "version": version,
            "url": format!("https://repo.example.org/plugins/{name}/{version}/{name}.hpi"),
            "sha256": "ab".repeat(32),
            "released_at": released_at,
            "required_core": "2.361.4"
        });
        if let (Some(base), Some(extra)) = (descriptor.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        self.write_descriptor(&format!("plugins/{name}/{version}.json"), &descriptor);
        self
    }

    pub fn core(&self, version: &str, released_at: &str) -> &Self {
        self.write_descriptor(
            &format!("core/{version}.json"),
            &json!({
                "kind": "core",
                "group": "org.example.main",
                "name": "core-war",
                "version": version,
                "url": format!("https://repo.example.org/war/{version}/core.war"),
                "sha256": "cd".repeat(32),
                "released_at": released_at
            }),
        );
        self
    }

    /// Config reading this workspace's descriptors and writing to `www`.
    pub fn config(&self, www: &str, filter: Value) -> CatalogConfig {
        self.config_with(www, json!({ "filter": filter }))
    }

    pub fn config_with(&self, www: &str, overrides: Value) -> CatalogConfig {
        let mut layer = json!({
            "source": {"dir": self.descriptors().to_string_lossy()},
            "output": {"dir": self.www(www).to_string_lossy()}
        });
        if let (Some(base), Some(extra)) = (layer.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                match (base.get_mut(k), v) {
                    (Some(Value::Object(existing)), Value::Object(more)) => {
                        existing.extend(more.clone());
                    }
                    _ => {
                        base.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        CatalogConfig::build(None, Some(layer)).unwrap()
    }
}

/// The standard sample: two plugins and three core releases.
pub fn sample() -> Workspace {
    let ws = Workspace::new();
    ws.plugin("foo", "1.0", "2024-01-10T10:00:00Z", json!({}))
        .plugin("foo", "1.1-beta", "2024-02-01T10:00:00Z", json!({}))
        .plugin(
            "foo",
            "2.0",
            "2024-06-20T10:00:00Z",
            json!({"title": "Foo", "dependencies": [{"name": "bar", "version": "1.6"}]}),
        )
        .plugin("bar", "1.6", "2024-03-05T08:00:00Z", json!({}))
        .plugin("bar", "2.0", "2024-06-21T08:00:00Z", json!({"minimum_java_version": "17"}))
        .core("1.600.1", "2024-01-01T00:00:00Z")
        .core("1.601", "2024-01-08T00:00:00Z")
        .core("2.0.1", "2024-06-01T00:00:00Z");
    ws
}

pub fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}
