use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    logs: HashMap<String, LogEntry>,
    #[serde(default)]
    configs: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LogEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        subjects: Vec<String>,
    },
}

impl LogEntry {
    fn as_path(&self) -> &str {
        match self {
            LogEntry::Path(path) => path,
            LogEntry::Detailed { path, .. } => path,
        }
    }

    fn subjects(&self) -> &[String] {
        match self {
            LogEntry::Path(_) => &[],
            LogEntry::Detailed { subjects, .. } => subjects,
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod logs {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.logs.keys().cloned().collect()
    }

    pub fn csv(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.logs, "log", name)?;
        read_to_string(entry.as_path())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.logs, "log", name)?;
        Ok(resolve_path(entry.as_path()))
    }

    /// Subjects the fixture is documented to contain, in first-seen order.
    pub fn subjects(name: &str) -> Result<Vec<String>> {
        let entry = lookup(&MANIFEST.logs, "log", name)?;
        Ok(entry.subjects().to_vec())
    }
}

pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.configs.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        read_to_string(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        Ok(resolve_path(rel))
    }
}
