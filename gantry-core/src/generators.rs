// gantry-core/src/generators.rs
//! Template lookup for code generators, layered by the generator scope.
//!
//! Templates live under `<root>/<scope>/<generator>/`. Scopes are searched in
//! precedence order, with the framework's base scope last.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gantry_common::error::{GantryError, Result};
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

pub const BASE_SCOPE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    /// Path relative to the generator directory.
    pub relative: PathBuf,
    pub source: PathBuf,
    pub scope: String,
}

#[derive(Debug, Clone)]
pub struct TemplateLocator {
    root: PathBuf,
    scope: Vec<String>,
}

impl TemplateLocator {
    pub fn new(root: impl Into<PathBuf>, scope: &[String]) -> Self {
        let mut layered: Vec<String> = Vec::with_capacity(scope.len() + 1);
        for s in scope.iter().map(String::as_str).chain([BASE_SCOPE]) {
            if !layered.iter().any(|existing| existing == s) {
                layered.push(s.to_string());
            }
        }
        Self {
            root: root.into(),
            scope: layered,
        }
    }

    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    /// Existing generator directories, highest precedence first.
    pub fn scope_dirs(&self, generator: &str) -> Vec<(String, PathBuf)> {
        self.scope
            .iter()
            .map(|s| (s.clone(), self.root.join(s).join(generator)))
            .filter(|(_, dir)| dir.is_dir())
            .collect()
    }

    /// First template named `file` across the layers.
    pub fn find(&self, generator: &str, file: impl AsRef<Path>) -> Option<PathBuf> {
        let file = file.as_ref();
        self.scope_dirs(generator)
            .into_iter()
            .map(|(_, dir)| dir.join(file))
            .find(|candidate| candidate.is_file())
    }

    /// All templates for `generator`; a file in a higher layer shadows the
    /// same relative path in lower layers.
    pub fn templates(&self, generator: &str) -> Result<Vec<Template>> {
        let mut merged: BTreeMap<PathBuf, Template> = BTreeMap::new();
        for (scope, dir) in self.scope_dirs(generator) {
            for entry in WalkDir::new(&dir).follow_links(true) {
                let entry = entry.map_err(|e| GantryError::from(std::io::Error::from(e)))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(&dir)
                    .map_err(|e| GantryError::Config(format!("template path: {e}")))?
                    .to_path_buf();
                if merged.contains_key(&relative) {
                    debug!("{} shadowed by a higher layer", entry.path().display());
                    continue;
                }
                merged.insert(
                    relative.clone(),
                    Template {
                        relative,
                        source: entry.path().to_path_buf(),
                        scope: scope.clone(),
                    },
                );
            }
        }
        Ok(merged.into_values().collect())
    }
}
