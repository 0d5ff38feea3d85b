// gantry-core/src/manifest.rs
//! Startup manifest: path overrides plus the ordered list of configuration
//! directives.
//!
//! ```toml
//! [paths]
//! registry_root = "vendor/packages"
//! load_path = ["lib"]
//!
//! [[directive]]
//! kind = "dependency"
//! name = "json"
//! version = "~> 2.1"
//!
//! [[directive]]
//! kind = "dependencies"
//! entries = { baz = "1.2.0" }
//!
//! [[directive]]
//! kind = "use_orm"
//! candidate = "datamapper"
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use gantry_common::config::Config;
use gantry_common::dependency::{DependencyList, DependencyRequest, StrategySet, VersionConstraint};
use gantry_common::error::{GantryError, Result};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestPaths {
    pub framework_root: Option<PathBuf>,
    pub registry_root: Option<PathBuf>,
    pub load_path: Option<Vec<PathBuf>>,
    pub namespace: Option<String>,
    pub internal_prefix: Option<String>,
    pub strategies: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    Dependency {
        name: String,
        #[serde(default)]
        version: VersionConstraint,
        /// Try the embedded framework first.
        #[serde(default)]
        framework: bool,
        /// Warn instead of stopping startup when it cannot be found.
        #[serde(default)]
        optional: bool,
    },
    Dependencies {
        entries: DependencyList,
    },
    UseOrm {
        candidate: String,
    },
    UseTest {
        candidate: String,
    },
    UseTemplateEngine {
        candidate: String,
    },
    Select {
        category: String,
        candidate: String,
    },
}

impl Directive {
    pub fn dependency_request(&self) -> Option<DependencyRequest> {
        match self {
            Self::Dependency {
                name,
                version,
                framework,
                ..
            } => Some(
                DependencyRequest::new(name.clone())
                    .with_constraint(version.clone())
                    .framework_internal(*framework),
            ),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub paths: ManifestPaths,
    #[serde(default, rename = "directive")]
    pub directives: Vec<Directive>,
}

impl Manifest {
    pub fn parse(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Reading manifest {}", path.display());
        let source = fs::read_to_string(path)?;
        Self::parse(&source)
    }

    /// Applies `[paths]` to `config`; relative paths are taken from `base_dir`.
    pub fn apply_to(&self, config: &mut Config, base_dir: &Path) -> Result<()> {
        let paths = &self.paths;
        if let Some(root) = &paths.framework_root {
            config.framework_root = base_dir.join(root);
        }
        if let Some(root) = &paths.registry_root {
            config.registry_root = Some(base_dir.join(root));
        }
        if let Some(load_path) = &paths.load_path {
            config.load_path = load_path.iter().map(|p| base_dir.join(p)).collect();
        }
        if let Some(namespace) = &paths.namespace {
            config.namespace = namespace.clone();
        }
        // The internal prefix follows the namespace unless set on its own.
        match (&paths.internal_prefix, &paths.namespace) {
            (Some(prefix), _) => config.internal_prefix = prefix.clone(),
            (None, Some(namespace)) => config.internal_prefix = namespace.clone(),
            (None, None) => {}
        }
        if let Some(strategies) = &paths.strategies {
            config.strategies = StrategySet::parse_list(&strategies.join(","))
                .map_err(|e| GantryError::Config(format!("manifest strategies: {e}")))?;
        }
        Ok(())
    }
}
