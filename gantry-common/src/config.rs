// gantry-common/src/config.rs
use std::env;
use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::debug;

use super::dependency::StrategySet;
use super::error::{GantryError, Result};

const DEFAULT_NAMESPACE: &str = "gantry";
const DEFAULT_UNIT_EXTENSIONS: &[&str] = &["rb", "so"];

#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub framework_root: PathBuf,
    pub registry_root: Option<PathBuf>,
    pub load_path: Vec<PathBuf>,
    /// Prefix used to derive package names for policy candidates (`gantry` -> `gantry_datamapper`).
    pub namespace: String,
    /// Names equal to this prefix, or starting with it and a separator, are framework-internal.
    pub internal_prefix: String,
    pub unit_extensions: Vec<String>,
    pub strategies: StrategySet,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading gantry configuration");

        let root = match env::var_os("GANTRY_ROOT").filter(|s| !s.is_empty()) {
            Some(root) => PathBuf::from(root),
            None => {
                let cwd = env::current_dir()?;
                debug!(
                    "GANTRY_ROOT not set, using current directory: {}",
                    cwd.display()
                );
                cwd
            }
        };

        let framework_root = env::var_os("GANTRY_FRAMEWORK_ROOT")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| root.join("framework"));

        let registry_root = env::var_os("GANTRY_REGISTRY_ROOT")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let load_path = match env::var_os("GANTRY_LOAD_PATH").filter(|s| !s.is_empty()) {
            Some(paths) => env::split_paths(&paths).collect(),
            None => vec![root.join("lib")],
        };

        let namespace = env::var("GANTRY_NAMESPACE")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let internal_prefix = env::var("GANTRY_INTERNAL_PREFIX")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| namespace.clone());

        let strategies = match env::var("GANTRY_STRATEGIES") {
            Ok(list) if !list.trim().is_empty() => StrategySet::parse_list(&list)
                .map_err(|e| GantryError::Config(format!("GANTRY_STRATEGIES: {e}")))?,
            _ => StrategySet::all(),
        };

        debug!(
            "Effective root: {}, framework root: {}, registry root: {:?}",
            root.display(),
            framework_root.display(),
            registry_root
        );

        Ok(Self {
            root,
            framework_root,
            registry_root,
            load_path,
            namespace,
            internal_prefix,
            unit_extensions: DEFAULT_UNIT_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            strategies,
        })
    }

    /// A configuration rooted at `root` with no environment lookups.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            framework_root: root.join("framework"),
            registry_root: None,
            load_path: vec![root.join("lib")],
            namespace: DEFAULT_NAMESPACE.to_string(),
            internal_prefix: DEFAULT_NAMESPACE.to_string(),
            unit_extensions: DEFAULT_UNIT_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            strategies: StrategySet::all(),
            root,
        }
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("templates")
    }

    pub fn logs_dir(&self) -> PathBuf {
        ProjectDirs::from("", "", "gantry")
            .map(|dirs| dirs.data_local_dir().join("logs"))
            .unwrap_or_else(|| self.root.join("log"))
    }

    /// Package prefix for policy candidates, e.g. `gantry_`.
    pub fn package_prefix(&self) -> String {
        format!("{}_", self.namespace)
    }

    /// Default framework-internal naming convention.
    pub fn is_framework_internal(&self, name: &str) -> bool {
        matches_internal_prefix(&self.internal_prefix, name)
    }
}

pub fn matches_internal_prefix(prefix: &str, name: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    match name.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with(['-', '_', '/']),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_prefix_requires_separator() {
        assert!(matches_internal_prefix("gantry", "gantry"));
        assert!(matches_internal_prefix("gantry", "gantry-core"));
        assert!(matches_internal_prefix("gantry", "gantry_helpers"));
        assert!(matches_internal_prefix("gantry", "gantry/cache"));
        assert!(!matches_internal_prefix("gantry", "gantryx"));
        assert!(!matches_internal_prefix("gantry", "json"));
        assert!(!matches_internal_prefix("", "gantry"));
    }

    #[test]
    fn rooted_config_derives_paths() {
        let config = Config::rooted_at("/srv/app");
        assert_eq!(config.framework_root, PathBuf::from("/srv/app/framework"));
        assert_eq!(config.load_path, vec![PathBuf::from("/srv/app/lib")]);
        assert_eq!(config.templates_dir(), PathBuf::from("/srv/app/templates"));
        assert_eq!(config.package_prefix(), "gantry_");
        assert!(config.registry_root.is_none());
        assert_eq!(config.strategies, StrategySet::all());
    }
}
