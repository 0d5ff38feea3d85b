// gantry-core/src/strategy/mod.rs
//! Filesystem-backed resolution strategies.
use std::path::{Component, Path, PathBuf};

use gantry_common::config::Config;
use gantry_common::dependency::{Resolver, Strategy, StrategyKind};
use tracing::debug;

pub mod framework;
pub mod load_path;
pub mod registry;

pub use framework::FrameworkLocal;
pub use load_path::RawPath;
pub use registry::{Package, PackageRegistry};

/// Builds the resolver described by `config`.
pub fn resolver_for(config: &Config) -> Resolver {
    let mut strategies: Vec<Box<dyn Strategy>> = Vec::new();
    if config.strategies.enables(StrategyKind::FrameworkLocal) {
        strategies.push(Box::new(
            FrameworkLocal::new(&config.framework_root, config.unit_extensions.clone())
                .with_prefix(config.internal_prefix.clone()),
        ));
    }
    if config.strategies.enables(StrategyKind::PackageRegistry) {
        strategies.push(Box::new(
            PackageRegistry::new(config.registry_root.clone(), config.unit_extensions.clone())
                .with_namespace(config.package_prefix()),
        ));
    }
    if config.strategies.enables(StrategyKind::RawPath) {
        strategies.push(Box::new(RawPath::new(
            config.load_path.clone(),
            config.unit_extensions.clone(),
        )));
    }
    debug!("Resolver strategies enabled: {:?}", config.strategies);

    let naming = config.clone();
    Resolver::new(strategies).with_internal_predicate(move |name| naming.is_framework_internal(name))
}

/// Looks for `name` under `root` as a directory or as a file with one of `extensions`.
pub(crate) fn find_unit(root: &Path, name: &str, extensions: &[String]) -> Option<PathBuf> {
    let direct = root.join(name);
    if direct.is_dir() || (direct.is_file() && direct.extension().is_some()) {
        return Some(direct);
    }
    extensions
        .iter()
        .map(|ext| root.join(format!("{name}.{ext}")))
        .find(|candidate| candidate.is_file())
}

/// Relative names that stay inside the directory they are joined to.
pub(crate) fn is_contained(name: &str) -> bool {
    let path = Path::new(name);
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn exts() -> Vec<String> {
        vec!["rb".to_string(), "so".to_string()]
    }

    #[test]
    fn finds_directories_and_files_with_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("router")).unwrap();
        fs::write(dir.path().join("cache.rb"), "").unwrap();
        fs::write(dir.path().join("native.so"), "").unwrap();

        assert_eq!(
            find_unit(dir.path(), "router", &exts()),
            Some(dir.path().join("router"))
        );
        assert_eq!(
            find_unit(dir.path(), "cache", &exts()),
            Some(dir.path().join("cache.rb"))
        );
        assert_eq!(
            find_unit(dir.path(), "native.so", &exts()),
            Some(dir.path().join("native.so"))
        );
        assert_eq!(find_unit(dir.path(), "missing", &exts()), None);
    }

    #[test]
    fn resolver_follows_the_configured_internal_prefix() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("framework/cache")).unwrap();
        let mut config = Config::rooted_at(dir.path());
        config.internal_prefix = "merb".to_string();
        let mut resolver = resolver_for(&config);

        let result = resolver
            .resolve(&gantry_common::DependencyRequest::new("merb-cache"))
            .unwrap();
        assert_eq!(result.strategy_used(), Some(StrategyKind::FrameworkLocal));

        let result = resolver
            .resolve(&gantry_common::DependencyRequest::new("gantry-cache"))
            .unwrap();
        assert!(!result.attempted().contains(&StrategyKind::FrameworkLocal));
    }

    #[test]
    fn containment() {
        assert!(is_contained("foo"));
        assert!(is_contained("foo/bar"));
        assert!(!is_contained("../foo"));
        assert!(!is_contained("/etc/passwd"));
        assert!(!is_contained(""));
    }
}
