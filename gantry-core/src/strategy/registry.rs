// gantry-core/src/strategy/registry.rs
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use gantry_common::dependency::requirement::parse_lenient_version;
use gantry_common::dependency::{
    AttemptOutcome, DependencyRequest, Strategy, StrategyKind, UnitLocation, VersionConstraint,
};
use semver::Version;
use tracing::{debug, warn};

use super::{find_unit, is_contained};

/// An installed package directory, `<root>/<name>-<version>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub version: Version,
    pub path: PathBuf,
}

impl Package {
    /// Splits a directory name such as `dm-core-0.9.1` into name and version.
    pub fn from_dir_name(dir_name: &str, path: PathBuf) -> Option<Self> {
        dir_name
            .match_indices('-')
            .map(|(idx, _)| (&dir_name[..idx], &dir_name[idx + 1..]))
            .filter(|(name, version)| {
                !name.is_empty() && version.starts_with(|c: char| c.is_ascii_digit())
            })
            .find_map(|(name, version)| {
                parse_lenient_version(version).ok().map(|version| Self {
                    name: name.to_string(),
                    version,
                    path: path.clone(),
                })
            })
    }
}

/// Versioned package registry laid out as one directory per installed version.
///
/// Resolving a package activates it: later requests for the same name are
/// answered from the activated version, and a request that the activated
/// version cannot satisfy fails recoverably.
#[derive(Debug, Clone)]
pub struct PackageRegistry {
    root: Option<PathBuf>,
    extensions: Vec<String>,
    namespace: Option<String>,
    activated: HashMap<String, Package>,
}

impl PackageRegistry {
    pub fn new(root: Option<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            root,
            extensions,
            namespace: None,
            activated: HashMap::new(),
        }
    }

    /// Conventional prefix tried when a name lacks it (`datamapper` -> `gantry_datamapper`).
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    pub fn activated(&self) -> impl Iterator<Item = &Package> {
        self.activated.values()
    }

    /// Lists every package in the registry.
    pub fn scan(root: &Path) -> std::io::Result<Vec<Package>> {
        let mut packages = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Error reading entry in {}: {}", root.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy().to_string();
            match Package::from_dir_name(&dir_name, path) {
                Some(package) => packages.push(package),
                None => debug!("Skipping registry entry without a version: {}", dir_name),
            }
        }
        Ok(packages)
    }

    /// `(package name, path inside the package)` candidates for a request name.
    fn candidates<'a>(&self, name: &'a str) -> (Vec<String>, Option<&'a str>) {
        let (base, rest) = match name.split_once('/') {
            Some((base, rest)) => (base, Some(rest)),
            None => (name, None),
        };
        let mut names = vec![base.to_string()];
        if let Some(ns) = &self.namespace {
            if !base.starts_with(ns.as_str()) {
                names.push(format!("{ns}{base}"));
            }
        }
        (names, rest)
    }

    fn locate(&self, package: &Package, inner: Option<&str>) -> Option<UnitLocation> {
        let path = match inner {
            None => package.path.clone(),
            Some(inner) => {
                let lib = package.path.join("lib");
                let search_root = if lib.is_dir() { lib } else { package.path.clone() };
                find_unit(&search_root, inner, &self.extensions)?
            }
        };
        Some(UnitLocation::versioned(path, package.version.clone()))
    }

    fn from_activated(
        &self,
        names: &[String],
        inner: Option<&str>,
        constraint: &VersionConstraint,
    ) -> Option<AttemptOutcome> {
        let package = names.iter().find_map(|n| self.activated.get(n))?;
        if !constraint.matches(&package.version) {
            return Some(AttemptOutcome::Recoverable(format!(
                "'{}' {} is already activated and does not satisfy {}",
                package.name, package.version, constraint
            )));
        }
        Some(match self.locate(package, inner) {
            Some(location) => AttemptOutcome::Success(location),
            None => AttemptOutcome::Recoverable(format!(
                "'{}' {} does not contain '{}'",
                package.name,
                package.version,
                inner.unwrap_or_default()
            )),
        })
    }
}

impl Strategy for PackageRegistry {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PackageRegistry
    }

    fn attempt(&mut self, request: &DependencyRequest) -> AttemptOutcome {
        let Some(root) = self.root.clone() else {
            return AttemptOutcome::Recoverable("no package registry configured".to_string());
        };
        if !is_contained(&request.name) {
            return AttemptOutcome::Recoverable(format!(
                "'{}' is not a package name",
                request.name
            ));
        }

        let (names, inner) = self.candidates(&request.name);
        let constraint = &request.version_constraint;
        if let Some(outcome) = self.from_activated(&names, inner, constraint) {
            return outcome;
        }

        let packages = match Self::scan(&root) {
            Ok(packages) => packages,
            Err(e) => {
                return AttemptOutcome::Fatal(format!(
                    "package registry at {} is unreachable: {e}",
                    root.display()
                ))
            }
        };

        for name in &names {
            let mut available: Vec<&Package> =
                packages.iter().filter(|p| &p.name == name).collect();
            if available.is_empty() {
                continue;
            }
            available.sort_by(|a, b| b.version.cmp(&a.version));

            let Some(best) = available.iter().find(|p| constraint.matches(&p.version)) else {
                let versions: Vec<String> =
                    available.iter().map(|p| p.version.to_string()).collect();
                return AttemptOutcome::Recoverable(format!(
                    "no version of '{name}' satisfies {constraint} (available: {})",
                    versions.join(", ")
                ));
            };

            return match self.locate(best, inner) {
                Some(location) => {
                    debug!("Activating {} {}", best.name, best.version);
                    self.activated.insert(best.name.clone(), (*best).clone());
                    AttemptOutcome::Success(location)
                }
                None => AttemptOutcome::Recoverable(format!(
                    "'{}' {} does not contain '{}'",
                    best.name,
                    best.version,
                    inner.unwrap_or_default()
                )),
            };
        }

        AttemptOutcome::Recoverable(format!(
            "'{}' is not installed in {}",
            names.join("' or '"),
            root.display()
        ))
    }
}
