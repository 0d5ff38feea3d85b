// gantry-core/src/strategy/framework.rs
use std::path::PathBuf;

use gantry_common::dependency::{
    AttemptOutcome, DependencyRequest, Strategy, StrategyKind, UnitLocation,
};
use tracing::debug;

use super::{find_unit, is_contained};

/// Looks a name up inside the embedded framework tree.
///
/// `gantry-cache` is found either as `<root>/gantry-cache` or, with the
/// framework prefix stripped, as `<root>/cache`.
#[derive(Debug, Clone)]
pub struct FrameworkLocal {
    root: PathBuf,
    extensions: Vec<String>,
    prefix: Option<String>,
}

impl FrameworkLocal {
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            extensions,
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    fn lookup_names<'a>(&self, name: &'a str) -> Vec<&'a str> {
        let mut names = vec![name];
        if let Some(prefix) = &self.prefix {
            if let Some(rest) = name.strip_prefix(prefix.as_str()) {
                let stripped = rest.trim_start_matches(['-', '_', '/']);
                if !stripped.is_empty() && stripped.len() < rest.len() {
                    names.push(stripped);
                }
            }
        }
        names
    }
}

impl Strategy for FrameworkLocal {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FrameworkLocal
    }

    fn attempt(&mut self, request: &DependencyRequest) -> AttemptOutcome {
        if !self.root.is_dir() {
            return AttemptOutcome::Recoverable(format!(
                "framework tree {} is not present",
                self.root.display()
            ));
        }
        if !is_contained(&request.name) {
            return AttemptOutcome::Recoverable(format!(
                "'{}' is not a framework module name",
                request.name
            ));
        }

        for name in self.lookup_names(&request.name) {
            if let Some(path) = find_unit(&self.root, name, &self.extensions) {
                debug!("Found '{}' in framework at {}", request.name, path.display());
                return AttemptOutcome::Success(UnitLocation::at(path));
            }
        }
        AttemptOutcome::Recoverable(format!(
            "'{}' is not part of the framework at {}",
            request.name,
            self.root.display()
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use gantry_common::dependency::VersionConstraint;

    fn strategy(root: &std::path::Path) -> FrameworkLocal {
        FrameworkLocal::new(root, vec!["rb".to_string()]).with_prefix("gantry")
    }

    #[test]
    fn finds_modules_with_and_without_prefix() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("cache")).unwrap();
        fs::write(dir.path().join("gantry-router.rb"), "").unwrap();
        let mut s = strategy(dir.path());

        let outcome = s.attempt(&DependencyRequest::new("gantry-cache"));
        assert_eq!(
            outcome,
            AttemptOutcome::Success(UnitLocation::at(dir.path().join("cache")))
        );
        let outcome = s.attempt(&DependencyRequest::new("gantry-router"));
        assert_eq!(
            outcome,
            AttemptOutcome::Success(UnitLocation::at(dir.path().join("gantry-router.rb")))
        );
    }

    #[test]
    fn misses_are_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = strategy(dir.path());
        assert!(matches!(
            s.attempt(&DependencyRequest::new("gantry-mailer")),
            AttemptOutcome::Recoverable(_)
        ));
        assert!(matches!(
            s.attempt(&DependencyRequest::new("../outside")),
            AttemptOutcome::Recoverable(_)
        ));

        let mut absent = strategy(&dir.path().join("nowhere"));
        assert!(matches!(
            absent.attempt(&DependencyRequest::new("cache")),
            AttemptOutcome::Recoverable(_)
        ));
    }

    #[test]
    fn version_constraints_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("cache")).unwrap();
        let mut s = strategy(dir.path());

        let request = DependencyRequest::new("gantry-cache")
            .with_constraint(VersionConstraint::parse("9.9.9").unwrap())
            .framework_internal(true);
        assert_eq!(
            s.attempt(&request),
            AttemptOutcome::Success(UnitLocation::at(dir.path().join("cache")))
        );
    }

    #[test]
    fn prefix_alone_is_not_stripped_to_nothing() {
        let s = strategy(std::path::Path::new("/unused"));
        assert_eq!(s.lookup_names("gantry"), vec!["gantry"]);
        assert_eq!(s.lookup_names("gantryish"), vec!["gantryish"]);
        assert_eq!(s.lookup_names("gantry_ext"), vec!["gantry_ext", "ext"]);
    }
}
