// gantry-core/src/strategy/load_path.rs
use std::path::{Path, PathBuf};

use gantry_common::dependency::{
    AttemptOutcome, DependencyRequest, Strategy, StrategyKind, UnitLocation,
};
use tracing::debug;

use super::find_unit;

/// Loads a name directly as a path, or relative to each load-path entry.
#[derive(Debug, Clone)]
pub struct RawPath {
    load_path: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl RawPath {
    pub fn new(load_path: Vec<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            load_path,
            extensions,
        }
    }
}

fn is_explicit_path(name: &str) -> bool {
    Path::new(name).is_absolute() || name.starts_with("./") || name.starts_with("../")
}

impl Strategy for RawPath {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RawPath
    }

    fn attempt(&mut self, request: &DependencyRequest) -> AttemptOutcome {
        let name = request.name.as_str();

        if is_explicit_path(name) {
            let path = Path::new(name);
            let (parent, file) = match (path.parent(), path.file_name()) {
                (Some(parent), Some(file)) => (parent, file.to_string_lossy()),
                _ => return AttemptOutcome::Recoverable(format!("'{name}' is not a loadable path")),
            };
            return match find_unit(parent, &file, &self.extensions) {
                Some(found) => AttemptOutcome::Success(UnitLocation::at(found)),
                None => AttemptOutcome::Recoverable(format!("no file or directory at '{name}'")),
            };
        }

        for dir in &self.load_path {
            if let Some(found) = find_unit(dir, name, &self.extensions) {
                debug!("Found '{}' on load path at {}", name, found.display());
                return AttemptOutcome::Success(UnitLocation::at(found));
            }
        }

        let searched: Vec<String> = self
            .load_path
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        AttemptOutcome::Recoverable(format!(
            "'{name}' not found on load path [{}]",
            searched.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use gantry_common::dependency::VersionConstraint;

    #[test]
    fn searches_load_path_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("helpers.rb"), "").unwrap();
        fs::write(second.path().join("helpers.rb"), "").unwrap();
        fs::write(second.path().join("extras.rb"), "").unwrap();

        let mut s = RawPath::new(
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
            vec!["rb".into()],
        );
        assert_eq!(
            s.attempt(&DependencyRequest::new("helpers")),
            AttemptOutcome::Success(UnitLocation::at(first.path().join("helpers.rb")))
        );
        assert_eq!(
            s.attempt(&DependencyRequest::new("extras")),
            AttemptOutcome::Success(UnitLocation::at(second.path().join("extras.rb")))
        );
    }

    #[test]
    fn absolute_paths_load_directly_and_ignore_versions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("local.rb"), "").unwrap();
        let mut s = RawPath::new(vec![], vec!["rb".into()]);

        let name = dir.path().join("local").display().to_string();
        let request = DependencyRequest::new(name)
            .with_constraint(VersionConstraint::parse("9.9.9").unwrap());
        assert_eq!(
            s.attempt(&request),
            AttemptOutcome::Success(UnitLocation::at(dir.path().join("local.rb")))
        );
    }

    #[test]
    fn misses_name_the_searched_directories() {
        let mut s = RawPath::new(vec![PathBuf::from("/nonexistent/lib")], vec!["rb".into()]);
        match s.attempt(&DependencyRequest::new("ghost")) {
            AttemptOutcome::Recoverable(reason) => assert!(reason.contains("/nonexistent/lib")),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
