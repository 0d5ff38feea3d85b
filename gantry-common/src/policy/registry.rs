// gantry-common/src/policy/registry.rs
use tracing::debug;

use super::category::{Activation, Category, Reselection, Selection, Severity};
use super::error::PolicyError;
use super::{ORM, TEMPLATE_ENGINE, TEST_FRAMEWORK};
use crate::dependency::{DependencyRequest, ResolutionResult, Resolver};

/// Ordered set of policy categories owned by the startup coordinator.
///
/// Categories keep their registration order; it is also the order of the
/// generator scope. After [`PolicyRegistry::freeze`] the registry is read-only.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    categories: Vec<Category>,
    frozen: bool,
}

impl PolicyRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry seeded with the built-in categories; candidate packages are
    /// derived with `package_prefix` (e.g. `gantry_`).
    pub fn with_defaults(package_prefix: &str) -> Self {
        let mut registry = Self::empty();
        let builtins = [
            Category::new(ORM, ["active_record", "datamapper", "sequel"])
                .reselection(Reselection::Forbidden)
                .severity(Severity::Hard)
                .default_scope("orm_default"),
            Category::new(TEST_FRAMEWORK, ["rspec", "test_unit"])
                .reselection(Reselection::Allowed)
                .severity(Severity::Soft)
                .default_scope("rspec"),
            Category::new(TEMPLATE_ENGINE, ["erb", "haml", "markaby"])
                .reselection(Reselection::Allowed)
                .severity(Severity::Soft)
                .activation(Activation::Layered)
                .default_scope("erb"),
        ];
        for category in builtins {
            registry
                .categories
                .push(category.namespace(package_prefix.to_string()));
        }
        registry
    }

    pub fn register(&mut self, category: Category) -> Result<(), PolicyError> {
        if self.frozen {
            return Err(PolicyError::Frozen(category.name().to_string()));
        }
        if self.categories.iter().any(|c| c.name() == category.name()) {
            return Err(PolicyError::DuplicateCategory(category.name().to_string()));
        }
        debug!("Registering policy category '{}'", category.name());
        self.categories.push(category);
        Ok(())
    }

    pub fn category(&self, name: &str) -> Result<&Category, PolicyError> {
        self.categories
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| PolicyError::UnknownCategory(name.to_string()))
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn current(&self, name: &str) -> Result<&Selection, PolicyError> {
        self.category(name).map(Category::selection)
    }

    pub fn active_candidates(&self, name: &str) -> Result<Vec<&str>, PolicyError> {
        self.category(name).map(Category::active_candidates)
    }

    /// Makes `candidate` the active choice for `category` and resolves its package.
    ///
    /// On any failure the registry is left exactly as it was.
    pub fn select(
        &mut self,
        category: &str,
        candidate: &str,
        resolver: &mut Resolver,
    ) -> Result<ResolutionResult, PolicyError> {
        if self.frozen {
            return Err(PolicyError::Frozen(category.to_string()));
        }
        let entry = self
            .categories
            .iter_mut()
            .find(|c| c.name() == category)
            .ok_or_else(|| PolicyError::UnknownCategory(category.to_string()))?;

        if !entry.allows(candidate) {
            return Err(PolicyError::InvalidCandidate {
                category: category.to_string(),
                candidate: candidate.to_string(),
                allowed: entry.candidates().join(", "),
            });
        }
        if let Selection::Chosen(current) = entry.selection() {
            if entry.reselection_policy() == Reselection::Forbidden {
                return Err(PolicyError::ReselectionForbidden {
                    category: category.to_string(),
                    current: current.clone(),
                });
            }
        }

        let previous = entry.set_selection(Selection::Chosen(candidate.to_string()));
        let package = entry.package_for(candidate);
        debug!(
            "Selected '{}' for {} (was {}), resolving package '{}'",
            candidate, category, previous, package
        );

        match resolver.resolve(&DependencyRequest::new(package.clone())) {
            Ok(result) if result.is_success() => Ok(result),
            Ok(result) => {
                entry.set_selection(previous);
                Err(PolicyError::DependencyUnresolved {
                    category: category.to_string(),
                    candidate: candidate.to_string(),
                    package,
                    severity: entry.severity_class(),
                    result: Box::new(result),
                })
            }
            Err(e) => {
                entry.set_selection(previous);
                Err(PolicyError::Resolution {
                    category: category.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Scopes for code generation, highest precedence first.
    pub fn generator_scope(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|c| c.scope())
            .map(str::to_string)
            .collect()
    }

    pub fn freeze(&mut self) {
        debug!("Freezing policy registry");
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::dependency::{AttemptOutcome, Strategy, StrategyKind, UnitLocation};

    /// Registry strategy that knows a fixed set of package names.
    struct Known(HashSet<String>);

    impl Strategy for Known {
        fn kind(&self) -> StrategyKind {
            StrategyKind::PackageRegistry
        }

        fn attempt(&mut self, request: &DependencyRequest) -> AttemptOutcome {
            if self.0.contains(&request.name) {
                AttemptOutcome::Success(UnitLocation::at(format!("/registry/{}", request.name)))
            } else {
                AttemptOutcome::Recoverable(format!("'{}' is not installed", request.name))
            }
        }
    }

    fn resolver(known: &[&str]) -> Resolver {
        Resolver::new(vec![Box::new(Known(
            known.iter().map(|s| s.to_string()).collect(),
        ))])
    }

    #[test]
    fn defaults_start_unset() {
        let registry = PolicyRegistry::with_defaults("gantry_");
        for name in [ORM, TEST_FRAMEWORK, TEMPLATE_ENGINE] {
            assert_eq!(registry.current(name).unwrap(), &Selection::Default);
        }
        assert_eq!(
            registry.generator_scope(),
            vec!["orm_default", "rspec", "erb"]
        );
    }

    #[test]
    fn forbidden_reselection_succeeds_exactly_once() {
        let mut registry = PolicyRegistry::with_defaults("gantry_");
        let mut r = resolver(&["gantry_active_record", "gantry_datamapper"]);

        let result = registry.select(ORM, "active_record", &mut r).unwrap();
        assert_eq!(result.request.name, "gantry_active_record");
        assert_eq!(
            registry.current(ORM).unwrap(),
            &Selection::Chosen("active_record".into())
        );

        for candidate in ["active_record", "datamapper"] {
            let err = registry.select(ORM, candidate, &mut r).unwrap_err();
            assert!(matches!(err, PolicyError::ReselectionForbidden { .. }));
        }
        assert_eq!(
            registry.current(ORM).unwrap(),
            &Selection::Chosen("active_record".into())
        );
    }

    #[test]
    fn allowed_reselection_replaces_the_choice() {
        let mut registry = PolicyRegistry::with_defaults("gantry_");
        let mut r = resolver(&["gantry_rspec", "gantry_test_unit"]);
        registry.select(TEST_FRAMEWORK, "rspec", &mut r).unwrap();
        registry.select(TEST_FRAMEWORK, "test_unit", &mut r).unwrap();
        assert_eq!(
            registry.active_candidates(TEST_FRAMEWORK).unwrap(),
            vec!["test_unit"]
        );
    }

    #[test]
    fn invalid_candidate_leaves_state_unchanged() {
        let mut registry = PolicyRegistry::with_defaults("gantry_");
        let mut r = resolver(&["gantry_mongoid"]);
        let err = registry.select(ORM, "mongoid", &mut r).unwrap_err();
        match err {
            PolicyError::InvalidCandidate { allowed, .. } => {
                assert_eq!(allowed, "active_record, datamapper, sequel")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(registry.current(ORM).unwrap(), &Selection::Default);
    }

    #[test]
    fn unknown_category() {
        let mut registry = PolicyRegistry::with_defaults("gantry_");
        let mut r = resolver(&[]);
        assert!(matches!(
            registry.select("cache", "redis", &mut r),
            Err(PolicyError::UnknownCategory(_))
        ));
        assert!(matches!(
            registry.current("cache"),
            Err(PolicyError::UnknownCategory(_))
        ));
    }

    #[test]
    fn unresolved_package_rolls_back() {
        let mut registry = PolicyRegistry::with_defaults("gantry_");
        let mut r = resolver(&["gantry_rspec"]);
        registry.select(TEST_FRAMEWORK, "rspec", &mut r).unwrap();

        let err = registry
            .select(TEST_FRAMEWORK, "test_unit", &mut r)
            .unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(
            registry.current(TEST_FRAMEWORK).unwrap(),
            &Selection::Chosen("rspec".into())
        );
        let diagnostics = err.diagnostics().unwrap();
        assert_eq!(diagnostics.request.name, "gantry_test_unit");
        assert!(!diagnostics.is_success());
    }

    #[test]
    fn unresolved_hard_category_is_fatal_and_not_consumed() {
        let mut registry = PolicyRegistry::with_defaults("gantry_");
        let mut r = resolver(&["gantry_sequel"]);
        let err = registry.select(ORM, "datamapper", &mut r).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(registry.current(ORM).unwrap(), &Selection::Default);

        // The one-shot selection is still available after a failed attempt.
        registry.select(ORM, "sequel", &mut r).unwrap();
    }

    #[test]
    fn layered_scope_follows_choice() {
        let mut registry = PolicyRegistry::with_defaults("gantry_");
        let mut r = resolver(&["gantry_haml", "gantry_datamapper"]);
        registry.select(TEMPLATE_ENGINE, "haml", &mut r).unwrap();
        registry.select(ORM, "datamapper", &mut r).unwrap();
        assert_eq!(
            registry.generator_scope(),
            vec!["datamapper", "rspec", "haml", "erb", "markaby"]
        );
    }

    #[test]
    fn frozen_registry_rejects_changes() {
        let mut registry = PolicyRegistry::with_defaults("gantry_");
        let mut r = resolver(&["gantry_rspec"]);
        registry.freeze();
        assert!(registry.is_frozen());
        assert!(matches!(
            registry.select(TEST_FRAMEWORK, "rspec", &mut r),
            Err(PolicyError::Frozen(_))
        ));
        assert!(matches!(
            registry.register(Category::new("cache", ["redis"])),
            Err(PolicyError::Frozen(_))
        ));
    }

    #[test]
    fn custom_categories_register_once() {
        let mut registry = PolicyRegistry::empty();
        registry
            .register(Category::new("cache", ["memory", "redis"]).namespace("cache-"))
            .unwrap();
        assert!(matches!(
            registry.register(Category::new("cache", ["file"])),
            Err(PolicyError::DuplicateCategory(_))
        ));
        let mut r = resolver(&["cache-redis"]);
        let result = registry.select("cache", "redis", &mut r).unwrap();
        assert_eq!(result.request.name, "cache-redis");
    }

    #[test]
    fn resolver_configuration_errors_roll_back() {
        let mut registry = PolicyRegistry::with_defaults("gantry_");
        let mut r = Resolver::new(Vec::new());
        let err = registry.select(TEST_FRAMEWORK, "rspec", &mut r).unwrap_err();
        assert!(matches!(err, PolicyError::Resolution { .. }));
        assert_eq!(registry.current(TEST_FRAMEWORK).unwrap(), &Selection::Default);
    }
}
