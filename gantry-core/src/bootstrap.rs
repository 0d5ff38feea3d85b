// gantry-core/src/bootstrap.rs
//! Single-pass startup configuration.
//!
//! A [`Bootstrap`] evaluates directives in order, hands every outcome to the
//! diagnostics sink and decides what is fatal. [`Bootstrap::finish`] freezes
//! the policy registry and ends the configuration phase.
use gantry_common::config::Config;
use gantry_common::dependency::{DependencyList, DependencyRequest, ResolutionResult, Resolver};
use gantry_common::diagnostics::DiagnosticsSink;
use gantry_common::error::{GantryError, Result};
use gantry_common::policy::{PolicyError, PolicyRegistry, Severity, ORM, TEMPLATE_ENGINE, TEST_FRAMEWORK};
use serde::Serialize;
use tracing::debug;

use crate::manifest::{Directive, Manifest};
use crate::strategy::resolver_for;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportEntry {
    Dependency {
        required: bool,
        result: ResolutionResult,
    },
    Policy {
        category: String,
        candidate: String,
        applied: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<ResolutionResult>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl ReportEntry {
    pub fn is_success(&self) -> bool {
        match self {
            Self::Dependency { result, .. } => result.is_success(),
            Self::Policy { applied, .. } => *applied,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BootReport {
    pub entries: Vec<ReportEntry>,
    pub generator_scope: Vec<String>,
}

impl BootReport {
    pub fn failures(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| !e.is_success())
    }
}

pub struct Bootstrap {
    config: Config,
    resolver: Resolver,
    policy: PolicyRegistry,
    sink: Box<dyn DiagnosticsSink>,
    report: BootReport,
}

impl Bootstrap {
    pub fn new(config: Config, sink: Box<dyn DiagnosticsSink>) -> Self {
        let resolver = resolver_for(&config);
        let policy = PolicyRegistry::with_defaults(&config.package_prefix());
        Self::with_parts(config, resolver, policy, sink)
    }

    pub fn with_parts(
        config: Config,
        resolver: Resolver,
        policy: PolicyRegistry,
        sink: Box<dyn DiagnosticsSink>,
    ) -> Self {
        Self {
            config,
            resolver,
            policy,
            sink,
            report: BootReport::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn policy(&self) -> &PolicyRegistry {
        &self.policy
    }

    pub fn report(&self) -> &BootReport {
        &self.report
    }

    /// Resolves one dependency. A required dependency that cannot be found
    /// is returned as [`GantryError::Unresolved`].
    pub fn dependency(
        &mut self,
        request: &DependencyRequest,
        required: bool,
    ) -> Result<ResolutionResult> {
        let result = self.resolver.resolve(request)?;
        if result.is_success() {
            self.sink.resolved(&result);
        } else {
            let severity = if required { Severity::Hard } else { Severity::Soft };
            self.sink.unresolved(&result, severity);
        }
        self.report.entries.push(ReportEntry::Dependency {
            required,
            result: result.clone(),
        });

        if required && !result.is_success() {
            return Err(GantryError::Unresolved {
                name: request.name.clone(),
                result: Box::new(result),
            });
        }
        Ok(result)
    }

    /// Resolves every entry of `list` in order; stops at the first required failure.
    pub fn dependencies(&mut self, list: &DependencyList) -> Result<Vec<ResolutionResult>> {
        let requests = list.normalize()?;
        let mut results = Vec::with_capacity(requests.len());
        for request in &requests {
            results.push(self.dependency(request, true)?);
        }
        Ok(results)
    }

    /// Selects `candidate` for `category`.
    ///
    /// Returns `Ok(None)` when a soft category's package is missing: the
    /// previous selection stays active and a warning is reported.
    pub fn select(&mut self, category: &str, candidate: &str) -> Result<Option<ResolutionResult>> {
        match self.policy.select(category, candidate, &mut self.resolver) {
            Ok(result) => {
                self.sink.selected(category, candidate, &result);
                self.report.entries.push(ReportEntry::Policy {
                    category: category.to_string(),
                    candidate: candidate.to_string(),
                    applied: true,
                    result: Some(result.clone()),
                    error: None,
                });
                Ok(Some(result))
            }
            Err(e) => {
                let severity = if e.is_fatal() { Severity::Hard } else { Severity::Soft };
                if let Some(diagnostics) = e.diagnostics() {
                    self.sink.unresolved(diagnostics, severity);
                }
                self.report.entries.push(ReportEntry::Policy {
                    category: category.to_string(),
                    candidate: candidate.to_string(),
                    applied: false,
                    result: e.diagnostics().cloned(),
                    error: Some(e.to_string()),
                });
                if e.is_fatal() {
                    return Err(e.into());
                }
                debug!("Keeping {} for {}", self.current_label(category), category);
                Ok(None)
            }
        }
    }

    pub fn use_orm(&mut self, candidate: &str) -> Result<Option<ResolutionResult>> {
        self.select(ORM, candidate)
    }

    pub fn use_test(&mut self, candidate: &str) -> Result<Option<ResolutionResult>> {
        self.select(TEST_FRAMEWORK, candidate)
    }

    pub fn use_template_engine(&mut self, candidate: &str) -> Result<Option<ResolutionResult>> {
        self.select(TEMPLATE_ENGINE, candidate)
    }

    pub fn apply(&mut self, directive: &Directive) -> Result<()> {
        match directive {
            Directive::Dependency { optional, .. } => {
                if let Some(request) = directive.dependency_request() {
                    self.dependency(&request, !optional)?;
                }
            }
            Directive::Dependencies { entries } => {
                self.dependencies(entries)?;
            }
            Directive::UseOrm { candidate } => {
                self.use_orm(candidate)?;
            }
            Directive::UseTest { candidate } => {
                self.use_test(candidate)?;
            }
            Directive::UseTemplateEngine { candidate } => {
                self.use_template_engine(candidate)?;
            }
            Directive::Select {
                category,
                candidate,
            } => {
                self.select(category, candidate)?;
            }
        }
        Ok(())
    }

    /// Applies every directive of `manifest` in file order.
    pub fn run(&mut self, manifest: &Manifest) -> Result<()> {
        debug!("Running {} startup directives", manifest.directives.len());
        for directive in &manifest.directives {
            self.apply(directive)?;
        }
        Ok(())
    }

    /// Ends the configuration phase.
    pub fn finish(mut self) -> Configured {
        self.policy.freeze();
        self.report.generator_scope = self.policy.generator_scope();
        Configured {
            config: self.config,
            policy: self.policy,
            report: self.report,
        }
    }

    fn current_label(&self, category: &str) -> String {
        self.policy
            .current(category)
            .map(|s| s.to_string())
            .unwrap_or_else(|e: PolicyError| e.to_string())
    }
}

/// Read-only outcome of a finished configuration pass.
#[derive(Debug, Clone)]
pub struct Configured {
    config: Config,
    policy: PolicyRegistry,
    report: BootReport,
}

impl Configured {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn policy(&self) -> &PolicyRegistry {
        &self.policy
    }

    pub fn report(&self) -> &BootReport {
        &self.report
    }

    pub fn generator_scope(&self) -> &[String] {
        &self.report.generator_scope
    }
}
