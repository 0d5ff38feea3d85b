// gantry-common/src/dependency/resolver.rs
use std::fmt::Write as _;
use std::path::PathBuf;

use semver::Version;
use serde::Serialize;
use tracing::debug;

use super::definition::DependencyRequest;
use super::strategy::{AttemptOutcome, ResolutionAttempt, Strategy, StrategyKind};
use crate::error::{GantryError, Result};

/// Which strategy satisfied a request, and from where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub strategy: StrategyKind,
    pub location: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Success(Provenance),
    /// Every applicable strategy failed recoverably.
    Exhausted { failures: Vec<(StrategyKind, String)> },
    /// A strategy failed fatally and the remaining chain was skipped.
    Aborted { strategy: StrategyKind, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    pub request: DependencyRequest,
    pub attempts: Vec<ResolutionAttempt>,
    pub resolution: Resolution,
}

impl ResolutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self.resolution, Resolution::Success(_))
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        match &self.resolution {
            Resolution::Success(p) => Some(p),
            _ => None,
        }
    }

    pub fn strategy_used(&self) -> Option<StrategyKind> {
        self.provenance().map(|p| p.strategy)
    }

    pub fn attempted(&self) -> Vec<StrategyKind> {
        self.attempts.iter().map(|a| a.strategy).collect()
    }

    /// Human readable account of a failed resolution, with remedies.
    pub fn explain(&self) -> String {
        let mut out = String::new();
        match &self.resolution {
            Resolution::Success(p) => {
                let _ = write!(out, "'{}' {} ({})", self.request.name, p.detail, p.strategy);
                return out;
            }
            Resolution::Exhausted { .. } => {
                let _ = writeln!(out, "Could not find '{}' with any strategy:", self.request);
            }
            Resolution::Aborted { strategy, .. } => {
                let _ = writeln!(
                    out,
                    "Resolution of '{}' stopped: {strategy} failed fatally:",
                    self.request
                );
            }
        }
        for attempt in &self.attempts {
            if let Some(reason) = attempt.outcome.reason() {
                let _ = writeln!(out, "  - {}: {reason}", attempt.strategy);
            }
        }
        let _ = writeln!(out, "Check that:");
        let _ = writeln!(out, "  * '{}' is spelled correctly", self.request.name);
        let _ = writeln!(out, "  * it is declared as a dependency and installed in the package registry");
        let _ = write!(out, "  * the load path contains the directory providing it");
        out
    }
}

pub type InternalPredicate = Box<dyn Fn(&str) -> bool>;

/// Walks an ordered strategy chain for each request.
///
/// The chain is always evaluated as framework-local, package-registry,
/// raw-path; strategies are deduplicated by kind.
pub struct Resolver {
    strategies: Vec<Box<dyn Strategy>>,
    is_internal: InternalPredicate,
}

impl Resolver {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        let mut resolver = Self {
            strategies: Vec::with_capacity(strategies.len()),
            is_internal: Box::new(|_| false),
        };
        for strategy in strategies {
            resolver.insert(strategy);
        }
        resolver
    }

    /// Replaces the framework-internal naming convention.
    pub fn with_internal_predicate(mut self, predicate: impl Fn(&str) -> bool + 'static) -> Self {
        self.is_internal = Box::new(predicate);
        self
    }

    /// Adds a strategy, replacing any existing one of the same kind.
    pub fn insert(&mut self, strategy: Box<dyn Strategy>) {
        let kind = strategy.kind();
        if let Some(existing) = self.strategies.iter_mut().find(|s| s.kind() == kind) {
            debug!("Replacing {} strategy", kind);
            *existing = strategy;
            return;
        }
        self.strategies.push(strategy);
        self.strategies.sort_by_key(|s| s.kind());
    }

    pub fn strategies(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    pub fn resolve(&mut self, request: &DependencyRequest) -> Result<ResolutionResult> {
        if request.name.trim().is_empty() {
            return Err(GantryError::Config(
                "dependency name must not be empty".to_string(),
            ));
        }

        let try_framework = request.is_framework_internal || (self.is_internal)(&request.name);
        let mut effective = request.clone();
        let mut attempts: Vec<ResolutionAttempt> = Vec::new();
        debug!(
            "Resolving {} (framework_internal={}, chain={:?})",
            request,
            try_framework,
            self.strategies()
        );

        for strategy in self.strategies.iter_mut() {
            let kind = strategy.kind();
            if kind == StrategyKind::FrameworkLocal && !try_framework {
                continue;
            }

            let outcome = match strategy.attempt(&effective) {
                // A framework miss never ends the chain.
                AttemptOutcome::Fatal(reason) if kind == StrategyKind::FrameworkLocal => {
                    AttemptOutcome::Recoverable(reason)
                }
                other => other,
            };
            debug!("{} attempt for '{}': {:?}", kind, request.name, outcome);
            attempts.push(ResolutionAttempt {
                strategy: kind,
                outcome: outcome.clone(),
            });

            match outcome {
                AttemptOutcome::Success(location) => {
                    let provenance = Provenance {
                        strategy: kind,
                        detail: format!("loaded from {}", location.path.display()),
                        location: location.path,
                        version: location.version,
                    };
                    return Ok(ResolutionResult {
                        request: request.clone(),
                        attempts,
                        resolution: Resolution::Success(provenance),
                    });
                }
                AttemptOutcome::Fatal(reason) => {
                    return Ok(ResolutionResult {
                        request: request.clone(),
                        attempts,
                        resolution: Resolution::Aborted {
                            strategy: kind,
                            reason,
                        },
                    });
                }
                AttemptOutcome::Recoverable(_) => {
                    if kind == StrategyKind::FrameworkLocal && effective.is_framework_internal {
                        debug!(
                            "'{}' not found in framework, retrying as a regular dependency",
                            request.name
                        );
                        effective.is_framework_internal = false;
                    }
                }
            }
        }

        if attempts.is_empty() {
            return Err(GantryError::Config(format!(
                "no resolution strategy applies to '{}'",
                request.name
            )));
        }

        let failures = attempts
            .iter()
            .filter_map(|a| a.outcome.reason().map(|r| (a.strategy, r.to_string())))
            .collect();
        Ok(ResolutionResult {
            request: request.clone(),
            attempts,
            resolution: Resolution::Exhausted { failures },
        })
    }
}
