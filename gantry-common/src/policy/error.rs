// gantry-common/src/policy/error.rs
use thiserror::Error;

use super::category::Severity;
use crate::dependency::ResolutionResult;

#[derive(Error, Debug, Clone)]
pub enum PolicyError {
    #[error("Unknown policy category '{0}'")]
    UnknownCategory(String),

    #[error("'{candidate}' is not a valid {category} (expected one of: {allowed})")]
    InvalidCandidate {
        category: String,
        candidate: String,
        allowed: String,
    },

    #[error("{category} is already set to '{current}' and may only be selected once")]
    ReselectionForbidden { category: String, current: String },

    #[error("Policy category '{0}' is already registered")]
    DuplicateCategory(String),

    #[error("Configuration is frozen; cannot change '{0}'")]
    Frozen(String),

    #[error("Package '{package}' for {category} '{candidate}' could not be resolved")]
    DependencyUnresolved {
        category: String,
        candidate: String,
        package: String,
        severity: Severity,
        result: Box<ResolutionResult>,
    },

    #[error("Could not resolve package for {category}: {reason}")]
    Resolution { category: String, reason: String },
}

impl PolicyError {
    /// Only soft categories may fail without stopping startup.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::DependencyUnresolved { severity, .. } => *severity == Severity::Hard,
            _ => true,
        }
    }

    pub fn diagnostics(&self) -> Option<&ResolutionResult> {
        match self {
            Self::DependencyUnresolved { result, .. } => Some(result),
            _ => None,
        }
    }
}
