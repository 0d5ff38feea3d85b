// gantry-common/src/dependency/strategy.rs
use std::fmt;
use std::path::PathBuf;

use bitflags::bitflags;
use semver::Version;
use serde::{Deserialize, Serialize};

use super::definition::DependencyRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    FrameworkLocal,
    PackageRegistry,
    RawPath,
}

impl StrategyKind {
    /// Evaluation order of the resolution chain.
    pub const CHAIN: [StrategyKind; 3] = [
        StrategyKind::FrameworkLocal,
        StrategyKind::PackageRegistry,
        StrategyKind::RawPath,
    ];

    pub fn flag(self) -> StrategySet {
        match self {
            Self::FrameworkLocal => StrategySet::FRAMEWORK_LOCAL,
            Self::PackageRegistry => StrategySet::PACKAGE_REGISTRY,
            Self::RawPath => StrategySet::RAW_PATH,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::FrameworkLocal => "framework-local",
            Self::PackageRegistry => "package-registry",
            Self::RawPath => "raw-path",
        };
        f.write_str(label)
    }
}

bitflags! {
    /// Strategies enabled for a resolver.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct StrategySet: u8 {
        const FRAMEWORK_LOCAL  = 0b001;
        const PACKAGE_REGISTRY = 0b010;
        const RAW_PATH         = 0b100;
    }
}

impl Default for StrategySet {
    fn default() -> Self {
        Self::all()
    }
}

impl StrategySet {
    /// Parses a comma separated list such as `framework,registry,path`.
    pub fn parse_list(list: &str) -> std::result::Result<Self, String> {
        let mut set = Self::empty();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            set |= match item {
                "framework" | "framework-local" => Self::FRAMEWORK_LOCAL,
                "registry" | "package-registry" => Self::PACKAGE_REGISTRY,
                "path" | "raw-path" => Self::RAW_PATH,
                other => return Err(format!("unknown strategy '{other}'")),
            };
        }
        if set.is_empty() {
            return Err("at least one strategy must be enabled".to_string());
        }
        Ok(set)
    }

    pub fn enables(&self, kind: StrategyKind) -> bool {
        self.contains(kind.flag())
    }
}

/// Where a strategy found the unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitLocation {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

impl UnitLocation {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            version: None,
        }
    }

    pub fn versioned(path: impl Into<PathBuf>, version: Version) -> Self {
        Self {
            path: path.into(),
            version: Some(version),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success(UnitLocation),
    /// The strategy could not satisfy the request; the chain moves on.
    Recoverable(String),
    /// The strategy's environment is broken; the chain stops.
    Fatal(String),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Recoverable(reason) | Self::Fatal(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionAttempt {
    pub strategy: StrategyKind,
    pub outcome: AttemptOutcome,
}

/// One mechanism for satisfying a dependency request.
///
/// Strategies take `&mut self` because a successful attempt may change what
/// later attempts see (the package registry activates what it resolves).
pub trait Strategy {
    fn kind(&self) -> StrategyKind;

    fn attempt(&mut self, request: &DependencyRequest) -> AttemptOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strategy_list() {
        let set = StrategySet::parse_list("registry, path").unwrap();
        assert!(!set.enables(StrategyKind::FrameworkLocal));
        assert!(set.enables(StrategyKind::PackageRegistry));
        assert!(set.enables(StrategyKind::RawPath));

        assert!(StrategySet::parse_list("registry,ftp").is_err());
        assert!(StrategySet::parse_list(" , ").is_err());
    }

    #[test]
    fn chain_order_is_fixed() {
        let mut kinds = vec![
            StrategyKind::RawPath,
            StrategyKind::FrameworkLocal,
            StrategyKind::PackageRegistry,
        ];
        kinds.sort();
        assert_eq!(kinds, StrategyKind::CHAIN.to_vec());
    }
}
