// gantry-common/src/dependency/requirement.rs
use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::error::{GantryError, Result};

/// Version constraint attached to a dependency request.
///
/// Only the package registry enforces it; framework-local and raw-path lookups
/// have no version semantics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VersionConstraint {
    #[default]
    Any,
    Exact(Version),
    Range(VersionReq),
}

impl VersionConstraint {
    /// Parses a constraint string.
    ///
    /// Accepted forms: `""`, `"*"`, `"any"` (no constraint); a bare version or
    /// `"= 1.2"` (exact, missing components padded with zeros); pessimistic
    /// `"~> 1.2"` clauses; anything else is handed to [`VersionReq`].
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "*" || trimmed.eq_ignore_ascii_case("any") {
            return Ok(Self::Any);
        }

        if let Some(exact) = trimmed.strip_prefix('=').filter(|rest| !rest.starts_with('=')) {
            return Ok(Self::Exact(parse_lenient_version(exact.trim())?));
        }
        if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            return Ok(Self::Exact(parse_lenient_version(trimmed)?));
        }

        let clauses = trimmed
            .split(',')
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
            .map(expand_pessimistic)
            .collect::<Result<Vec<_>>>()?;
        let req = VersionReq::parse(&clauses.join(", "))?;
        Ok(Self::Range(req))
    }

    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(exact) => exact == version,
            Self::Range(req) => req.matches(version),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Exact(v) => write!(f, "= {v}"),
            Self::Range(req) => write!(f, "{req}"),
        }
    }
}

impl FromStr for VersionConstraint {
    type Err = GantryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionConstraint {
    type Error = GantryError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<VersionConstraint> for String {
    fn from(value: VersionConstraint) -> Self {
        value.to_string()
    }
}

/// Parses `1`, `1.2` and `1.2.3` (optionally with pre-release/build suffix).
pub fn parse_lenient_version(input: &str) -> Result<Version> {
    if let Ok(v) = Version::parse(input) {
        return Ok(v);
    }
    let split_at = input.find(['-', '+']).unwrap_or(input.len());
    let (core, suffix) = input.split_at(split_at);
    let components = core.split('.').count();
    if core.is_empty() || components >= 3 {
        return Version::parse(input).map_err(GantryError::from);
    }
    let padded = format!("{core}{}{suffix}", ".0".repeat(3 - components));
    Version::parse(&padded).map_err(GantryError::from)
}

// `~> 1.2` allows >= 1.2.0, < 2.0.0; `~> 1.2.3` allows >= 1.2.3, < 1.3.0.
fn expand_pessimistic(clause: &str) -> Result<String> {
    let Some(rest) = clause.strip_prefix("~>") else {
        return Ok(clause.to_string());
    };
    let invalid = || GantryError::Config(format!("invalid pessimistic constraint '{clause}'"));
    let parts = rest
        .trim()
        .split('.')
        .map(|p| p.parse::<u64>().map_err(|_| invalid()))
        .collect::<Result<Vec<u64>>>()?;

    match parts.as_slice() {
        [major] => Ok(format!(">={major}.0.0")),
        [major, minor] => {
            let next = major.checked_add(1).ok_or_else(invalid)?;
            Ok(format!(">={major}.{minor}.0, <{next}.0.0"))
        }
        [major, minor, patch] => {
            let next = minor.checked_add(1).ok_or_else(invalid)?;
            Ok(format!(">={major}.{minor}.{patch}, <{major}.{next}.0"))
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn empty_and_wildcards_are_any() {
        for input in ["", "  ", "*", "any", "ANY"] {
            assert_eq!(VersionConstraint::parse(input).unwrap(), VersionConstraint::Any);
        }
    }

    #[test]
    fn bare_version_is_exact_and_padded() {
        let c = VersionConstraint::parse("1.2").unwrap();
        assert_eq!(c, VersionConstraint::Exact(v("1.2.0")));
        assert!(c.matches(&v("1.2.0")));
        assert!(!c.matches(&v("1.2.1")));

        let c = VersionConstraint::parse("= 0.9.12").unwrap();
        assert_eq!(c, VersionConstraint::Exact(v("0.9.12")));
    }

    #[test]
    fn pessimistic_two_components() {
        let c = VersionConstraint::parse("~> 1.2").unwrap();
        assert!(c.matches(&v("1.2.0")));
        assert!(c.matches(&v("1.9.4")));
        assert!(!c.matches(&v("2.0.0")));
        assert!(!c.matches(&v("1.1.9")));
    }

    #[test]
    fn pessimistic_three_components() {
        let c = VersionConstraint::parse("~> 1.2.3").unwrap();
        assert!(c.matches(&v("1.2.3")));
        assert!(c.matches(&v("1.2.9")));
        assert!(!c.matches(&v("1.3.0")));
    }

    #[test]
    fn comparator_ranges_pass_through() {
        let c = VersionConstraint::parse(">= 1.0, < 1.5").unwrap();
        assert!(c.matches(&v("1.4.2")));
        assert!(!c.matches(&v("1.5.0")));
        assert!(!c.matches(&v("0.9.0")));
    }

    #[test]
    fn malformed_constraints_are_errors() {
        assert!(VersionConstraint::parse("~> one").is_err());
        assert!(VersionConstraint::parse(">= banana").is_err());
        assert!(VersionConstraint::parse("1.x.y").is_err());
    }

    #[test]
    fn pessimistic_upper_bound_overflow_is_an_error() {
        for input in ["~> 18446744073709551615.0", "~> 1.18446744073709551615.0"] {
            assert!(matches!(
                VersionConstraint::parse(input),
                Err(GantryError::Config(_))
            ));
        }
        assert!(VersionConstraint::parse("~> 18446744073709551614.0").is_ok());
    }

    #[test]
    fn display_parses_back() {
        for input in ["any", "= 1.2.0", ">=1.0.0, <2.0.0"] {
            let parsed = VersionConstraint::parse(input).unwrap();
            assert_eq!(VersionConstraint::parse(&parsed.to_string()).unwrap(), parsed);
        }
    }
}
