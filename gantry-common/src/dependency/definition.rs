// gantry-common/src/dependency/definition.rs
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::requirement::VersionConstraint;
use crate::error::{GantryError, Result};

/// One dependency to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRequest {
    pub name: String,
    #[serde(default)]
    pub version_constraint: VersionConstraint,
    #[serde(default)]
    pub is_framework_internal: bool,
}

impl DependencyRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version_constraint: VersionConstraint::Any,
            is_framework_internal: false,
        }
    }

    pub fn with_constraint(mut self, constraint: VersionConstraint) -> Self {
        self.version_constraint = constraint;
        self
    }

    pub fn framework_internal(mut self, internal: bool) -> Self {
        self.is_framework_internal = internal;
        self
    }
}

impl fmt::Display for DependencyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version_constraint.is_any() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.version_constraint)
        }
    }
}

/// The shapes a `dependencies` directive accepts.
///
/// ```toml
/// entries = ["foo", "bar"]                  # sequence of names
/// entries = { baz = "1.2.0" }               # mapping name -> constraint
/// entries = [["foo"], ["baz", "~> 1.2"]]    # nested sequence
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DependencyList {
    Mapping(OrderedPairs),
    Sequence(Vec<DependencyEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DependencyEntry {
    Name(String),
    Nested(Vec<String>),
}

/// Name/constraint pairs kept in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedPairs(pub Vec<(String, String)>);

impl DependencyList {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Sequence(
            names
                .into_iter()
                .map(|n| DependencyEntry::Name(n.into()))
                .collect(),
        )
    }

    pub fn pairs<I, N, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        Self::Mapping(OrderedPairs(
            pairs
                .into_iter()
                .map(|(n, c)| (n.into(), c.into()))
                .collect(),
        ))
    }

    /// Flattens every supported shape into one request per entry.
    pub fn normalize(&self) -> Result<Vec<DependencyRequest>> {
        match self {
            Self::Mapping(OrderedPairs(pairs)) => pairs
                .iter()
                .map(|(name, constraint)| request_from(name, Some(constraint)))
                .collect(),
            Self::Sequence(entries) => entries
                .iter()
                .map(|entry| match entry {
                    DependencyEntry::Name(name) => request_from(name, None),
                    DependencyEntry::Nested(parts) => match parts.as_slice() {
                        [name] => request_from(name, None),
                        [name, constraint] => request_from(name, Some(constraint)),
                        _ => Err(GantryError::Config(format!(
                            "unsupported dependency entry {parts:?}: expected [name] or [name, version]"
                        ))),
                    },
                })
                .collect(),
        }
    }
}

fn request_from(name: &str, constraint: Option<&String>) -> Result<DependencyRequest> {
    let constraint = match constraint {
        Some(c) => VersionConstraint::parse(c)?,
        None => VersionConstraint::Any,
    };
    Ok(DependencyRequest::new(name).with_constraint(constraint))
}

impl<'de> Deserialize<'de> for OrderedPairs {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = OrderedPairs;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of dependency names to version constraints")
            }

            fn visit_map<M>(self, mut access: M) -> std::result::Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, constraint)) = access.next_entry::<String, String>()? {
                    pairs.push((name, constraint));
                }
                Ok(OrderedPairs(pairs))
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_of_names() {
        let list: DependencyList = serde_json::from_str(r#"["foo", "bar"]"#).unwrap();
        let requests = list.normalize().unwrap();
        assert_eq!(
            requests,
            vec![DependencyRequest::new("foo"), DependencyRequest::new("bar")]
        );
    }

    #[test]
    fn mapping_keeps_document_order() {
        let list: DependencyList =
            serde_json::from_str(r#"{"zeta": "1.2.0", "alpha": ">= 2.0"}"#).unwrap();
        let requests = list.normalize().unwrap();
        assert_eq!(requests[0].name, "zeta");
        assert_eq!(
            requests[0].version_constraint,
            VersionConstraint::parse("1.2.0").unwrap()
        );
        assert_eq!(requests[1].name, "alpha");
    }

    #[test]
    fn nested_sequence() {
        let list: DependencyList =
            serde_json::from_str(r#"[["foo"], ["baz", "~> 1.2"], "bar"]"#).unwrap();
        let requests = list.normalize().unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].version_constraint.is_any());
        assert!(!requests[1].version_constraint.is_any());
        assert_eq!(requests[2].name, "bar");
    }

    #[test]
    fn oversized_nested_entry_is_rejected() {
        let list: DependencyList = serde_json::from_str(r#"[["foo", "1.0", "extra"]]"#).unwrap();
        assert!(matches!(list.normalize(), Err(GantryError::Config(_))));

        let list: DependencyList = serde_json::from_str(r#"[[]]"#).unwrap();
        assert!(matches!(list.normalize(), Err(GantryError::Config(_))));
    }

    #[test]
    fn unsupported_shapes_fail_to_deserialize() {
        assert!(serde_json::from_str::<DependencyList>("42").is_err());
        assert!(serde_json::from_str::<DependencyList>(r#"{"foo": 1}"#).is_err());
    }

    #[test]
    fn programmatic_constructors() {
        let requests = DependencyList::pairs([("baz", "1.2.0")]).normalize().unwrap();
        assert_eq!(requests[0].to_string(), "baz (= 1.2.0)");
        let requests = DependencyList::names(["a"]).normalize().unwrap();
        assert_eq!(requests[0].to_string(), "a");
    }
}
