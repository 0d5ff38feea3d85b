// gantry-common/src/policy/category.rs
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Default,
    Chosen(String),
}

impl Selection {
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    pub fn chosen(&self) -> Option<&str> {
        match self {
            Self::Default => None,
            Self::Chosen(c) => Some(c),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("(default)"),
            Self::Chosen(c) => f.write_str(c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reselection {
    /// Once chosen, the selection is final.
    Forbidden,
    #[default]
    Allowed,
}

/// Whether an unresolvable candidate package stops startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Warn and keep the previous selection.
    #[default]
    Soft,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Exactly the chosen candidate is active.
    #[default]
    Single,
    /// The chosen candidate leads, the other candidates follow in declaration order.
    Layered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    name: String,
    candidates: Vec<String>,
    selection: Selection,
    reselection: Reselection,
    severity: Severity,
    activation: Activation,
    namespace: String,
    default_scope: Option<String>,
}

impl Category {
    pub fn new<I, S>(name: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            candidates: candidates.into_iter().map(Into::into).collect(),
            selection: Selection::Default,
            reselection: Reselection::default(),
            severity: Severity::default(),
            activation: Activation::default(),
            namespace: String::new(),
            default_scope: None,
        }
    }

    pub fn reselection(mut self, reselection: Reselection) -> Self {
        self.reselection = reselection;
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn default_scope(mut self, scope: impl Into<String>) -> Self {
        self.default_scope = Some(scope.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn reselection_policy(&self) -> Reselection {
        self.reselection
    }

    pub fn severity_class(&self) -> Severity {
        self.severity
    }

    pub fn activation_mode(&self) -> Activation {
        self.activation
    }

    pub fn allows(&self, candidate: &str) -> bool {
        self.candidates.iter().any(|c| c == candidate)
    }

    pub(crate) fn set_selection(&mut self, selection: Selection) -> Selection {
        std::mem::replace(&mut self.selection, selection)
    }

    /// Package implementing `candidate`: `datamapper` becomes `gantry_datamapper`
    /// unless it already carries the namespace or is a path.
    pub fn package_for(&self, candidate: &str) -> String {
        if self.namespace.is_empty()
            || candidate.starts_with(&self.namespace)
            || candidate.contains('/')
        {
            candidate.to_string()
        } else {
            format!("{}{candidate}", self.namespace)
        }
    }

    /// Candidates in precedence order.
    pub fn active_candidates(&self) -> Vec<&str> {
        let chosen = self.selection.chosen();
        match self.activation {
            Activation::Single => chosen.into_iter().collect(),
            Activation::Layered => {
                let mut active: Vec<&str> = chosen.into_iter().collect();
                active.extend(
                    self.candidates
                        .iter()
                        .map(String::as_str)
                        .filter(|c| Some(*c) != chosen),
                );
                active
            }
        }
    }

    /// Generator scopes this category contributes.
    pub fn scope(&self) -> Vec<&str> {
        if self.selection.is_default() {
            return self.default_scope.as_deref().into_iter().collect();
        }
        self.active_candidates()
    }
}
