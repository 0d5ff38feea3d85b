use std::sync::Arc;

use thiserror::Error;

use crate::dependency::ResolutionResult;
use crate::policy::PolicyError;

#[derive(Error, Debug, Clone)]
pub enum GantryError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("Manifest Parsing Error: {0}")]
    Toml(#[from] Arc<toml::de::Error>),

    #[error("Semantic Versioning Error: {0}")]
    SemVer(#[from] Arc<semver::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Policy Error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Dependency '{name}' could not be resolved")]
    Unresolved {
        name: String,
        result: Box<ResolutionResult>,
    },
}

impl GantryError {
    /// Whether the configuring process should stop on this error.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Policy(e) => e.is_fatal(),
            _ => true,
        }
    }
}

impl From<std::io::Error> for GantryError {
    fn from(err: std::io::Error) -> Self {
        GantryError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for GantryError {
    fn from(err: serde_json::Error) -> Self {
        GantryError::Json(Arc::new(err))
    }
}

impl From<toml::de::Error> for GantryError {
    fn from(err: toml::de::Error) -> Self {
        GantryError::Toml(Arc::new(err))
    }
}

impl From<semver::Error> for GantryError {
    fn from(err: semver::Error) -> Self {
        GantryError::SemVer(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, GantryError>;
