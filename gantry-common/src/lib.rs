// gantry-common/src/lib.rs
pub mod config;
pub mod dependency;
pub mod diagnostics;
pub mod error;
pub mod policy;

// Re-export key types
pub use config::Config;
pub use dependency::{
    DependencyList, DependencyRequest, Resolution, ResolutionResult, Resolver, StrategyKind,
    VersionConstraint,
};
pub use diagnostics::DiagnosticsSink;
pub use error::{GantryError, Result};
pub use policy::{Category, PolicyError, PolicyRegistry, Selection, Severity};
