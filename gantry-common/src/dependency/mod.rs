// gantry-common/src/dependency/mod.rs
pub mod definition;
pub mod requirement;
pub mod resolver;
pub mod strategy;

pub use definition::{DependencyEntry, DependencyList, DependencyRequest};
pub use requirement::VersionConstraint;
pub use resolver::{Provenance, Resolution, ResolutionResult, Resolver};
pub use strategy::{AttemptOutcome, ResolutionAttempt, Strategy, StrategyKind, StrategySet, UnitLocation};
