// gantry-common/src/policy/mod.rs
//! Per-category selection of active implementation candidates (ORM adapter,
//! test framework, template engine) and the generator scope derived from it.
pub mod category;
pub mod error;
pub mod registry;

pub use category::{Activation, Category, Reselection, Selection, Severity};
pub use error::PolicyError;
pub use registry::PolicyRegistry;

pub const ORM: &str = "orm";
pub const TEST_FRAMEWORK: &str = "test-framework";
pub const TEMPLATE_ENGINE: &str = "template-engine";
