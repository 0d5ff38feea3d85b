// gantry-core/src/lib.rs

pub mod bootstrap;
pub mod diagnostics;
pub mod generators;
pub mod manifest;
pub mod strategy;

// Re-export key types for easier use by the CLI crate
pub use bootstrap::{BootReport, Bootstrap, Configured, ReportEntry};
pub use diagnostics::TracingSink;
pub use generators::{Template, TemplateLocator};
pub use manifest::{Directive, Manifest, ManifestPaths};
pub use strategy::resolver_for;
