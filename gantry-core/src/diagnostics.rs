// gantry-core/src/diagnostics.rs
use gantry_common::dependency::ResolutionResult;
use gantry_common::diagnostics::DiagnosticsSink;
use gantry_common::policy::Severity;
use tracing::{error, info, warn};

/// Sends resolution outcomes to the installed `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn resolved(&self, result: &ResolutionResult) {
        if let Some(p) = result.provenance() {
            match &p.version {
                Some(version) => info!(
                    "Loaded {} {} via {} from {}",
                    result.request.name,
                    version,
                    p.strategy,
                    p.location.display()
                ),
                None => info!(
                    "Loaded {} via {} from {}",
                    result.request.name,
                    p.strategy,
                    p.location.display()
                ),
            }
        }
    }

    fn unresolved(&self, result: &ResolutionResult, severity: Severity) {
        match severity {
            Severity::Hard => error!("{}", result.explain()),
            Severity::Soft => warn!("{} (continuing without it)", result.explain()),
        }
    }

    fn selected(&self, category: &str, candidate: &str, result: &ResolutionResult) {
        match result.provenance() {
            Some(p) => info!(
                "Using {} for {} ({} via {})",
                candidate,
                category,
                p.location.display(),
                p.strategy
            ),
            None => info!("Using {} for {}", candidate, category),
        }
    }
}
