// gantry-common/src/diagnostics.rs
//! Reporting seam between the resolution subsystem and whatever log sink the
//! caller wires in. Nothing in the resolver or the policy registry reports on
//! its own; the startup coordinator hands results to a sink.
use crate::dependency::ResolutionResult;
use crate::policy::Severity;

pub trait DiagnosticsSink {
    /// One informational record per successful resolution.
    fn resolved(&self, result: &ResolutionResult);

    /// One record per failed resolution; `Hard` failures are errors, `Soft` ones warnings.
    fn unresolved(&self, result: &ResolutionResult, severity: Severity);

    /// A policy candidate was selected and its package resolved.
    fn selected(&self, _category: &str, _candidate: &str, result: &ResolutionResult) {
        self.resolved(result);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn resolved(&self, _result: &ResolutionResult) {}

    fn unresolved(&self, _result: &ResolutionResult, _severity: Severity) {}
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::dependency::{
        DependencyRequest, Provenance, Resolution, ResolutionResult, StrategyKind,
    };

    #[derive(Default)]
    struct Counting(RefCell<Vec<String>>);

    impl DiagnosticsSink for Counting {
        fn resolved(&self, result: &ResolutionResult) {
            self.0.borrow_mut().push(result.request.name.clone());
        }

        fn unresolved(&self, _result: &ResolutionResult, _severity: Severity) {}
    }

    #[test]
    fn selections_are_reported_as_resolutions_by_default() {
        let result = ResolutionResult {
            request: DependencyRequest::new("gantry_haml"),
            attempts: Vec::new(),
            resolution: Resolution::Success(Provenance {
                strategy: StrategyKind::PackageRegistry,
                location: "/registry/gantry_haml-2.0.0".into(),
                version: None,
                detail: "loaded from /registry/gantry_haml-2.0.0".to_string(),
            }),
        };
        let sink = Counting::default();
        sink.selected("template-engine", "haml", &result);
        NullSink.selected("template-engine", "haml", &result);
        assert_eq!(*sink.0.borrow(), vec!["gantry_haml".to_string()]);
    }
}
