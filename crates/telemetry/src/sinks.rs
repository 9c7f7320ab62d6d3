// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling validators from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A lazily-initialized static reference to the global `MetricsSink` implementation.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns a static reference to the configured validation metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn validation_metrics() -> &'static dyn ValidationMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured error metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

// --- Trait Definitions ---

/// A sink for metrics about state transition validation.
pub trait ValidationMetricsSink: Send + Sync + std::fmt::Debug {
    /// Counts one finished stage, labeled by transition kind, stage and `valid`/`invalid`.
    fn inc_transitions_validated(&self, kind: &str, stage: &str, outcome: &str);
    /// Counts one consensus error by its numeric code.
    fn inc_consensus_error(&self, code: u32);
    /// Observes how long one stage took.
    fn observe_validation_duration(&self, kind: &str, stage: &str, duration_secs: f64);
}
impl ValidationMetricsSink for NopSink {
    fn inc_transitions_validated(&self, _kind: &str, _stage: &str, _outcome: &str) {}
    fn inc_consensus_error(&self, _code: u32) {}
    fn observe_validation_duration(&self, _kind: &str, _stage: &str, _duration_secs: f64) {}
}

/// A sink for recording faults that aborted a validation.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific fault, categorized by its kind and variant.
    fn inc_error(&self, kind: &'static str, variant: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _variant: &'static str) {}
}

/// A unified sink that implements all domain-specific traits, providing a single
/// point of implementation for metrics backends like Prometheus.
pub trait MetricsSink: ValidationMetricsSink + ErrorMetricsSink {}

// Blanket implementation to allow any type that implements all sub-traits
// to be used as a `MetricsSink`.
impl<T> MetricsSink for T where T: ValidationMetricsSink + ErrorMetricsSink {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_fall_back_to_nop() {
        // Nothing installs a sink in this crate's tests.
        validation_metrics().inc_transitions_validated("identity_create", "basic", "valid");
        validation_metrics().inc_consensus_error(1046);
        error_metrics().inc_error("repository", "backend");
    }
}
