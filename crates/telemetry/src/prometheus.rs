// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_histogram_vec, register_int_counter_vec, HistogramVec,
    IntCounterVec,
};

// --- Metric Statics ---
// The collectors are initialized exactly once by the `install` function.

static TRANSITIONS_VALIDATED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static CONSENSUS_ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static VALIDATION_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

/// The Prometheus-backed sink returned by [`install`].
#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

/// Runs the body only when `install()` has registered the collector.
macro_rules! with_metric {
    ($metric:ident, |$m:ident| $body:expr) => {
        if let Some($m) = $metric.get() {
            $body;
        }
    };
}

impl ValidationMetricsSink for PrometheusSink {
    fn inc_transitions_validated(&self, kind: &str, stage: &str, outcome: &str) {
        with_metric!(TRANSITIONS_VALIDATED_TOTAL, |m| m
            .with_label_values(&[kind, stage, outcome])
            .inc());
    }
    fn inc_consensus_error(&self, code: u32) {
        let code = code.to_string();
        with_metric!(CONSENSUS_ERRORS_TOTAL, |m| m
            .with_label_values(&[code.as_str()])
            .inc());
    }
    fn observe_validation_duration(&self, kind: &str, stage: &str, duration_secs: f64) {
        with_metric!(VALIDATION_DURATION_SECONDS, |m| m
            .with_label_values(&[kind, stage])
            .observe(duration_secs));
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, variant: &'static str) {
        with_metric!(ERRORS_TOTAL, |m| m.with_label_values(&[kind, variant]).inc());
    }
}

fn already_installed<T>(_: T) -> prometheus::Error {
    prometheus::Error::Msg("Prometheus sink already installed".to_string())
}

/// Initializes all Prometheus metrics collectors, publishes the sink globally and
/// returns a static reference to it.
/// This function must be called only once at application startup.
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    TRANSITIONS_VALIDATED_TOTAL
        .set(register_int_counter_vec!(
            "platform_transitions_validated_total",
            "Total validation stages run, by transition kind, stage and outcome.",
            &["kind", "stage", "outcome"]
        )?)
        .map_err(already_installed)?;
    CONSENSUS_ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "platform_consensus_errors_total",
            "Total consensus errors produced, by numeric code.",
            &["code"]
        )?)
        .map_err(already_installed)?;
    VALIDATION_DURATION_SECONDS
        .set(register_histogram_vec!(
            "platform_validation_duration_seconds",
            "Latency of a single validation stage.",
            &["kind", "stage"],
            exponential_buckets(0.0001, 2.0, 16)?
        )?)
        .map_err(already_installed)?;
    ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "platform_errors_total",
            "Total number of faults, categorized by type and variant.",
            &["kind", "variant"]
        )?)
        .map_err(already_installed)?;

    static PROMETHEUS_SINK: PrometheusSink = PrometheusSink;
    SINK.set(&PROMETHEUS_SINK).map_err(already_installed)?;
    Ok(&PROMETHEUS_SINK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_registers_collectors_once() {
        let sink = install().unwrap();
        sink.inc_transitions_validated("documents_batch", "basic", "invalid");
        sink.inc_consensus_error(1021);
        sink.observe_validation_duration("documents_batch", "basic", 0.01);

        let families = prometheus::gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "platform_consensus_errors_total"));

        assert!(install().is_err());
    }
}
