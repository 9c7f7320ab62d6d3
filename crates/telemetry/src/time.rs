// Path: crates/telemetry/src/time.rs
use crate::sinks::ValidationMetricsSink;
use std::time::Instant;

/// Observes the lifetime of a scope as one validation stage duration.
pub struct Timer<'a> {
    sink: &'a dyn ValidationMetricsSink,
    kind: &'a str,
    stage: &'a str,
    start: Instant,
}

impl<'a> Timer<'a> {
    /// Starts timing `stage` of a `kind` transition.
    pub fn new(sink: &'a dyn ValidationMetricsSink, kind: &'a str, stage: &'a str) -> Self {
        Self {
            sink,
            kind,
            stage,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        self.sink.observe_validation_duration(
            self.kind,
            self.stage,
            self.start.elapsed().as_secs_f64(),
        );
    }
}
