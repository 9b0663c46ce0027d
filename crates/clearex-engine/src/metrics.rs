//! Execution diagnostics.
//!
//! Two histograms: per-tick processing time and fills processed. Never
//! consensus-relevant; a node with metrics disabled behaves identically.

use std::time::Duration;

use prometheus::{Histogram, HistogramOpts, Registry, linear_buckets};

#[derive(Clone)]
pub struct EngineMetrics {
    processing_time: Histogram,
    orders_processed: Histogram,
}

impl EngineMetrics {
    #[must_use]
    pub fn new() -> Self {
        let processing_time = Histogram::with_opts(
            HistogramOpts::new(
                "execution_time",
                "Time for all match and fill operations to complete, in milliseconds.",
            )
            .namespace("clearex")
            .subsystem("execution")
            .buckets(linear_buckets(1.0, 10.0, 10).expect("static bucket layout")),
        )
        .expect("static histogram options");
        let orders_processed = Histogram::with_opts(
            HistogramOpts::new("orders_processed", "Number of fills processed per block.")
                .namespace("clearex")
                .subsystem("execution")
                .buckets(linear_buckets(1.0, 10.0, 10).expect("static bucket layout")),
        )
        .expect("static histogram options");

        Self {
            processing_time,
            orders_processed,
        }
    }

    /// Record one tick's duration and fill count.
    #[allow(clippy::cast_precision_loss)]
    pub fn observe_tick(&self, duration: Duration, fills: usize) {
        self.processing_time
            .observe(duration.as_secs_f64() * 1_000.0);
        self.orders_processed.observe(fills as f64);
    }

    /// Register both collectors with a host-owned registry.
    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.processing_time.clone()))?;
        registry.register(Box::new(self.orders_processed.clone()))
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_and_observes() {
        let metrics = EngineMetrics::new();
        let registry = Registry::new();
        metrics.register(&registry).unwrap();

        metrics.observe_tick(Duration::from_millis(3), 7);

        let families = registry.gather();
        assert_eq!(families.len(), 2);
        for family in families {
            assert_eq!(family.get_metric()[0].get_histogram().get_sample_count(), 1);
        }
    }

    #[test]
    fn double_registration_fails() {
        let metrics = EngineMetrics::new();
        let registry = Registry::new();
        metrics.register(&registry).unwrap();
        assert!(metrics.register(&registry).is_err());
    }
}
