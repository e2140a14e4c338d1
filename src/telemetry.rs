//! Telemetry Module
//!
//! Metrics recording for cache operations. Purely observational: the
//! recorder is infallible by signature so nothing it does can affect
//! cache correctness.

use tracing::debug;

// == Metric Categories ==
/// Which branch served a cache operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricCategory {
    /// Served from the volatile (memory) tier
    Memory,
    /// Served from the durable (disk) tier after promotion
    Disk,
    /// Found in neither tier
    Miss,
    /// A write operation
    Set,
}

impl MetricCategory {
    /// Label used in metric events.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricCategory::Memory => "memory",
            MetricCategory::Disk => "disk",
            MetricCategory::Miss => "miss",
            MetricCategory::Set => "set",
        }
    }
}

// == Metrics Recorder Trait ==
/// Sink for cache operation timings.
pub trait MetricsRecorder: Send + Sync {
    /// Records one timing sample tagged with the branch taken.
    fn record_metric(&self, name: &str, duration_ms: u64, category: MetricCategory);
}

// == Tracing Recorder ==
/// Default recorder: emits metrics as structured tracing events.
#[derive(Debug, Default)]
pub struct TracingRecorder;

impl MetricsRecorder for TracingRecorder {
    fn record_metric(&self, name: &str, duration_ms: u64, category: MetricCategory) {
        debug!(
            metric = name,
            duration_ms,
            category = category.as_str(),
            "cache metric"
        );
    }
}

// == Capturing Recorder (test support) ==
/// Recorder capturing every sample, used in tests to observe which tier
/// served a request.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct CapturingRecorder {
    pub samples: std::sync::Mutex<Vec<(String, MetricCategory)>>,
}

#[cfg(test)]
impl CapturingRecorder {
    /// Categories recorded so far, in order.
    pub fn categories(&self) -> Vec<MetricCategory> {
        self.samples
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c)| *c)
            .collect()
    }
}

#[cfg(test)]
impl MetricsRecorder for CapturingRecorder {
    fn record_metric(&self, name: &str, _duration_ms: u64, category: MetricCategory) {
        self.samples
            .lock()
            .unwrap()
            .push((name.to_string(), category));
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels() {
        assert_eq!(MetricCategory::Memory.as_str(), "memory");
        assert_eq!(MetricCategory::Disk.as_str(), "disk");
        assert_eq!(MetricCategory::Miss.as_str(), "miss");
        assert_eq!(MetricCategory::Set.as_str(), "set");
    }

    #[test]
    fn test_capturing_recorder() {
        let recorder = CapturingRecorder::default();
        recorder.record_metric("cache.get", 3, MetricCategory::Memory);
        recorder.record_metric("cache.get", 5, MetricCategory::Miss);

        assert_eq!(
            recorder.categories(),
            vec![MetricCategory::Memory, MetricCategory::Miss]
        );
    }
}
