use std::sync::Mutex;

use serde::Serialize;

use crate::prelude::StageMetadata;

/// Point-in-time view of the aggregated counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub spectra: usize,
    pub dropped_observations: usize,
    pub degenerate_bins: usize,
    pub errors: usize,
}

/// Counters aggregated across detector runs.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_spectrum(&self, metadata: &StageMetadata) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.spectra += 1;
            metrics.dropped_observations += metadata.dropped_observations;
            metrics.degenerate_bins += metadata.degenerate_bins;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_across_runs() {
        let recorder = MetricsRecorder::new();
        let metadata = StageMetadata {
            dropped_observations: 3,
            mismatched_samples: 1,
            degenerate_bins: 2,
            notes: Vec::new(),
        };
        recorder.record_spectrum(&metadata);
        recorder.record_spectrum(&metadata);
        recorder.record_error();

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.spectra, 2);
        assert_eq!(snapshot.dropped_observations, 6);
        assert_eq!(snapshot.degenerate_bins, 4);
        assert_eq!(snapshot.errors, 1);
    }
}
