use serde::{Deserialize, Serialize};

/// Instrument window that produced a collection, as the acquisition side
/// applied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub preset: String,
    pub start_freq_hz: f64,
    pub stop_freq_hz: f64,
    pub points: usize,
    pub rbw_hz: f64,
    pub vbw_hz: f64,
    pub requested_duration_s: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One instrument sweep: a timestamp plus one amplitude per axis bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSample {
    /// Seconds since the start of the collection window.
    pub timestamp_s: f64,
    pub amplitudes_dbuv: Vec<f64>,
}

impl SweepSample {
    pub fn new(timestamp_s: f64, amplitudes_dbuv: Vec<f64>) -> Self {
        Self {
            timestamp_s,
            amplitudes_dbuv,
        }
    }
}

/// A collection of sweeps sharing one frequency axis. The series is treated
/// as a frozen snapshot once handed to a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSeries {
    pub frequencies_hz: Vec<f64>,
    pub samples: Vec<SweepSample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionMetadata>,
}

impl SweepSeries {
    pub fn new(frequencies_hz: Vec<f64>, samples: Vec<SweepSample>) -> Self {
        Self {
            frequencies_hz,
            samples,
            session: None,
        }
    }

    pub fn with_session(mut self, session: SessionMetadata) -> Self {
        self.session = Some(session);
        self
    }

    /// Number of collected sweeps.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of bins on the shared frequency axis.
    pub fn points(&self) -> usize {
        self.frequencies_hz.len()
    }

    /// Collection statistics over the sweep timestamps, or `None` when no
    /// sweeps were collected.
    pub fn sampling_info(&self) -> Option<SamplingInfo> {
        if self.samples.is_empty() {
            return None;
        }
        let mut start = f64::INFINITY;
        let mut end = f64::NEG_INFINITY;
        for sample in &self.samples {
            start = start.min(sample.timestamp_s);
            end = end.max(sample.timestamp_s);
        }
        let spans = self.samples.len().saturating_sub(1);
        let mean_interval_s = if spans == 0 {
            0.0
        } else {
            (end - start) / spans as f64
        };
        Some(SamplingInfo {
            total_samples: self.samples.len(),
            data_points: self.points(),
            start_time_s: start,
            end_time_s: end,
            mean_interval_s,
        })
    }
}

/// Timing statistics derived from a series snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingInfo {
    pub total_samples: usize,
    pub data_points: usize,
    pub start_time_s: f64,
    pub end_time_s: f64,
    pub mean_interval_s: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_with_times(times: &[f64]) -> SweepSeries {
        let samples = times
            .iter()
            .map(|&t| SweepSample::new(t, vec![10.0, 20.0]))
            .collect();
        SweepSeries::new(vec![1e6, 2e6], samples)
    }

    #[test]
    fn sampling_info_uses_extreme_timestamps() {
        let series = series_with_times(&[0.9, 0.0, 0.3]);
        let info = series.sampling_info().unwrap();
        assert_eq!(info.total_samples, 3);
        assert_eq!(info.data_points, 2);
        assert_eq!(info.start_time_s, 0.0);
        assert_eq!(info.end_time_s, 0.9);
        assert!((info.mean_interval_s - 0.45).abs() < 1e-12);
    }

    #[test]
    fn single_sweep_has_zero_interval() {
        let series = series_with_times(&[2.5]);
        let info = series.sampling_info().unwrap();
        assert_eq!(info.mean_interval_s, 0.0);
        assert_eq!(info.start_time_s, info.end_time_s);
    }

    #[test]
    fn empty_series_has_no_sampling_info() {
        let series = SweepSeries::new(vec![1e6], Vec::new());
        assert!(series.is_empty());
        assert!(series.sampling_info().is_none());
    }

    #[test]
    fn series_roundtrips_through_json() {
        let series = series_with_times(&[0.0, 0.3]).with_session(SessionMetadata {
            preset: "EMC_30MHz_1GHz".to_string(),
            start_freq_hz: 30e6,
            stop_freq_hz: 1e9,
            points: 2,
            rbw_hz: 100e3,
            vbw_hz: 100e3,
            requested_duration_s: 0.6,
            description: None,
        });
        let encoded = serde_json::to_string(&series).unwrap();
        let decoded: SweepSeries = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, series);
    }
}
