use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::math::stats::StatsHelper;

/// Detector characteristic applied when reducing a series to a spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectorMode {
    Peak,
    QuasiPeak,
    Average,
}

impl DetectorMode {
    pub const ALL: [DetectorMode; 3] = [
        DetectorMode::Peak,
        DetectorMode::QuasiPeak,
        DetectorMode::Average,
    ];
}

impl fmt::Display for DetectorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectorMode::Peak => "peak",
            DetectorMode::QuasiPeak => "quasi_peak",
            DetectorMode::Average => "average",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for DetectorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "peak" => Ok(DetectorMode::Peak),
            "quasi_peak" | "quasipeak" | "qp" => Ok(DetectorMode::QuasiPeak),
            "average" | "avg" => Ok(DetectorMode::Average),
            other => Err(format!("unknown detector mode '{}'", other)),
        }
    }
}

/// Spectrum derived from a series under one detector mode. Bins without any
/// contributing observation carry `None` rather than a coerced zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorSpectrum {
    pub mode: DetectorMode,
    pub frequencies_hz: Vec<f64>,
    pub amplitudes_dbuv: Vec<Option<f64>>,
}

impl DetectorSpectrum {
    pub fn new(
        mode: DetectorMode,
        frequencies_hz: Vec<f64>,
        amplitudes_dbuv: Vec<Option<f64>>,
    ) -> Self {
        Self {
            mode,
            frequencies_hz,
            amplitudes_dbuv,
        }
    }

    pub fn len(&self) -> usize {
        self.frequencies_hz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies_hz.is_empty()
    }

    /// Iterator over bins that carry a measured value.
    pub fn present(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies_hz
            .iter()
            .zip(self.amplitudes_dbuv.iter())
            .filter_map(|(&freq, &amp)| amp.map(|amp| (freq, amp)))
    }

    /// Summary statistics over measured bins, or `None` when every bin is
    /// degenerate.
    pub fn summary(&self) -> Option<SpectrumSummary> {
        let values: Vec<f64> = self.present().map(|(_, amp)| amp).collect();
        if values.is_empty() {
            return None;
        }
        let min_dbuv = values.iter().copied().fold(f64::INFINITY, f64::min);
        Some(SpectrumSummary {
            max_dbuv: StatsHelper::max(&values),
            min_dbuv,
            mean_dbuv: StatsHelper::mean(&values),
            measured_bins: values.len(),
        })
    }
}

/// Max/min/mean over the measured bins of one spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumSummary {
    pub max_dbuv: f64,
    pub min_dbuv: f64,
    pub mean_dbuv: f64,
    pub measured_bins: usize,
}
