use std::sync::Arc;

use rayon::prelude::*;

use crate::math::stats::StatsHelper;
use crate::prelude::{ProcessingStage, StageConfig, StageError, StageMetadata, StageResult};
use crate::processing::quasi_peak::{QuasiPeakDetector, QuasiPeakGuards, TimedSample};
use crate::sa_interface::spectrum::{DetectorMode, DetectorSpectrum};
use crate::sa_interface::sweep::SweepSeries;
use crate::standards::cispr::WeightingTable;
use crate::telemetry::log::LogManager;

/// Request for one detector-mode reduction over a frozen series snapshot.
#[derive(Debug, Clone)]
pub struct DetectorInput {
    pub series: Arc<SweepSeries>,
    pub mode: DetectorMode,
}

/// Spectrum plus the bookkeeping collected while reducing it.
#[derive(Debug, Clone)]
pub struct DetectorOutput {
    pub spectrum: DetectorSpectrum,
    pub metadata: StageMetadata,
}

/// Stage reducing a sweep series to one spectrum per requested mode.
///
/// Bins are independent, so the reduction fans out across the axis. Sweeps
/// shorter than the axis contribute to the bins they cover and are excluded
/// elsewhere; the exclusions are counted in the stage metadata.
pub struct DetectorStage {
    weighting: WeightingTable,
    config: Option<StageConfig>,
    logger: LogManager,
}

impl DetectorStage {
    pub fn new() -> Self {
        Self::with_weighting(WeightingTable::cispr16())
    }

    /// Uses an alternate weighting table.
    pub fn with_weighting(weighting: WeightingTable) -> Self {
        Self {
            weighting,
            config: None,
            logger: LogManager::scoped("detector"),
        }
    }

    fn guards(config: &StageConfig) -> QuasiPeakGuards {
        QuasiPeakGuards {
            sag_floor_ratio: config.qp_sag_floor_ratio,
            result_floor_ratio: config.qp_result_floor_ratio,
            max_gap_s: config.qp_max_gap_s,
        }
    }

    fn reduce_bin(&self, input: &DetectorInput, guards: QuasiPeakGuards, bin: usize) -> Option<f64> {
        let observations: Vec<TimedSample> = input
            .series
            .samples
            .iter()
            .filter(|sample| bin < sample.amplitudes_dbuv.len())
            .map(|sample| TimedSample {
                time_s: sample.timestamp_s,
                value_dbuv: sample.amplitudes_dbuv[bin],
            })
            .collect();

        if observations.is_empty() {
            return None;
        }

        let value = match input.mode {
            DetectorMode::Peak => observations
                .iter()
                .map(|obs| obs.value_dbuv)
                .fold(f64::NEG_INFINITY, f64::max),
            DetectorMode::Average => {
                let values: Vec<f64> = observations.iter().map(|obs| obs.value_dbuv).collect();
                StatsHelper::mean(&values)
            }
            DetectorMode::QuasiPeak => {
                let constants = self
                    .weighting
                    .constants_for(input.series.frequencies_hz[bin]);
                QuasiPeakDetector::with_guards(constants, guards).evaluate(observations)
            }
        };
        Some(value)
    }
}

impl Default for DetectorStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for DetectorStage {
    type Input = DetectorInput;
    type Output = DetectorOutput;

    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: DetectorInput) -> StageResult<DetectorOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".to_string()))?;

        if input.series.is_empty() {
            return Err(StageError::EmptySeries(
                "no sweeps collected for detector reduction".to_string(),
            ));
        }

        let guards = Self::guards(config);
        let bins = input.series.points();
        let sweeps = input.series.len();

        let amplitudes: Vec<Option<f64>> = (0..bins)
            .into_par_iter()
            .map(|bin| self.reduce_bin(&input, guards, bin))
            .collect();

        let dropped_observations: usize = input
            .series
            .samples
            .iter()
            .map(|sample| sample.amplitudes_dbuv.len().abs_diff(bins))
            .sum();
        let mismatched_samples = input
            .series
            .samples
            .iter()
            .filter(|sample| sample.amplitudes_dbuv.len() != bins)
            .count();
        let degenerate_bins = amplitudes.iter().filter(|amp| amp.is_none()).count();

        self.logger.record(&format!(
            "{} reduction over {} sweeps x {} bins",
            input.mode, sweeps, bins
        ));
        if mismatched_samples > 0 {
            self.logger.flag(&format!(
                "{} observations across {} mismatched sweeps were unusable",
                dropped_observations, mismatched_samples
            ));
        }

        let metadata = StageMetadata {
            dropped_observations,
            mismatched_samples,
            degenerate_bins,
            notes: vec![format!("{} mode over {} sweeps", input.mode, sweeps)],
        };

        Ok(DetectorOutput {
            spectrum: DetectorSpectrum::new(
                input.mode,
                input.series.frequencies_hz.clone(),
                amplitudes,
            ),
            metadata,
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
