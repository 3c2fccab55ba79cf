use std::cmp::Ordering;

use crate::math::stats::StatsHelper;
use crate::prelude::{ProcessingStage, StageConfig, StageError, StageResult};
use crate::sa_interface::report::{PeakRecord, PeakReport};
use crate::sa_interface::spectrum::DetectorSpectrum;
use crate::standards::limits::LimitTables;
use crate::telemetry::log::LogManager;

/// Stage locating candidate violation frequencies in one derived spectrum
/// and classifying them against the regulatory tables.
pub struct PeakSearchStage {
    limits: LimitTables,
    config: Option<StageConfig>,
    logger: LogManager,
}

impl PeakSearchStage {
    pub fn new() -> Self {
        Self::with_limits(LimitTables::class_b())
    }

    /// Classifies against an alternate table pair.
    pub fn with_limits(limits: LimitTables) -> Self {
        Self {
            limits,
            config: None,
            logger: LogManager::scoped("peak-search"),
        }
    }

    /// Interior bins that strictly dominate their measured neighborhood and
    /// clear the prominence threshold, ordered by amplitude descending.
    fn candidate_bins(amplitudes: &[Option<f64>], distance: usize, threshold: f64) -> Vec<usize> {
        let bins = amplitudes.len();
        let mut candidates = Vec::new();
        for i in 1..bins.saturating_sub(1) {
            let value = match amplitudes[i] {
                Some(value) => value,
                None => continue,
            };
            if value <= threshold {
                continue;
            }
            let low = i.saturating_sub(distance);
            let high = (i + distance + 1).min(bins);
            let dominated = (low..high).any(|j| {
                j != i
                    && amplitudes[j]
                        .map(|other| other >= value)
                        .unwrap_or(false)
            });
            if !dominated {
                candidates.push(i);
            }
        }
        candidates.sort_by(|&a, &b| {
            let va = amplitudes[a].unwrap_or(f64::NEG_INFINITY);
            let vb = amplitudes[b].unwrap_or(f64::NEG_INFINITY);
            vb.total_cmp(&va)
        });
        candidates
    }
}

impl Default for PeakSearchStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for PeakSearchStage {
    type Input = DetectorSpectrum;
    type Output = PeakReport;

    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, spectrum: DetectorSpectrum) -> StageResult<PeakReport> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".to_string()))?;

        if spectrum.frequencies_hz.len() != spectrum.amplitudes_dbuv.len() {
            return Err(StageError::InvalidInput(format!(
                "axis/amplitude length mismatch: {} vs {}",
                spectrum.frequencies_hz.len(),
                spectrum.amplitudes_dbuv.len()
            )));
        }
        if spectrum.is_empty() {
            return Ok(PeakReport::default());
        }

        let present: Vec<f64> = spectrum.amplitudes_dbuv.iter().flatten().copied().collect();
        if present.is_empty() {
            return Ok(PeakReport::default());
        }
        let threshold = StatsHelper::mean(&present) + config.min_prominence;

        let mut bins = Self::candidate_bins(
            &spectrum.amplitudes_dbuv,
            config.peak_distance,
            threshold,
        );
        bins.truncate(config.top_n);

        let mut records: Vec<PeakRecord> = bins
            .into_iter()
            .filter_map(|bin| {
                spectrum.amplitudes_dbuv[bin].map(|amplitude| {
                    let frequency = spectrum.frequencies_hz[bin];
                    PeakRecord::new(frequency, amplitude, self.limits.lookup(frequency))
                })
            })
            .collect();

        // Exceeding records lead, mildest violation first; compliant records
        // follow, closest to the limit first.
        records.sort_by(|a, b| match (a.exceeds_fcc, b.exceeds_fcc) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (true, true) => a.fcc_margin_db.total_cmp(&b.fcc_margin_db),
            (false, false) => b.fcc_margin_db.total_cmp(&a.fcc_margin_db),
        });

        self.logger.record(&format!(
            "retained {} of at most {} candidates from {} spectrum",
            records.len(),
            config.top_n,
            spectrum.mode
        ));

        Ok(PeakReport { records })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
