use emicore::sa_interface::{
    DetectorSpectrum, PeakRecord, SamplingInfo, SessionMetadata, SweepSeries,
};
use serde::{Deserialize, Serialize};

use crate::workflow::runner::WorkflowResult;

/// Latest analysis results published to GUI and report consumers.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub peak: Option<DetectorSpectrum>,
    pub quasi_peak: Option<DetectorSpectrum>,
    pub average: Option<DetectorSpectrum>,
    pub records: Vec<PeakRecord>,
    pub sampling: Option<SamplingInfo>,
    pub session: Option<SessionMetadata>,
    pub notes: Vec<String>,
}

impl VisualizationModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_result(result: &WorkflowResult, series: &SweepSeries) -> Self {
        Self {
            peak: Some(result.peak.clone()),
            quasi_peak: Some(result.quasi_peak.clone()),
            average: Some(result.average.clone()),
            records: result.report.records.clone(),
            sampling: series.sampling_info(),
            session: series.session.clone(),
            notes: result.notes.clone(),
        }
    }
}
