use serde::{Deserialize, Serialize};

/// Shared configuration for the analysis stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Exclusion radius for the local-maximum search, in bin positions.
    pub peak_distance: usize,
    /// Candidates must exceed the spectrum mean by this many dB.
    pub min_prominence: f64,
    /// Upper bound on retained peak records.
    pub top_n: usize,
    /// Quasi-peak decay floor, as a fraction of the bin average.
    pub qp_sag_floor_ratio: f64,
    /// Quasi-peak final floor, as a fraction of the bin average.
    pub qp_result_floor_ratio: f64,
    /// Inter-sample gaps above this many seconds are treated as glitches.
    pub qp_max_gap_s: f64,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            peak_distance: 50,
            min_prominence: 3.0,
            top_n: 10,
            qp_sag_floor_ratio: 0.7,
            qp_result_floor_ratio: 0.8,
            qp_max_gap_s: 10.0,
        }
    }
}

/// Metadata used for chaining stages and telemetry.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    /// Observations that could not be mapped onto the shared axis.
    pub dropped_observations: usize,
    /// Sweeps whose amplitude count disagreed with the axis.
    pub mismatched_samples: usize,
    /// Bins left without any contributing observation.
    pub degenerate_bins: usize,
    pub notes: Vec<String>,
}

/// Common error type for stage execution.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("empty series: {0}")]
    EmptySeries(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// Trait describing the lifecycle of an analysis stage.
pub trait ProcessingStage {
    type Input;
    type Output;

    fn initialize(&mut self, config: &StageConfig) -> StageResult<()>;
    fn execute(&mut self, input: Self::Input) -> StageResult<Self::Output>;
    fn cleanup(&mut self);
}
