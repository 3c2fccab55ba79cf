pub mod report;
pub mod spectrum;
pub mod sweep;

pub use report::{PeakRecord, PeakReport};
pub use spectrum::{DetectorMode, DetectorSpectrum, SpectrumSummary};
pub use sweep::{SamplingInfo, SessionMetadata, SweepSample, SweepSeries};
