pub mod detector;
pub mod quasi_peak;
pub mod search;

pub use detector::{DetectorInput, DetectorOutput, DetectorStage};
pub use quasi_peak::{QuasiPeakDetector, QuasiPeakGuards, TimedSample};
pub use search::PeakSearchStage;
