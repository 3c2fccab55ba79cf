use anyhow::Context;
use emicore::prelude::StageConfig;
use emicore::sa_interface::DetectorMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub preset: String,
    pub sweeps: usize,
    pub interval_s: f64,
    /// Spectrum fed to the peak search.
    pub report_mode: DetectorMode,
    pub peak_distance: usize,
    pub min_prominence: f64,
    pub top_n: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let stage = StageConfig::default();
        Self {
            preset: "EMC_30MHz_1GHz".to_string(),
            sweeps: 50,
            interval_s: 0.3,
            report_mode: DetectorMode::QuasiPeak,
            peak_distance: stage.peak_distance,
            min_prominence: stage.min_prominence,
            top_n: stage.top_n,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        preset: String,
        sweeps: usize,
        interval_s: f64,
        report_mode: DetectorMode,
    ) -> Self {
        Self {
            preset,
            sweeps,
            interval_s,
            report_mode,
            ..Self::default()
        }
    }

    pub fn to_stage_config(&self) -> StageConfig {
        StageConfig {
            peak_distance: self.peak_distance,
            min_prominence: self.min_prominence,
            top_n: self.top_n,
            ..StageConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_produces_stage_config() {
        let cfg = WorkflowConfig::from_args(
            "MF_150kHz_30MHz".to_string(),
            12,
            0.5,
            DetectorMode::Average,
        );
        assert_eq!(cfg.sweeps, 12);
        assert_eq!(cfg.report_mode, DetectorMode::Average);
        assert_eq!(cfg.to_stage_config().peak_distance, 50);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"preset: LF_9kHz_150kHz\nsweeps: 24\ntop_n: 5\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.preset, "LF_9kHz_150kHz");
        assert_eq!(cfg.sweeps, 24);
        assert_eq!(cfg.to_stage_config().top_n, 5);
        // Unlisted fields keep their defaults.
        assert_eq!(cfg.report_mode, DetectorMode::QuasiPeak);
    }

    #[test]
    fn report_mode_reads_from_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"report_mode: Peak\n").unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.report_mode, DetectorMode::Peak);
    }
}
