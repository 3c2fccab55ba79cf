use serde::{Deserialize, Serialize};

use crate::standards::limits::RegulatoryLimits;

/// Classified peak candidate emitted by the peak-search stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakRecord {
    pub frequency_hz: f64,
    pub amplitude_dbuv: f64,
    pub fcc_limit_dbuv: f64,
    pub ce_limit_dbuv: f64,
    pub fcc_margin_db: f64,
    pub ce_margin_db: f64,
    pub exceeds_fcc: bool,
    pub exceeds_ce: bool,
}

impl PeakRecord {
    /// Builds a fully classified record. Margins and exceedance flags are
    /// derived here and never patched afterwards.
    pub fn new(frequency_hz: f64, amplitude_dbuv: f64, limits: RegulatoryLimits) -> Self {
        let fcc_margin_db = amplitude_dbuv - limits.fcc_dbuv;
        let ce_margin_db = amplitude_dbuv - limits.ce_dbuv;
        Self {
            frequency_hz,
            amplitude_dbuv,
            fcc_limit_dbuv: limits.fcc_dbuv,
            ce_limit_dbuv: limits.ce_dbuv,
            fcc_margin_db,
            ce_margin_db,
            exceeds_fcc: fcc_margin_db > 0.0,
            exceeds_ce: ce_margin_db > 0.0,
        }
    }

    pub fn frequency_mhz(&self) -> f64 {
        self.frequency_hz / 1e6
    }

    /// True when the record stays at or under both limits.
    pub fn passes(&self) -> bool {
        !self.exceeds_fcc && !self.exceeds_ce
    }
}

/// Ranked, size-bounded set of classified peaks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakReport {
    pub records: Vec<PeakRecord>,
}

impl PeakReport {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records violating at least one regime.
    pub fn failures(&self) -> impl Iterator<Item = &PeakRecord> {
        self.records.iter().filter(|record| !record.passes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_derives_margins_and_flags() {
        let limits = RegulatoryLimits {
            fcc_dbuv: 46.0,
            ce_dbuv: 40.0,
        };
        let record = PeakRecord::new(250e6, 43.5, limits);
        assert!((record.fcc_margin_db + 2.5).abs() < 1e-12);
        assert!((record.ce_margin_db - 3.5).abs() < 1e-12);
        assert!(!record.exceeds_fcc);
        assert!(record.exceeds_ce);
        assert!(!record.passes());
        assert!((record.frequency_mhz() - 250.0).abs() < 1e-12);
    }

    #[test]
    fn amplitude_at_the_limit_passes() {
        let limits = RegulatoryLimits {
            fcc_dbuv: 40.0,
            ce_dbuv: 40.0,
        };
        let record = PeakRecord::new(50e6, 40.0, limits);
        assert!(record.passes());
        assert_eq!(record.fcc_margin_db, 0.0);
    }

    #[test]
    fn report_counts_failures() {
        let tight = RegulatoryLimits {
            fcc_dbuv: 30.0,
            ce_dbuv: 30.0,
        };
        let loose = RegulatoryLimits {
            fcc_dbuv: 60.0,
            ce_dbuv: 60.0,
        };
        let report = PeakReport {
            records: vec![
                PeakRecord::new(100e6, 45.0, tight),
                PeakRecord::new(200e6, 45.0, loose),
            ],
        };
        assert_eq!(report.len(), 2);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn record_serializes_with_wire_field_names() {
        let limits = RegulatoryLimits {
            fcc_dbuv: 40.0,
            ce_dbuv: 40.0,
        };
        let record = PeakRecord::new(125e6, 44.0, limits);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["frequency_hz"], 125e6);
        assert_eq!(value["exceeds_fcc"], true);
        assert!(value.get("fcc_margin_db").is_some());
    }
}
