use serde::{Deserialize, Serialize};

/// Charge and discharge time constants of a quasi-peak weighting circuit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeConstants {
    pub rise_s: f64,
    pub decay_s: f64,
}

impl Default for TimeConstants {
    /// Band B constants, the fallback when no band claims a frequency.
    fn default() -> Self {
        CisprBand::B.time_constants()
    }
}

/// CISPR 16 measurement bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CisprBand {
    /// 9 kHz to 150 kHz.
    A,
    /// 150 kHz to 30 MHz.
    B,
    /// Above 30 MHz; bands C and D share one constant pair.
    Cd,
}

impl CisprBand {
    /// Band owning the given frequency. Total over all inputs: everything
    /// below 150 kHz maps to band A, everything from 30 MHz up to C/D.
    pub fn for_frequency_hz(frequency_hz: f64) -> Self {
        if frequency_hz < 150e3 {
            CisprBand::A
        } else if frequency_hz < 30e6 {
            CisprBand::B
        } else {
            CisprBand::Cd
        }
    }

    pub fn time_constants(self) -> TimeConstants {
        match self {
            CisprBand::A => TimeConstants {
                rise_s: 45e-3,
                decay_s: 500e-3,
            },
            CisprBand::B => TimeConstants {
                rise_s: 1e-3,
                decay_s: 160e-3,
            },
            CisprBand::Cd => TimeConstants {
                rise_s: 1e-3,
                decay_s: 550e-6,
            },
        }
    }
}

/// One row of a weighting table: constants applied below an upper bound.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeightingRow {
    /// Exclusive upper frequency bound for this row.
    pub upper_bound_hz: f64,
    pub constants: TimeConstants,
}

/// Frequency-ordered weighting rows, replaceable for other jurisdictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightingTable {
    rows: Vec<WeightingRow>,
}

impl WeightingTable {
    pub fn cispr16() -> Self {
        Self::from_rows(vec![
            WeightingRow {
                upper_bound_hz: 150e3,
                constants: CisprBand::A.time_constants(),
            },
            WeightingRow {
                upper_bound_hz: 30e6,
                constants: CisprBand::B.time_constants(),
            },
            WeightingRow {
                upper_bound_hz: f64::INFINITY,
                constants: CisprBand::Cd.time_constants(),
            },
        ])
    }

    /// Rows must be sorted by ascending upper bound.
    pub fn from_rows(rows: Vec<WeightingRow>) -> Self {
        Self { rows }
    }

    /// Constants for the row owning `frequency_hz`; falls back to the band B
    /// defaults when no row matches.
    pub fn constants_for(&self, frequency_hz: f64) -> TimeConstants {
        self.rows
            .iter()
            .find(|row| frequency_hz < row.upper_bound_hz)
            .map(|row| row.constants)
            .unwrap_or_default()
    }
}

impl Default for WeightingTable {
    fn default() -> Self {
        Self::cispr16()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges_assign_upward() {
        assert_eq!(CisprBand::for_frequency_hz(10e3), CisprBand::A);
        assert_eq!(CisprBand::for_frequency_hz(150e3), CisprBand::B);
        assert_eq!(CisprBand::for_frequency_hz(29.9e6), CisprBand::B);
        assert_eq!(CisprBand::for_frequency_hz(30e6), CisprBand::Cd);
        assert_eq!(CisprBand::for_frequency_hz(2.4e9), CisprBand::Cd);
    }

    #[test]
    fn cispr16_table_matches_band_constants() {
        let table = WeightingTable::cispr16();
        assert_eq!(table.constants_for(50e3), CisprBand::A.time_constants());
        assert_eq!(table.constants_for(1e6), CisprBand::B.time_constants());
        assert_eq!(table.constants_for(100e6), CisprBand::Cd.time_constants());
    }

    #[test]
    fn empty_table_falls_back_to_band_b() {
        let table = WeightingTable::from_rows(Vec::new());
        assert_eq!(table.constants_for(5e6), TimeConstants::default());
        assert_eq!(TimeConstants::default(), CisprBand::B.time_constants());
    }
}
