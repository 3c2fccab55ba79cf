use serde::{Deserialize, Serialize};

/// Limit applied to frequencies outside every tabulated band, high enough
/// that such bins never fail classification.
pub const OUT_OF_TABLE_LIMIT_DBUV: f64 = 120.0;

/// One half-open `[low, high)` band of a regulatory limit table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LimitBand {
    pub low_mhz: f64,
    pub high_mhz: f64,
    pub limit_dbuv: f64,
}

/// Ordered piecewise limit table for one regulatory regime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitTable {
    bands: Vec<LimitBand>,
}

fn band(low_mhz: f64, high_mhz: f64, limit_dbuv: f64) -> LimitBand {
    LimitBand {
        low_mhz,
        high_mhz,
        limit_dbuv,
    }
}

impl LimitTable {
    pub fn from_bands(bands: Vec<LimitBand>) -> Self {
        Self { bands }
    }

    /// FCC Part 15 Class B quasi-peak limits.
    pub fn fcc_part15_class_b() -> Self {
        Self::from_bands(vec![
            band(0.009, 0.05, 34.0),
            band(0.05, 0.15, 40.0),
            band(0.15, 0.5, 40.0),
            band(0.5, 1.705, 40.0),
            band(1.705, 30.0, 40.0),
            band(30.0, 88.0, 40.0),
            band(88.0, 216.0, 40.0),
            band(216.0, 960.0, 46.0),
            band(960.0, 10_000.0, 40.0),
        ])
    }

    /// EN 55032 Class B quasi-peak limits.
    pub fn en55032_class_b() -> Self {
        Self::from_bands(vec![
            band(0.009, 0.05, 34.0),
            band(0.05, 0.15, 40.0),
            band(0.15, 0.5, 40.0),
            band(0.5, 1.705, 40.0),
            band(1.705, 30.0, 40.0),
            band(30.0, 230.0, 40.0),
            band(230.0, 1_000.0, 47.0),
            band(1_000.0, 10_000.0, 40.0),
        ])
    }

    /// Limit owning `frequency_hz`. Bands are half-open `[low, high)`;
    /// anything uncovered resolves to [`OUT_OF_TABLE_LIMIT_DBUV`].
    pub fn limit_for_hz(&self, frequency_hz: f64) -> f64 {
        let freq_mhz = frequency_hz / 1e6;
        self.bands
            .iter()
            .find(|b| freq_mhz >= b.low_mhz && freq_mhz < b.high_mhz)
            .map(|b| b.limit_dbuv)
            .unwrap_or(OUT_OF_TABLE_LIMIT_DBUV)
    }
}

/// Limit pair resolved for one frequency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegulatoryLimits {
    pub fcc_dbuv: f64,
    pub ce_dbuv: f64,
}

/// FCC/CE table pair used to classify peak records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitTables {
    pub fcc: LimitTable,
    pub ce: LimitTable,
}

impl LimitTables {
    pub fn class_b() -> Self {
        Self {
            fcc: LimitTable::fcc_part15_class_b(),
            ce: LimitTable::en55032_class_b(),
        }
    }

    pub fn lookup(&self, frequency_hz: f64) -> RegulatoryLimits {
        RegulatoryLimits {
            fcc_dbuv: self.fcc.limit_for_hz(frequency_hz),
            ce_dbuv: self.ce.limit_for_hz(frequency_hz),
        }
    }
}

impl Default for LimitTables {
    fn default() -> Self {
        Self::class_b()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_total_over_frequency() {
        let tables = LimitTables::class_b();
        let below = tables.lookup(1e3);
        assert_eq!(below.fcc_dbuv, OUT_OF_TABLE_LIMIT_DBUV);
        assert_eq!(below.ce_dbuv, OUT_OF_TABLE_LIMIT_DBUV);

        let above = tables.lookup(10.0e9);
        assert_eq!(above.fcc_dbuv, OUT_OF_TABLE_LIMIT_DBUV);

        let negative = tables.lookup(-5e6);
        assert_eq!(negative.ce_dbuv, OUT_OF_TABLE_LIMIT_DBUV);
    }

    #[test]
    fn boundaries_belong_to_the_upper_band() {
        let fcc = LimitTable::fcc_part15_class_b();
        assert_eq!(fcc.limit_for_hz(0.05e6), 40.0);
        assert_eq!(fcc.limit_for_hz(216e6), 46.0);
        assert_eq!(fcc.limit_for_hz(960e6), 40.0);
    }

    #[test]
    fn regimes_diverge_above_216_mhz() {
        let tables = LimitTables::class_b();
        let at_250 = tables.lookup(250e6);
        assert_eq!(at_250.fcc_dbuv, 46.0);
        assert_eq!(at_250.ce_dbuv, 40.0);

        let at_980 = tables.lookup(980e6);
        assert_eq!(at_980.fcc_dbuv, 40.0);
        assert_eq!(at_980.ce_dbuv, 47.0);
    }

    #[test]
    fn shared_low_bands_agree() {
        let tables = LimitTables::class_b();
        let at_20k = tables.lookup(20e3);
        assert_eq!(at_20k.fcc_dbuv, 34.0);
        assert_eq!(at_20k.ce_dbuv, 34.0);

        let at_10m = tables.lookup(10e6);
        assert_eq!(at_10m.fcc_dbuv, 40.0);
        assert_eq!(at_10m.ce_dbuv, 40.0);
    }
}
