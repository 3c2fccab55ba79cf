use crate::math::stats::StatsHelper;
use crate::standards::cispr::TimeConstants;

/// One timed observation of a single frequency bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSample {
    pub time_s: f64,
    pub value_dbuv: f64,
}

/// Stability guards keeping the recurrence honest on sparse, jittery
/// real-world sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuasiPeakGuards {
    /// The decayed value may not sag below this fraction of the bin average.
    pub sag_floor_ratio: f64,
    /// The final value may not fall below this fraction of the bin average.
    pub result_floor_ratio: f64,
    /// Gaps longer than this many seconds are treated as glitches.
    pub max_gap_s: f64,
}

impl Default for QuasiPeakGuards {
    fn default() -> Self {
        Self {
            sag_floor_ratio: 0.7,
            result_floor_ratio: 0.8,
            max_gap_s: 10.0,
        }
    }
}

/// Software emulation of a CISPR 16 quasi-peak detector for one bin fed
/// with irregularly spaced observations.
pub struct QuasiPeakDetector {
    constants: TimeConstants,
    guards: QuasiPeakGuards,
}

impl QuasiPeakDetector {
    pub fn new(constants: TimeConstants) -> Self {
        Self::with_guards(constants, QuasiPeakGuards::default())
    }

    pub fn with_guards(constants: TimeConstants, guards: QuasiPeakGuards) -> Self {
        Self { constants, guards }
    }

    /// Reduces the observations for one bin to a single quasi-peak value.
    ///
    /// Observations are clamped to be non-negative and sorted by
    /// `(time, value)`, so the result does not depend on arrival order.
    /// Non-positive or oversized time steps are skipped instead of
    /// corrupting the recurrence.
    pub fn evaluate(&self, mut observations: Vec<TimedSample>) -> f64 {
        match observations.len() {
            0 => return 0.0,
            1 => return observations[0].value_dbuv.max(0.0),
            _ => {}
        }

        for obs in observations.iter_mut() {
            obs.value_dbuv = obs.value_dbuv.max(0.0);
        }
        observations.sort_unstable_by(|a, b| {
            a.time_s
                .total_cmp(&b.time_s)
                .then(a.value_dbuv.total_cmp(&b.value_dbuv))
        });

        let values: Vec<f64> = observations.iter().map(|obs| obs.value_dbuv).collect();
        let average = StatsHelper::mean(&values);
        let max_value = StatsHelper::max(&values);

        let mut qp = observations[0].value_dbuv;
        for pair in observations.windows(2) {
            let dt = pair[1].time_s - pair[0].time_s;
            if !dt.is_finite() || dt <= 0.0 || dt > self.guards.max_gap_s {
                continue;
            }
            let current = pair[1].value_dbuv;

            if current > qp {
                // Charge toward the larger input.
                let alpha = 1.0 - (-dt / self.constants.rise_s).exp();
                qp += alpha * (current - qp);
            } else {
                // Discharge, floored at the present input and at the
                // configured share of the bin average.
                let decayed = qp * (-dt / self.constants.decay_s).exp();
                let floor = current.max(self.guards.sag_floor_ratio * average);
                qp = decayed.max(floor);
            }
        }

        qp = qp.max(self.guards.result_floor_ratio * average);
        qp = qp.min(max_value);
        qp.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standards::cispr::CisprBand;
    use approx::assert_relative_eq;

    fn sample(time_s: f64, value_dbuv: f64) -> TimedSample {
        TimedSample { time_s, value_dbuv }
    }

    fn detector(band: CisprBand) -> QuasiPeakDetector {
        QuasiPeakDetector::new(band.time_constants())
    }

    #[test]
    fn empty_and_single_inputs_short_circuit() {
        let qp = detector(CisprBand::B);
        assert_eq!(qp.evaluate(Vec::new()), 0.0);
        assert_eq!(qp.evaluate(vec![sample(0.0, 7.0)]), 7.0);
        assert_eq!(qp.evaluate(vec![sample(0.0, -5.0)]), 0.0);
    }

    #[test]
    fn constant_input_reproduces_itself() {
        let qp = detector(CisprBand::Cd);
        let observations = vec![sample(0.0, 10.0), sample(1.0, 10.0), sample(2.0, 10.0)];
        assert_eq!(qp.evaluate(observations), 10.0);
    }

    #[test]
    fn single_step_stays_strictly_between_extremes() {
        // Band A rises slowly enough that one second cannot fully charge.
        let qp = detector(CisprBand::A);
        let value = qp.evaluate(vec![sample(0.0, 0.0), sample(1.0, 100.0)]);
        assert!(value > 0.0);
        assert!(value < 100.0);
        assert!(value > 99.9);
    }

    #[test]
    fn result_never_leaves_the_guard_interval() {
        // A spike followed by a quiet tail collapses onto the result floor.
        let qp = detector(CisprBand::Cd);
        let observations = vec![
            sample(0.0, 100.0),
            sample(0.4, 10.0),
            sample(0.8, 10.0),
            sample(1.2, 10.0),
        ];
        let value = qp.evaluate(observations);
        assert_relative_eq!(value, 26.0, epsilon = 1e-9);
    }

    #[test]
    fn arrival_order_does_not_change_the_result() {
        let qp = detector(CisprBand::B);
        let base = vec![
            sample(0.0, 30.0),
            sample(0.2, 80.0),
            sample(0.4, 20.0),
            sample(0.6, 55.0),
        ];
        let shuffled = vec![base[2], base[0], base[3], base[1]];
        let reference = qp.evaluate(base);
        let permuted = qp.evaluate(shuffled);
        assert_eq!(reference.to_bits(), permuted.to_bits());
    }

    #[test]
    fn oversized_gaps_are_skipped() {
        let qp = detector(CisprBand::B);
        let value = qp.evaluate(vec![sample(0.0, 50.0), sample(100.0, 50.0)]);
        assert_eq!(value, 50.0);
    }

    #[test]
    fn duplicate_timestamps_do_not_advance_the_recurrence() {
        // Both observations share one timestamp, so only the clamps act:
        // max(5, 0.8 * 7) = 5.6.
        let qp = detector(CisprBand::B);
        let value = qp.evaluate(vec![sample(1.0, 9.0), sample(1.0, 5.0)]);
        assert_relative_eq!(value, 5.6, epsilon = 1e-12);
    }

    #[test]
    fn band_constants_shape_the_charge_rate() {
        let observations = vec![sample(0.0, 0.0), sample(0.1, 100.0)];
        let slow = detector(CisprBand::A).evaluate(observations.clone());
        let fast = detector(CisprBand::Cd).evaluate(observations);
        assert!(slow < fast);
        assert_relative_eq!(fast, 100.0, epsilon = 1e-9);
        assert!(slow > 88.0 && slow < 90.0);
    }

    #[test]
    fn negative_observations_are_clamped_before_statistics() {
        let qp = detector(CisprBand::B);
        let value = qp.evaluate(vec![sample(0.0, -40.0), sample(0.5, -40.0)]);
        assert_eq!(value, 0.0);
    }

    #[test]
    fn custom_guards_are_honored() {
        let guards = QuasiPeakGuards {
            sag_floor_ratio: 0.0,
            result_floor_ratio: 0.0,
            max_gap_s: 10.0,
        };
        let qp = QuasiPeakDetector::with_guards(CisprBand::Cd.time_constants(), guards);
        // Without floors the fast C/D decay falls all the way to the input.
        let observations = vec![sample(0.0, 100.0), sample(0.4, 10.0)];
        let value = qp.evaluate(observations);
        assert_relative_eq!(value, 10.0, epsilon = 1e-9);
    }
}
