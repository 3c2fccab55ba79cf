pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    pub fn max(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_sequence_yields_zero() {
        assert_eq!(StatsHelper::mean(&[]), 0.0);
    }

    #[test]
    fn mean_handles_mixed_signs() {
        assert_eq!(StatsHelper::mean(&[-10.0, 10.0, 30.0]), 10.0);
    }

    #[test]
    fn max_of_empty_sequence_yields_zero() {
        assert_eq!(StatsHelper::max(&[]), 0.0);
    }

    #[test]
    fn max_picks_largest_value() {
        assert_eq!(StatsHelper::max(&[3.5, -2.0, 7.25, 1.0]), 7.25);
    }
}
