//! Shared math utilities.

/// Streaming population variance over integer samples.
///
/// Keeps an exact integer sum and sum of squares, so the result doesn't
/// depend on sample order and needs no buffer of the samples.
#[derive(Debug, Default, Clone, Copy)]
pub struct VarianceAccumulator {
    count: u64,
    sum: i64,
    sum_sq: i64,
}

impl VarianceAccumulator {
    pub fn push(&mut self, value: i32) {
        let v = i64::from(value);
        self.count += 1;
        self.sum += v;
        self.sum_sq += v * v;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Population variance (divides by N, not N-1). 0.0 when empty.
    pub fn population_variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = i128::from(self.count);
        let sum = i128::from(self.sum);
        let numerator = n * i128::from(self.sum_sq) - sum * sum;
        numerator as f64 / (n * n) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variance_of(values: &[i32]) -> f64 {
        let mut acc = VarianceAccumulator::default();
        values.iter().for_each(|&v| acc.push(v));
        acc.population_variance()
    }

    #[test]
    fn test_population_variance() {
        // Deviations from mean 5: -3, -1, -1, -1, 0, 0, 2, 4 → sum sq 32, /8 = 4
        assert_eq!(variance_of(&[2, 4, 4, 4, 5, 5, 7, 9]), 4.0);
    }

    #[test]
    fn test_variance_of_constant_is_zero() {
        assert_eq!(variance_of(&[7; 16]), 0.0);
    }

    #[test]
    fn test_empty_is_zero() {
        let acc = VarianceAccumulator::default();
        assert_eq!(acc.count(), 0);
        assert_eq!(acc.population_variance(), 0.0);
    }

    #[test]
    fn test_large_offset_keeps_precision() {
        // ±1020 around a large constant offset
        let values: Vec<i32> = (0..10_000)
            .map(|i| 1_000_000 + if i % 2 == 0 { 1020 } else { -1020 })
            .collect();
        assert_eq!(variance_of(&values), 1020.0 * 1020.0);
    }
}
