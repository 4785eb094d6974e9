//! Rounding helpers shared by the metric calculators.

/// Round to the nearest integer, ties toward positive infinity.
///
/// Differs from [`f64::round`] only on negative ties (`-2.5` → `-2.0`).
pub fn round_half_up(x: f64) -> f64 {
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Round to one decimal place with [`round_half_up`].
pub fn round1(x: f64) -> f64 {
    round_half_up(x * 10.0) / 10.0
}

/// Arithmetic mean; zero for an empty iterator.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up_ties() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(round_half_up(0.49), 0.0);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(12.34), 12.3);
        assert_eq!(round1(12.35), 12.4);
        assert_eq!(round1(100.0), 100.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean([1.0, 2.0, 3.0]), 2.0);
        assert_eq!(mean(Vec::<f64>::new()), 0.0);
    }
}
