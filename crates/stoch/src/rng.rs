//! Seedable random source for region sampling, `or` and `iter`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Every draw is a pure function of the seed and the draws before it.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: ChaCha8Rng,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// A value in `[lo, hi)`. Equal bounds yield `lo`; reversed bounds yield
    /// a value in `(hi, lo]`. Always consumes exactly one draw.
    pub fn uniform_real(&mut self, lo: f64, hi: f64) -> f64 {
        let unit: f64 = self.rng.gen_range(0.0..1.0);
        // A draw that rounds onto `hi` falls back to `lo`
        scale_unit(lo, hi, unit).unwrap_or(lo)
    }

    /// An integer in `[0, n)`. `n` must be positive.
    pub fn uniform_int(&mut self, n: u64) -> u64 {
        debug_assert!(n > 0, "uniform_int needs a non-empty range");
        self.rng.gen_range(0..n.max(1))
    }
}

/// Maps `unit` in `[0, 1)` onto the range from `lo` towards `hi`.
///
/// `None` when rounding lands on `hi` itself, which the half-open range
/// excludes. Never `None` for `lo == hi` or for `unit == 0`.
fn scale_unit(lo: f64, hi: f64, unit: f64) -> Option<f64> {
    let value = lo + (hi - lo) * unit;
    let past_end = if lo < hi {
        value >= hi
    } else if lo > hi {
        value <= hi
    } else {
        false
    };
    (!past_end).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RandomSource::new(42);
        let mut b = RandomSource::new(42);
        for _ in 0..100 {
            assert_eq!(a.uniform_real(-3.0, 5.0).to_bits(), b.uniform_real(-3.0, 5.0).to_bits());
            assert_eq!(a.uniform_int(7), b.uniform_int(7));
        }
    }

    #[test]
    fn real_stays_in_half_open_range() {
        let mut rng = RandomSource::new(1);
        for _ in 0..1000 {
            let v = rng.uniform_real(2.0, 3.0);
            assert!((2.0..3.0).contains(&v));
        }
    }

    #[test]
    fn degenerate_range_returns_bound() {
        let mut rng = RandomSource::new(9);
        assert_eq!(rng.uniform_real(4.0, 4.0), 4.0);
    }

    #[test]
    fn rounding_onto_upper_bound_is_rejected() {
        let largest_unit = 1.0 - f64::EPSILON;
        assert_eq!(2.0 + (3.0 - 2.0) * largest_unit, 3.0);
        assert_eq!(scale_unit(2.0, 3.0, largest_unit), None);
        assert_eq!(scale_unit(3.0, 2.0, largest_unit), None);
        assert_eq!(scale_unit(2.0, 3.0, 0.5), Some(2.5));
        assert_eq!(scale_unit(3.0, 2.0, 0.0), Some(3.0));
        assert_eq!(scale_unit(4.0, 4.0, largest_unit), Some(4.0));
    }

    #[test]
    fn int_covers_range() {
        let mut rng = RandomSource::new(3);
        let mut seen = [false; 4];
        for _ in 0..1000 {
            seen[rng.uniform_int(4) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
