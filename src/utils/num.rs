//! Numeric utilities: centralised integer conversions for paging and metrics.
//!
//! - Fallible conversions return `Option` when an out-of-range value must stop the operation.
//! - Saturating conversions clamp when best-effort is acceptable (durations in log lines).

#[inline]
#[must_use]
pub fn i64_to_usize(v: i64) -> Option<usize> {
    usize::try_from(v).ok()
}

#[inline]
#[must_use]
pub fn usize_to_u64(v: usize) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

#[inline]
#[must_use]
pub fn u128_to_u64_saturating(v: u128) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

/// Nearest `f64`; exact up to 2^53.
#[inline]
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn i128_to_f64(v: i128) -> f64 {
    v as f64
}

/// The integer an `f64` holds exactly, if it is whole and in range.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn f64_to_i128_exact(v: f64) -> Option<i128> {
    const BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0; // 2^127
    (v.is_finite() && v.fract() == 0.0 && v >= -BOUND && v < BOUND).then(|| v as i128)
}

/// `ceil(total / size)` with a zero size treated as one.
#[inline]
#[must_use]
pub fn ceil_div(total: usize, size: usize) -> usize {
    total.div_ceil(size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_does_not_convert() {
        assert_eq!(i64_to_usize(-1), None);
        assert_eq!(i64_to_usize(7), Some(7));
    }

    #[test]
    fn ceil_div_rounds_up_and_guards_zero() {
        assert_eq!(ceil_div(10, 3), 4);
        assert_eq!(ceil_div(9, 3), 3);
        assert_eq!(ceil_div(0, 5), 0);
        assert_eq!(ceil_div(4, 0), 4);
    }

    #[test]
    fn whole_floats_convert_exactly() {
        assert_eq!(f64_to_i128_exact(42.0), Some(42));
        assert_eq!(f64_to_i128_exact(-0.0), Some(0));
        assert_eq!(f64_to_i128_exact(2.5), None);
        assert_eq!(f64_to_i128_exact(f64::NAN), None);
        assert_eq!(f64_to_i128_exact(1e40), None);
        assert_eq!(i128_to_f64(1 << 53), 9_007_199_254_740_992.0);
    }

    #[test]
    fn saturating_u128() {
        assert_eq!(u128_to_u64_saturating(u128::MAX), u64::MAX);
        assert_eq!(u128_to_u64_saturating(12), 12);
    }
}
