//! Deterministic float ordering.
//!
//! Cache eviction sorts by timestamps and picking sorts by angles; both go
//! through [`stable_total_cmp_f64`] so ties and NaNs order the same way on
//! every run.

use core::cmp::Ordering;

/// Total order on floats with `-0.0 == 0.0` and every NaN equal.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    fn canonical(v: f64) -> f64 {
        if v == 0.0 {
            0.0
        } else if v.is_nan() {
            f64::NAN
        } else {
            v
        }
    }
    canonical(a).total_cmp(&canonical(b))
}

#[cfg(test)]
mod tests {
    use super::stable_total_cmp_f64;
    use core::cmp::Ordering;

    #[test]
    fn zeros_and_nans_collapse() {
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(f64::NAN, -f64::NAN), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(1.0, 2.0), Ordering::Less);
    }

    #[test]
    fn sorts_angles_deterministically() {
        let mut v = vec![12.5, -0.0, 3.0, 0.0];
        v.sort_by(|a, b| stable_total_cmp_f64(*a, *b));
        assert_eq!(v, vec![-0.0, 0.0, 3.0, 12.5]);
    }
}
