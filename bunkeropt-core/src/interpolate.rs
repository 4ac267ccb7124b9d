//! Propulsion rating (MCR) of shuttles between and beyond catalogue sizes.
//!
//! The catalogue only lists the MCR of a few hull sizes. Other sizes are
//! filled deterministically:
//!
//! - inside the known range: piecewise linear
//! - above the largest size: logarithmic in size, continuing the slope of
//!   the last two points, `m2 + (m2 - m1) / (ln s2 - ln s1) · (ln S - ln s2)`
//! - below the smallest size: linear, continuing the first two points

use crate::errors::{BunkerError, BunkerResult};

/// Sorted MCR curve built from sparse `(size_m3, mcr_kw)` points.
#[derive(Debug, Clone, PartialEq)]
pub struct McrCurve {
    points: Vec<(f64, f64)>,
}

impl McrCurve {
    /// Build a curve from unsorted points. Duplicate sizes keep the last rating.
    pub fn new(points: &[(f64, f64)]) -> BunkerResult<Self> {
        let mut sorted: Vec<(f64, f64)> = Vec::with_capacity(points.len());
        let mut input = points.to_vec();
        input.sort_by(|a, b| a.0.total_cmp(&b.0));
        for point in input {
            match sorted.last_mut() {
                Some(last) if last.0 == point.0 => *last = point,
                _ => sorted.push(point),
            }
        }
        if sorted.len() < 2 {
            return Err(BunkerError::InsufficientMcrPoints(sorted.len()));
        }
        Ok(Self { points: sorted })
    }

    /// MCR (kW) for a shuttle of `size` m³.
    ///
    /// The result can be zero or negative far below the catalogue; callers
    /// treat such sizes as infeasible.
    pub fn mcr(&self, size: f64) -> f64 {
        let n = self.points.len();
        let (s_min, m_min) = self.points[0];
        let (s_max, m_max) = self.points[n - 1];

        if size > s_max {
            let (s1, m1) = self.points[n - 2];
            let slope = (m_max - m1) / (s_max.ln() - s1.ln());
            return m_max + slope * (size.ln() - s_max.ln());
        }
        if size < s_min {
            let (s2, m2) = self.points[1];
            let slope = (m2 - m_min) / (s2 - s_min);
            return m_min + slope * (size - s_min);
        }

        // Exact hits and interior points
        let upper = self
            .points
            .iter()
            .position(|(s, _)| *s >= size)
            .unwrap_or(n - 1);
        let (s_hi, m_hi) = self.points[upper];
        if upper == 0 || s_hi == size {
            return m_hi;
        }
        let (s_lo, m_lo) = self.points[upper - 1];
        m_lo + (m_hi - m_lo) * (size - s_lo) / (s_hi - s_lo)
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn curve() -> McrCurve {
        McrCurve::new(&[(1000.0, 1341.0), (500.0, 1296.0), (4000.0, 1606.0), (3500.0, 1562.0)]).unwrap()
    }

    #[test]
    fn known_points_are_returned_exactly() {
        let c = curve();
        assert_eq!(c.mcr(500.0), 1296.0);
        assert_eq!(c.mcr(1000.0), 1341.0);
        assert_eq!(c.mcr(4000.0), 1606.0);
    }

    #[test]
    fn interior_is_linear() {
        let c = curve();
        assert!(is_close!(c.mcr(750.0), 1318.5));
        assert!(is_close!(c.mcr(3750.0), 1584.0));
    }

    #[test]
    fn above_range_is_logarithmic() {
        let c = curve();
        let slope = (1606.0 - 1562.0) / (4000.0_f64.ln() - 3500.0_f64.ln());
        let expected = 1606.0 + slope * (40_000.0_f64.ln() - 4000.0_f64.ln());
        assert!(is_close!(c.mcr(40_000.0), expected));
        // grows, but slower than a linear continuation would
        let linear = 1606.0 + (1606.0 - 1562.0) / 500.0 * 36_000.0;
        assert!(c.mcr(40_000.0) > 1606.0 && c.mcr(40_000.0) < linear);
    }

    #[test]
    fn below_range_is_linear_and_may_go_non_positive() {
        let c = curve();
        assert!(is_close!(c.mcr(250.0), 1296.0 - 45.0 * 0.5));
        assert!(c.mcr(-20_000.0) < 0.0);
    }

    #[test]
    fn needs_two_distinct_points() {
        assert!(matches!(
            McrCurve::new(&[(500.0, 1.0), (500.0, 2.0)]),
            Err(BunkerError::InsufficientMcrPoints(1))
        ));
    }
}
