//! Membership function library — trapezoid and triangle shapes.
//!
//! Every shape maps the whole real line into `[0.0, 1.0]`:
//!
//! ```text
//!  1 ┤      b━━━━━━━c             1 ┤        b
//!    │     ╱         ╲              │       ╱ ╲
//!  0 ┼━━━━a           d━━━━       0 ┼━━━━━a   c━━━━━
//!         trapezoid                      triangle
//! ```
//!
//! # Invariants
//!
//! - **Plateau first** — the `[b, c]` plateau (or the triangle peak `b`) is
//!   tested before the outer zero region, so a vertical edge (`a == b` or
//!   `c == d`) evaluates to `1.0` at the edge instead of dividing by zero.
//! - **Total** — NaN evaluates to `0.0`; every other input yields a clamped
//!   degree.
//! - **Pure** — no state, no allocation.

use crate::error::ConfigError;

/// A single membership shape with validated breakpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MembershipFunction {
    /// Four breakpoints `a ≤ b ≤ c ≤ d`; plateau at 1 on `[b, c]`.
    Trapezoid {
        /// Left foot.
        a: f64,
        /// Left shoulder.
        b: f64,
        /// Right shoulder.
        c: f64,
        /// Right foot.
        d: f64,
    },
    /// Three breakpoints `a ≤ b ≤ c`; single peak at `b`.
    Triangle {
        /// Left foot.
        a: f64,
        /// Peak.
        b: f64,
        /// Right foot.
        c: f64,
    },
}

fn check_breakpoints(points: &[f64]) -> Result<(), ConfigError> {
    if let Some(&bad) = points.iter().find(|p| !p.is_finite()) {
        return Err(ConfigError::NonFiniteBreakpoint(bad));
    }
    if points.windows(2).any(|w| w[0] > w[1]) {
        return Err(ConfigError::BreakpointOrder(points.to_vec()));
    }
    Ok(())
}

impl MembershipFunction {
    /// Build a trapezoid, rejecting unordered or non-finite breakpoints.
    pub fn trapezoid(a: f64, b: f64, c: f64, d: f64) -> Result<Self, ConfigError> {
        check_breakpoints(&[a, b, c, d])?;
        Ok(Self::Trapezoid { a, b, c, d })
    }

    /// Build a triangle, rejecting unordered or non-finite breakpoints.
    pub fn triangle(a: f64, b: f64, c: f64) -> Result<Self, ConfigError> {
        check_breakpoints(&[a, b, c])?;
        Ok(Self::Triangle { a, b, c })
    }

    /// Re-check the ordering invariant.
    ///
    /// The enum variants are public, so a value built by struct literal (or
    /// deserialised) can bypass the constructors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Trapezoid { a, b, c, d } => check_breakpoints(&[a, b, c, d]),
            Self::Triangle { a, b, c } => check_breakpoints(&[a, b, c]),
        }
    }

    /// Membership degree of `x`, always in `[0.0, 1.0]`.
    pub fn evaluate(&self, x: f64) -> f64 {
        if x.is_nan() {
            return 0.0;
        }
        let degree = match *self {
            Self::Trapezoid { a, b, c, d } => ramp(x, a, b, c, d),
            Self::Triangle { a, b, c } => ramp(x, a, b, b, c),
        };
        degree.clamp(0.0, 1.0)
    }

    /// Closed interval outside which the degree is zero.
    pub fn support(&self) -> (f64, f64) {
        match *self {
            Self::Trapezoid { a, d, .. } => (a, d),
            Self::Triangle { a, c, .. } => (a, c),
        }
    }

    /// Closed interval on which the degree is one.
    pub fn core(&self) -> (f64, f64) {
        match *self {
            Self::Trapezoid { b, c, .. } => (b, c),
            Self::Triangle { b, .. } => (b, b),
        }
    }

    /// Breakpoints in order (3 for a triangle, 4 for a trapezoid).
    pub fn breakpoints(&self) -> heapless::Vec<f64, 4> {
        let mut out = heapless::Vec::new();
        let points: &[f64] = match self {
            Self::Trapezoid { a, b, c, d } => &[*a, *b, *c, *d],
            Self::Triangle { a, b, c } => &[*a, *b, *c],
        };
        // Capacity is 4 and a shape never has more than 4 breakpoints.
        let _ = out.extend_from_slice(points);
        out
    }
}

/// Shared trapezoid evaluation; a triangle is a trapezoid with `b == c`.
#[inline]
fn ramp(x: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    if b <= x && x <= c {
        1.0
    } else if x <= a || x >= d {
        0.0
    } else if x < b {
        (x - a) / (b - a)
    } else {
        (d - x) / (d - c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> MembershipFunction {
        MembershipFunction::trapezoid(0.0, 0.0, 0.035, 0.060).unwrap()
    }

    fn medium() -> MembershipFunction {
        MembershipFunction::trapezoid(0.045, 0.055, 0.065, 0.080).unwrap()
    }

    #[test]
    fn zero_outside_support() {
        let mf = medium();
        for &x in &[-1.0, 0.0, 0.045, 0.080, 0.1, 5.0] {
            assert_eq!(mf.evaluate(x), 0.0, "x={}", x);
        }
        let tri = MembershipFunction::triangle(-0.03, 0.0, 0.03).unwrap();
        for &x in &[-0.4, -0.03, 0.03, 0.4] {
            assert_eq!(tri.evaluate(x), 0.0, "x={}", x);
        }
    }

    #[test]
    fn one_on_plateau() {
        let mf = medium();
        for i in 0..=10 {
            let x = 0.055 + 0.001 * i as f64;
            assert_eq!(mf.evaluate(x), 1.0, "x={}", x);
        }
    }

    #[test]
    fn linear_ramps() {
        let mf = medium();
        assert!((mf.evaluate(0.050) - 0.5).abs() < 1e-9);
        assert!((mf.evaluate(0.0725) - 0.5).abs() < 1e-9);
        assert!((small().evaluate(0.04) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn vertical_edges_take_plateau_value() {
        // a == b at the universe minimum
        assert_eq!(small().evaluate(0.0), 1.0);
        // triangle with a == b (the LOA no_change shape)
        let no_change = MembershipFunction::triangle(-1.0, -1.0, 0.0).unwrap();
        assert_eq!(no_change.evaluate(-1.0), 1.0);
        assert!((no_change.evaluate(-0.8) - 0.8).abs() < 1e-12);
        // c == d at the universe maximum
        let large = MembershipFunction::trapezoid(0.065, 0.085, 0.1, 0.1).unwrap();
        assert_eq!(large.evaluate(0.1), 1.0);
        assert_eq!(large.evaluate(0.1000001), 0.0);
    }

    #[test]
    fn fully_degenerate_shapes_stay_in_range() {
        let spike = MembershipFunction::triangle(0.5, 0.5, 0.5).unwrap();
        assert_eq!(spike.evaluate(0.5), 1.0);
        assert_eq!(spike.evaluate(0.4999), 0.0);
        let block = MembershipFunction::trapezoid(0.2, 0.2, 0.3, 0.3).unwrap();
        for i in 0..=100 {
            let d = block.evaluate(i as f64 / 100.0);
            assert!(d.is_finite() && (0.0..=1.0).contains(&d));
        }
    }

    #[test]
    fn nan_and_infinities_are_total() {
        let mf = small();
        assert_eq!(mf.evaluate(f64::NAN), 0.0);
        assert_eq!(mf.evaluate(f64::INFINITY), 0.0);
        assert_eq!(mf.evaluate(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn rejects_bad_breakpoints() {
        assert!(matches!(
            MembershipFunction::trapezoid(0.0, 0.2, 0.1, 0.3),
            Err(ConfigError::BreakpointOrder(_))
        ));
        assert!(matches!(
            MembershipFunction::triangle(0.0, f64::NAN, 1.0),
            Err(ConfigError::NonFiniteBreakpoint(v)) if v.is_nan()
        ));
        assert!(MembershipFunction::Triangle { a: 1.0, b: 0.0, c: 2.0 }
            .validate()
            .is_err());
    }

    #[test]
    fn support_and_core() {
        let mf = medium();
        assert_eq!(mf.support(), (0.045, 0.080));
        assert_eq!(mf.core(), (0.055, 0.065));
        assert_eq!(mf.breakpoints().as_slice(), &[0.045, 0.055, 0.065, 0.080]);
    }
}
