//! Discretised universe of discourse.
//!
//! A [`Universe`] is the sample axis a linguistic variable is defined on:
//! `min, min + step, min + 2·step, …` up to `max`. Samples are computed as
//! `min + i·step` rather than by repeated addition so that rounding error
//! does not accumulate along the axis.

use alloc::vec::Vec;

use crate::error::ConfigError;

/// Relative tolerance used when deciding whether `max` is reached.
const SNAP_TOLERANCE: f64 = 1e-9;

/// Maximum number of samples a universe may hold.
pub const MAX_SAMPLES: usize = 4096;

/// Evenly spaced, strictly increasing samples over `[min, max]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Universe {
    min: f64,
    max: f64,
    step: f64,
    samples: Vec<f64>,
}

impl Universe {
    /// Build a universe over `[min, max]` with the given `step`.
    ///
    /// The sample count is `⌊(max − min)/step⌋ + 1`, with a small tolerance so
    /// that decimal steps such as `0.005` over `[0, 0.1]` give exactly 21
    /// samples. A final sample within tolerance of `max` is snapped to `max`.
    /// More than [`MAX_SAMPLES`] samples is [`ConfigError::TooManySamples`].
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self, ConfigError> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ConfigError::InvalidUniverseRange { min, max });
        }
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::InvalidUniverseStep(step));
        }

        let span = max - min;
        let intervals = span / step * (1.0 + SNAP_TOLERANCE);
        if !intervals.is_finite() || intervals >= MAX_SAMPLES as f64 {
            return Err(ConfigError::TooManySamples { limit: MAX_SAMPLES });
        }
        // Truncation towards zero is floor for the non-negative quotient.
        let n = intervals as usize;
        let mut samples = Vec::with_capacity(n + 1);
        for i in 0..=n {
            samples.push(min + i as f64 * step);
        }
        if let Some(last) = samples.last_mut() {
            if max - *last <= span * SNAP_TOLERANCE || *last > max {
                *last = max;
            }
        }

        Ok(Self { min, max, step, samples })
    }

    /// Lower bound.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound (the last sample may be smaller when `step` does not divide the span).
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Sample spacing.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// The sample points, strictly increasing.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Never true for a universe built through [`Universe::new`].
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Clamp `x` into `[min, max]`.
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }

    /// Linear interpolation of `values` (one per sample) at `x`.
    ///
    /// `x` outside the axis takes the nearest end value.
    pub fn interpolate(&self, values: &[f64], x: f64) -> f64 {
        interpolate(&self.samples, values, x)
    }
}

/// Piecewise-linear interpolation over a strictly increasing axis.
pub(crate) fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    let (first, last) = match (xs.first(), xs.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => return 0.0,
    };
    if x <= first {
        return ys[0];
    }
    if x >= last {
        return ys[ys.len() - 1];
    }
    // First index whose sample is >= x; x is strictly inside the axis here.
    let hi = xs.partition_point(|&s| s < x);
    let lo = hi - 1;
    let (x0, x1) = (xs[lo], xs[hi]);
    let (y0, y1) = (ys[lo], ys[hi]);
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_universes_have_expected_sizes() {
        let error = Universe::new(0.0, 0.1, 0.005).unwrap();
        assert_eq!(error.len(), 21);
        assert_eq!(error.samples()[0], 0.0);
        assert_eq!(*error.samples().last().unwrap(), 0.1);

        let speed = Universe::new(-0.4, 0.4, 0.05).unwrap();
        assert_eq!(speed.len(), 17);
        assert_eq!(*speed.samples().last().unwrap(), 0.4);

        let loa = Universe::new(-1.0, 1.0, 0.25).unwrap();
        assert_eq!(loa.len(), 9);
        assert_eq!(loa.samples()[4], 0.0);
    }

    #[test]
    fn samples_strictly_increase() {
        let u = Universe::new(-0.4, 0.4, 0.05).unwrap();
        assert!(u.samples().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn step_not_dividing_span_stops_below_max() {
        let u = Universe::new(0.0, 1.0, 0.3).unwrap();
        assert_eq!(u.len(), 4);
        assert!(*u.samples().last().unwrap() < 1.0);
    }

    #[test]
    fn rejects_malformed_ranges() {
        assert_eq!(
            Universe::new(1.0, 1.0, 0.1),
            Err(ConfigError::InvalidUniverseRange { min: 1.0, max: 1.0 })
        );
        assert_eq!(
            Universe::new(2.0, 1.0, 0.1),
            Err(ConfigError::InvalidUniverseRange { min: 2.0, max: 1.0 })
        );
        assert_eq!(
            Universe::new(0.0, 1.0, 0.0),
            Err(ConfigError::InvalidUniverseStep(0.0))
        );
        assert_eq!(
            Universe::new(0.0, 1.0, -0.1),
            Err(ConfigError::InvalidUniverseStep(-0.1))
        );
        assert!(Universe::new(0.0, f64::INFINITY, 0.1).is_err());
    }

    #[test]
    fn tiny_step_is_rejected_not_allocated() {
        assert_eq!(
            Universe::new(0.0, 1.0, 1e-300),
            Err(ConfigError::TooManySamples { limit: MAX_SAMPLES })
        );
        assert_eq!(
            Universe::new(-f64::MAX, f64::MAX, 1.0),
            Err(ConfigError::TooManySamples { limit: MAX_SAMPLES })
        );
        // one step short of the limit still builds
        let u = Universe::new(0.0, (MAX_SAMPLES - 2) as f64, 1.0).unwrap();
        assert_eq!(u.len(), MAX_SAMPLES - 1);
    }

    #[test]
    fn clamp_and_interpolate() {
        let u = Universe::new(0.0, 1.0, 0.5).unwrap();
        assert_eq!(u.clamp(-3.0), 0.0);
        assert_eq!(u.clamp(3.0), 1.0);
        let ys = [0.0, 1.0, 0.0];
        assert!((u.interpolate(&ys, 0.25) - 0.5).abs() < 1e-12);
        assert_eq!(u.interpolate(&ys, 0.5), 1.0);
        assert_eq!(u.interpolate(&ys, -1.0), 0.0);
    }
}
