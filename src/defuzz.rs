//! Defuzzification — collapse a sampled fuzzy set to one crisp value.
//!
//! The set is a piecewise-linear curve given as parallel `xs` / `ys` slices
//! (`xs` strictly increasing). Area-based methods integrate that curve
//! exactly segment by segment; maximum-based methods look only at the sample
//! points.
//!
//! All functions return `None` when the set is zero everywhere. What to do in
//! that case is the caller's policy, see [`NoRuleFired`](crate::engine::NoRuleFired).

use core::str::FromStr;

use crate::error::ConfigError;

/// Defuzzification method carried by a consequent variable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DefuzzMethod {
    /// Centre of gravity of the area under the curve.
    Centroid,
    /// The x that splits the area under the curve into two equal halves.
    Bisector,
    /// Mean of the sample points at maximal degree.
    MeanOfMaximum,
    /// Smallest sample point at maximal degree.
    SmallestOfMaximum,
    /// Largest sample point at maximal degree; ties resolve to the rightmost x.
    #[default]
    LargestOfMaximum,
}

impl DefuzzMethod {
    /// Short name as used by common fuzzy toolkits (`"lom"`, `"centroid"`, …).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Centroid => "centroid",
            Self::Bisector => "bisector",
            Self::MeanOfMaximum => "mom",
            Self::SmallestOfMaximum => "som",
            Self::LargestOfMaximum => "lom",
        }
    }

    /// Defuzzify the set `(xs, ys)`; `None` if every degree is zero.
    pub fn apply(&self, xs: &[f64], ys: &[f64]) -> Option<f64> {
        match self {
            Self::Centroid => centroid(xs, ys),
            Self::Bisector => bisector(xs, ys),
            Self::MeanOfMaximum => mean_of_maximum(xs, ys),
            Self::SmallestOfMaximum => smallest_of_maximum(xs, ys),
            Self::LargestOfMaximum => largest_of_maximum(xs, ys),
        }
    }
}

impl FromStr for DefuzzMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "centroid" => Ok(Self::Centroid),
            "bisector" => Ok(Self::Bisector),
            "mom" => Ok(Self::MeanOfMaximum),
            "som" => Ok(Self::SmallestOfMaximum),
            "lom" => Ok(Self::LargestOfMaximum),
            other => Err(ConfigError::UnknownDefuzzMethod(other.into())),
        }
    }
}

impl core::fmt::Display for DefuzzMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Largest degree in the set, `None` if the set is empty or all zero.
fn peak(ys: &[f64]) -> Option<f64> {
    let max = ys.iter().copied().fold(0.0_f64, f64::max);
    if max > 0.0 { Some(max) } else { None }
}

/// Sample points whose degree equals the peak exactly.
///
/// Relies on the engine's clipping writing plateau values as exactly the clip
/// level, so every point of a clipped plateau compares equal to the peak.
fn maxima<'a>(xs: &'a [f64], ys: &'a [f64]) -> Option<impl Iterator<Item = f64> + 'a> {
    let max = peak(ys)?;
    Some(xs.iter().zip(ys).filter(move |&(_, &y)| y == max).map(|(&x, _)| x))
}

/// Largest-of-maximum.
pub fn largest_of_maximum(xs: &[f64], ys: &[f64]) -> Option<f64> {
    maxima(xs, ys)?.last()
}

/// Smallest-of-maximum.
pub fn smallest_of_maximum(xs: &[f64], ys: &[f64]) -> Option<f64> {
    maxima(xs, ys)?.next()
}

/// Mean-of-maximum.
pub fn mean_of_maximum(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let (sum, n) = maxima(xs, ys)?.fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    Some(sum / n as f64)
}

/// Centre of gravity of the piecewise-linear curve.
///
/// A set whose only mass is a single isolated sample has zero area; its
/// centroid is that sample's position.
pub fn centroid(xs: &[f64], ys: &[f64]) -> Option<f64> {
    peak(ys)?;
    let mut area = 0.0;
    let mut moment = 0.0;
    for i in 1..xs.len() {
        let (x0, x1) = (xs[i - 1], xs[i]);
        let (y0, y1) = (ys[i - 1], ys[i]);
        let dx = x1 - x0;
        area += dx * (y0 + y1) / 2.0;
        moment += dx * (x0 * (2.0 * y0 + y1) + x1 * (y0 + 2.0 * y1)) / 6.0;
    }
    if area > 0.0 {
        Some(moment / area)
    } else {
        mean_of_maximum(xs, ys)
    }
}

/// Vertical line that halves the area under the piecewise-linear curve.
pub fn bisector(xs: &[f64], ys: &[f64]) -> Option<f64> {
    peak(ys)?;
    let total: f64 = (1..xs.len())
        .map(|i| (xs[i] - xs[i - 1]) * (ys[i - 1] + ys[i]) / 2.0)
        .sum();
    if total <= 0.0 {
        return mean_of_maximum(xs, ys);
    }

    let half = total / 2.0;
    let mut acc = 0.0;
    for i in 1..xs.len() {
        let (x0, x1) = (xs[i - 1], xs[i]);
        let (y0, y1) = (ys[i - 1], ys[i]);
        let dx = x1 - x0;
        let seg = dx * (y0 + y1) / 2.0;
        if acc + seg >= half && seg > 0.0 {
            // Solve y0·t + slope·t²/2 = need for t in [0, dx]. The rationalised
            // root form stays finite when slope → 0.
            let need = half - acc;
            let slope = (y1 - y0) / dx;
            let disc = (y0 * y0 + 2.0 * slope * need).max(0.0);
            let t = 2.0 * need / (y0 + sqrt_nr(disc));
            return Some(x0 + t.clamp(0.0, dx));
        }
        acc += seg;
    }
    xs.last().copied()
}

/// Square root of a non-negative f64 by Newton-Raphson; `no_std` compatible.
fn sqrt_nr(x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    // Halving the exponent bits gives a seed within a few percent.
    let mut s = f64::from_bits((x.to_bits() >> 1) + 0x1ff8_0000_0000_0000);
    for _ in 0..8 {
        s = 0.5 * (s + x / s);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    const XS: [f64; 9] = [-1.0, -0.75, -0.5, -0.25, 0.0, 0.25, 0.5, 0.75, 1.0];

    #[test]
    fn lom_picks_rightmost_of_tied_maxima() {
        // two disjoint plateaus at the same height
        let ys = [0.6, 0.6, 0.2, 0.0, 0.0, 0.3, 0.6, 0.6, 0.1];
        assert_eq!(largest_of_maximum(&XS, &ys), Some(0.75));
        assert_eq!(smallest_of_maximum(&XS, &ys), Some(-1.0));
        let mom = mean_of_maximum(&XS, &ys).unwrap();
        assert!((mom - (-1.0 - 0.75 + 0.5 + 0.75) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn all_zero_set_has_no_value() {
        let ys = [0.0; 9];
        for m in [
            DefuzzMethod::Centroid,
            DefuzzMethod::Bisector,
            DefuzzMethod::MeanOfMaximum,
            DefuzzMethod::SmallestOfMaximum,
            DefuzzMethod::LargestOfMaximum,
        ] {
            assert_eq!(m.apply(&XS, &ys), None, "{}", m);
        }
    }

    #[test]
    fn centroid_of_symmetric_triangle_is_its_peak() {
        let ys = [0.0, 0.0, 0.0, 0.5, 1.0, 0.5, 0.0, 0.0, 0.0];
        assert!(centroid(&XS, &ys).unwrap().abs() < 1e-12);
        assert!(bisector(&XS, &ys).unwrap().abs() < 1e-9);
    }

    #[test]
    fn centroid_of_right_triangle() {
        // μ(x) = x on [0, 1]: centroid at 2/3, bisector at 1/√2
        let ys = [0.0, 0.0, 0.0, 0.0, 0.0, 0.25, 0.5, 0.75, 1.0];
        assert!((centroid(&XS, &ys).unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!((bisector(&XS, &ys).unwrap() - 0.5_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn isolated_spike_falls_back_to_its_position() {
        let xs = [0.0];
        let ys = [0.4];
        assert_eq!(centroid(&xs, &ys), Some(0.0));
        assert_eq!(bisector(&xs, &ys), Some(0.0));
    }

    #[test]
    fn parses_toolkit_names() {
        assert_eq!("lom".parse::<DefuzzMethod>(), Ok(DefuzzMethod::LargestOfMaximum));
        assert_eq!("centroid".parse::<DefuzzMethod>(), Ok(DefuzzMethod::Centroid));
        assert!(matches!(
            "mean".parse::<DefuzzMethod>(),
            Err(ConfigError::UnknownDefuzzMethod(_))
        ));
        assert_eq!(DefuzzMethod::default(), DefuzzMethod::LargestOfMaximum);
    }

    #[test]
    fn sqrt_nr_accuracy() {
        for &(input, expected) in &[(0.0, 0.0), (1.0, 1.0), (0.25, 0.5), (2.0, 1.4142135623730951), (1e-6, 1e-3)] {
            let got = sqrt_nr(input);
            assert!((got - expected).abs() < 1e-12, "sqrt_nr({}) = {}", input, got);
        }
    }
}
