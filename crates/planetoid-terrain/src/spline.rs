//! Piecewise-linear interpolation over sorted control points.

use crate::colour::Rgb;

/// A piecewise-linear colour ramp.
///
/// Control points are kept sorted by key. Sampling below the first key or
/// above the last clamps to the end colours.
#[derive(Clone, Debug, Default)]
pub struct LinearSpline {
    points: Vec<(f64, Rgb)>,
}

impl LinearSpline {
    /// Create an empty spline.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Insert a control point, keeping keys sorted.
    pub fn add_point(&mut self, t: f64, value: Rgb) -> &mut Self {
        let at = self.points.partition_point(|(k, _)| *k <= t);
        self.points.insert(at, (t, value));
        self
    }

    /// Number of control points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the spline has no control points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sample the ramp at `t`. An empty spline yields black; NaN yields the
    /// first colour.
    pub fn get(&self, t: f64) -> Rgb {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return Rgb::BLACK;
        };
        if t.is_nan() || t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        let upper = self.points.partition_point(|(k, _)| *k <= t);
        let (k0, c0) = self.points[upper - 1];
        let (k1, c1) = self.points[upper];
        if k1 == k0 {
            return c1;
        }
        c0.lerp(c1, (t - k0) / (k1 - k0))
    }
}
