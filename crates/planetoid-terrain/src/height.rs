//! Height sampling capability and its noise-backed implementation.

use glam::DVec3;

use crate::fractal::NoiseGenerator;

/// A scalar height field over world-space positions.
///
/// Returns an ordered pair of bands: band 0 is the height in world units,
/// band 1 is a blending weight in `[0, 1]`. Consumers that do not blend read
/// band 0 only.
pub trait HeightGenerator: Send + Sync {
    /// Sample the field at a world-space point.
    fn get(&self, point: DVec3) -> [f64; 2];
}

/// Plain closures act as height fields with full weight.
impl<F> HeightGenerator for F
where
    F: Fn(DVec3) -> f64 + Send + Sync,
{
    fn get(&self, point: DVec3) -> [f64; 2] {
        [self(point), 1.0]
    }
}

/// A noise height field whose blend weight falls off with distance from a centre.
///
/// The weight is 1 within `min_radius` of `centre`, 0 beyond `max_radius`, and
/// smoothstepped in between.
#[derive(Clone, Debug)]
pub struct RadialHeightGenerator {
    generator: NoiseGenerator,
    centre: DVec3,
    min_radius: f64,
    max_radius: f64,
}

impl RadialHeightGenerator {
    /// Create a new radial height generator.
    ///
    /// # Panics
    ///
    /// Panics if `max_radius` is not greater than `min_radius`.
    pub fn new(generator: NoiseGenerator, centre: DVec3, min_radius: f64, max_radius: f64) -> Self {
        assert!(
            max_radius > min_radius,
            "max_radius must exceed min_radius, got {min_radius}..{max_radius}"
        );
        Self {
            generator,
            centre,
            min_radius,
            max_radius,
        }
    }

    /// A generator whose weight is 1 everywhere.
    pub fn unbounded(generator: NoiseGenerator) -> Self {
        Self::new(generator, DVec3::ZERO, f64::MAX / 2.0, f64::MAX)
    }

    /// Blend weight at a world-space point.
    pub fn weight(&self, point: DVec3) -> f64 {
        let distance = self.centre.distance(point);
        let t = ((distance - self.min_radius) / (self.max_radius - self.min_radius)).clamp(0.0, 1.0);
        let w = 1.0 - t;
        w * w * (3.0 - 2.0 * w)
    }
}

impl HeightGenerator for RadialHeightGenerator {
    fn get(&self, point: DVec3) -> [f64; 2] {
        [self.generator.get(point), self.weight(point)]
    }
}
