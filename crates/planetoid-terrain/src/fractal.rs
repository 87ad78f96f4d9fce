//! Multi-octave fractal noise sampled in 3D world space.
//!
//! Each octave contributes `noise * 0.5 + 0.5`, so the normalized sum lies in
//! `[0, 1]` before it is shaped by an exponent and scaled to a height.

use glam::DVec3;
use noise::{NoiseFn, Perlin, Simplex};

/// Which gradient noise backs a [`NoiseGenerator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NoiseKind {
    /// OpenSimplex-style simplex noise.
    #[default]
    Simplex,
    /// Classic Perlin noise.
    Perlin,
}

/// Configuration for a [`NoiseGenerator`].
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseParams {
    /// Backing noise function.
    pub kind: NoiseKind,
    /// Seed for the backing noise function.
    pub seed: u32,
    /// Number of octaves to composite.
    pub octaves: u32,
    /// Octave amplitude falls off as `2^-persistence` per octave.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Exponent applied to the normalized sum. Values above 1 flatten lowlands
    /// and sharpen peaks.
    pub exponentiation: f64,
    /// Height of a fully saturated sample, in world units.
    pub height: f64,
    /// World units per noise cycle of the first octave.
    pub scale: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            kind: NoiseKind::Simplex,
            seed: 1,
            octaves: 10,
            persistence: 0.5,
            lacunarity: 1.6,
            exponentiation: 7.5,
            height: 900.0,
            scale: 1100.0,
        }
    }
}

#[derive(Clone, Debug)]
enum NoiseSource {
    Simplex(Simplex),
    Perlin(Perlin),
}

impl NoiseSource {
    fn sample(&self, point: [f64; 3]) -> f64 {
        match self {
            NoiseSource::Simplex(n) => n.get(point),
            NoiseSource::Perlin(n) => n.get(point),
        }
    }
}

/// Fractal noise field over world-space positions.
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    source: NoiseSource,
    params: NoiseParams,
}

impl NoiseGenerator {
    /// Create a generator with the given parameters.
    ///
    /// # Panics
    ///
    /// Panics if `scale` is not positive and finite.
    pub fn new(params: NoiseParams) -> Self {
        assert!(
            params.scale > 0.0 && params.scale.is_finite(),
            "scale must be positive and finite, got {}",
            params.scale
        );
        let source = match params.kind {
            NoiseKind::Simplex => NoiseSource::Simplex(Simplex::new(params.seed)),
            NoiseKind::Perlin => NoiseSource::Perlin(Perlin::new(params.seed)),
        };
        Self { source, params }
    }

    /// Sample the field at a world-space position.
    ///
    /// Returns a value in `[0, params.height]` (or `[params.height, 0]` for a
    /// negative height).
    pub fn get(&self, point: DVec3) -> f64 {
        let gain = 2.0_f64.powf(-self.params.persistence);
        let scaled = point / self.params.scale;

        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut normalization = 0.0;
        let mut total = 0.0;

        for _ in 0..self.params.octaves {
            let p = scaled * frequency;
            let value = self.source.sample([p.x, p.y, p.z]) * 0.5 + 0.5;
            total += value * amplitude;
            normalization += amplitude;
            amplitude *= gain;
            frequency *= self.params.lacunarity;
        }

        if normalization == 0.0 {
            return 0.0;
        }

        // Gradient noise can overshoot [-1, 1] slightly; a negative base would
        // turn the power into NaN.
        let normalized = (total / normalization).clamp(0.0, 1.0);
        normalized.powf(self.params.exponentiation) * self.params.height
    }

    /// Return a reference to the current parameters.
    pub fn params(&self) -> &NoiseParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn unit_params() -> NoiseParams {
        NoiseParams {
            seed: 42,
            octaves: 6,
            exponentiation: 1.0,
            height: 1.0,
            scale: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_determinism_same_seed_same_point() {
        let a = NoiseGenerator::new(unit_params());
        let b = NoiseGenerator::new(unit_params());
        let p = DVec3::new(123.0, -45.0, 6.5);
        let (h1, h2) = (a.get(p), b.get(p));
        assert!(
            (h1 - h2).abs() < EPSILON,
            "Same seed + same point must produce identical values: {h1} vs {h2}"
        );
    }

    #[test]
    fn test_different_seeds_produce_different_values() {
        let a = NoiseGenerator::new(NoiseParams {
            seed: 1,
            ..unit_params()
        });
        let b = NoiseGenerator::new(NoiseParams {
            seed: 999,
            ..unit_params()
        });
        let differs = (0..32).any(|i| {
            let p = DVec3::new(i as f64 * 37.0, 11.0, i as f64 * -13.0);
            (a.get(p) - b.get(p)).abs() > EPSILON
        });
        assert!(differs, "Different seeds should produce different fields");
    }

    #[test]
    fn test_values_within_height_range() {
        for kind in [NoiseKind::Simplex, NoiseKind::Perlin] {
            let generator = NoiseGenerator::new(NoiseParams {
                kind,
                height: 250.0,
                exponentiation: 2.0,
                ..unit_params()
            });
            for i in 0..40 {
                for j in 0..40 {
                    let p = DVec3::new(i as f64 * 17.0, j as f64 * 23.0, (i + j) as f64);
                    let h = generator.get(p);
                    assert!(
                        (0.0..=250.0).contains(&h),
                        "{kind:?} value {h} out of [0, 250] at {p:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_zero_height_returns_zero() {
        let generator = NoiseGenerator::new(NoiseParams {
            height: 0.0,
            ..unit_params()
        });
        assert_eq!(generator.get(DVec3::new(1.0, 2.0, 3.0)), 0.0);
    }

    #[test]
    fn test_zero_octaves_returns_zero() {
        let generator = NoiseGenerator::new(NoiseParams {
            octaves: 0,
            ..unit_params()
        });
        assert_eq!(generator.get(DVec3::new(1.0, 2.0, 3.0)), 0.0);
    }

    #[test]
    fn test_smooth_field_no_discontinuities() {
        let generator = NoiseGenerator::new(unit_params());
        let step = 0.01;
        for i in 0..5_000 {
            let x = i as f64 * step;
            let a = generator.get(DVec3::new(x, 0.0, 0.0));
            let b = generator.get(DVec3::new(x + step, 0.0, 0.0));
            assert!(
                (b - a).abs() < 0.05,
                "Discontinuity at x={x}: {a} -> {b}"
            );
        }
    }

    #[test]
    #[should_panic(expected = "scale must be positive")]
    fn test_zero_scale_panics() {
        NoiseGenerator::new(NoiseParams {
            scale: 0.0,
            ..unit_params()
        });
    }
}
