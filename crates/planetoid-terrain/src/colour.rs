//! Colour sampling capability and terrain colour generators.

use glam::DVec3;

use crate::fractal::NoiseGenerator;
use crate::spline::LinearSpline;

/// A linear RGB colour with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Decode a `0xRRGGBB` hex colour.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]` and NaN
    /// reads as 0.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) as f32 };
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Maps a world-space surface sample to a vertex colour.
pub trait ColourGenerator: Send + Sync {
    /// Colour for the surface at world `(x, y)` with the given terrain height.
    fn get(&self, x: f64, y: f64, height: f64) -> Rgb;
}

/// Returns the same colour everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedColourGenerator {
    pub colour: Rgb,
}

impl FixedColourGenerator {
    pub fn new(colour: Rgb) -> Self {
        Self { colour }
    }
}

impl ColourGenerator for FixedColourGenerator {
    fn get(&self, _x: f64, _y: f64, _height: f64) -> Rgb {
        self.colour
    }
}

const SNOW: u32 = 0xffffff;
const FOREST_BOREAL: u32 = 0x29c100;
const DEEP_OCEAN: u32 = 0x20020f;
const SHALLOW_OCEAN: u32 = 0x8080ff;
const ARID_LOW: u32 = 0xb7a67d;
const ARID_MID: u32 = 0xf1e1bc;
const HUMID_MID: u32 = 0xcee59c;

/// Normalized height below which a sample is coloured as water.
const SEA_LEVEL: f64 = 0.05;

/// Elevation tints: an ocean ramp below sea level, and above it a blend between
/// arid and humid ramps driven by a biome noise field.
#[derive(Clone, Debug)]
pub struct HypsometricTints {
    arid: LinearSpline,
    humid: LinearSpline,
    ocean: LinearSpline,
    biome: NoiseGenerator,
    height_scale: f64,
}

impl HypsometricTints {
    /// Create tints that normalize heights by `height_scale` and blend biomes
    /// by `biome`, which should produce values in `[0, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `height_scale` is not positive.
    pub fn new(biome: NoiseGenerator, height_scale: f64) -> Self {
        assert!(
            height_scale > 0.0,
            "height_scale must be positive, got {height_scale}"
        );

        let mut arid = LinearSpline::new();
        arid.add_point(0.0, Rgb::from_hex(ARID_LOW))
            .add_point(0.5, Rgb::from_hex(ARID_MID))
            .add_point(1.0, Rgb::from_hex(SNOW));

        let mut humid = LinearSpline::new();
        humid
            .add_point(0.0, Rgb::from_hex(FOREST_BOREAL))
            .add_point(0.5, Rgb::from_hex(HUMID_MID))
            .add_point(1.0, Rgb::from_hex(SNOW));

        let mut ocean = LinearSpline::new();
        ocean
            .add_point(0.0, Rgb::from_hex(DEEP_OCEAN))
            .add_point(0.03, Rgb::from_hex(SHALLOW_OCEAN))
            .add_point(SEA_LEVEL, Rgb::from_hex(SHALLOW_OCEAN));

        Self {
            arid,
            humid,
            ocean,
            biome,
            height_scale,
        }
    }
}

impl ColourGenerator for HypsometricTints {
    fn get(&self, x: f64, y: f64, height: f64) -> Rgb {
        let h = height / self.height_scale;
        if h.is_nan() || h < SEA_LEVEL {
            return self.ocean.get(h);
        }
        let moisture = self.biome.get(DVec3::new(x, y, height));
        self.arid.get(h).lerp(self.humid.get(h), moisture)
    }
}
