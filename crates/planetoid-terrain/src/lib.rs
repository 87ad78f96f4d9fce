//! Procedural sampling fields for planet terrain: fractal noise heights, falloff
//! blending weights, and hypsometric colour ramps.

mod colour;
mod fractal;
mod height;
mod spline;

pub use colour::{ColourGenerator, FixedColourGenerator, HypsometricTints, Rgb};
pub use fractal::{NoiseGenerator, NoiseKind, NoiseParams};
pub use height::{HeightGenerator, RadialHeightGenerator};
pub use spline::LinearSpline;
