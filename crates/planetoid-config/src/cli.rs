//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Planetoid command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "planetoid", about = "Displaced-sphere terrain chunk builder")]
pub struct CliArgs {
    /// Planet radius in world units.
    #[arg(long)]
    pub radius: Option<f64>,

    /// Chunks along each cube face edge.
    #[arg(long)]
    pub chunks_per_face: Option<u32>,

    /// Grid cells along each chunk edge.
    #[arg(long)]
    pub resolution: Option<u32>,

    /// Seed for the height field.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Build phases per update tick.
    #[arg(long)]
    pub phases_per_update: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(radius) = args.radius {
            self.planet.radius = radius;
        }
        if let Some(n) = args.chunks_per_face {
            self.planet.chunks_per_face = n;
        }
        if let Some(resolution) = args.resolution {
            self.planet.chunk_resolution = resolution;
        }
        if let Some(seed) = args.seed {
            self.terrain.height.seed = seed;
        }
        if let Some(phases) = args.phases_per_update {
            self.rebuild.phases_per_update = phases;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
