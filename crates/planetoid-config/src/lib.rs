//! Runtime settings for the planetoid demo.
//!
//! Settings persist to disk as `config.ron`, tolerate missing and unknown
//! fields, and can be overridden from the command line.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, NoiseBasis, NoiseConfig, PlanetConfig, RebuildConfig, TerrainConfig,
    default_config_dir,
};
pub use error::ConfigError;
