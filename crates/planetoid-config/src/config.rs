//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use planetoid_terrain::{NoiseKind, NoiseParams};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Planet shape and chunk layout.
    pub planet: PlanetConfig,
    /// Height and colour fields.
    pub terrain: TerrainConfig,
    /// Rebuild scheduling.
    pub rebuild: RebuildConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Planet configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanetConfig {
    /// Sphere radius in world units.
    pub radius: f64,
    /// Chunks along each edge of a cube face.
    pub chunks_per_face: u32,
    /// Grid cells along each edge of a chunk.
    pub chunk_resolution: u32,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            radius: 4000.0,
            chunks_per_face: 4,
            chunk_resolution: 32,
        }
    }
}

/// Gradient noise backing a fractal field.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum NoiseBasis {
    #[default]
    Simplex,
    Perlin,
}

/// Serializable fractal noise parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseConfig {
    pub basis: NoiseBasis,
    pub seed: u32,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    pub exponentiation: f64,
    pub height: f64,
    pub scale: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self::from(&NoiseParams::default())
    }
}

impl From<&NoiseParams> for NoiseConfig {
    fn from(params: &NoiseParams) -> Self {
        Self {
            basis: match params.kind {
                NoiseKind::Simplex => NoiseBasis::Simplex,
                NoiseKind::Perlin => NoiseBasis::Perlin,
            },
            seed: params.seed,
            octaves: params.octaves,
            persistence: params.persistence,
            lacunarity: params.lacunarity,
            exponentiation: params.exponentiation,
            height: params.height,
            scale: params.scale,
        }
    }
}

impl NoiseConfig {
    /// Parameters for constructing a `NoiseGenerator`.
    pub fn to_params(&self) -> NoiseParams {
        NoiseParams {
            kind: match self.basis {
                NoiseBasis::Simplex => NoiseKind::Simplex,
                NoiseBasis::Perlin => NoiseKind::Perlin,
            },
            seed: self.seed,
            octaves: self.octaves,
            persistence: self.persistence,
            lacunarity: self.lacunarity,
            exponentiation: self.exponentiation,
            height: self.height,
            scale: self.scale,
        }
    }
}

/// Terrain field configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Displacement field.
    pub height: NoiseConfig,
    /// Low-frequency field blending arid and humid tints.
    pub biome: NoiseConfig,
    /// Height that maps to the top of the tint ramps.
    pub height_scale: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        let height = NoiseConfig::default();
        Self {
            height_scale: height.height,
            biome: NoiseConfig {
                seed: 2,
                octaves: 2,
                persistence: 1.0,
                lacunarity: 2.0,
                exponentiation: 1.0,
                height: 1.0,
                scale: 2048.0,
                ..NoiseConfig::default()
            },
            height,
        }
    }
}

/// Rebuild scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RebuildConfig {
    /// Build phases run per update tick.
    pub phases_per_update: u32,
}

impl Default for RebuildConfig {
    fn default() -> Self {
        Self {
            phases_per_update: 1,
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for planetoid, if the platform has one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("planetoid"))
}

// --- Validation ---

impl Config {
    /// Reject values that would make every chunk invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: String| {
            Err(ConfigError::InvalidValue { field, reason })
        };

        if !(self.planet.radius.is_finite() && self.planet.radius > 0.0) {
            return invalid("planet.radius", format!("{} is not positive", self.planet.radius));
        }
        if self.planet.chunks_per_face == 0 {
            return invalid("planet.chunks_per_face", "must be at least 1".into());
        }
        if self.planet.chunk_resolution == 0 {
            return invalid("planet.chunk_resolution", "must be at least 1".into());
        }
        for (field, noise) in [
            ("terrain.height.scale", &self.terrain.height),
            ("terrain.biome.scale", &self.terrain.biome),
        ] {
            if !(noise.scale.is_finite() && noise.scale > 0.0) {
                return invalid(field, format!("{} is not positive", noise.scale));
            }
        }
        if !(self.terrain.height_scale.is_finite() && self.terrain.height_scale > 0.0) {
            return invalid(
                "terrain.height_scale",
                format!("{} is not positive", self.terrain.height_scale),
            );
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }
}
