//! Headless demo that builds a displaced-sphere planet chunk by chunk.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p planetoid-demo -- --chunks-per-face 2 --resolution 16`.

mod faces;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use glam::{DVec3, Vec3};
use planetoid_config::{CliArgs, Config};
use planetoid_mesh::{
    ChunkKey, ChunkParams, ChunkRebuilder, Group, MaterialId, RebuildError, TerrainVertex,
    VertexAttribute,
};
use planetoid_terrain::{
    ColourGenerator, HeightGenerator, HypsometricTints, NoiseGenerator, RadialHeightGenerator,
};
use tracing::{debug, error, info};

use crate::faces::{CubeFace, chunk_layout};

const TERRAIN_MATERIAL: MaterialId = MaterialId(1);

/// A focus point circling the planet, standing in for a camera.
struct Orbit {
    angle: f64,
    distance: f64,
    step: f64,
}

impl Orbit {
    fn new(radius: f64) -> Self {
        Self {
            angle: 0.0,
            distance: radius * 1.5,
            step: 0.01,
        }
    }

    fn advance(&mut self) {
        self.angle = (self.angle + self.step) % std::f64::consts::TAU;
    }

    fn position(&self) -> DVec3 {
        DVec3::new(self.angle.sin(), 0.35, self.angle.cos()).normalize() * self.distance
    }
}

/// Totals over every live chunk.
#[derive(Debug, Default)]
struct Summary {
    chunks: usize,
    visible: usize,
    vertices: usize,
    triangles: usize,
    /// Size of every chunk's interleaved vertex buffer, in bytes.
    vertex_bytes: usize,
    min_radius: f64,
    max_radius: f64,
}

struct Planet {
    radius: f64,
    chunks_per_face: u32,
    height: Arc<dyn HeightGenerator>,
    colour: Arc<dyn ColourGenerator>,
    groups: Vec<Group>,
    faces: Vec<Vec<ChunkKey>>,
    rebuilder: ChunkRebuilder,
}

impl Planet {
    fn new(config: &Config) -> Self {
        let radius = config.planet.radius;
        let height = RadialHeightGenerator::unbounded(NoiseGenerator::new(
            config.terrain.height.to_params(),
        ));
        let colour = HypsometricTints::new(
            NoiseGenerator::new(config.terrain.biome.to_params()),
            config.terrain.height_scale,
        );

        Self {
            radius,
            chunks_per_face: config.planet.chunks_per_face,
            height: Arc::new(height),
            colour: Arc::new(colour),
            groups: CubeFace::ALL
                .iter()
                .map(|face| Group::new(face.transform(radius)))
                .collect(),
            faces: vec![Vec::new(); CubeFace::ALL.len()],
            rebuilder: ChunkRebuilder::new(config.rebuild.phases_per_update),
        }
    }

    /// Queue a full tiling of `face` at `resolution`, retiring whatever tiled it before.
    fn tile_face(&mut self, face: usize, resolution: u32) -> Result<(), RebuildError> {
        let (width, offsets) = chunk_layout(self.radius, self.chunks_per_face);
        let mut keys = Vec::with_capacity(offsets.len());
        for offset in offsets {
            let params = ChunkParams {
                resolution,
                radius: self.radius,
                offset,
                width,
                height_generators: vec![Arc::clone(&self.height)],
                colour_generator: Arc::clone(&self.colour),
                material: TERRAIN_MATERIAL,
            };
            keys.push(self.rebuilder.allocate(params, face, &mut self.groups)?);
        }

        for old in std::mem::replace(&mut self.faces[face], keys) {
            self.rebuilder.retire(old);
        }
        debug!(?face, resolution, "face tiling queued");
        Ok(())
    }

    /// Tick the rebuilder until its batch is shown, moving `orbit` each tick.
    fn drive(&mut self, orbit: &mut Orbit) -> Result<u64, RebuildError> {
        let mut ticks = 0;
        while self.rebuilder.is_busy() {
            self.rebuilder.update(&mut self.groups)?;
            orbit.advance();
            ticks += 1;
        }
        Ok(ticks)
    }

    fn summary(&self) -> Summary {
        let mut summary = Summary {
            min_radius: f64::INFINITY,
            max_radius: f64::NEG_INFINITY,
            ..Summary::default()
        };
        for (_, group, chunk) in self.rebuilder.chunks() {
            let geometry = chunk.geometry();
            summary.chunks += 1;
            summary.visible += usize::from(chunk.is_visible());
            summary.vertices += geometry.vertex_count();
            summary.triangles += geometry.triangle_count();
            summary.vertex_bytes += std::mem::size_of_val(geometry.to_vertices().as_slice());

            let transform = self.groups[group].transform;
            for p in geometry.items::<3>(VertexAttribute::Position) {
                let r = transform
                    .transform_point3(Vec3::from_array(*p).as_dvec3())
                    .length();
                summary.min_radius = summary.min_radius.min(r);
                summary.max_radius = summary.max_radius.max(r);
            }
        }
        summary
    }
}

fn run(config: &Config) -> Result<Summary, RebuildError> {
    let mut planet = Planet::new(config);
    let mut orbit = Orbit::new(config.planet.radius);
    let resolution = config.planet.chunk_resolution;

    for face in CubeFace::ALL {
        planet.tile_face(face.index(), resolution)?;
    }
    let ticks = planet.drive(&mut orbit)?;
    info!(ticks, chunks = planet.rebuilder.len(), "initial planet built");

    // Refine the face under the focus point.
    let focus = orbit.position();
    let face = CubeFace::facing(focus);
    planet.tile_face(face.index(), resolution.saturating_mul(2))?;
    let ticks = planet.drive(&mut orbit)?;
    info!(?face, ticks, "face refined");

    Ok(planet.summary())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args
        .config
        .clone()
        .or_else(planetoid_config::default_config_dir)
        .unwrap_or_else(|| PathBuf::from("planetoid"));

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    planetoid_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = config.validate() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(summary) => {
            info!(
                chunks = summary.chunks,
                visible = summary.visible,
                vertices = summary.vertices,
                triangles = summary.triangles,
                vertex_bytes = summary.vertex_bytes,
                min_radius = summary.min_radius,
                max_radius = summary.max_radius,
                "planet summary"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("planet build failed: {e}");
            ExitCode::FAILURE
        }
    }
}
