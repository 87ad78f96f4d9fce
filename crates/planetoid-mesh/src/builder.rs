//! Incremental synthesis of a displaced-sphere terrain patch.
//!
//! A planar `(resolution + 1)^2` grid is pushed through the cube-to-sphere
//! projection, displaced along the outward direction by a sampled height field,
//! triangulated, and given area-weighted smooth normals. The work is split into
//! four phases so a driver can spread one chunk over several scheduling turns:
//!
//! 1. [`BuildPhase::VerticesPending`]: positions, colours, uvs (samples the fields)
//! 2. [`BuildPhase::IndicesPending`]: two triangles per grid cell
//! 3. [`BuildPhase::NormalsAccumPending`]: face normals summed per vertex
//! 4. [`BuildPhase::NormalsNormalizePending`]: accumulated normals made unit length
//!
//! Each [`ChunkGeometryBuilder::step`] runs exactly one phase. Output is handed
//! to a [`GeometrySink`] once the builder reaches [`BuildPhase::Done`].

use glam::{DMat4, DVec3};
use planetoid_terrain::Rgb;

use crate::error::{BuildError, ChunkParamsError};
use crate::geometry::{GeometrySink, VertexAttribute};
use crate::params::ChunkParams;

/// Placeholder tangent written for every vertex.
const TANGENT: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// World units per texture repeat.
const UV_SCALE: f64 = 10.0;

/// The next phase a [`ChunkGeometryBuilder`] will run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuildPhase {
    VerticesPending,
    IndicesPending,
    NormalsAccumPending,
    NormalsNormalizePending,
    Done,
}

impl BuildPhase {
    /// Phases still to run, including this one.
    pub fn remaining(self) -> usize {
        match self {
            BuildPhase::VerticesPending => 4,
            BuildPhase::IndicesPending => 3,
            BuildPhase::NormalsAccumPending => 2,
            BuildPhase::NormalsNormalizePending => 1,
            BuildPhase::Done => 0,
        }
    }

    fn next(self) -> Self {
        match self {
            BuildPhase::VerticesPending => BuildPhase::IndicesPending,
            BuildPhase::IndicesPending => BuildPhase::NormalsAccumPending,
            BuildPhase::NormalsAccumPending => BuildPhase::NormalsNormalizePending,
            BuildPhase::NormalsNormalizePending | BuildPhase::Done => BuildPhase::Done,
        }
    }
}

/// Resumable geometry builder for one chunk.
///
/// Intermediate values are kept in `f64` and narrowed to `f32` only when the
/// buffers are written out.
pub struct ChunkGeometryBuilder {
    params: ChunkParams,
    phase: BuildPhase,
    positions: Vec<DVec3>,
    /// Outward unit direction of each vertex before displacement.
    directions: Vec<DVec3>,
    colours: Vec<Rgb>,
    uvs: Vec<[f64; 2]>,
    normals: Vec<DVec3>,
    indices: Vec<u32>,
}

impl ChunkGeometryBuilder {
    /// Create a builder positioned before the first phase.
    pub fn new(params: ChunkParams) -> Result<Self, ChunkParamsError> {
        params.validate()?;
        Ok(Self::from_validated(params))
    }

    pub(crate) fn from_validated(params: ChunkParams) -> Self {
        Self {
            params,
            phase: BuildPhase::VerticesPending,
            positions: Vec::new(),
            directions: Vec::new(),
            colours: Vec::new(),
            uvs: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == BuildPhase::Done
    }

    pub fn params(&self) -> &ChunkParams {
        &self.params
    }

    /// Run the pending phase and return the phase that follows it.
    ///
    /// `local_to_world` is the owning group's transform; it is only read by the
    /// vertex phase. Stepping a finished builder does nothing.
    pub fn step(&mut self, local_to_world: &DMat4) -> BuildPhase {
        match self.phase {
            BuildPhase::VerticesPending => self.build_vertices(local_to_world),
            BuildPhase::IndicesPending => self.build_indices(),
            BuildPhase::NormalsAccumPending => self.accumulate_normals(),
            BuildPhase::NormalsNormalizePending => self.normalize_normals(),
            BuildPhase::Done => return BuildPhase::Done,
        }
        self.phase = self.phase.next();
        self.phase
    }

    /// Run every remaining phase back-to-back.
    pub fn run_to_completion(&mut self, local_to_world: &DMat4) {
        while self.step(local_to_world) != BuildPhase::Done {}
    }

    fn build_vertices(&mut self, local_to_world: &DMat4) {
        let ChunkParams {
            resolution,
            radius,
            offset,
            width,
            ..
        } = self.params;
        let height_generator = &self.params.height_generators[0];
        let colour_generator = &self.params.colour_generator;
        let half = width / 2.0;
        let count = self.params.vertex_count();

        self.positions = Vec::with_capacity(count);
        self.directions = Vec::with_capacity(count);
        self.colours = Vec::with_capacity(count);
        self.uvs = Vec::with_capacity(count);

        for x in 0..=resolution {
            let xp = width * f64::from(x) / f64::from(resolution);
            for y in 0..=resolution {
                let yp = width * f64::from(y) / f64::from(resolution);

                // Cube face point to sphere, then re-centred on the group origin.
                let direction = (DVec3::new(xp - half, yp - half, radius) + offset).normalize();
                let mut p = direction * radius;
                p.z -= radius;

                // Fields are sampled in world space so chunks with different
                // group transforms line up.
                let world = local_to_world.transform_point3(p);
                let height = height_generator.get(world)[0];
                let colour = colour_generator.get(world.x, world.y, height);

                p += direction * height;

                self.positions.push(p);
                self.directions.push(direction);
                self.colours.push(colour);
                self.uvs.push([p.x / UV_SCALE, p.y / UV_SCALE]);
            }
        }
    }

    fn build_indices(&mut self) {
        let stride = self.params.resolution + 1;
        let mut indices = Vec::with_capacity(self.params.index_count());

        for i in 0..self.params.resolution {
            for j in 0..self.params.resolution {
                let a = i * stride + j;
                let b = (i + 1) * stride + j;
                indices.extend_from_slice(&[a, b + 1, a + 1]);
                indices.extend_from_slice(&[b, b + 1, a]);
            }
        }

        self.indices = indices;
    }

    fn accumulate_normals(&mut self) {
        let mut normals = vec![DVec3::ZERO; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let (i1, i2, i3) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let (p1, p2, p3) = (self.positions[i1], self.positions[i2], self.positions[i3]);
            let face = (p3 - p2).cross(p1 - p2);
            normals[i1] += face;
            normals[i2] += face;
            normals[i3] += face;
        }

        self.normals = normals;
    }

    fn normalize_normals(&mut self) {
        for (normal, direction) in self.normals.iter_mut().zip(&self.directions) {
            *normal = normal.try_normalize().unwrap_or(*direction);
        }
    }

    /// Write the finished buffers into `sink`.
    pub fn write_to<S: GeometrySink + ?Sized>(&self, sink: &mut S) -> Result<(), BuildError> {
        if !self.is_done() {
            return Err(BuildError::Incomplete(self.phase));
        }

        let narrow = |v: &DVec3| [v.x as f32, v.y as f32, v.z as f32];
        let flat3 = |vs: &[DVec3]| -> Vec<f32> { vs.iter().flat_map(narrow).collect() };

        sink.set_attribute(VertexAttribute::Position, flat3(&self.positions));
        sink.set_attribute(
            VertexAttribute::Color,
            self.colours.iter().flat_map(|c| c.to_array()).collect(),
        );
        sink.set_attribute(VertexAttribute::Normal, flat3(&self.normals));
        sink.set_attribute(
            VertexAttribute::Tangent,
            TANGENT.repeat(self.positions.len()),
        );
        sink.set_attribute(
            VertexAttribute::Uv,
            self.uvs
                .iter()
                .flat_map(|[u, v]| [*u as f32, *v as f32])
                .collect(),
        );
        sink.set_index(self.indices.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BufferGeometry;
    use crate::params::tests::flat_params;
    use planetoid_terrain::{
        ColourGenerator, HeightGenerator, HypsometricTints, NoiseGenerator, NoiseParams,
        RadialHeightGenerator,
    };
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn build(params: ChunkParams, local_to_world: &DMat4) -> BufferGeometry {
        let mut builder = ChunkGeometryBuilder::new(params).unwrap();
        builder.run_to_completion(local_to_world);
        let mut geometry = BufferGeometry::new();
        builder.write_to(&mut geometry).unwrap();
        geometry
    }

    fn noisy_params(resolution: u32) -> ChunkParams {
        let noise = NoiseGenerator::new(NoiseParams {
            seed: 11,
            octaves: 5,
            exponentiation: 2.0,
            height: 20.0,
            scale: 50.0,
            ..Default::default()
        });
        ChunkParams {
            radius: 500.0,
            width: 120.0,
            offset: DVec3::new(-60.0, 30.0, 0.0),
            height_generators: vec![Arc::new(RadialHeightGenerator::unbounded(noise))],
            ..flat_params(resolution)
        }
    }

    /// Lifts a single grid vertex, identified by its undisplaced world position.
    fn spike_at(target: DVec3, amount: f64) -> Arc<dyn HeightGenerator> {
        Arc::new(move |p: DVec3| {
            if p.distance(target) < 1e-6 { amount } else { 0.0 }
        })
    }

    fn pos(geometry: &BufferGeometry, i: usize) -> DVec3 {
        let [x, y, z] = geometry.items::<3>(VertexAttribute::Position)[i];
        DVec3::new(x as f64, y as f64, z as f64)
    }

    #[test]
    fn test_phases_advance_in_order() {
        let mut builder = ChunkGeometryBuilder::new(flat_params(2)).unwrap();
        assert_eq!(builder.phase(), BuildPhase::VerticesPending);
        assert_eq!(builder.phase().remaining(), 4);
        let m = DMat4::IDENTITY;
        assert_eq!(builder.step(&m), BuildPhase::IndicesPending);
        assert_eq!(builder.step(&m), BuildPhase::NormalsAccumPending);
        assert_eq!(builder.step(&m), BuildPhase::NormalsNormalizePending);
        assert_eq!(builder.step(&m), BuildPhase::Done);
        assert!(builder.is_done());
        assert_eq!(builder.step(&m), BuildPhase::Done);
    }

    #[test]
    fn test_write_before_done_is_error() {
        let mut builder = ChunkGeometryBuilder::new(flat_params(1)).unwrap();
        builder.step(&DMat4::IDENTITY);
        let mut geometry = BufferGeometry::new();
        assert_eq!(
            builder.write_to(&mut geometry),
            Err(BuildError::Incomplete(BuildPhase::IndicesPending))
        );
        assert!(geometry.is_empty());
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(matches!(
            ChunkGeometryBuilder::new(flat_params(0)),
            Err(ChunkParamsError::ZeroResolution)
        ));
    }

    #[test]
    fn test_vertex_and_index_counts() {
        for r in [1u32, 2, 3, 7, 16] {
            let geometry = build(flat_params(r), &DMat4::IDENTITY);
            let n = (r as usize + 1).pow(2);
            assert_eq!(geometry.vertex_count(), n, "vertex count for R={r}");
            assert_eq!(geometry.indices().len(), 6 * (r as usize).pow(2), "index count for R={r}");
            for attribute in VertexAttribute::ALL {
                assert_eq!(
                    geometry.attribute(attribute).len(),
                    n * attribute.item_size(),
                    "{} length for R={r}",
                    attribute.name()
                );
            }
            assert!(geometry.indices().iter().all(|&i| (i as usize) < n));
        }
    }

    #[test]
    fn test_normals_are_unit_length() {
        let geometry = build(noisy_params(12), &DMat4::IDENTITY);
        for n in geometry.items::<3>(VertexAttribute::Normal) {
            let len = DVec3::new(n[0] as f64, n[1] as f64, n[2] as f64).length();
            assert!((len - 1.0).abs() < 1e-5, "Normal length {len} is not 1");
        }
    }

    #[test]
    fn test_triangles_face_outward() {
        let params = noisy_params(10);
        let radius = params.radius;
        let geometry = build(params, &DMat4::IDENTITY);
        // Local space places the sphere centre at (0, 0, -radius).
        let centre = DVec3::new(0.0, 0.0, -radius);

        for tri in geometry.indices().chunks_exact(3) {
            let [p1, p2, p3] = [0, 1, 2].map(|k| pos(&geometry, tri[k] as usize));
            let face = (p3 - p2).cross(p1 - p2);
            let outward = ((p1 + p2 + p3) / 3.0 - centre).normalize();
            assert!(
                face.dot(outward) >= 0.0,
                "Triangle {tri:?} faces inward: dot={}",
                face.dot(outward)
            );
        }
    }

    #[test]
    fn test_flat_single_cell_lies_on_sphere() {
        let params = flat_params(1);
        let geometry = build(params, &DMat4::IDENTITY);
        assert_eq!(geometry.vertex_count(), 4);
        assert_eq!(geometry.triangle_count(), 2);

        let centre = DVec3::new(0.0, 0.0, -100.0);
        for i in 0..4 {
            let d = pos(&geometry, i).distance(centre);
            assert!((d - 100.0).abs() < 1e-3, "Vertex {i} at distance {d}, expected 100");
        }
    }

    #[test]
    fn test_grid_order_and_winding() {
        let geometry = build(flat_params(1), &DMat4::IDENTITY);
        // x is the outer loop: vertex 1 is (x=0, y=1), vertex 2 is (x=1, y=0).
        assert!(pos(&geometry, 1).y > pos(&geometry, 0).y);
        assert!(pos(&geometry, 2).x > pos(&geometry, 0).x);
        assert_eq!(geometry.indices(), &[0, 3, 1, 2, 3, 0]);
    }

    #[test]
    fn test_single_raised_vertex_moves_only_itself() {
        let base = build(flat_params(1), &DMat4::IDENTITY);

        // Vertex 1 is grid (0, 1); with an identity transform its world sample
        // point equals its undisplaced local position.
        let lifted = 1;
        let direction = DVec3::new(-1.0, 1.0, 100.0).normalize();
        let target = direction * 100.0 - DVec3::new(0.0, 0.0, 100.0);
        assert!(target.distance(pos(&base, lifted)) < 1e-4);

        let mut params = flat_params(1);
        params.height_generators = vec![spike_at(target, 10.0)];
        let raised = build(params, &DMat4::IDENTITY);

        let moved = pos(&raised, lifted) - pos(&base, lifted);
        assert!(
            (moved - direction * 10.0).length() < 1e-4,
            "Lifted vertex should move 10 units outward, moved {moved:?}"
        );

        let base_normals = base.items::<3>(VertexAttribute::Normal);
        let raised_normals = raised.items::<3>(VertexAttribute::Normal);
        for i in 0..4 {
            if i == lifted {
                continue;
            }
            assert_eq!(pos(&base, i), pos(&raised, i), "Vertex {i} should not move");
        }
        // Vertex 2 shares no triangle with vertex 1 (triangles 0-3-1 and 2-3-0).
        assert_eq!(base_normals[2], raised_normals[2]);
        assert_ne!(base_normals[lifted], raised_normals[lifted]);
        assert_ne!(base_normals[0], raised_normals[0]);
    }

    #[test]
    fn test_output_is_deterministic() {
        let a = build(noisy_params(9), &DMat4::IDENTITY);
        let b = build(noisy_params(9), &DMat4::IDENTITY);
        for attribute in VertexAttribute::ALL {
            assert_eq!(a.attribute_bytes(attribute), b.attribute_bytes(attribute));
        }
        assert_eq!(a.index_bytes(), b.index_bytes());
    }

    #[test]
    fn test_interleaved_steps_match_back_to_back() {
        let transform = DMat4::from_translation(DVec3::new(0.0, 0.0, 500.0));
        let direct = build(noisy_params(8), &transform);

        let mut first = ChunkGeometryBuilder::new(noisy_params(8)).unwrap();
        let mut second = ChunkGeometryBuilder::new(noisy_params(5)).unwrap();
        while !first.is_done() {
            first.step(&transform);
            second.step(&DMat4::IDENTITY);
        }
        let mut interleaved = BufferGeometry::new();
        first.write_to(&mut interleaved).unwrap();

        assert_eq!(direct, interleaved);
    }

    #[test]
    fn test_heights_are_sampled_in_world_space() {
        let transform = DMat4::from_translation(DVec3::new(1000.0, 0.0, 0.0));
        let mut params = flat_params(2);
        params.height_generators = vec![Arc::new(|p: DVec3| p.x / 100.0) as Arc<dyn HeightGenerator>];
        let geometry = build(params, &transform);

        let centre = DVec3::new(0.0, 0.0, -100.0);
        for i in 0..geometry.vertex_count() {
            let d = pos(&geometry, i).distance(centre);
            assert!(
                d > 109.0 && d < 111.0,
                "Expected ~10 units of world-space displacement, got radius {d}"
            );
        }
    }

    #[test]
    fn test_only_first_height_generator_is_used() {
        let mut params = flat_params(2);
        params.height_generators = vec![
            Arc::new(|_: DVec3| 0.0_f64) as Arc<dyn HeightGenerator>,
            Arc::new(|_: DVec3| 50.0_f64),
        ];
        let layered = build(params, &DMat4::IDENTITY);
        let flat = build(flat_params(2), &DMat4::IDENTITY);
        assert_eq!(layered, flat);
    }

    #[test]
    fn test_constant_attributes() {
        let geometry = build(flat_params(3), &DMat4::IDENTITY);
        for t in geometry.items::<4>(VertexAttribute::Tangent) {
            assert_eq!(t, &TANGENT);
        }
        for c in geometry.items::<3>(VertexAttribute::Color) {
            assert_eq!(c, &[0.5, 0.25, 1.0]);
        }
        for (uv, p) in geometry
            .items::<2>(VertexAttribute::Uv)
            .iter()
            .zip(geometry.items::<3>(VertexAttribute::Position))
        {
            assert!((uv[0] as f64 - p[0] as f64 / UV_SCALE).abs() < 1e-6);
            assert!((uv[1] as f64 - p[1] as f64 / UV_SCALE).abs() < 1e-6);
        }
    }

    struct CountingColour {
        calls: Arc<AtomicUsize>,
    }

    impl ColourGenerator for CountingColour {
        fn get(&self, _x: f64, _y: f64, _height: f64) -> Rgb {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Rgb::WHITE
        }
    }

    #[test]
    fn test_fields_sampled_once_per_vertex() {
        let heights = Arc::new(AtomicUsize::new(0));
        let colours = Arc::new(AtomicUsize::new(0));
        let mut params = flat_params(5);
        let counter = Arc::clone(&heights);
        params.height_generators = vec![Arc::new(move |_: DVec3| {
            counter.fetch_add(1, Ordering::Relaxed);
            1.0_f64
        }) as Arc<dyn HeightGenerator>];
        params.colour_generator = Arc::new(CountingColour {
            calls: Arc::clone(&colours),
        });

        let mut builder = ChunkGeometryBuilder::new(params).unwrap();
        let expected = builder.params().vertex_count();
        builder.step(&DMat4::IDENTITY);
        assert_eq!(heights.load(Ordering::Relaxed), expected);
        assert_eq!(colours.load(Ordering::Relaxed), expected);

        // Later phases and steps past Done never resample.
        builder.run_to_completion(&DMat4::IDENTITY);
        builder.step(&DMat4::IDENTITY);
        let mut geometry = BufferGeometry::new();
        builder.write_to(&mut geometry).unwrap();
        assert_eq!(
            heights.load(Ordering::Relaxed),
            expected,
            "heights resampled after the vertex phase"
        );
        assert_eq!(
            colours.load(Ordering::Relaxed),
            expected,
            "colours resampled after the vertex phase"
        );
    }

    #[test]
    fn test_nan_height_does_not_abort_build() {
        // Only the (0, 0) corner of a width-2 patch has both coordinates near -1.
        let mut params = flat_params(2);
        params.height_generators = vec![Arc::new(|p: DVec3| {
            if p.x < -0.5 && p.y < -0.5 { f64::NAN } else { 0.0 }
        }) as Arc<dyn HeightGenerator>];
        params.colour_generator = Arc::new(HypsometricTints::new(
            NoiseGenerator::new(NoiseParams::default()),
            10.0,
        ));

        let geometry = build(params, &DMat4::IDENTITY);
        assert_eq!(geometry.vertex_count(), 9);
        for c in geometry.items::<3>(VertexAttribute::Color) {
            assert!(
                c.iter().all(|v| (0.0..=1.0).contains(v)),
                "colour {c:?} out of range"
            );
        }
    }
}
