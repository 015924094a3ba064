//! # Terrain Generation
//!
//! A height-field terrain built from two Perlin noise sources. The height of a
//! column depends only on its absolute world X/Z, never on chunk-local indices
//! or Y, so neighbouring chunks agree along every shared boundary.
//!
//! ```text
//! height(x, z) = BASE + base(x * s1, z * s1) * AMPLITUDE + exp(detail(x * s2, z * s2) * K) * E
//! ```
//!
//! A block is solid iff its world Y is below the column height.

use noise::{NoiseFn, Perlin};

use super::{Chunk, CHUNK_DIMENSION};

/// World Y around which the terrain surface oscillates.
pub const TERRAIN_BASE_HEIGHT: f64 = 8.0;
/// Scaling factor applied to world coordinates when sampling the base noise.
pub const BASE_SCALE_FACTOR: f64 = 0.01;
/// Height contribution of the base noise.
pub const BASE_AMPLITUDE: f64 = 12.0;
/// Scaling factor applied to world coordinates when sampling the detail noise.
pub const DETAIL_SCALE_FACTOR: f64 = 0.04;
/// Multiplier inside the exponential detail term.
pub const DETAIL_EXPONENT: f64 = 2.0;
/// Height contribution of the exponential detail term.
pub const DETAIL_AMPLITUDE: f64 = 3.0;

/// Deterministic terrain height source shared by every generated chunk.
#[derive(Clone)]
pub struct TerrainGenerator {
    seed: u32,
    base: Perlin,
    detail: Perlin,
}

impl TerrainGenerator {
    /// Creates a generator whose two noise sources derive from `seed`.
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            base: Perlin::new(seed),
            detail: Perlin::new(seed.wrapping_add(1)),
        }
    }

    /// The seed this generator was built with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Terrain surface height of the column at world (x, z).
    pub fn height_at(&self, world_x: i32, world_z: i32) -> f64 {
        let x = world_x as f64;
        let z = world_z as f64;

        let base = self
            .base
            .get([x * BASE_SCALE_FACTOR, z * BASE_SCALE_FACTOR]);
        let detail = self
            .detail
            .get([x * DETAIL_SCALE_FACTOR, z * DETAIL_SCALE_FACTOR]);

        TERRAIN_BASE_HEIGHT + base * BASE_AMPLITUDE + (detail * DETAIL_EXPONENT).exp() * DETAIL_AMPLITUDE
    }

    /// Whether the block at a world position is below the terrain surface.
    pub fn is_solid_at(&self, world_x: i32, world_y: i32, world_z: i32) -> bool {
        (world_y as f64) < self.height_at(world_x, world_z)
    }
}

impl Chunk {
    /// Overwrites every block with terrain from `generator`.
    ///
    /// Heights are sampled once per column.
    pub fn fill_terrain(&mut self, generator: &TerrainGenerator) {
        let origin = self.coordinate.block_origin();

        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let height = generator
                    .height_at(origin.x.saturating_add(x as i32), origin.z.saturating_add(z as i32));
                for y in 0..CHUNK_DIMENSION {
                    let solid = (origin.y.saturating_add(y as i32) as f64) < height;
                    self.solid_array.set(Self::wrapped_index(x + 1, y + 1, z + 1), solid);
                }
            }
        }
    }
}
