//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a 32x32x32 block of voxel data, the
//! mesh derived from it, and the lazily created GPU resources used to draw it.
//!
//! ## Storage
//!
//! Block solidity is kept in a bit vector with one layer of padding on every
//! side (`CHUNK_DIMENSION_WRAPPED` bits per axis). The padding is never set, so
//! neighbour lookups one step outside the chunk read as air without a bounds
//! check. This is what makes faces on the chunk boundary always visible.
//!
//! ## Lifecycle
//!
//! 1. `Chunk::generate` fills terrain and builds the mesh on the worker thread;
//!    the chunk is then `generated`
//! 2. The chunk is published into the world registry and never mutated again
//!    except for its GPU state
//! 3. The first `render` on the render thread uploads the mesh; the chunk is
//!    then `ready`
//!
//! `ready` implies `generated`, and neither flag is ever cleared.

use bitvec::prelude::BitVec;
use cgmath::{EuclideanSpace, Matrix4, Point3};
use log::{debug, error};
use parking_lot::Mutex;

use super::block::{BlockSide, BlockType};
use super::coordinate::ChunkCoordinate;
use crate::engine_state::rendering::{ChunkVertex, GraphicsBackend, GraphicsError, MeshHandle};

pub mod chunk_iteration;
mod mesher;
pub mod terrain;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: usize = 32;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: usize = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: usize = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;
/// The dimension of a chunk including an extra layer of blocks on each side for neighbor lookups.
pub const CHUNK_DIMENSION_WRAPPED: usize = CHUNK_DIMENSION + 2;
/// The number of blocks in a wrapped 2D chunk plane.
pub const CHUNK_PLANE_SIZE_WRAPPED: usize = CHUNK_DIMENSION_WRAPPED * CHUNK_DIMENSION_WRAPPED;
/// The total number of blocks in a wrapped chunk.
pub const CHUNK_SIZE_WRAPPED: usize = CHUNK_PLANE_SIZE_WRAPPED * CHUNK_DIMENSION_WRAPPED;

/// GPU-side state of a chunk, touched only by the render thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GpuState {
    /// Nothing uploaded yet.
    Unprepared,
    /// Resources exist; `None` when the mesh is empty and nothing needed uploading.
    Ready(Option<MeshHandle>),
    /// The single preparation attempt failed.
    Failed,
}

/// A cubic block of voxels, the unit of generation, meshing and rendering.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    coordinate: ChunkCoordinate,

    /// One bit per block, set for solid blocks, including the always-clear padding.
    ///
    /// Bits are stored x fastest, then y, then z.
    solid_array: BitVec,

    /// Interleaved mesh vertices, positioned relative to the chunk origin.
    vertices: Vec<ChunkVertex>,

    /// Triangle list indices into `vertices`.
    indices: Vec<u32>,

    /// Set once the mesh has been built.
    generated: bool,

    gpu: Mutex<GpuState>,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are air).
    pub fn empty(coordinate: ChunkCoordinate) -> Self {
        Chunk {
            coordinate,
            solid_array: BitVec::repeat(false, CHUNK_SIZE_WRAPPED),
            vertices: Vec::new(),
            indices: Vec::new(),
            generated: false,
            gpu: Mutex::new(GpuState::Unprepared),
        }
    }

    /// Creates a new chunk filled with solid blocks.
    pub fn solid(coordinate: ChunkCoordinate) -> Self {
        let mut chunk = Self::empty(coordinate);
        for z in 0..CHUNK_DIMENSION {
            for y in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    chunk.set_block(x, y, z, BlockType::DIRT);
                }
            }
        }
        chunk
    }

    /// Fills terrain and builds the mesh; the returned chunk is `generated`.
    ///
    /// Pure CPU work, safe to run away from the graphics thread.
    pub fn generate(coordinate: ChunkCoordinate, generator: &terrain::TerrainGenerator) -> Self {
        let mut chunk = Self::empty(coordinate);
        chunk.fill_terrain(generator);
        chunk.build_mesh();
        chunk
    }

    /// The chunk's key in the world registry.
    pub fn coordinate(&self) -> ChunkCoordinate {
        self.coordinate
    }

    /// World-space position of the chunk's minimum corner.
    pub fn world_position(&self) -> Point3<f32> {
        self.coordinate.world_origin()
    }

    /// Checks whether chunk-relative coordinates address a block inside the chunk.
    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        let range = 0..CHUNK_DIMENSION as i32;
        range.contains(&x) && range.contains(&y) && range.contains(&z)
    }

    /// Returns the block at chunk-relative coordinates.
    ///
    /// Coordinates outside the chunk read as [`BlockType::AIR`].
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockType {
        if !Self::in_bounds(x, y, z) {
            return BlockType::AIR;
        }
        BlockType::from_solid(self.solid_array[Self::wrapped_index(
            x as usize + 1,
            y as usize + 1,
            z as usize + 1,
        )])
    }

    /// Replaces the block at chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        assert!(
            x < CHUNK_DIMENSION && y < CHUNK_DIMENSION && z < CHUNK_DIMENSION,
            "block ({x}, {y}, {z}) is outside the chunk"
        );
        self.solid_array.set(
            Self::wrapped_index(x + 1, y + 1, z + 1),
            block_type.is_solid(),
        );
    }

    /// Index of a padded (1-based interior) position in `solid_array`.
    fn wrapped_index(i: usize, j: usize, k: usize) -> usize {
        i + CHUNK_DIMENSION_WRAPPED * j + CHUNK_PLANE_SIZE_WRAPPED * k
    }

    /// Checks solidity at a padded position; padding is always air.
    pub(crate) fn is_block_solid(&self, i: usize, j: usize, k: usize) -> bool {
        self.solid_array[Self::wrapped_index(i, j, k)]
    }

    /// Determines which faces of the block at (x,y,z) are covered by a solid neighbour.
    ///
    /// The result is indexed by `BlockSide as usize`; `false` means the face is exposed.
    pub fn generate_adjacent_blocks(&self, x: usize, y: usize, z: usize) -> [bool; 6] {
        //This accounts for the chunk wrapping
        let i = x + 1;
        let j = y + 1;
        let k = z + 1;

        let mut adjacency_data = [false; 6];
        adjacency_data[BlockSide::NORTH as usize] = self.is_block_solid(i, j, k - 1);
        adjacency_data[BlockSide::SOUTH as usize] = self.is_block_solid(i, j, k + 1);
        adjacency_data[BlockSide::WEST as usize] = self.is_block_solid(i - 1, j, k);
        adjacency_data[BlockSide::EAST as usize] = self.is_block_solid(i + 1, j, k);
        adjacency_data[BlockSide::BOTTOM as usize] = self.is_block_solid(i, j - 1, k);
        adjacency_data[BlockSide::TOP as usize] = self.is_block_solid(i, j + 1, k);
        adjacency_data
    }

    /// The padded solidity bits, for comparing block data between chunks.
    pub fn solid_array(&self) -> &BitVec {
        &self.solid_array
    }

    /// Number of solid blocks in the chunk.
    pub fn solid_count(&self) -> usize {
        self.solid_array.count_ones()
    }

    /// Mesh vertices, empty until the mesh has been built.
    pub fn vertices(&self) -> &[ChunkVertex] {
        &self.vertices
    }

    /// Mesh indices, empty until the mesh has been built.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Whether block data and mesh buffers have been computed.
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Whether GPU resources have been allocated and uploaded.
    pub fn is_ready(&self) -> bool {
        matches!(*self.gpu.lock(), GpuState::Ready(_))
    }

    /// Uploads the mesh through `backend` the first time it is called.
    ///
    /// Render thread only. Later calls are no-ops once ready. A failed upload is
    /// remembered and reported as [`GraphicsError::PreparationFailed`] from then
    /// on rather than retried every frame. Chunks that are not yet generated are
    /// left untouched.
    pub fn prepare_gpu_resources(
        &self,
        backend: &mut dyn GraphicsBackend,
    ) -> Result<(), GraphicsError> {
        if !self.generated {
            return Ok(());
        }

        let mut gpu = self.gpu.lock();
        match *gpu {
            GpuState::Ready(_) => Ok(()),
            GpuState::Failed => Err(GraphicsError::PreparationFailed {
                coordinate: self.coordinate,
            }),
            GpuState::Unprepared if self.indices.is_empty() => {
                *gpu = GpuState::Ready(None);
                Ok(())
            }
            GpuState::Unprepared => match backend.upload_mesh(&self.vertices, &self.indices) {
                Ok(handle) => {
                    debug!(
                        "Uploaded chunk {} as {:?} ({} vertices, {} indices)",
                        self.coordinate,
                        handle,
                        self.vertices.len(),
                        self.indices.len()
                    );
                    *gpu = GpuState::Ready(Some(handle));
                    Ok(())
                }
                Err(err) => {
                    error!("Failed to prepare GPU resources for chunk {}: {}", self.coordinate, err);
                    *gpu = GpuState::Failed;
                    Err(err)
                }
            },
        }
    }

    /// Draws the chunk, preparing GPU resources on first use.
    ///
    /// Render thread only. Returns `Ok(true)` when a draw call was issued and
    /// `Ok(false)` when there was nothing to draw.
    pub fn render(&self, backend: &mut dyn GraphicsBackend) -> Result<bool, GraphicsError> {
        if !self.generated {
            return Ok(false);
        }

        self.prepare_gpu_resources(backend)?;

        let handle = match *self.gpu.lock() {
            GpuState::Ready(Some(handle)) => handle,
            _ => return Ok(false),
        };

        let model = Matrix4::from_translation(self.world_position().to_vec());
        backend.set_model_transform(model);
        backend.draw_indexed(handle, self.indices.len() as u32)?;
        Ok(true)
    }
}
