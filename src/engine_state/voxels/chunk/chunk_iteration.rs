//! # Chunk Iteration Module
//!
//! This module provides an iterator over the solid blocks of a chunk.
//!
//! The `ChunkBlockIterator` walks the set bits of the chunk's padded
//! `solid_array` directly, so air blocks and the padding cost nothing beyond the
//! bit scan.

use bitvec::{order::Lsb0, slice::IterOnes};
use cgmath::Point3;

use crate::engine_state::voxels::block::BlockType;

use super::{Chunk, CHUNK_DIMENSION_WRAPPED, CHUNK_PLANE_SIZE_WRAPPED};

/// An iterator over all non-air blocks in a chunk.
///
/// Yields chunk-relative positions (0-based) in storage order: x fastest, then
/// y, then z.
pub struct ChunkBlockIterator<'a> {
    ones: IterOnes<'a, usize, Lsb0>,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` for the given chunk.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            ones: chunk_ref.solid_array.iter_ones(),
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<usize>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.ones.next()?;

        // Convert from the padded 1-based layout to 0-based coordinates
        let k = index / CHUNK_PLANE_SIZE_WRAPPED;
        let j = (index % CHUNK_PLANE_SIZE_WRAPPED) / CHUNK_DIMENSION_WRAPPED;
        let i = index % CHUNK_DIMENSION_WRAPPED;

        Some((Point3::new(i - 1, j - 1, k - 1), BlockType::DIRT))
    }
}
