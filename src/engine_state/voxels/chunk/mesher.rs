//! Face-culling mesh builder.
//!
//! Every solid block contributes one quad per side whose neighbour is air.
//! Neighbours outside the chunk always read as air, so chunk boundary faces are
//! emitted even when the adjacent chunk is solid there. Adjacent chunks
//! therefore both draw their shared boundary; there is no cross-chunk query.

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use crate::engine_state::{
    rendering::ChunkVertex,
    voxels::block::{block_side::FACE_INDICES, BlockSide, BlockType},
};

use super::{chunk_iteration::ChunkBlockIterator, Chunk};

impl Chunk {
    /// Rebuilds the mesh from the current block data and marks the chunk `generated`.
    ///
    /// Makes no graphics calls.
    pub fn build_mesh(&mut self) {
        let start = Instant::now();
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for (position, block_type) in ChunkBlockIterator::new(self) {
            let adjacency = self.generate_adjacent_blocks(position.x, position.y, position.z);
            for side in BlockSide::all() {
                if !adjacency[side as usize] {
                    add_face(&mut vertices, &mut indices, position, block_type, side);
                }
            }
        }

        self.vertices = vertices;
        self.indices = indices;
        self.generated = true;

        debug!(
            "Meshed chunk {}: {} vertices, {} indices in {:?}",
            self.coordinate,
            self.vertices.len(),
            self.indices.len(),
            start.elapsed()
        );
    }
}

/// Appends one quad for `side` of the block at `position`.
///
/// Indices are offset by the running vertex count, so earlier faces never need
/// re-indexing.
fn add_face(
    vertices: &mut Vec<ChunkVertex>,
    indices: &mut Vec<u32>,
    position: Point3<usize>,
    block_type: BlockType,
    side: BlockSide,
) {
    let base = vertices.len() as u32;
    let shade = side.shade();
    let texture_layer = block_type.texture_layer(side);

    for corner in side.face_template() {
        vertices.push(ChunkVertex::new(
            Point3::new(
                position.x as f32 + corner.position[0],
                position.y as f32 + corner.position[1],
                position.z as f32 + corner.position[2],
            ),
            corner.tex_coords,
            shade,
            texture_layer,
        ));
    }

    indices.extend(FACE_INDICES.iter().map(|index| index + base));
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;
    use crate::engine_state::voxels::{
        chunk::{CHUNK_DIMENSION, CHUNK_PLANE_SIZE},
        coordinate::ChunkCoordinate,
    };

    fn vec_of(vertex: &ChunkVertex) -> Vector3<f32> {
        Vector3::new(vertex.position[0], vertex.position[1], vertex.position[2])
    }

    /// A scattered pattern with plenty of touching and isolated blocks.
    fn patterned_chunk() -> Chunk {
        let mut chunk = Chunk::empty(ChunkCoordinate::new(0, 0, 0));
        for z in 0..CHUNK_DIMENSION {
            for y in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    if (x * 7 + y * 13 + z * 5) % 3 == 0 || y < 4 {
                        chunk.set_block(x, y, z, BlockType::DIRT);
                    }
                }
            }
        }
        chunk
    }

    #[test]
    fn all_air_chunk_has_empty_mesh() {
        let mut chunk = Chunk::empty(ChunkCoordinate::new(0, 0, 0));
        chunk.build_mesh();

        assert!(chunk.is_generated());
        assert!(chunk.vertices().is_empty());
        assert!(chunk.indices().is_empty());
    }

    #[test]
    fn single_block_emits_six_faces() {
        let mut chunk = Chunk::empty(ChunkCoordinate::new(0, 0, 0));
        chunk.set_block(0, 0, 0, BlockType::DIRT);
        chunk.build_mesh();

        assert_eq!(chunk.vertices().len(), 24);
        assert_eq!(chunk.indices().len(), 36);
        assert_eq!(&chunk.indices()[..6], &[0, 1, 2, 2, 3, 0]);
        assert_eq!(&chunk.indices()[30..], &[20, 21, 22, 22, 23, 20]);
    }

    #[test]
    fn touching_blocks_hide_shared_faces() {
        let mut chunk = Chunk::empty(ChunkCoordinate::new(0, 0, 0));
        chunk.set_block(4, 4, 4, BlockType::DIRT);
        chunk.set_block(5, 4, 4, BlockType::DIRT);
        chunk.build_mesh();

        assert_eq!(chunk.vertices().len(), 10 * 4);
        assert_eq!(chunk.indices().len(), 10 * 6);
    }

    #[test]
    fn solid_chunk_only_shows_its_boundary() {
        let mut chunk = Chunk::solid(ChunkCoordinate::new(0, 0, 0));
        chunk.build_mesh();

        let faces = 6 * CHUNK_PLANE_SIZE;
        assert_eq!(chunk.vertices().len(), faces * 4);
        assert_eq!(chunk.indices().len(), faces * 6);
    }

    #[test]
    fn shading_follows_face_direction() {
        let mut chunk = Chunk::empty(ChunkCoordinate::new(0, 0, 0));
        chunk.set_block(0, 0, 0, BlockType::DIRT);
        chunk.build_mesh();

        for (side, quad) in BlockSide::all().iter().zip(chunk.vertices().chunks(4)) {
            for vertex in quad {
                assert_eq!(vertex.shade, side.shade());
                assert_eq!(vertex.texture_layer, 0.0);
            }
        }
    }

    #[test]
    fn every_face_separates_solid_from_air() {
        let mut chunk = patterned_chunk();
        chunk.build_mesh();

        let mut expected_faces = 0;
        for z in 0..CHUNK_DIMENSION as i32 {
            for y in 0..CHUNK_DIMENSION as i32 {
                for x in 0..CHUNK_DIMENSION as i32 {
                    if !chunk.get_block(x, y, z).is_solid() {
                        continue;
                    }
                    for side in BlockSide::all() {
                        let n = side.normal();
                        if !chunk.get_block(x + n.x, y + n.y, z + n.z).is_solid() {
                            expected_faces += 1;
                        }
                    }
                }
            }
        }
        assert_eq!(chunk.vertices().len(), expected_faces * 4);
        assert_eq!(chunk.indices().len(), expected_faces * 6);

        for (quad, quad_indices) in chunk.vertices().chunks(4).zip(chunk.indices().chunks(6)) {
            let a = vec_of(&quad[0]);
            let b = vec_of(&quad[1]);
            let c = vec_of(&quad[2]);
            // Clockwise from outside, so the counter-clockwise normal points inward.
            let outward = -(b - a).cross(c - a).normalize();
            let center = quad.iter().map(vec_of).fold(Vector3::new(0.0, 0.0, 0.0), |acc, v| acc + v) / 4.0;

            let cell = center - outward * 0.5;
            let (x, y, z) = (cell.x.floor() as i32, cell.y.floor() as i32, cell.z.floor() as i32);
            let n = outward.map(|v| v.round() as i32);

            assert!(chunk.get_block(x, y, z).is_solid(), "face owner ({x}, {y}, {z}) is air");
            assert!(
                !chunk.get_block(x + n.x, y + n.y, z + n.z).is_solid(),
                "face between two solid blocks at ({x}, {y}, {z})"
            );

            let base = quad_indices.iter().min().copied().unwrap_or_default();
            assert_eq!(base % 4, 0);
            assert!(quad_indices.iter().all(|i| *i < base + 4));
        }
    }

    #[test]
    fn rebuilding_replaces_previous_mesh() {
        let mut chunk = Chunk::empty(ChunkCoordinate::new(0, 0, 0));
        chunk.set_block(0, 0, 0, BlockType::DIRT);
        chunk.build_mesh();
        chunk.build_mesh();

        assert_eq!(chunk.vertices().len(), 24);
        assert!(chunk.is_generated());
    }
}
