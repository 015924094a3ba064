//! Vertex data structures and layouts for chunk rendering.
//!
//! This module defines the interleaved vertex format emitted by the mesher and
//! the attribute layout the chunk pipeline binds it with.

use cgmath::Point3;

/// A vertex of a chunk mesh.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Shade: f32 (4 bytes)
/// - Texture Layer: f32 (4 bytes)
///
/// Total size: 28 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ChunkVertex {
    /// Position relative to the chunk's minimum corner
    pub position: [f32; 3],
    /// UV texture coordinates (0.0-1.0 across one block face)
    pub tex_coords: [f32; 2],
    /// Directional brightness multiplier of the face
    pub shade: f32,
    /// Layer of the block texture array
    pub texture_layer: f32,
}

impl ChunkVertex {
    /// Shader attribute layout, one entry per interleaved field.
    ///
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: tex_coords (vec2<f32>)
    /// - `location = 2`: shade (f32)
    /// - `location = 3`: texture_layer (f32)
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x2,
        2 => Float32,
        3 => Float32,
    ];

    /// Creates a new vertex.
    pub fn new(position: Point3<f32>, tex_coords: [f32; 2], shade: f32, texture_layer: u32) -> Self {
        ChunkVertex {
            position: [position.x, position.y, position.z],
            tex_coords,
            shade,
            texture_layer: texture_layer as f32,
        }
    }

    /// Returns the vertex buffer layout description for the chunk pipeline.
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ChunkVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
