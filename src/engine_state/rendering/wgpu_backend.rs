//! # WGPU Chunk Backend
//!
//! The [`GraphicsBackend`] implementation used for real rendering.
//!
//! ## Architecture
//!
//! * Every uploaded chunk mesh owns its own vertex and index buffer, created
//!   once with `create_buffer_init` and never rewritten.
//! * Draws issued through the trait are recorded into a per-frame draw list
//!   together with the model transform active at the time.
//! * [`WgpuChunkBackend::encode`] packs all model transforms of the frame into
//!   a single uniform buffer, one aligned slot per draw, and replays the draw
//!   list into a render pass using dynamic offsets.
//!
//! The pipeline itself is owned by the caller, which must include
//! [`WgpuChunkBackend::model_bind_group_layout`] at [`MODEL_BIND_GROUP_INDEX`]
//! and [`ChunkVertex::desc`] as vertex buffer 0.

use cgmath::{Matrix4, SquareMatrix};
use log::debug;
use wgpu::{util::DeviceExt, BindGroup, BindGroupLayout, Buffer, Device, Queue, RenderPass};

use super::{ChunkVertex, GraphicsBackend, GraphicsError, MeshHandle};

/// Bind group slot the chunk pipeline reserves for the model transform.
pub const MODEL_BIND_GROUP_INDEX: u32 = 1;

/// Size of one model transform in bytes.
const MODEL_UNIFORM_SIZE: u64 = std::mem::size_of::<ModelUniform>() as u64;

/// Model slots allocated up front; the buffer doubles when a frame needs more.
const INITIAL_MODEL_CAPACITY: u64 = 256;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ModelUniform {
    model: [[f32; 4]; 4],
}

/// GPU buffers of one chunk mesh.
struct GpuMesh {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    index_count: u32,
}

/// A draw recorded during the frame.
#[derive(Debug, Clone, Copy)]
struct DrawCommand {
    mesh: MeshHandle,
    index_count: u32,
    model: Matrix4<f32>,
}

/// Uniform storage for the model transforms of one frame.
struct ModelSlots {
    buffer: Buffer,
    bind_group: BindGroup,
    capacity: u64,
}

/// Chunk rendering backend over a wgpu device.
pub struct WgpuChunkBackend {
    device: Device,
    queue: Queue,
    meshes: Vec<GpuMesh>,
    model_bind_group_layout: BindGroupLayout,
    model_slots: ModelSlots,
    /// Distance between model slots, rounded up to the uniform offset alignment
    model_stride: u64,
    current_model: Matrix4<f32>,
    draws: Vec<DrawCommand>,
    /// Total bytes allocated for mesh buffers
    allocated_memory: u64,
}

impl WgpuChunkBackend {
    /// Creates a backend over the given device and queue.
    pub fn new(device: Device, queue: Queue) -> Self {
        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(MODEL_UNIFORM_SIZE),
                    },
                    count: None,
                }],
                label: Some("model_bind_group_layout"),
            });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let model_stride = MODEL_UNIFORM_SIZE.div_ceil(alignment) * alignment;

        let model_slots = Self::create_model_slots(
            &device,
            &model_bind_group_layout,
            model_stride,
            INITIAL_MODEL_CAPACITY,
        );

        Self {
            device,
            queue,
            meshes: Vec::new(),
            model_bind_group_layout,
            model_slots,
            model_stride,
            current_model: Matrix4::identity(),
            draws: Vec::new(),
            allocated_memory: 0,
        }
    }

    fn create_model_slots(
        device: &Device,
        layout: &BindGroupLayout,
        stride: u64,
        capacity: u64,
    ) -> ModelSlots {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniform Buffer"),
            size: stride * capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(MODEL_UNIFORM_SIZE),
                }),
            }],
            label: Some("model_bind_group"),
        });

        ModelSlots {
            buffer,
            bind_group,
            capacity,
        }
    }

    /// The GPU device this backend allocates from.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// The queue this backend writes through.
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Layout of the model transform bind group, for the pipeline owner.
    pub fn model_bind_group_layout(&self) -> &BindGroupLayout {
        &self.model_bind_group_layout
    }

    /// Number of meshes uploaded so far.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Total bytes allocated for mesh vertex and index buffers.
    pub fn total_allocated_memory(&self) -> u64 {
        self.allocated_memory
    }

    /// Discards the previous frame's draw list.
    pub fn begin_frame(&mut self) {
        self.draws.clear();
    }

    /// Writes the frame's model transforms and replays its draws into `render_pass`.
    ///
    /// The caller must have set the chunk pipeline and its other bind groups.
    pub fn encode(&mut self, render_pass: &mut RenderPass<'_>) {
        if self.draws.is_empty() {
            return;
        }

        let needed = self.draws.len() as u64;
        if needed > self.model_slots.capacity {
            let capacity = needed.next_power_of_two();
            debug!("Growing model uniform buffer to {} slots", capacity);
            self.model_slots = Self::create_model_slots(
                &self.device,
                &self.model_bind_group_layout,
                self.model_stride,
                capacity,
            );
        }

        let stride = self.model_stride as usize;
        let mut staging = vec![0u8; stride * self.draws.len()];
        for (slot, draw) in self.draws.iter().enumerate() {
            let uniform = ModelUniform {
                model: draw.model.into(),
            };
            let start = slot * stride;
            staging[start..start + MODEL_UNIFORM_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&uniform));
        }
        self.queue
            .write_buffer(&self.model_slots.buffer, 0, &staging);

        for (slot, draw) in self.draws.iter().enumerate() {
            let mesh = &self.meshes[draw.mesh.0 as usize];
            let offset = (slot as u64 * self.model_stride) as wgpu::DynamicOffset;

            render_pass.set_bind_group(
                MODEL_BIND_GROUP_INDEX,
                &self.model_slots.bind_group,
                &[offset],
            );
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..draw.index_count, 0, 0..1);
        }
    }
}

impl GraphicsBackend for WgpuChunkBackend {
    fn upload_mesh(
        &mut self,
        vertices: &[ChunkVertex],
        indices: &[u32],
    ) -> Result<MeshHandle, GraphicsError> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(GraphicsError::EmptyMesh);
        }

        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(indices);

        let max_buffer_size = self.device.limits().max_buffer_size;
        if vertex_bytes.len() as u64 > max_buffer_size {
            return Err(GraphicsError::Backend(format!(
                "vertex data of {} bytes exceeds the device limit of {} bytes",
                vertex_bytes.len(),
                max_buffer_size
            )));
        }

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Chunk Vertex Buffer"),
                contents: vertex_bytes,
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Chunk Index Buffer"),
                contents: index_bytes,
                usage: wgpu::BufferUsages::INDEX,
            });

        self.allocated_memory += (vertex_bytes.len() + index_bytes.len()) as u64;

        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        });
        Ok(handle)
    }

    fn set_model_transform(&mut self, model: Matrix4<f32>) {
        self.current_model = model;
    }

    fn draw_indexed(&mut self, mesh: MeshHandle, index_count: u32) -> Result<(), GraphicsError> {
        let gpu_mesh = self
            .meshes
            .get(mesh.0 as usize)
            .ok_or(GraphicsError::UnknownMesh(mesh))?;

        if index_count > gpu_mesh.index_count {
            return Err(GraphicsError::Backend(format!(
                "draw of {} indices exceeds the {} uploaded for {:?}",
                index_count, gpu_mesh.index_count, mesh
            )));
        }

        self.draws.push(DrawCommand {
            mesh,
            index_count,
            model: self.current_model,
        });
        Ok(())
    }
}
