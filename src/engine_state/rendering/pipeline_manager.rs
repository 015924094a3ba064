//! Manages the chunk render pipeline and the offscreen frame it draws into.
//!
//! # Architecture
//!
//! - `PipelineManager`: owns the pipeline, the camera bind group and the attachments
//! - `WgpuChunkBackend`: owns the chunk meshes and replays the frame's draws
//!
//! Bind groups follow `shaders/chunk.wgsl`:
//!
//! | group | contents                                   |
//! |-------|--------------------------------------------|
//! | 0     | camera uniform                             |
//! | 1     | model transform, dynamic offset per draw   |

use wgpu::{BindGroup, Buffer, Queue, RenderPipeline};

use super::{
    texture::Texture,
    wgpu_backend::WgpuChunkBackend,
    ChunkVertex,
};
use crate::engine_state::camera_state::camera::CameraUniform;

/// WGSL source of the chunk pipeline.
pub const CHUNK_SHADER: &str = include_str!("../../shaders/chunk.wgsl");

/// Bind group slot of the camera uniform.
pub const CAMERA_BIND_GROUP_INDEX: u32 = 0;

/// Sky colour the frame is cleared to.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.53,
    g: 0.72,
    b: 0.92,
    a: 1.0,
};

/// The chunk render pipeline with its camera binding and offscreen attachments.
pub struct PipelineManager {
    /// Pipeline drawing `ChunkVertex` triangle lists
    render_pipeline: RenderPipeline,
    /// Uniform buffer holding the `CameraUniform`
    camera_buffer: Buffer,
    /// Bind group for `camera_buffer` at group 0
    camera_bind_group: BindGroup,
    /// Offscreen colour attachment
    pub color_target: Texture,
    /// Depth texture used for depth testing
    pub depth_texture: Texture,
}

impl PipelineManager {
    /// Creates the pipeline and its attachments.
    ///
    /// # Arguments
    /// * `backend` - The chunk backend whose model layout the pipeline binds at group 1
    /// * `width` / `height` - Size of the offscreen frame in pixels
    pub fn new(backend: &WgpuChunkBackend, width: u32, height: u32) -> Self {
        let device = backend.device();

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera_buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera_bind_group_layout"),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Chunk Render Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout, backend.model_bind_group_layout()],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Chunk Shader"),
            source: wgpu::ShaderSource::Wgsl(CHUNK_SHADER.into()),
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Chunk Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[ChunkVertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: Texture::COLOR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                // Face templates wind clockwise seen from outside the block.
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Texture::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Self {
            render_pipeline,
            camera_buffer,
            camera_bind_group,
            color_target: Texture::create_color_target(device, width, height, "COLOR TARGET"),
            depth_texture: Texture::create_depth_texture(device, width, height, "DEPTH TEXTURE"),
        }
    }

    /// Uploads the camera uniform for the next frame.
    pub fn write_camera(&self, queue: &Queue, camera_uniform: &CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[*camera_uniform]));
    }

    /// Renders the draws recorded in `backend` this frame and submits them.
    ///
    /// Clears colour and depth, binds the camera, and lets the backend replay its
    /// draw list with the per-draw model transforms.
    pub fn render(&self, backend: &mut WgpuChunkBackend) {
        let mut encoder = backend
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Chunk Frame Encoder"),
            });
        {
            let depth_stencil_attachment = Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            });
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Chunk Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color_target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                ..Default::default()
            });

            rpass.set_pipeline(&self.render_pipeline);
            rpass.set_bind_group(CAMERA_BIND_GROUP_INDEX, &self.camera_bind_group, &[]);
            backend.encode(&mut rpass);
        }

        backend.queue().submit([encoder.finish()]);
    }
}
