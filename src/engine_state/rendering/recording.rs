//! An in-memory [`GraphicsBackend`].
//!
//! Every upload, transform and draw is recorded so callers can inspect what the
//! chunk core asked for. Used by the tests and by the demo when no GPU adapter
//! is available.

use cgmath::{Matrix4, SquareMatrix};

use super::{ChunkVertex, GraphicsBackend, GraphicsError, MeshHandle};

/// A mesh as it was uploaded.
#[derive(Debug, Clone)]
pub struct RecordedMesh {
    /// Number of uploaded vertices.
    pub vertex_count: usize,
    /// Number of uploaded indices.
    pub index_count: usize,
    /// Number of vertex attributes bound for the mesh.
    pub attribute_count: usize,
}

/// One draw call together with the model transform active when it was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    /// The drawn mesh.
    pub mesh: MeshHandle,
    /// Number of indices drawn.
    pub index_count: u32,
    /// The model transform set before the draw.
    pub model: Matrix4<f32>,
}

/// Backend that records calls instead of touching a GPU.
#[derive(Debug)]
pub struct RecordingBackend {
    /// Uploaded meshes, indexed by `MeshHandle.0`.
    pub meshes: Vec<RecordedMesh>,
    /// Every draw issued so far.
    pub draws: Vec<RecordedDraw>,
    /// Number of upload attempts, including failed ones.
    pub upload_attempts: usize,
    /// When set, uploads fail with [`GraphicsError::Backend`].
    pub fail_uploads: bool,
    current_model: Matrix4<f32>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self {
            meshes: Vec::new(),
            draws: Vec::new(),
            upload_attempts: 0,
            fail_uploads: false,
            current_model: Matrix4::identity(),
        }
    }

    /// Creates a recorder whose uploads always fail.
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::new()
        }
    }

    /// Forgets the draws of the previous frame; uploads are kept.
    pub fn begin_frame(&mut self) {
        self.draws.clear();
    }
}

impl GraphicsBackend for RecordingBackend {
    fn upload_mesh(
        &mut self,
        vertices: &[ChunkVertex],
        indices: &[u32],
    ) -> Result<MeshHandle, GraphicsError> {
        self.upload_attempts += 1;
        if self.fail_uploads {
            return Err(GraphicsError::Backend("uploads disabled".to_string()));
        }
        if vertices.is_empty() || indices.is_empty() {
            return Err(GraphicsError::EmptyMesh);
        }

        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(RecordedMesh {
            vertex_count: vertices.len(),
            index_count: indices.len(),
            attribute_count: ChunkVertex::ATTRIBUTES.len(),
        });
        Ok(handle)
    }

    fn set_model_transform(&mut self, model: Matrix4<f32>) {
        self.current_model = model;
    }

    fn draw_indexed(&mut self, mesh: MeshHandle, index_count: u32) -> Result<(), GraphicsError> {
        if mesh.0 as usize >= self.meshes.len() {
            return Err(GraphicsError::UnknownMesh(mesh));
        }
        self.draws.push(RecordedDraw {
            mesh,
            index_count,
            model: self.current_model,
        });
        Ok(())
    }
}
