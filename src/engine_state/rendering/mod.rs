//! Rendering system for the voxel engine.
//!
//! Chunks never talk to the GPU directly. They go through the
//! [`GraphicsBackend`] contract, which is only ever driven from the thread that
//! owns the graphics context:
//!
//! * [`GraphicsBackend::upload_mesh`] allocates buffers, uploads a chunk mesh and
//!   binds the [`ChunkVertex`] attribute layout
//! * [`GraphicsBackend::set_model_transform`] sets the per-chunk model uniform
//! * [`GraphicsBackend::draw_indexed`] submits an indexed draw
//!
//! Two backends are provided: [`WgpuChunkBackend`] for real rendering and
//! [`RecordingBackend`] which keeps every call in memory.

use cgmath::Matrix4;
use thiserror::Error;

use super::voxels::coordinate::ChunkCoordinate;

pub mod pipeline_manager;
pub mod recording;
pub mod texture;
mod vertex;
pub mod wgpu_backend;

pub use recording::RecordingBackend;
pub use vertex::ChunkVertex;
pub use wgpu_backend::WgpuChunkBackend;

/// Opaque identifier of a mesh uploaded to a backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Errors raised by graphics backends and chunk GPU preparation.
#[derive(Debug, Error)]
pub enum GraphicsError {
    /// A mesh with no vertices or no indices was handed to the backend.
    #[error("cannot upload an empty mesh")]
    EmptyMesh,
    /// A draw referenced a handle the backend never issued.
    #[error("unknown mesh handle {0:?}")]
    UnknownMesh(MeshHandle),
    /// GPU preparation failed earlier for this chunk and is not retried.
    #[error("GPU preparation previously failed for chunk {coordinate}")]
    PreparationFailed {
        /// The chunk whose resources could not be prepared.
        coordinate: ChunkCoordinate,
    },
    /// Backend-specific failure.
    #[error("graphics backend error: {0}")]
    Backend(String),
}

/// The graphics calls the chunk core consumes.
///
/// Implementations are not required to be `Send`; they are owned by the render
/// thread.
pub trait GraphicsBackend {
    /// Allocates vertex and index buffers, uploads the mesh and binds the
    /// [`ChunkVertex::ATTRIBUTES`] layout.
    fn upload_mesh(
        &mut self,
        vertices: &[ChunkVertex],
        indices: &[u32],
    ) -> Result<MeshHandle, GraphicsError>;

    /// Sets the model transform used by subsequent draws.
    fn set_model_transform(&mut self, model: Matrix4<f32>);

    /// Issues an indexed triangle draw over the first `index_count` indices.
    fn draw_indexed(&mut self, mesh: MeshHandle, index_count: u32) -> Result<(), GraphicsError>;
}
