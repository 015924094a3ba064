//! # Voxel World
//!
//! Block data, chunk meshing, and the streaming chunk registry.
//!
//! ## Architecture
//!
//! * **Block**: block types and the six face directions with their quad templates
//! * **Chunk**: a 32x32x32 grid of blocks, its face-culled mesh and lazy GPU state
//! * **Coordinate**: the integer key chunks are registered under
//! * **World**: the registry shared between the render thread and the generation worker
//! * **Tasks**: the unit of work the generation worker repeats
//!
//! ## Data Flow
//!
//! 1. The render thread calls `World::update` with the observer position
//! 2. Missing coordinates around the observer are queued and marked pending
//! 3. The worker pops a coordinate, generates and meshes the chunk off-lock, then
//!    publishes it into the resident map
//! 4. Later frames draw the resident chunks, uploading each mesh on first draw
//!
//! ## Thread Safety
//!
//! The resident map, the queue and the pending set live behind one mutex. Chunks
//! are immutable once published; only their GPU state changes, and only on the
//! render thread.

pub mod block;
pub mod chunk;
pub mod coordinate;
pub mod tasks;
pub mod world;
