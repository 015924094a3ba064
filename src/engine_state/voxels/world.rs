//! # World Module
//!
//! This module provides the `World` struct, the registry of resident chunks and
//! the coordinator of background chunk generation.
//!
//! ## Architecture
//!
//! The world keeps a sparse map from [`ChunkCoordinate`] to generated chunks.
//! Only chunks that have been requested around an observer are ever created,
//! and none are evicted.
//!
//! Three collections are shared with the generation worker, all behind one
//! mutex in [`RegistryState`]:
//! - `chunks`: published chunks, keyed by coordinate
//! - `queue`: coordinates waiting for the worker, in request order
//! - `pending`: every coordinate in `queue` or currently being generated
//!
//! A coordinate moves `absent -> pending -> resident` and never back. It stays
//! in `pending` while the worker generates it and leaves in the same critical
//! section that inserts the chunk, so a requested coordinate is always either
//! resident or pending.
//!
//! ## Performance Considerations
//!
//! - Critical sections only touch the three collections; generation, meshing and
//!   every graphics call run with the lock released
//! - The render thread clones `Arc` handles under the lock and draws afterwards
//! - Chunk lookup is O(1) using a hash map

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
    time::Duration,
};

use cgmath::Point3;
use log::{debug, error, info, trace};
use thiserror::Error;

use crate::{
    config::{ConfigError, WorldConfig},
    core::MtResource,
    engine_state::{
        rendering::{GraphicsBackend, GraphicsError},
        task_management::GenerationWorker,
        voxels::{
            chunk::{terrain::TerrainGenerator, Chunk},
            coordinate::ChunkCoordinate,
            tasks::chunk_generation_task::ChunkGenerationTask,
        },
    },
};

/// Errors raised while starting or stopping the world.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The configuration was rejected before the worker was started.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The OS refused to create the generation thread.
    #[error("failed to spawn generation worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
    /// The generation thread panicked before it could be joined.
    #[error("generation worker panicked")]
    WorkerPanicked,
}

/// State shared between the render thread and the generation worker.
#[derive(Default)]
pub struct RegistryState {
    /// Published chunks. Entries are inserted once and never replaced.
    pub(crate) chunks: HashMap<ChunkCoordinate, Arc<Chunk>>,
    /// Coordinates waiting to be generated, oldest first.
    pub(crate) queue: VecDeque<ChunkCoordinate>,
    /// Coordinates queued or in flight.
    pub(crate) pending: HashSet<ChunkCoordinate>,
}

impl RegistryState {
    /// Queues `coordinate` unless it is already resident or pending.
    ///
    /// # Returns
    /// `true` if the coordinate was newly queued.
    pub(crate) fn enqueue(&mut self, coordinate: ChunkCoordinate) -> bool {
        if self.chunks.contains_key(&coordinate) || !self.pending.insert(coordinate) {
            return false;
        }
        self.queue.push_back(coordinate);
        true
    }

    /// Inserts a generated chunk unless its coordinate is already resident,
    /// and clears the coordinate from the pending set.
    pub(crate) fn publish(&mut self, chunk: Arc<Chunk>) {
        let coordinate = chunk.coordinate();
        self.pending.remove(&coordinate);

        if self.chunks.contains_key(&coordinate) {
            debug!("Discarding duplicate generation of chunk {}", coordinate);
            return;
        }
        self.chunks.insert(coordinate, chunk);
    }
}

/// Counts describing one call to [`World::update`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpdateStats {
    /// Coordinates newly queued for generation this frame.
    pub enqueued: usize,
    /// Resident chunks inside the render range.
    pub visible: usize,
    /// Chunks that issued a draw call.
    pub drawn: usize,
    /// Visible chunks skipped because their GPU preparation failed earlier.
    pub failed: usize,
}

/// The streaming chunk registry.
///
/// Owns the shared [`RegistryState`] and the single background worker that
/// fills it. All methods are called from the render thread.
///
/// # Examples
///
/// ```no_run
/// use cgmath::Point3;
/// use voxel_streaming::{config::WorldConfig, engine_state::{rendering::RecordingBackend, voxels::world::World}};
///
/// let mut world = World::new(WorldConfig::default())?;
/// let mut backend = RecordingBackend::new();
///
/// // Once per frame
/// let stats = world.update(Point3::new(0.0, 0.0, 0.0), &mut backend)?;
/// println!("drew {} of {} chunks", stats.drawn, stats.visible);
///
/// world.shutdown()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct World {
    /// Chunk map, queue and pending set, behind one mutex
    state: MtResource<RegistryState>,
    /// The settings the world was built with
    config: WorldConfig,
    /// The generation thread
    worker: GenerationWorker,
}

impl World {
    /// Creates an empty world and starts its generation worker.
    ///
    /// # Arguments
    ///
    /// * `config` - Render radii, terrain seed and worker backoff
    ///
    /// # Returns
    ///
    /// The running world, or an error if `config` is invalid or the worker
    /// thread could not be spawned.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;

        let state = MtResource::new(RegistryState::default());
        let task = ChunkGenerationTask::new(state.clone(), TerrainGenerator::new(config.seed));
        let worker =
            GenerationWorker::spawn(task, Duration::from_millis(config.idle_backoff_ms))?;

        info!(
            "World created: render distance {}, render height {} ({} chunks in range), seed {}",
            config.render_distance,
            config.render_height,
            config.chunks_in_range(),
            config.seed
        );

        Ok(Self {
            state,
            config,
            worker,
        })
    }

    /// The settings the world was built with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Coordinates inside the render range of the chunk containing `position`.
    fn coordinates_in_range(&self, position: Point3<f32>) -> impl Iterator<Item = ChunkCoordinate> {
        ChunkCoordinate::range_around(
            ChunkCoordinate::from_world_position(position),
            self.config.render_distance,
            self.config.render_height,
        )
    }

    /// Queues every coordinate in range of `position` that is neither resident
    /// nor pending.
    ///
    /// Runs as a single critical section, so the worker never observes a
    /// partially queued range.
    ///
    /// # Returns
    ///
    /// The number of coordinates newly queued.
    pub fn request_chunks_around(&self, position: Point3<f32>) -> usize {
        let coordinates: Vec<_> = self.coordinates_in_range(position).collect();
        let mut state = self.state.lock();
        coordinates
            .into_iter()
            .filter(|coordinate| state.enqueue(*coordinate))
            .count()
    }

    /// Handles to the resident chunks in range of `position`.
    ///
    /// Chunks still being generated are skipped. The lock is held only while
    /// cloning the handles.
    pub fn visible_chunks(&self, position: Point3<f32>) -> Vec<Arc<Chunk>> {
        let coordinates: Vec<_> = self.coordinates_in_range(position).collect();
        let state = self.state.lock();
        coordinates
            .iter()
            .filter_map(|coordinate| state.chunks.get(coordinate).cloned())
            .collect()
    }

    /// Advances streaming for one frame and draws the resident chunks.
    ///
    /// Queues missing chunks around `position`, then renders every resident chunk
    /// in range through `backend` with the registry lock released. Each chunk's
    /// mesh is uploaded on its first draw.
    ///
    /// A chunk whose upload failed reports the error from the frame it failed
    /// in; on later frames it is counted in [`UpdateStats::failed`] and skipped.
    ///
    /// # Arguments
    ///
    /// * `position` - The observer's world-space position
    /// * `backend` - The graphics backend owned by the render thread
    pub fn update(
        &self,
        position: Point3<f32>,
        backend: &mut dyn GraphicsBackend,
    ) -> Result<UpdateStats, GraphicsError> {
        let enqueued = self.request_chunks_around(position);
        if enqueued > 0 {
            trace!("Queued {} chunks around {:?}", enqueued, position);
        }

        let visible = self.visible_chunks(position);
        let mut stats = UpdateStats {
            enqueued,
            visible: visible.len(),
            ..UpdateStats::default()
        };

        for chunk in &visible {
            match chunk.render(backend) {
                Ok(true) => stats.drawn += 1,
                Ok(false) => {}
                Err(GraphicsError::PreparationFailed { .. }) => stats.failed += 1,
                Err(err) => return Err(err),
            }
        }

        Ok(stats)
    }

    /// The resident chunk at `coordinate`, if it has been generated.
    pub fn get_chunk(&self, coordinate: ChunkCoordinate) -> Option<Arc<Chunk>> {
        self.state.lock().chunks.get(&coordinate).cloned()
    }

    /// Whether a chunk has been published at `coordinate`.
    pub fn is_resident(&self, coordinate: ChunkCoordinate) -> bool {
        self.state.lock().chunks.contains_key(&coordinate)
    }

    /// Whether `coordinate` is queued or being generated.
    pub fn is_pending(&self, coordinate: ChunkCoordinate) -> bool {
        self.state.lock().pending.contains(&coordinate)
    }

    /// Number of resident chunks.
    pub fn resident_count(&self) -> usize {
        self.state.lock().chunks.len()
    }

    /// Number of queued or in-flight coordinates.
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Whether the generation worker is still running.
    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    /// Stops the generation worker and waits for it to exit.
    ///
    /// The worker finishes the chunk it is generating, if any, then exits. Once
    /// this returns the resident map is never modified again. Calling it more
    /// than once is harmless.
    pub fn shutdown(&mut self) -> Result<(), WorldError> {
        if self.worker.is_running() {
            info!(
                "Shutting down world with {} resident and {} pending chunks",
                self.resident_count(),
                self.pending_count()
            );
        }
        self.worker.shutdown()
    }
}

impl Drop for World {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            error!("World shutdown failed: {}", err);
        }
    }
}
