//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask`, the work the background
//! worker repeats: take one queued coordinate, generate and mesh its chunk, and
//! publish the result into the world registry.

use std::sync::Arc;

use log::debug;
use web_time::Instant;

use crate::{
    core::MtResource,
    engine_state::{
        task_management::task::Task,
        voxels::{
            chunk::{terrain::TerrainGenerator, Chunk},
            world::RegistryState,
        },
    },
};

/// Generates queued chunks off the render thread.
///
/// Each step holds the registry lock twice, briefly: once to pop a coordinate
/// and once to publish the finished chunk. Terrain fill and meshing run with the
/// lock released.
pub struct ChunkGenerationTask {
    /// The registry shared with the render thread
    state: MtResource<RegistryState>,
    /// Terrain source used for every chunk
    generator: TerrainGenerator,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `state` - The registry shared with the render thread
    /// * `generator` - The terrain source for every generated chunk
    pub fn new(state: MtResource<RegistryState>, generator: TerrainGenerator) -> Self {
        ChunkGenerationTask { state, generator }
    }
}

impl Task for ChunkGenerationTask {
    /// Generates at most one queued chunk.
    ///
    /// # Returns
    /// `false` when the queue was empty.
    fn run_once(&mut self) -> bool {
        let Some(coordinate) = self.state.lock().queue.pop_front() else {
            return false;
        };

        let start = Instant::now();
        let chunk = Chunk::generate(coordinate, &self.generator);
        debug!(
            "Generated chunk {}: {} vertices, {} indices in {:?}",
            coordinate,
            chunk.vertices().len(),
            chunk.indices().len(),
            start.elapsed()
        );

        self.state.lock().publish(Arc::new(chunk));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::coordinate::ChunkCoordinate;

    fn task_with_state() -> (ChunkGenerationTask, MtResource<RegistryState>) {
        let state = MtResource::new(RegistryState::default());
        let task = ChunkGenerationTask::new(state.clone(), TerrainGenerator::new(0));
        (task, state)
    }

    #[test]
    fn empty_queue_reports_no_work() {
        let (mut task, state) = task_with_state();

        assert!(!task.run_once());
        assert!(state.lock().chunks.is_empty());
    }

    #[test]
    fn step_moves_coordinate_from_pending_to_resident() {
        let (mut task, state) = task_with_state();
        let coordinate = ChunkCoordinate::new(0, -1, 0);
        assert!(state.lock().enqueue(coordinate));

        assert!(task.run_once());

        let state = state.lock();
        assert!(state.pending.is_empty());
        assert!(state.queue.is_empty());
        let chunk = state.chunks.get(&coordinate).unwrap();
        assert!(chunk.is_generated());
        assert!(!chunk.is_ready());
        assert_eq!(chunk.coordinate(), coordinate);
    }

    #[test]
    fn queue_is_processed_in_fifo_order() {
        let (mut task, state) = task_with_state();
        let first = ChunkCoordinate::new(1, 0, 0);
        let second = ChunkCoordinate::new(2, 0, 0);
        state.with(|state| {
            state.enqueue(first);
            state.enqueue(second);
        });

        assert!(task.run_once());
        {
            let state = state.lock();
            assert!(state.chunks.contains_key(&first));
            assert!(state.pending.contains(&second));
        }

        assert!(task.run_once());
        assert!(!task.run_once());
        assert_eq!(state.lock().chunks.len(), 2);
    }

    #[test]
    fn stale_queue_entry_does_not_replace_resident_chunk() {
        let (mut task, state) = task_with_state();
        let coordinate = ChunkCoordinate::new(0, 0, 0);
        state.lock().enqueue(coordinate);
        task.run_once();
        let original = Arc::clone(state.lock().chunks.get(&coordinate).unwrap());

        // Force a duplicate past the enqueue guard.
        state.lock().queue.push_back(coordinate);
        assert!(task.run_once());

        let state = state.lock();
        assert_eq!(state.chunks.len(), 1);
        assert!(Arc::ptr_eq(state.chunks.get(&coordinate).unwrap(), &original));
    }
}
