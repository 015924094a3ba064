//! # Engine State Module
//!
//! The render-loop side of the engine: it owns the streaming world, the
//! observer camera and the graphics backend, and advances them once per frame.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container driven by `frame()`
//! * `camera_state` - The observer and its flight path
//! * `rendering` - The graphics backend contract and its wgpu implementation
//! * `task_management` - The background generation worker
//! * `voxels` - Chunk data, meshing, and the world registry
//!
//! ## Frame Flow
//!
//! 1. The camera moves along its flight path
//! 2. `World::update` queues missing chunks and records draws for resident ones
//! 3. With a GPU, the recorded draws are encoded into an offscreen pass and submitted
//!
//! Everything here runs on the render thread. Only `voxels::world` talks to the
//! worker, through its lock.

use cgmath::{Point3, Vector3};
use log::{debug, info};
use web_time::Duration;
use wgpu::{Device, Queue};

use camera_state::{CameraState, CameraUpdates, FlightPath};
use rendering::{
    pipeline_manager::PipelineManager, GraphicsError, RecordingBackend, WgpuChunkBackend,
};
use voxels::world::{UpdateStats, World, WorldError};

use crate::config::WorldConfig;

pub mod camera_state;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// Size of the offscreen frame in pixels.
pub const FRAME_WIDTH: u32 = 1280;
/// Size of the offscreen frame in pixels.
pub const FRAME_HEIGHT: u32 = 720;

/// Frames between two frame-statistics log lines.
const STATS_LOG_INTERVAL: u64 = 60;

/// Where the observer starts: above the terrain surface near the origin.
const START_POSITION: Point3<f32> = Point3 {
    x: 0.5,
    y: 48.0,
    z: 0.5,
};
/// Observer speed in world units per second.
const FLIGHT_SPEED: f32 = 12.0;

/// The graphics backend the engine renders through.
pub enum RenderTarget {
    /// Real rendering into an offscreen frame.
    Gpu {
        /// Chunk meshes and the per-frame draw list
        backend: WgpuChunkBackend,
        /// Pipeline, camera binding and attachments
        pipeline: PipelineManager,
    },
    /// No GPU available; calls are recorded in memory.
    Headless(RecordingBackend),
}

impl RenderTarget {
    /// Creates a GPU target over `device` and `queue`.
    pub fn gpu(device: Device, queue: Queue) -> Self {
        let backend = WgpuChunkBackend::new(device, queue);
        let pipeline = PipelineManager::new(&backend, FRAME_WIDTH, FRAME_HEIGHT);
        RenderTarget::Gpu { backend, pipeline }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            RenderTarget::Gpu { .. } => "wgpu",
            RenderTarget::Headless(_) => "headless",
        }
    }
}

/// The main state container of the demo render loop.
///
/// # Examples
///
/// ```no_run
/// use voxel_streaming::{config::WorldConfig, engine_state::{EngineState, RenderTarget}};
/// use voxel_streaming::engine_state::rendering::RecordingBackend;
/// use web_time::Duration;
///
/// let mut engine = EngineState::new(
///     WorldConfig::default(),
///     RenderTarget::Headless(RecordingBackend::new()),
/// )?;
///
/// for _ in 0..600 {
///     engine.frame(Duration::from_millis(16))?;
/// }
/// engine.shutdown()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct EngineState {
    /// Camera state managing position and movement
    pub camera_state: CameraState,
    /// The voxel world containing all chunk data
    world: World,
    /// The backend chunks are drawn through
    target: RenderTarget,
    /// Frames rendered so far
    frame_count: u64,
    /// Statistics of the most recent frame
    last_stats: UpdateStats,
}

impl EngineState {
    /// Creates the world, starts its worker, and places the observer.
    ///
    /// # Arguments
    ///
    /// * `config` - World settings
    /// * `target` - The backend to render through
    pub fn new(config: WorldConfig, target: RenderTarget) -> Result<Self, WorldError> {
        let world = World::new(config)?;
        let flight_path = FlightPath::new(Vector3::new(1.0, 0.0, 0.35), FLIGHT_SPEED);
        let camera_state = CameraState::new(START_POSITION, flight_path, FRAME_WIDTH, FRAME_HEIGHT);

        info!("Engine rendering through the {} backend", target.name());

        Ok(Self {
            camera_state,
            world,
            target,
            frame_count: 0,
            last_stats: UpdateStats::default(),
        })
    }

    /// The streaming world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The backend chunks are drawn through.
    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    /// Frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Statistics of the most recent frame.
    pub fn last_stats(&self) -> UpdateStats {
        self.last_stats
    }

    /// Advances the observer by `dt` and renders one frame.
    ///
    /// # Returns
    ///
    /// The world's statistics for this frame.
    pub fn frame(&mut self, dt: Duration) -> Result<UpdateStats, GraphicsError> {
        if let Some(CameraUpdates { new_chunk_position }) = self.camera_state.update(dt) {
            debug!("Observer entered chunk {}", new_chunk_position);
        }
        let position = self.camera_state.position();

        let stats = match &mut self.target {
            RenderTarget::Gpu { backend, pipeline } => {
                backend.begin_frame();
                let stats = self.world.update(position, backend)?;
                pipeline.write_camera(backend.queue(), &self.camera_state.camera_uniform);
                pipeline.render(backend);
                stats
            }
            RenderTarget::Headless(backend) => {
                backend.begin_frame();
                self.world.update(position, backend)?
            }
        };

        self.frame_count += 1;
        self.last_stats = stats;

        if self.frame_count % STATS_LOG_INTERVAL == 0 {
            self.log_frame_stats();
        }

        Ok(stats)
    }

    fn log_frame_stats(&self) {
        info!(
            "Frame {}: observer in chunk {}, {} resident, {} pending, {} visible, {} drawn, {} failed",
            self.frame_count,
            self.camera_state.current_chunk(),
            self.world.resident_count(),
            self.world.pending_count(),
            self.last_stats.visible,
            self.last_stats.drawn,
            self.last_stats.failed
        );
        if let RenderTarget::Gpu { backend, .. } = &self.target {
            info!(
                "GPU: {} chunk meshes, {} bytes of mesh buffers",
                backend.mesh_count(),
                backend.total_allocated_memory()
            );
        }
    }

    /// Stops the world's generation worker.
    pub fn shutdown(&mut self) -> Result<(), WorldError> {
        self.world.shutdown()
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Instant};

    use super::*;
    use crate::engine_state::voxels::coordinate::ChunkCoordinate;

    fn headless_engine() -> EngineState {
        let config = WorldConfig {
            render_distance: 1,
            render_height: 1,
            idle_backoff_ms: 1,
            ..WorldConfig::default()
        };
        EngineState::new(config, RenderTarget::Headless(RecordingBackend::new())).unwrap()
    }

    #[test]
    fn first_frame_requests_the_range_around_the_observer() {
        let mut engine = headless_engine();
        let stats = engine.frame(Duration::from_millis(16)).unwrap();

        assert_eq!(stats.enqueued, 27);
        assert_eq!(engine.frame_count(), 1);
        assert_eq!(engine.last_stats(), stats);
        assert_eq!(engine.camera_state.current_chunk(), ChunkCoordinate::new(0, 1, 0));
        assert_eq!(engine.target().name(), "headless");
    }

    #[test]
    fn frames_draw_chunks_once_generated() {
        let mut engine = headless_engine();
        let start = Instant::now();

        let mut stats = engine.frame(Duration::ZERO).unwrap();
        while stats.visible < 27 && start.elapsed() < std::time::Duration::from_secs(30) {
            thread::sleep(std::time::Duration::from_millis(5));
            stats = engine.frame(Duration::ZERO).unwrap();
        }

        assert_eq!(stats.visible, 27);
        let RenderTarget::Headless(backend) = engine.target() else {
            panic!("expected the headless backend");
        };
        assert_eq!(backend.draws.len(), stats.drawn);
        engine.shutdown().unwrap();
    }
}
