#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streaming
//!
//! A voxel chunk streaming core: terrain generation and face-culled meshing on a
//! background worker, a thread-safe chunk registry, and lazy GPU upload on the
//! render thread.
//!
//! ## Key Modules
//!
//! * `config` - World settings loaded from JSON
//! * `core` - Shared-state utilities used across threads
//! * `engine_state` - The world registry, chunks, rendering, and the demo render loop
//!
//! ## Architecture
//!
//! Exactly two threads take part:
//! * The render thread owns the graphics backend and calls `World::update` once per frame
//! * One generation worker builds chunk data and meshes without touching the GPU
//!
//! They share a single mutex-guarded registry holding the resident chunk map,
//! the work queue, and the set of pending coordinates.
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if let Err(err) = voxel_streaming::run() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

use std::thread;

use log::{info, warn};
use thiserror::Error;
use web_time::{Duration, Instant};
use wgpu::{Device, Queue};

use config::{ConfigError, WorldConfig};
use engine_state::{
    rendering::{GraphicsError, RecordingBackend},
    voxels::world::WorldError,
    EngineState, RenderTarget,
};

pub mod config;
pub mod core;
pub mod engine_state;

/// Number of frames the demo renders before shutting down.
pub const DEMO_FRAMES: u32 = 600;

/// Target frame time of the demo loop.
pub const FRAME_TIME: Duration = Duration::from_millis(16);

/// Errors that end the demo.
#[derive(Debug, Error)]
pub enum AppError {
    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The world failed to start or stop.
    #[error(transparent)]
    World(#[from] WorldError),
    /// Rendering a frame failed.
    #[error(transparent)]
    Graphics(#[from] GraphicsError),
    /// No graphics adapter is available.
    #[error("no graphics adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    /// The adapter refused to create a device.
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// Requests a headless device and queue on the primary backends.
async fn request_device() -> Result<(Device, Queue), AppError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
        ..Default::default()
    });

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await?;
    info!("Using adapter {}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            label: Some("voxel-streaming device"),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::Off,
        })
        .await?;

    Ok((device, queue))
}

/// Runs the demo render loop.
///
/// Reads an optional JSON config path from the first command-line argument,
/// renders [`DEMO_FRAMES`] frames while the observer flies over the terrain,
/// then shuts the world down. Falls back to an in-memory backend when no GPU
/// is available.
pub fn run() -> Result<(), AppError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading config from {}", path);
            WorldConfig::load(&path)?
        }
        None => WorldConfig::default(),
    };

    let target = match pollster::block_on(request_device()) {
        Ok((device, queue)) => RenderTarget::gpu(device, queue),
        Err(err) => {
            warn!("Rendering headless: {}", err);
            RenderTarget::Headless(RecordingBackend::new())
        }
    };

    let mut engine = EngineState::new(config, target)?;

    let start = Instant::now();
    for _ in 0..DEMO_FRAMES {
        engine.frame(FRAME_TIME)?;
        thread::sleep(FRAME_TIME);
    }

    let last = engine.last_stats();
    info!(
        "Rendered {} frames in {:?}; {} chunks resident, last frame drew {} of {} visible",
        engine.frame_count(),
        start.elapsed(),
        engine.world().resident_count(),
        last.drawn,
        last.visible
    );

    engine.shutdown()?;
    Ok(())
}
