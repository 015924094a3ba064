//! # Camera State Management
//!
//! This module drives the observer of the demo render loop:
//! - Camera position and orientation tracking
//! - View and projection matrix calculations
//! - A fixed flight path in place of player input
//! - Chunk tracking so the engine knows when the observer changed chunks
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `Projection`: Manages the camera's projection matrix
//! - `CameraUniform`: GPU representation of camera data for shaders
//! - `FlightPath`: Moves the camera at constant speed along a heading

use cgmath::{Deg, InnerSpace, Point3, Vector3};
use web_time::Duration;

use super::voxels::coordinate::ChunkCoordinate;

pub mod camera;

/// Vertical field of view of the demo camera.
const FIELD_OF_VIEW: Deg<f32> = Deg(60.0);
/// Near clipping plane distance.
const Z_NEAR: f32 = 0.1;
/// Far clipping plane distance.
const Z_FAR: f32 = 1000.0;

/// Straight-line motion at constant speed.
#[derive(Debug, Clone, Copy)]
pub struct FlightPath {
    /// Normalized direction of travel
    pub heading: Vector3<f32>,
    /// World units per second
    pub speed: f32,
}

impl FlightPath {
    /// Creates a path along `heading` at `speed` units per second.
    pub fn new(heading: Vector3<f32>, speed: f32) -> Self {
        Self {
            heading: heading.normalize(),
            speed,
        }
    }

    /// Displacement covered in `dt`.
    pub fn step(&self, dt: Duration) -> Vector3<f32> {
        self.heading * self.speed * dt.as_secs_f32()
    }
}

/// Changes reported by [`CameraState::update`] when the observer enters a new chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraUpdates {
    /// The chunk now containing the camera
    pub new_chunk_position: ChunkCoordinate,
}

/// Camera, projection and uniform data for the demo observer.
///
/// # Fields
/// - `camera`: The current camera state (position, orientation)
/// - `projection`: The perspective projection
/// - `camera_uniform`: GPU-ready copy of the view-projection matrix
/// - `flight_path`: How the camera moves each frame
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: camera::Camera,
    /// Perspective projection for the render target size
    pub projection: camera::Projection,
    /// GPU-optimized camera data for shaders
    pub camera_uniform: camera::CameraUniform,
    /// Motion applied on every update
    pub flight_path: FlightPath,
    /// Chunk containing the camera as of the last update
    current_chunk: ChunkCoordinate,
}

impl CameraState {
    /// Creates a camera at `position` that looks and travels along the flight path.
    ///
    /// # Arguments
    /// * `position` - Starting world-space position
    /// * `flight_path` - Motion applied by `update`
    /// * `width` / `height` - Render target size, for the aspect ratio
    pub fn new(position: Point3<f32>, flight_path: FlightPath, width: u32, height: u32) -> Self {
        let heading = flight_path.heading;
        let yaw = cgmath::Rad(heading.z.atan2(heading.x));
        let camera = camera::Camera::new(position, yaw, Deg(-20.0));
        let projection = camera::Projection::new(width, height, FIELD_OF_VIEW, Z_NEAR, Z_FAR);

        let mut camera_uniform = camera::CameraUniform::new();
        camera_uniform.update_view_proj_and_pos(&camera, &projection);

        CameraState {
            current_chunk: ChunkCoordinate::from_world_position(position),
            camera,
            projection,
            camera_uniform,
            flight_path,
        }
    }

    /// The camera's world-space position.
    pub fn position(&self) -> Point3<f32> {
        self.camera.position
    }

    /// The chunk containing the camera.
    pub fn current_chunk(&self) -> ChunkCoordinate {
        self.current_chunk
    }

    /// Advances the camera along its flight path and refreshes the uniform.
    ///
    /// # Returns
    /// - `Some(CameraUpdates)` if the camera crossed into another chunk
    /// - `None` otherwise
    pub fn update(&mut self, dt: Duration) -> Option<CameraUpdates> {
        self.camera.position += self.flight_path.step(dt);
        self.camera_uniform
            .update_view_proj_and_pos(&self.camera, &self.projection);

        let new_chunk_position = ChunkCoordinate::from_world_position(self.camera.position);
        if new_chunk_position == self.current_chunk {
            return None;
        }

        self.current_chunk = new_chunk_position;
        Some(CameraUpdates { new_chunk_position })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_a_chunk_boundary_reports_the_new_chunk() {
        let path = FlightPath::new(Vector3::new(1.0, 0.0, 0.0), 16.0);
        let mut state = CameraState::new(Point3::new(1.0, 40.0, 1.0), path, 640, 480);
        assert_eq!(state.current_chunk(), ChunkCoordinate::new(0, 1, 0));

        // 16 units: still inside chunk 0.
        assert_eq!(state.update(Duration::from_secs(1)), None);

        // 32 units total past x = 1: now in chunk 1.
        let updates = state.update(Duration::from_secs(1)).unwrap();
        assert_eq!(updates.new_chunk_position, ChunkCoordinate::new(1, 1, 0));
        assert_eq!(state.current_chunk(), ChunkCoordinate::new(1, 1, 0));
        assert!((state.position().x - 33.0).abs() < 1e-4);
    }

    #[test]
    fn camera_faces_along_the_heading() {
        let path = FlightPath::new(Vector3::new(0.0, 0.0, -3.0), 1.0);
        let state = CameraState::new(Point3::new(0.0, 0.0, 0.0), path, 640, 480);
        let forward = state.camera.get_view_vec();

        assert!(forward.z < -0.9);
        assert!(forward.x.abs() < 1e-5);
    }
}
