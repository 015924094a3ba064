//! End-to-end streaming tests against a live generation worker.

use std::{
    thread,
    time::{Duration, Instant},
};

use cgmath::Point3;
use voxel_streaming::{
    config::WorldConfig,
    engine_state::{
        rendering::RecordingBackend,
        voxels::{coordinate::ChunkCoordinate, world::World},
    },
};

const GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

fn small_world() -> World {
    World::new(WorldConfig {
        render_distance: 1,
        render_height: 1,
        seed: 3,
        idle_backoff_ms: 1,
    })
    .unwrap()
}

/// Polls until `done` holds or the timeout expires.
fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < GENERATION_TIMEOUT {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    done()
}

#[test]
fn requested_range_is_always_covered() {
    let world = small_world();
    let position = Point3::new(10.0, 5.0, -3.0);
    world.request_chunks_around(position);

    let center = ChunkCoordinate::from_world_position(position);
    for coordinate in ChunkCoordinate::range_around(center, 1, 1) {
        assert!(
            world.is_resident(coordinate) || world.is_pending(coordinate),
            "{coordinate} is neither resident nor pending"
        );
    }
}

#[test]
fn queued_chunks_are_eventually_generated() {
    let world = small_world();
    let mut backend = RecordingBackend::new();
    let origin = Point3::new(0.0, 0.0, 0.0);

    let stats = world.update(origin, &mut backend).unwrap();
    assert_eq!(stats.enqueued, 27);

    assert!(wait_until(|| world.resident_count() == 27));
    assert_eq!(world.pending_count(), 0);

    let stats = world.update(origin, &mut backend).unwrap();
    assert_eq!(stats.enqueued, 0);
    assert_eq!(stats.visible, 27);
    for chunk in world.visible_chunks(origin) {
        assert!(chunk.is_generated());
        assert!(chunk.is_ready());
    }
}

#[test]
fn duplicate_requests_generate_one_chunk() {
    let world = small_world();
    let origin = Point3::new(0.0, 0.0, 0.0);

    let mut enqueued = 0;
    for _ in 0..50 {
        enqueued += world.request_chunks_around(origin);
    }
    assert_eq!(enqueued, 27);

    assert!(wait_until(|| world.resident_count() == 27));
    for _ in 0..10 {
        assert_eq!(world.request_chunks_around(origin), 0);
    }
    thread::sleep(Duration::from_millis(20));
    assert_eq!(world.resident_count(), 27);
}

#[test]
fn generated_chunks_match_across_worlds() {
    let first = small_world();
    let second = small_world();
    let coordinate = ChunkCoordinate::new(0, 0, 0);
    let position = Point3::new(0.0, 0.0, 0.0);

    first.request_chunks_around(position);
    second.request_chunks_around(position);
    assert!(wait_until(|| first.is_resident(coordinate) && second.is_resident(coordinate)));

    let a = first.get_chunk(coordinate).unwrap();
    let b = second.get_chunk(coordinate).unwrap();
    assert_eq!(a.solid_array(), b.solid_array());
    assert_eq!(a.indices(), b.indices());
}

#[test]
fn resident_map_is_frozen_after_shutdown() {
    let mut world = small_world();
    world.request_chunks_around(Point3::new(0.0, 0.0, 0.0));
    world.shutdown().unwrap();
    assert!(!world.is_running());

    let resident = world.resident_count();
    let pending = world.pending_count();
    assert_eq!(resident + pending, 27);

    world.request_chunks_around(Point3::new(500.0, 0.0, 0.0));
    thread::sleep(Duration::from_millis(50));
    assert_eq!(world.resident_count(), resident);
}

#[test]
fn dropping_a_running_world_joins_the_worker() {
    let world = small_world();
    world.request_chunks_around(Point3::new(0.0, 0.0, 0.0));
    drop(world);
}
