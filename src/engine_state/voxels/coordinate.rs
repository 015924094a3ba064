//! # Chunk Coordinates
//!
//! Integer addresses of chunks in chunk-grid space. A chunk at coordinate
//! `(x, y, z)` covers world positions `[x * N, (x + 1) * N)` on each axis, where
//! `N` is [`CHUNK_DIMENSION`].

use std::fmt;

use cgmath::Point3;

use super::chunk::CHUNK_DIMENSION;
use crate::config::MAX_RENDER_RADIUS;

/// Largest chunk coordinate, on any axis, an observer position maps to.
///
/// Every block of every chunk within [`MAX_RENDER_RADIUS`] of a clamped
/// coordinate still has an `i32` world position.
pub const CHUNK_COORDINATE_LIMIT: i32 = i32::MAX / CHUNK_DIMENSION as i32 - MAX_RENDER_RADIUS - 1;

/// The unique key of a chunk in the world registry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoordinate {
    /// Chunk-grid X.
    pub x: i32,
    /// Chunk-grid Y.
    pub y: i32,
    /// Chunk-grid Z.
    pub z: i32,
}

impl ChunkCoordinate {
    /// Creates a coordinate from its three components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinate of the chunk containing a world-space point.
    ///
    /// Uses floor division, so points just below zero land in chunk `-1` rather
    /// than truncating toward chunk `0`. Each axis is clamped to
    /// `±CHUNK_COORDINATE_LIMIT`; NaN maps to `0`.
    pub fn from_world_position(position: Point3<f32>) -> Self {
        let dimension = CHUNK_DIMENSION as f32;
        let axis = |value: f32| {
            let chunk = (value / dimension).floor() as i32;
            chunk.clamp(-CHUNK_COORDINATE_LIMIT, CHUNK_COORDINATE_LIMIT)
        };
        Self {
            x: axis(position.x),
            y: axis(position.y),
            z: axis(position.z),
        }
    }

    /// World-space position of the chunk's minimum corner.
    pub fn world_origin(&self) -> Point3<f32> {
        let dimension = CHUNK_DIMENSION as f32;
        Point3::new(
            self.x as f32 * dimension,
            self.y as f32 * dimension,
            self.z as f32 * dimension,
        )
    }

    /// World-space block position of the chunk's minimum corner.
    ///
    /// Saturates at the `i32` bounds.
    pub fn block_origin(&self) -> Point3<i32> {
        let dimension = CHUNK_DIMENSION as i32;
        Point3::new(
            self.x.saturating_mul(dimension),
            self.y.saturating_mul(dimension),
            self.z.saturating_mul(dimension),
        )
    }

    /// Returns this coordinate shifted by the given chunk offsets, saturating
    /// at the `i32` bounds.
    pub const fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.z.saturating_add(dz),
        )
    }

    /// Returns this coordinate shifted by the given chunk offsets, or `None`
    /// if the result is not representable.
    pub fn checked_offset(&self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
            self.z.checked_add(dz)?,
        ))
    }

    /// Iterates the inclusive box `[-d, d] x [-h, h] x [-d, d]` around `center`.
    ///
    /// Iteration order is X outermost, then Y, then Z. Coordinates outside the
    /// `i32` range are skipped.
    pub fn range_around(
        center: ChunkCoordinate,
        render_distance: i32,
        render_height: i32,
    ) -> impl Iterator<Item = ChunkCoordinate> {
        (-render_distance..=render_distance).flat_map(move |dx| {
            (-render_height..=render_height).flat_map(move |dy| {
                (-render_distance..=render_distance)
                    .filter_map(move |dz| center.checked_offset(dx, dy, dz))
            })
        })
    }
}

impl fmt::Display for ChunkCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<Point3<i32>> for ChunkCoordinate {
    fn from(point: Point3<i32>) -> Self {
        Self::new(point.x, point.y, point.z)
    }
}

impl From<ChunkCoordinate> for Point3<i32> {
    fn from(coordinate: ChunkCoordinate) -> Self {
        Point3::new(coordinate.x, coordinate.y, coordinate.z)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn world_position_uses_floor_division() {
        assert_eq!(
            ChunkCoordinate::from_world_position(Point3::new(0.0, 0.0, 0.0)),
            ChunkCoordinate::new(0, 0, 0)
        );
        assert_eq!(
            ChunkCoordinate::from_world_position(Point3::new(31.9, 32.0, 64.5)),
            ChunkCoordinate::new(0, 1, 2)
        );
        assert_eq!(
            ChunkCoordinate::from_world_position(Point3::new(-0.5, -32.0, -33.0)),
            ChunkCoordinate::new(-1, -1, -2)
        );
    }

    #[test]
    fn world_origin_scales_by_chunk_dimension() {
        let coordinate = ChunkCoordinate::new(1, -2, 3);
        assert_eq!(coordinate.world_origin(), Point3::new(32.0, -64.0, 96.0));
        assert_eq!(coordinate.block_origin(), Point3::new(32, -64, 96));
    }

    #[test]
    fn range_covers_inclusive_box_without_duplicates() {
        let center = ChunkCoordinate::new(5, -1, 2);
        let coordinates: Vec<_> = ChunkCoordinate::range_around(center, 2, 1).collect();
        let unique: HashSet<_> = coordinates.iter().copied().collect();

        assert_eq!(coordinates.len(), 5 * 3 * 5);
        assert_eq!(unique.len(), coordinates.len());
        assert!(unique.contains(&center.offset(-2, -1, -2)));
        assert!(unique.contains(&center.offset(2, 1, 2)));
        assert!(!unique.contains(&center.offset(0, 2, 0)));
    }

    #[test]
    fn zero_radius_yields_only_the_center() {
        let center = ChunkCoordinate::new(0, 0, 0);
        let coordinates: Vec<_> = ChunkCoordinate::range_around(center, 0, 0).collect();
        assert_eq!(coordinates, vec![center]);
    }

    #[test]
    fn converts_to_and_from_points() {
        let coordinate = ChunkCoordinate::new(4, 5, 6);
        let point: Point3<i32> = coordinate.into();
        assert_eq!(ChunkCoordinate::from(point), coordinate);
        assert_eq!(coordinate.to_string(), "(4, 5, 6)");
    }

    #[test]
    fn far_positions_clamp_to_the_coordinate_limit() {
        let coordinate =
            ChunkCoordinate::from_world_position(Point3::new(1.0e12, -1.0e12, f32::NAN));
        assert_eq!(
            coordinate,
            ChunkCoordinate::new(CHUNK_COORDINATE_LIMIT, -CHUNK_COORDINATE_LIMIT, 0)
        );

        // The farthest chunk in range of a clamped observer still has i32 blocks.
        let edge = coordinate.offset(MAX_RENDER_RADIUS, 0, 0);
        let last_block = edge.block_origin().x.checked_add(CHUNK_DIMENSION as i32 - 1);
        assert!(last_block.is_some());
        assert!(edge.block_origin().x < i32::MAX - CHUNK_DIMENSION as i32);
    }

    #[test]
    fn shifting_past_the_i32_range_saturates_or_is_skipped() {
        let edge = ChunkCoordinate::new(i32::MAX, 0, i32::MIN);

        assert_eq!(edge.offset(1, 0, -1), edge);
        assert_eq!(edge.checked_offset(1, 0, 0), None);
        assert_eq!(edge.block_origin(), Point3::new(i32::MAX, 0, i32::MIN));

        let coordinates: Vec<_> = ChunkCoordinate::range_around(edge, 1, 0).collect();
        // Only dx <= 0 and dz >= 0 are representable.
        assert_eq!(coordinates.len(), 4);
        assert!(coordinates.contains(&ChunkCoordinate::new(i32::MAX - 1, 0, i32::MIN + 1)));
    }
}
