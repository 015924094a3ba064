//! # Block Side Module
//!
//! This module defines the six faces of a voxel block together with the quad
//! template, outward normal and directional shade used when meshing each face.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The discriminants index [`FACE_TEMPLATES`] and match the order returned by
/// [`BlockSide::all`].
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The north face (facing negative Z)
    NORTH = 0,

    /// The south face (facing positive Z)
    SOUTH = 1,

    /// The west face (facing negative X)
    WEST = 2,

    /// The east face (facing positive X)
    EAST = 3,

    /// The bottom face (facing negative Y)
    BOTTOM = 4,

    /// The top face (facing positive Y)
    TOP = 5,
}

/// One corner of a face quad: a position offset inside the unit cube and its
/// texture coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceCorner {
    /// Offset from the block's minimum corner.
    pub position: [f32; 3],
    /// Texture coordinate of this corner.
    pub tex_coords: [f32; 2],
}

const fn corner(x: f32, y: f32, z: f32, u: f32, v: f32) -> FaceCorner {
    FaceCorner {
        position: [x, y, z],
        tex_coords: [u, v],
    }
}

/// Corner templates for each side, indexed by `BlockSide as usize`.
///
/// Combined with [`FACE_INDICES`], every quad winds clockwise when viewed
/// from outside the block.
#[rustfmt::skip]
pub static FACE_TEMPLATES: [[FaceCorner; 4]; 6] = [
    // NORTH (-z)
    [corner(0.0, 0.0, 0.0, 0.0, 0.0), corner(1.0, 0.0, 0.0, 1.0, 0.0),
     corner(1.0, 1.0, 0.0, 1.0, 1.0), corner(0.0, 1.0, 0.0, 0.0, 1.0)],
    // SOUTH (+z)
    [corner(0.0, 1.0, 1.0, 1.0, 1.0), corner(1.0, 1.0, 1.0, 0.0, 1.0),
     corner(1.0, 0.0, 1.0, 0.0, 0.0), corner(0.0, 0.0, 1.0, 1.0, 0.0)],
    // WEST (-x)
    [corner(0.0, 1.0, 0.0, 1.0, 1.0), corner(0.0, 1.0, 1.0, 0.0, 1.0),
     corner(0.0, 0.0, 1.0, 0.0, 0.0), corner(0.0, 0.0, 0.0, 1.0, 0.0)],
    // EAST (+x)
    [corner(1.0, 0.0, 0.0, 0.0, 0.0), corner(1.0, 0.0, 1.0, 1.0, 0.0),
     corner(1.0, 1.0, 1.0, 1.0, 1.0), corner(1.0, 1.0, 0.0, 0.0, 1.0)],
    // BOTTOM (-y)
    [corner(0.0, 0.0, 0.0, 0.0, 0.0), corner(0.0, 0.0, 1.0, 1.0, 0.0),
     corner(1.0, 0.0, 1.0, 1.0, 1.0), corner(1.0, 0.0, 0.0, 0.0, 1.0)],
    // TOP (+y)
    [corner(1.0, 1.0, 0.0, 0.0, 1.0), corner(1.0, 1.0, 1.0, 1.0, 1.0),
     corner(0.0, 1.0, 1.0, 1.0, 0.0), corner(0.0, 1.0, 0.0, 0.0, 0.0)],
];

/// Two triangles over a face's four corners.
pub const FACE_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

impl BlockSide {
    /// Returns an array containing all six block faces in discriminant order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::NORTH,
            BlockSide::SOUTH,
            BlockSide::WEST,
            BlockSide::EAST,
            BlockSide::BOTTOM,
            BlockSide::TOP,
        ]
    }

    /// Unit vector pointing out of the block through this face.
    pub fn normal(&self) -> Vector3<i32> {
        match self {
            BlockSide::NORTH => Vector3::new(0, 0, -1),
            BlockSide::SOUTH => Vector3::new(0, 0, 1),
            BlockSide::WEST => Vector3::new(-1, 0, 0),
            BlockSide::EAST => Vector3::new(1, 0, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
        }
    }

    /// Fixed brightness multiplier approximating a light from above.
    pub fn shade(&self) -> f32 {
        match self {
            BlockSide::TOP => 1.0,
            BlockSide::NORTH | BlockSide::SOUTH => 0.8,
            BlockSide::WEST | BlockSide::EAST => 0.7,
            BlockSide::BOTTOM => 0.5,
        }
    }

    /// The quad corners for this face.
    pub fn face_template(&self) -> &'static [FaceCorner; 4] {
        &FACE_TEMPLATES[*self as usize]
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;

    fn corner_vec(corner: &FaceCorner) -> Vector3<f32> {
        Vector3::new(corner.position[0], corner.position[1], corner.position[2])
    }

    #[test]
    fn every_corner_lies_on_its_face_plane() {
        for side in BlockSide::all() {
            let normal = side.normal().cast::<f32>().unwrap();
            // The face plane is at 1.0 along positive normals and 0.0 along negative ones.
            let plane = if normal.x + normal.y + normal.z > 0.0 { 1.0 } else { 0.0 };
            for corner in side.face_template() {
                let along = corner_vec(corner).dot(normal).abs();
                assert_eq!(along, plane, "{side:?} corner {corner:?} off plane");
            }
        }
    }

    #[test]
    fn triangles_wind_clockwise_from_outside() {
        for side in BlockSide::all() {
            let template = side.face_template();
            let outward = side.normal().cast::<f32>().unwrap();
            for triangle in FACE_INDICES.chunks(3) {
                let a = corner_vec(&template[triangle[0] as usize]);
                let b = corner_vec(&template[triangle[1] as usize]);
                let c = corner_vec(&template[triangle[2] as usize]);
                let ccw_normal = (b - a).cross(c - a);
                assert!(
                    ccw_normal.dot(outward) < 0.0,
                    "{side:?} triangle {triangle:?} is not clockwise from outside"
                );
            }
        }
    }

    #[test]
    fn shading_is_brightest_on_top_and_darkest_below() {
        assert!(BlockSide::TOP.shade() > BlockSide::NORTH.shade());
        assert_eq!(BlockSide::NORTH.shade(), BlockSide::SOUTH.shade());
        assert!(BlockSide::NORTH.shade() > BlockSide::EAST.shade());
        assert_eq!(BlockSide::EAST.shade(), BlockSide::WEST.shade());
        assert!(BlockSide::EAST.shade() > BlockSide::BOTTOM.shade());
    }
}
