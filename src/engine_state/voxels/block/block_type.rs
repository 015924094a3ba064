//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.

use super::block_side::BlockSide;

/// Enumerates all possible block types in the voxel world.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// An air block, which is non-solid and transparent.
    #[default]
    AIR,

    /// A basic dirt block, the only solid type terrain generation places.
    DIRT,
}

/// Maps each solid block type to its texture array layer for each face.
///
/// The outer array is indexed by `BlockType as usize - 1`; the inner array
/// by `BlockSide as usize`.
pub static BLOCK_TYPE_TO_TEXTURE_LAYERS: [[u32; 6]; 1] = [
    [0, 0, 0, 0, 0, 0], // DIRT
];

impl BlockType {
    /// Returns `true` for every block type that occludes its neighbours.
    pub fn is_solid(&self) -> bool {
        *self != BlockType::AIR
    }

    /// The texture array layer used on the given side of this block.
    ///
    /// Air has no texture and reports layer 0.
    pub fn texture_layer(&self, side: BlockSide) -> u32 {
        match self {
            BlockType::AIR => 0,
            solid => BLOCK_TYPE_TO_TEXTURE_LAYERS[*solid as usize - 1][side as usize],
        }
    }

    /// Maps a solidity bit back to a block type.
    pub fn from_solid(solid: bool) -> Self {
        if solid {
            BlockType::DIRT
        } else {
            BlockType::AIR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_air_is_transparent() {
        assert!(!BlockType::AIR.is_solid());
        assert!(BlockType::DIRT.is_solid());
        assert_eq!(BlockType::default(), BlockType::AIR);
    }

    #[test]
    fn dirt_uses_layer_zero_on_every_side() {
        for side in BlockSide::all() {
            assert_eq!(BlockType::DIRT.texture_layer(side), 0);
        }
    }
}
