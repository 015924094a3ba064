//! # Block Module
//!
//! Block type definitions and the per-face data (quad templates, normals and
//! shading) the mesher needs.

pub mod block_side;
pub mod block_type;

pub use block_side::BlockSide;
pub use block_type::BlockType;
