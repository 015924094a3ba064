//! # Voxel Task System
//!
//! Work units run by the background generation worker. They own everything
//! they need and touch shared state only through the registry lock.

pub mod chunk_generation_task;
