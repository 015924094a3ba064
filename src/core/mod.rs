//! # Core Module
//!
//! This module provides the concurrency primitives shared by the streaming
//! pipeline and the render loop.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource behind a single mutex
//!
//! ## Usage
//! ```rust
//! use voxel_streaming::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.lock() += 1;
//! assert_eq!(*counter.lock(), 1);
//! ```

pub mod mt_resource;

pub use mt_resource::MtResource;
