//! Engine internals: voxel grid, voxelization, update schemes, domain
//! partitioning, stepping, and slice captures.
//!
//! Pressure arrays are indexed `[z, y, x]` so that slabs along z are
//! contiguous in memory; the partitioner splits along that axis.

pub mod capture;
pub mod engine;
pub mod grid;
pub mod partition;
pub mod scheme;
pub mod voxelizer;

pub use capture::extract_frame;
pub use engine::Engine;
pub use grid::{CellKind, GridScalar, VoxelGrid};
pub use voxelizer::voxelize;
