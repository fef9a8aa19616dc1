//! Error types for the FDTD engine.

use fdtd_common::ModelError;
use thiserror::Error;

/// Errors that can occur while setting up or running a simulation.
#[derive(Debug, Error)]
pub enum FdtdError {
    /// Input model, material, or configuration error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A run was requested before any geometry was set.
    #[error("no geometry set")]
    GeometryNotSet,

    /// A source or receiver lies outside the simulation domain.
    #[error("{what} position ({x}, {y}, {z}) outside the simulation domain")]
    PositionOutsideDomain {
        /// What was being placed ("source" or "receiver")
        what: &'static str,
        /// X coordinate in meters
        x: f64,
        /// Y coordinate in meters
        y: f64,
        /// Z coordinate in meters
        z: f64,
    },

    /// A source or receiver lies inside solid geometry.
    #[error("{what} position ({x}, {y}, {z}) is inside solid geometry")]
    PositionInSolid {
        /// What was being placed ("source" or "receiver")
        what: &'static str,
        /// X coordinate in meters
        x: f64,
        /// Y coordinate in meters
        y: f64,
        /// Z coordinate in meters
        z: f64,
    },

    /// A capture slice index is outside the voxel grid.
    #[error("capture slice {slice} out of range (axis has {extent} cells)")]
    SliceOutOfRange {
        /// Requested slice index
        slice: usize,
        /// Cells along the slice's normal axis
        extent: usize,
    },

    /// A response was requested for a receiver that does not exist.
    #[error("receiver index {index} out of range ({count} receivers)")]
    ReceiverIndexOutOfRange {
        /// Requested receiver index
        index: usize,
        /// Number of registered receivers
        count: usize,
    },

    /// Responses were requested before any run mode was executed.
    #[error("no simulation has been run yet")]
    NotRun,
}

/// A specialized `Result` type for FDTD operations.
pub type Result<T> = std::result::Result<T, FdtdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FdtdError::SliceOutOfRange {
            slice: 80,
            extent: 64,
        };
        assert_eq!(
            err.to_string(),
            "capture slice 80 out of range (axis has 64 cells)"
        );
    }

    #[test]
    fn test_model_error_passthrough() {
        let err: FdtdError = ModelError::EmptyMesh.into();
        assert_eq!(err.to_string(), "mesh has no triangles");
    }
}
