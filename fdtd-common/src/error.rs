//! Error types for mesh model, material, and configuration handling.

use thiserror::Error;

/// Errors that can occur while loading or validating simulation inputs.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Flat vertex coordinate list is not a whole number of 3D points.
    #[error("vertex list length ({count}) is not a multiple of 3")]
    VertexCountNotTriples {
        /// Number of scalar coordinates provided
        count: usize,
    },

    /// Flat triangle index list is not a whole number of triangles.
    #[error("index list length ({count}) is not a multiple of 3")]
    IndexCountNotTriples {
        /// Number of indices provided
        count: usize,
    },

    /// A triangle references a vertex that does not exist.
    #[error("triangle index {index} out of range (mesh has {vertex_count} vertices)")]
    IndexOutOfRange {
        /// The offending zero-based vertex index
        index: usize,
        /// Number of vertices in the mesh
        vertex_count: usize,
    },

    /// The mesh has no triangles.
    #[error("mesh has no triangles")]
    EmptyMesh,

    /// `layers_of_triangles` does not cover every triangle exactly once.
    #[error("layer assignment length ({layers}) does not match triangle count ({triangles})")]
    LayerLengthMismatch {
        /// Entries in `layers_of_triangles`
        layers: usize,
        /// Triangles in the mesh
        triangles: usize,
    },

    /// A triangle is assigned to a layer missing from `layer_names`.
    #[error("triangle assigned to unknown layer {name:?}")]
    UnknownLayer {
        /// The unlisted layer name
        name: String,
    },

    /// Material matrix row count disagrees with the mesh triangle count.
    #[error("material matrix has {rows} rows but mesh has {triangles} triangles")]
    MaterialShapeMismatch {
        /// Rows in the material matrix
        rows: usize,
        /// Triangles in the mesh
        triangles: usize,
    },

    /// A flattened coefficient list has the wrong length.
    #[error("coefficient list length mismatch: expected {expected}, got {got}")]
    CoefficientCountMismatch {
        /// Expected scalar count (rows × coefficients per row)
        expected: usize,
        /// Actual scalar count provided
        got: usize,
    },

    /// A coefficient is outside its physical range.
    #[error("invalid {name} coefficient: {value} (must be in [0, 1])")]
    CoefficientOutOfRange {
        /// Which coefficient kind was rejected
        name: &'static str,
        /// The rejected value
        value: f64,
    },

    /// A scalar configuration parameter failed validation.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// The rejected value
        value: f64,
    },

    /// The configuration lists no sound sources.
    #[error("configuration has no sources")]
    NoSources,

    /// The configuration lists no receivers.
    #[error("configuration has no receivers")]
    NoReceivers,

    /// Underlying file I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for model and configuration operations.
pub type Result<T> = std::result::Result<T, ModelError>;

impl ModelError {
    /// Returns `true` if this error concerns mesh geometry.
    pub fn is_geometry_error(&self) -> bool {
        matches!(
            self,
            ModelError::VertexCountNotTriples { .. }
                | ModelError::IndexCountNotTriples { .. }
                | ModelError::IndexOutOfRange { .. }
                | ModelError::EmptyMesh
        )
    }

    /// Returns `true` if this error concerns layer or material assignment.
    pub fn is_material_error(&self) -> bool {
        matches!(
            self,
            ModelError::LayerLengthMismatch { .. }
                | ModelError::UnknownLayer { .. }
                | ModelError::MaterialShapeMismatch { .. }
                | ModelError::CoefficientCountMismatch { .. }
                | ModelError::CoefficientOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::IndexOutOfRange {
            index: 9,
            vertex_count: 8,
        };
        assert_eq!(
            err.to_string(),
            "triangle index 9 out of range (mesh has 8 vertices)"
        );
    }

    #[test]
    fn test_error_categories() {
        let geo = ModelError::EmptyMesh;
        let mat = ModelError::UnknownLayer {
            name: "ceiling".to_string(),
        };
        assert!(geo.is_geometry_error());
        assert!(!geo.is_material_error());
        assert!(mat.is_material_error());
        assert!(!mat.is_geometry_error());
    }
}
