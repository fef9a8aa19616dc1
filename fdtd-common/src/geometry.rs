//! Mesh model loading from JSON
//!
//! The model format is a flat JSON object with four keys: `vertices`
//! (x, y, z triples in meters), `indices` (zero-based triangle index
//! triples), `layers_of_triangles` (one layer name per triangle), and
//! `layer_names` (the set of valid layer names). Any format that can produce
//! a vertex list and a triangle list can be converted to this one.

use crate::types::{Point3D, TriangleMesh};
use crate::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A triangle mesh model with named surface layers, as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshModel {
    /// Flattened vertex coordinates (x, y, z per vertex), in meters
    pub vertices: Vec<f64>,
    /// Flattened zero-based triangle vertex indices
    pub indices: Vec<usize>,
    /// Layer name of each triangle
    pub layers_of_triangles: Vec<String>,
    /// All layer names used by the model
    pub layer_names: Vec<String>,
}

impl MeshModel {
    /// Load a model from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    /// Parse a model from a JSON string and validate it
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self> {
        let model: MeshModel = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Number of triangles described by the index list
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check internal consistency of the model
    pub fn validate(&self) -> Result<()> {
        let mesh = self.to_mesh()?;
        if self.layers_of_triangles.len() != mesh.triangle_count() {
            return Err(ModelError::LayerLengthMismatch {
                layers: self.layers_of_triangles.len(),
                triangles: mesh.triangle_count(),
            });
        }
        for name in &self.layers_of_triangles {
            if !self.layer_names.contains(name) {
                return Err(ModelError::UnknownLayer { name: name.clone() });
            }
        }
        Ok(())
    }

    /// Convert to a validated [`TriangleMesh`]
    pub fn to_mesh(&self) -> Result<TriangleMesh> {
        TriangleMesh::from_flat(&self.indices, &self.vertices)
    }

    /// Group triangle indices by layer name
    ///
    /// Every declared layer gets an entry, even when no triangle uses it.
    pub fn layers(&self) -> BTreeMap<String, Vec<usize>> {
        let mut layers: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for name in &self.layer_names {
            layers.entry(name.clone()).or_default();
        }
        for (i, name) in self.layers_of_triangles.iter().enumerate() {
            if let Some(tris) = layers.get_mut(name) {
                tris.push(i);
            }
        }
        layers
    }

    /// Centroid of the whole model, useful for placing default sources
    pub fn centroid(&self) -> Result<Point3D> {
        let mesh = self.to_mesh()?;
        let (lo, hi) = mesh.bounds();
        Ok((lo + hi).scale(0.5))
    }
}

/// Build an axis-aligned box model with the conventional room layers
///
/// The box spans from the origin to (`width`, `depth`, `height`) and carries
/// the layers `floor`, `ceiling`, and `walls`. Used by the demo configuration
/// and the test suites.
pub fn box_model(width: f64, depth: f64, height: f64) -> MeshModel {
    let (w, d, h) = (width, depth, height);
    #[rustfmt::skip]
    let vertices = vec![
        0.0, 0.0, 0.0,
        w,   0.0, 0.0,
        w,   d,   0.0,
        0.0, d,   0.0,
        0.0, 0.0, h,
        w,   0.0, h,
        w,   d,   h,
        0.0, d,   h,
    ];
    // Two triangles per face, outward winding
    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1, 0, 3, 2, // floor (z = 0)
        4, 5, 6, 4, 6, 7, // ceiling (z = h)
        0, 1, 5, 0, 5, 4, // front (y = 0)
        2, 3, 7, 2, 7, 6, // back (y = d)
        3, 0, 4, 3, 4, 7, // left (x = 0)
        1, 2, 6, 1, 6, 5, // right (x = w)
    ];
    let layers_of_triangles = vec![
        "floor", "floor", "ceiling", "ceiling", "walls", "walls", "walls", "walls", "walls",
        "walls", "walls", "walls",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    MeshModel {
        vertices,
        indices,
        layers_of_triangles,
        layer_names: vec![
            "floor".to_string(),
            "ceiling".to_string(),
            "walls".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX_JSON: &str = r#"{
        "vertices": [0.0, 0.0, 0.0,  1.0, 0.0, 0.0,  1.0, 1.0, 0.0,  0.0, 1.0, 0.0],
        "indices": [0, 1, 2,  0, 2, 3],
        "layers_of_triangles": ["floor", "floor"],
        "layer_names": ["floor", "walls"]
    }"#;

    #[test]
    fn test_parse_model() {
        let model = MeshModel::from_str(BOX_JSON).unwrap();
        assert_eq!(model.triangle_count(), 2);
        let mesh = model.to_mesh().unwrap();
        assert_eq!(mesh.vertices.len(), 4);
    }

    #[test]
    fn test_layer_grouping() {
        let model = MeshModel::from_str(BOX_JSON).unwrap();
        let layers = model.layers();
        assert_eq!(layers["floor"], vec![0, 1]);
        assert!(layers["walls"].is_empty());
    }

    #[test]
    fn test_unknown_layer_rejected() {
        let bad = BOX_JSON.replace("\"floor\", \"floor\"", "\"floor\", \"roof\"");
        let err = MeshModel::from_str(&bad).unwrap_err();
        assert!(matches!(err, ModelError::UnknownLayer { .. }));
    }

    #[test]
    fn test_layer_length_mismatch_rejected() {
        let bad = BOX_JSON.replace("[\"floor\", \"floor\"]", "[\"floor\"]");
        let err = MeshModel::from_str(&bad).unwrap_err();
        assert!(matches!(
            err,
            ModelError::LayerLengthMismatch {
                layers: 1,
                triangles: 2
            }
        ));
    }

    #[test]
    fn test_box_model_layers() {
        let model = box_model(2.0, 3.0, 2.5);
        model.validate().unwrap();
        assert_eq!(model.triangle_count(), 12);
        let layers = model.layers();
        assert_eq!(layers["floor"].len(), 2);
        assert_eq!(layers["ceiling"].len(), 2);
        assert_eq!(layers["walls"].len(), 8);
    }

    #[test]
    fn test_model_centroid() {
        let model = box_model(2.0, 4.0, 6.0);
        let c = model.centroid().unwrap();
        assert_eq!(c, Point3D::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_box_model_bounds() {
        let model = box_model(2.0, 3.0, 2.5);
        let mesh = model.to_mesh().unwrap();
        let (lo, hi) = mesh.bounds();
        assert_eq!(lo, Point3D::zero());
        assert_eq!(hi, Point3D::new(2.0, 3.0, 2.5));
    }
}
