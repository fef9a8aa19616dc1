//! Basic types for FDTD room acoustics simulation

use serde::{Deserialize, Serialize};

/// 3D point in space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point3D {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Point3D {
    /// Create a new 3D point
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Create a zero point (origin)
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Calculate Euclidean distance to another point
    pub fn distance_to(&self, other: &Point3D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Compute dot product with another point (treating as vectors)
    pub fn dot(&self, other: &Point3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Compute cross product with another point (treating as vectors)
    pub fn cross(&self, other: &Point3D) -> Point3D {
        Point3D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Compute the length (magnitude) of the vector
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Normalize the vector to unit length
    pub fn normalize(&self) -> Option<Point3D> {
        let len = self.length();
        if len > 1e-10 {
            Some(Point3D {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
            })
        } else {
            None
        }
    }

    /// Scale the vector by a scalar
    pub fn scale(&self, s: f64) -> Point3D {
        Point3D {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Component-wise minimum with another point
    pub fn min(&self, other: &Point3D) -> Point3D {
        Point3D {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
            z: self.z.min(other.z),
        }
    }

    /// Component-wise maximum with another point
    pub fn max(&self, other: &Point3D) -> Point3D {
        Point3D {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
            z: self.z.max(other.z),
        }
    }
}

impl std::ops::Add for Point3D {
    type Output = Point3D;
    fn add(self, other: Point3D) -> Point3D {
        Point3D {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl std::ops::Sub for Point3D {
    type Output = Point3D;
    fn sub(self, other: Point3D) -> Point3D {
        Point3D {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl std::ops::Mul<f64> for Point3D {
    type Output = Point3D;
    fn mul(self, s: f64) -> Point3D {
        Point3D {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }
}

/// Triangle surface mesh
///
/// Vertices are in meters; triangle indices are zero-based. Both invariants
/// are checked at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Vertex positions
    pub vertices: Vec<Point3D>,
    /// Triangles as triples of zero-based vertex indices
    pub triangles: Vec<[usize; 3]>,
}

impl TriangleMesh {
    /// Build a mesh from flattened coordinate and index lists
    ///
    /// `vertices` holds x, y, z triples; `indices` holds zero-based vertex
    /// index triples, one per triangle. These are the wire shapes the solver
    /// facade consumes.
    pub fn from_flat(indices: &[usize], vertices: &[f64]) -> crate::Result<Self> {
        if vertices.len() % 3 != 0 {
            return Err(crate::ModelError::VertexCountNotTriples {
                count: vertices.len(),
            });
        }
        if indices.len() % 3 != 0 {
            return Err(crate::ModelError::IndexCountNotTriples {
                count: indices.len(),
            });
        }

        let vertices: Vec<Point3D> = vertices
            .chunks_exact(3)
            .map(|c| Point3D::new(c[0], c[1], c[2]))
            .collect();

        let triangles: Vec<[usize; 3]> = indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();

        Self::new(vertices, triangles)
    }

    /// Build a mesh from vertex and triangle lists, validating indices
    pub fn new(vertices: Vec<Point3D>, triangles: Vec<[usize; 3]>) -> crate::Result<Self> {
        if triangles.is_empty() {
            return Err(crate::ModelError::EmptyMesh);
        }
        for tri in &triangles {
            for &idx in tri {
                if idx >= vertices.len() {
                    return Err(crate::ModelError::IndexOutOfRange {
                        index: idx,
                        vertex_count: vertices.len(),
                    });
                }
            }
        }
        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Corner points of a triangle
    pub fn triangle_points(&self, idx: usize) -> [Point3D; 3] {
        let t = self.triangles[idx];
        [self.vertices[t[0]], self.vertices[t[1]], self.vertices[t[2]]]
    }

    /// Centroid of a triangle
    pub fn triangle_centroid(&self, idx: usize) -> Point3D {
        let [p0, p1, p2] = self.triangle_points(idx);
        (p0 + p1 + p2).scale(1.0 / 3.0)
    }

    /// Unit normal of a triangle, `None` for degenerate triangles
    pub fn triangle_normal(&self, idx: usize) -> Option<Point3D> {
        let [p0, p1, p2] = self.triangle_points(idx);
        (p1 - p0).cross(&(p2 - p0)).normalize()
    }

    /// Area of a triangle
    pub fn triangle_area(&self, idx: usize) -> f64 {
        let [p0, p1, p2] = self.triangle_points(idx);
        (p1 - p0).cross(&(p2 - p0)).length() * 0.5
    }

    /// Axis-aligned bounding box as (min, max) corners
    pub fn bounds(&self) -> (Point3D, Point3D) {
        let mut lo = Point3D::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut hi = Point3D::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for v in &self.vertices {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        (lo, hi)
    }
}

/// Constants for room acoustics
pub mod constants {
    /// Speed of sound at 20°C in m/s
    pub const SPEED_OF_SOUND_20C: f64 = 343.0;

    /// Courant number for the 3D SRL scheme, 1/sqrt(3)
    pub const SRL_COURANT: f64 = 0.577_350_269_189_625_8;

    /// Squared Courant number, exactly 1/3
    pub const SRL_COURANT_SQ: f64 = 1.0 / 3.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_distance() {
        let p1 = Point3D::new(0.0, 0.0, 0.0);
        let p2 = Point3D::new(3.0, 4.0, 0.0);
        assert_relative_eq!(p1.distance_to(&p2), 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_cross_product() {
        let x = Point3D::new(1.0, 0.0, 0.0);
        let y = Point3D::new(0.0, 1.0, 0.0);
        let z = x.cross(&y);
        assert_relative_eq!(z.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(z.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mesh_from_flat() {
        let vertices = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let indices = vec![0, 1, 2];
        let mesh = TriangleMesh::from_flat(&indices, &vertices).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_relative_eq!(mesh.triangle_area(0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_mesh_rejects_bad_indices() {
        let vertices = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let err = TriangleMesh::from_flat(&[0, 1, 3], &vertices).unwrap_err();
        assert!(matches!(
            err,
            crate::ModelError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        ));
    }

    #[test]
    fn test_mesh_rejects_ragged_input() {
        assert!(TriangleMesh::from_flat(&[0, 1], &[0.0; 9]).is_err());
        assert!(TriangleMesh::from_flat(&[0, 1, 2], &[0.0; 8]).is_err());
    }

    #[test]
    fn test_mesh_bounds() {
        let vertices = vec![0.0, 0.0, 0.0, 2.0, 1.0, 0.5, -1.0, 0.0, 3.0];
        let mesh = TriangleMesh::from_flat(&[0, 1, 2], &vertices).unwrap();
        let (lo, hi) = mesh.bounds();
        assert_eq!(lo, Point3D::new(-1.0, 0.0, 0.0));
        assert_eq!(hi, Point3D::new(2.0, 1.0, 3.0));
    }

    #[test]
    fn test_srl_courant() {
        assert_relative_eq!(
            constants::SRL_COURANT * constants::SRL_COURANT,
            constants::SRL_COURANT_SQ,
            epsilon = 1e-15
        );
    }
}
