//! Surface materials and boundary admittance
//!
//! Boundaries are characterized by a normalized specific admittance derived
//! from either a pressure reflection coefficient or an energy absorption
//! coefficient. Materials are stored as one coefficient row per triangle;
//! the row width leaves room for two variables per ten octave bands, of
//! which only the first slot (the broadband admittance) is currently used.

use crate::{ModelError, Result};
use serde::{Deserialize, Serialize};

/// Coefficients stored per triangle (2 variables × 10 octave bands reserved)
pub const COEFS_PER_TRIANGLE: usize = 20;

/// Map a pressure reflection coefficient to a normalized admittance
///
/// `R = 1` (total reflection) maps to 0; `R → 0` approaches 1.
pub fn reflection_to_admittance(r: f64) -> f64 {
    (1.0 - r) / (1.0 + r)
}

/// Map an energy absorption coefficient to a normalized admittance
///
/// Defined through the reflection mapping with `R = sqrt(1 - alpha)`.
pub fn absorption_to_admittance(alpha: f64) -> f64 {
    reflection_to_admittance((1.0 - alpha).sqrt())
}

/// A surface coefficient as specified in configuration files
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SurfaceCoefficient {
    /// Pressure reflection coefficient in [0, 1]
    #[serde(rename = "reflection")]
    Reflection {
        /// The reflection coefficient R
        coefficient: f64,
    },
    /// Energy absorption coefficient in [0, 1]
    #[serde(rename = "absorption")]
    Absorption {
        /// The absorption coefficient alpha
        coefficient: f64,
    },
    /// Normalized admittance given directly
    #[serde(rename = "admittance")]
    Admittance {
        /// The admittance value
        value: f64,
    },
}

impl SurfaceCoefficient {
    /// Resolve to a normalized admittance, validating the input range
    pub fn to_admittance(self) -> Result<f64> {
        match self {
            SurfaceCoefficient::Reflection { coefficient } => {
                if !(0.0..=1.0).contains(&coefficient) {
                    return Err(ModelError::CoefficientOutOfRange {
                        name: "reflection",
                        value: coefficient,
                    });
                }
                Ok(reflection_to_admittance(coefficient))
            }
            SurfaceCoefficient::Absorption { coefficient } => {
                if !(0.0..=1.0).contains(&coefficient) {
                    return Err(ModelError::CoefficientOutOfRange {
                        name: "absorption",
                        value: coefficient,
                    });
                }
                Ok(absorption_to_admittance(coefficient))
            }
            SurfaceCoefficient::Admittance { value } => {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ModelError::CoefficientOutOfRange {
                        name: "admittance",
                        value,
                    });
                }
                Ok(value)
            }
        }
    }
}

impl Default for SurfaceCoefficient {
    fn default() -> Self {
        // Nearly rigid surface, the conventional starting point
        SurfaceCoefficient::Reflection { coefficient: 0.99 }
    }
}

/// Per-triangle material coefficient matrix (N × [`COEFS_PER_TRIANGLE`])
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialMatrix {
    rows: Vec<[f64; COEFS_PER_TRIANGLE]>,
}

impl MaterialMatrix {
    /// Create a matrix with the same admittance on every triangle
    pub fn uniform(triangle_count: usize, admittance: f64) -> Self {
        let mut row = [0.0; COEFS_PER_TRIANGLE];
        row[0] = admittance;
        Self {
            rows: vec![row; triangle_count],
        }
    }

    /// Rebuild a matrix from a flattened row-major coefficient list
    pub fn from_flat(coefficients: &[f64], triangle_count: usize, coefs: usize) -> Result<Self> {
        if coefs != COEFS_PER_TRIANGLE {
            return Err(ModelError::CoefficientCountMismatch {
                expected: COEFS_PER_TRIANGLE,
                got: coefs,
            });
        }
        if coefficients.len() != triangle_count * COEFS_PER_TRIANGLE {
            return Err(ModelError::CoefficientCountMismatch {
                expected: triangle_count * COEFS_PER_TRIANGLE,
                got: coefficients.len(),
            });
        }
        let rows = coefficients
            .chunks_exact(COEFS_PER_TRIANGLE)
            .map(|c| {
                let mut row = [0.0; COEFS_PER_TRIANGLE];
                row.copy_from_slice(c);
                row
            })
            .collect();
        Ok(Self { rows })
    }

    /// Number of triangle rows
    pub fn triangle_count(&self) -> usize {
        self.rows.len()
    }

    /// Assign an admittance to a set of triangles (e.g. one mesh layer)
    pub fn set_layer(&mut self, triangles: &[usize], admittance: f64) -> Result<()> {
        let rows = self.rows.len();
        for &t in triangles {
            if t >= rows {
                return Err(ModelError::MaterialShapeMismatch {
                    rows,
                    triangles: t + 1,
                });
            }
            self.rows[t][0] = admittance;
        }
        Ok(())
    }

    /// Admittance of a triangle (slot 0 of its row)
    pub fn admittance(&self, triangle: usize) -> f64 {
        self.rows[triangle][0]
    }

    /// Full coefficient row of a triangle
    pub fn row(&self, triangle: usize) -> &[f64; COEFS_PER_TRIANGLE] {
        &self.rows[triangle]
    }

    /// Flatten to the row-major wire shape consumed by the solver facade
    pub fn flatten(&self) -> Vec<f64> {
        self.rows.iter().flat_map(|r| r.iter().copied()).collect()
    }
}
