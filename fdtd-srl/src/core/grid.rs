//! Voxel grid representation of the simulation domain

use crate::{FdtdError, Result};
use fdtd_common::{constants, Point3D};
use ndarray::Array3;
use num_traits::{Float, FromPrimitive, ToPrimitive};

/// Scalar bound for the pressure grids: the engine is generic over `f32`
/// (visualization, early reflections) and `f64` (impulse responses).
pub trait GridScalar:
    Float + FromPrimitive + ToPrimitive + Send + Sync + std::fmt::Debug + 'static
{
}

impl<T> GridScalar for T where
    T: Float + FromPrimitive + ToPrimitive + Send + Sync + std::fmt::Debug + 'static
{
}

/// Classification of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Outside the air volume; pressure is pinned to zero
    Solid,
    /// Inside the air volume with six air neighbors
    Air,
    /// Air cell with at least one solid neighbor; the admittance update
    /// applies here
    Boundary,
}

/// The voxelized simulation domain
///
/// Geometry only: pressure state lives in the engine. Arrays are indexed
/// `[z, y, x]`.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    /// Cells along x
    pub nx: usize,
    /// Cells along y
    pub ny: usize,
    /// Cells along z
    pub nz: usize,
    /// Grid spacing in meters, `c * sqrt(3) / fs`
    pub dx: f64,
    /// Time step in seconds, `1 / fs`
    pub dt: f64,
    /// Sampling frequency in Hz
    pub fs: f64,
    /// Position of the low corner of cell (0, 0, 0)
    pub origin: Point3D,
    /// Cell classification
    pub kind: Array3<CellKind>,
    /// Number of air neighbors of each cell (0..=6); meaningful for air and
    /// boundary cells
    pub k_air: Array3<u8>,
    /// Normalized boundary admittance per cell; zero away from boundaries
    pub admittance: Array3<f64>,
}

impl VoxelGrid {
    /// Grid spacing and time step implied by a sampling frequency
    ///
    /// The SRL scheme is stable at the 3D Courant limit `lambda = 1/sqrt(3)`,
    /// which ties the spatial step to the temporal one.
    pub fn spacing_for(fs: f64, speed_of_sound: f64) -> (f64, f64) {
        let dt = 1.0 / fs;
        let dx = speed_of_sound * dt / constants::SRL_COURANT;
        (dx, dt)
    }

    /// Grid dimensions as (nz, ny, nx), the array shape
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nz, self.ny, self.nx)
    }

    /// Center of a cell in world coordinates
    pub fn cell_center(&self, i: usize, j: usize, k: usize) -> Point3D {
        Point3D::new(
            self.origin.x + (i as f64 + 0.5) * self.dx,
            self.origin.y + (j as f64 + 0.5) * self.dx,
            self.origin.z + (k as f64 + 0.5) * self.dx,
        )
    }

    /// Map a world position to its containing air cell as (i, j, k)
    ///
    /// Errors when the position falls outside the grid or inside solid
    /// geometry; `what` names the thing being placed for the error message.
    pub fn cell_at(&self, p: &Point3D, what: &'static str) -> Result<(usize, usize, usize)> {
        let fx = (p.x - self.origin.x) / self.dx;
        let fy = (p.y - self.origin.y) / self.dx;
        let fz = (p.z - self.origin.z) / self.dx;
        if fx < 0.0 || fy < 0.0 || fz < 0.0 {
            return Err(FdtdError::PositionOutsideDomain {
                what,
                x: p.x,
                y: p.y,
                z: p.z,
            });
        }
        let (i, j, k) = (fx as usize, fy as usize, fz as usize);
        if i >= self.nx || j >= self.ny || k >= self.nz {
            return Err(FdtdError::PositionOutsideDomain {
                what,
                x: p.x,
                y: p.y,
                z: p.z,
            });
        }
        if self.kind[[k, j, i]] == CellKind::Solid {
            return Err(FdtdError::PositionInSolid {
                what,
                x: p.x,
                y: p.y,
                z: p.z,
            });
        }
        Ok((i, j, k))
    }

    /// Number of air cells (interior plus boundary)
    pub fn air_cell_count(&self) -> usize {
        self.kind.iter().filter(|&&c| c != CellKind::Solid).count()
    }

    /// Number of boundary cells
    pub fn boundary_cell_count(&self) -> usize {
        self.kind
            .iter()
            .filter(|&&c| c == CellKind::Boundary)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spacing_matches_courant_limit() {
        let (dx, dt) = VoxelGrid::spacing_for(100_000.0, 343.0);
        assert_relative_eq!(dt, 1e-5, epsilon = 1e-15);
        assert_relative_eq!(dx, 343.0 * 3f64.sqrt() * 1e-5, epsilon = 1e-12);
        // lambda = c dt / dx recovers the Courant number
        assert_relative_eq!(343.0 * dt / dx, constants::SRL_COURANT, epsilon = 1e-12);
    }

    fn tiny_grid() -> VoxelGrid {
        let (nx, ny, nz) = (4, 4, 4);
        let mut kind = Array3::from_elem((nz, ny, nx), CellKind::Solid);
        kind[[1, 1, 1]] = CellKind::Boundary;
        kind[[1, 1, 2]] = CellKind::Boundary;
        VoxelGrid {
            nx,
            ny,
            nz,
            dx: 0.1,
            dt: 1e-4,
            fs: 10_000.0,
            origin: Point3D::zero(),
            kind,
            k_air: Array3::zeros((nz, ny, nx)),
            admittance: Array3::zeros((nz, ny, nx)),
        }
    }

    #[test]
    fn test_cell_at_maps_positions() {
        let grid = tiny_grid();
        let (i, j, k) = grid.cell_at(&Point3D::new(0.15, 0.15, 0.15), "source").unwrap();
        assert_eq!((i, j, k), (1, 1, 1));
    }

    #[test]
    fn test_cell_at_rejects_outside() {
        let grid = tiny_grid();
        let err = grid
            .cell_at(&Point3D::new(-0.05, 0.1, 0.1), "source")
            .unwrap_err();
        assert!(matches!(err, FdtdError::PositionOutsideDomain { .. }));
        let err = grid
            .cell_at(&Point3D::new(0.45, 0.1, 0.1), "receiver")
            .unwrap_err();
        assert!(matches!(err, FdtdError::PositionOutsideDomain { .. }));
    }

    #[test]
    fn test_cell_at_rejects_solid() {
        let grid = tiny_grid();
        let err = grid
            .cell_at(&Point3D::new(0.05, 0.05, 0.05), "receiver")
            .unwrap_err();
        assert!(matches!(err, FdtdError::PositionInSolid { .. }));
    }

    #[test]
    fn test_cell_counts() {
        let grid = tiny_grid();
        assert_eq!(grid.air_cell_count(), 2);
        assert_eq!(grid.boundary_cell_count(), 2);
    }
}
