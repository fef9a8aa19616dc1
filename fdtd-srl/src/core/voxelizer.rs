//! Triangle mesh voxelization
//!
//! Cells are classified air or solid by casting a ray along +x through each
//! cell-center column and counting triangle crossings (odd = inside the
//! enclosed air volume). Air cells touching a solid neighbor become boundary
//! cells and take the admittance of the nearest triangle's material row.
//! The result is the staircase approximation inherent to the SRL scheme.

use crate::core::grid::{CellKind, VoxelGrid};
use crate::Result;
use fdtd_common::{MaterialMatrix, ModelError, Point3D, TriangleMesh};
use ndarray::Array3;

/// Build a voxel grid from a mesh and its per-triangle materials
///
/// `fs` fixes the sampling frequency; the spatial step follows from the SRL
/// stability bound. The grid is padded by one solid cell on every side.
pub fn voxelize(
    mesh: &TriangleMesh,
    materials: &MaterialMatrix,
    fs: f64,
    speed_of_sound: f64,
) -> Result<VoxelGrid> {
    if materials.triangle_count() != mesh.triangle_count() {
        return Err(ModelError::MaterialShapeMismatch {
            rows: materials.triangle_count(),
            triangles: mesh.triangle_count(),
        }
        .into());
    }

    let (dx, dt) = VoxelGrid::spacing_for(fs, speed_of_sound);
    let (lo, hi) = mesh.bounds();

    // One padding cell per side keeps every air cell surrounded by grid
    let nx = ((hi.x - lo.x) / dx).ceil() as usize + 2;
    let ny = ((hi.y - lo.y) / dx).ceil() as usize + 2;
    let nz = ((hi.z - lo.z) / dx).ceil() as usize + 2;
    let origin = Point3D::new(lo.x - dx, lo.y - dx, lo.z - dx);

    let mut kind = Array3::from_elem((nz, ny, nx), CellKind::Solid);

    // Inside/outside classification, one ray per (y, z) column
    let ray_origin_x = origin.x - dx;
    for k in 0..nz {
        let z = origin.z + (k as f64 + 0.5) * dx;
        for j in 0..ny {
            let y = origin.y + (j as f64 + 0.5) * dx;
            let mut crossings = column_crossings(mesh, ray_origin_x, y, z);
            crossings.sort_by(|a, b| a.total_cmp(b));
            crossings.dedup_by(|a, b| (*a - *b).abs() < 1e-9 * dx);

            for i in 0..nx {
                let x = origin.x + (i as f64 + 0.5) * dx;
                let inside = crossings.iter().filter(|&&cx| cx < x).count() % 2 == 1;
                if inside {
                    kind[[k, j, i]] = CellKind::Air;
                }
            }
        }
    }

    // Neighbor counts and boundary classification
    let mut k_air = Array3::zeros((nz, ny, nx));
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                if kind[[k, j, i]] == CellKind::Solid {
                    continue;
                }
                let n = air_neighbor_count(&kind, i, j, k);
                k_air[[k, j, i]] = n;
                if n < 6 {
                    kind[[k, j, i]] = CellKind::Boundary;
                }
            }
        }
    }

    // Boundary admittance from the nearest triangle (by centroid distance)
    let centroids: Vec<Point3D> = (0..mesh.triangle_count())
        .map(|t| mesh.triangle_centroid(t))
        .collect();

    let mut admittance = Array3::zeros((nz, ny, nx));
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                if kind[[k, j, i]] != CellKind::Boundary {
                    continue;
                }
                let center = Point3D::new(
                    origin.x + (i as f64 + 0.5) * dx,
                    origin.y + (j as f64 + 0.5) * dx,
                    origin.z + (k as f64 + 0.5) * dx,
                );
                let nearest = centroids
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| {
                        center.distance_to(a).total_cmp(&center.distance_to(b))
                    })
                    .map(|(t, _)| t);
                if let Some(t) = nearest {
                    admittance[[k, j, i]] = materials.admittance(t);
                }
            }
        }
    }

    Ok(VoxelGrid {
        nx,
        ny,
        nz,
        dx,
        dt,
        fs,
        origin,
        kind,
        k_air,
        admittance,
    })
}

/// X positions where a +x ray from (`ox`, `y`, `z`) crosses the mesh
fn column_crossings(mesh: &TriangleMesh, ox: f64, y: f64, z: f64) -> Vec<f64> {
    let origin = Point3D::new(ox, y, z);
    let mut hits = Vec::new();
    for t in 0..mesh.triangle_count() {
        let [p0, p1, p2] = mesh.triangle_points(t);
        if let Some(t_hit) = ray_x_triangle(&origin, &p0, &p1, &p2) {
            hits.push(ox + t_hit);
        }
    }
    hits
}

/// Möller–Trumbore intersection specialized for the +x ray direction
///
/// Returns the ray parameter for hits in front of the origin; degenerate
/// triangles never intersect.
fn ray_x_triangle(origin: &Point3D, p0: &Point3D, p1: &Point3D, p2: &Point3D) -> Option<f64> {
    const EPS: f64 = 1e-12;
    let dir = Point3D::new(1.0, 0.0, 0.0);

    let edge1 = *p1 - *p0;
    let edge2 = *p2 - *p0;
    let h = dir.cross(&edge2);
    let a = edge1.dot(&h);
    if a.abs() < EPS {
        return None;
    }
    let f = 1.0 / a;
    let s = *origin - *p0;
    let u = f * s.dot(&h);
    if !(-EPS..=1.0 + EPS).contains(&u) {
        return None;
    }
    let q = s.cross(&edge1);
    let v = f * dir.dot(&q);
    if v < -EPS || u + v > 1.0 + EPS {
        return None;
    }
    let t = f * edge2.dot(&q);
    if t > EPS {
        Some(t)
    } else {
        None
    }
}

fn air_neighbor_count(kind: &Array3<CellKind>, i: usize, j: usize, k: usize) -> u8 {
    let (nz, ny, nx) = kind.dim();
    let mut n = 0u8;
    let mut check = |kk: isize, jj: isize, ii: isize| {
        if kk >= 0
            && jj >= 0
            && ii >= 0
            && (kk as usize) < nz
            && (jj as usize) < ny
            && (ii as usize) < nx
            && kind[[kk as usize, jj as usize, ii as usize]] != CellKind::Solid
        {
            n += 1;
        }
    };
    let (ii, jj, kk) = (i as isize, j as isize, k as isize);
    check(kk, jj, ii - 1);
    check(kk, jj, ii + 1);
    check(kk, jj - 1, ii);
    check(kk, jj + 1, ii);
    check(kk - 1, jj, ii);
    check(kk + 1, jj, ii);
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fdtd_common::{box_model, reflection_to_admittance};

    fn box_grid(edge: f64, fs: f64) -> (VoxelGrid, TriangleMesh) {
        let model = box_model(edge, edge, edge);
        let mesh = model.to_mesh().unwrap();
        let materials = MaterialMatrix::uniform(mesh.triangle_count(), 0.1);
        let grid = voxelize(&mesh, &materials, fs, 343.0).unwrap();
        (grid, mesh)
    }

    #[test]
    fn test_ray_hits_unit_triangle() {
        let p0 = Point3D::new(1.0, 0.0, 0.0);
        let p1 = Point3D::new(1.0, 1.0, 0.0);
        let p2 = Point3D::new(1.0, 0.0, 1.0);
        let origin = Point3D::new(0.0, 0.2, 0.2);
        let t = ray_x_triangle(&origin, &p0, &p1, &p2).unwrap();
        assert_relative_eq!(t, 1.0, epsilon = 1e-12);
        // Ray pointing away from the triangle plane region misses
        let origin = Point3D::new(0.0, 0.8, 0.8);
        assert!(ray_x_triangle(&origin, &p0, &p1, &p2).is_none());
    }

    #[test]
    fn test_degenerate_triangle_never_hits() {
        let p = Point3D::new(1.0, 0.0, 0.0);
        let origin = Point3D::zero();
        assert!(ray_x_triangle(&origin, &p, &p, &p).is_none());
    }

    #[test]
    fn test_box_classification() {
        let (grid, _) = box_grid(1.0, 10_000.0);
        // Cube of 1 m at fs = 10 kHz: dx ~ 0.0594 m, ~17 interior cells/side
        assert!(grid.nx >= 10 && grid.nx <= 25);
        assert!(grid.air_cell_count() > 0);
        assert!(grid.boundary_cell_count() > 0);
        // The padding ring must be solid
        let (nz, ny, nx) = grid.shape();
        for j in 0..ny {
            for i in 0..nx {
                assert_eq!(grid.kind[[0, j, i]], CellKind::Solid);
                assert_eq!(grid.kind[[nz - 1, j, i]], CellKind::Solid);
            }
        }
        // The center must be interior air
        let c = grid
            .cell_at(&Point3D::new(0.5, 0.5, 0.5), "probe")
            .unwrap();
        assert_eq!(grid.kind[[c.2, c.1, c.0]], CellKind::Air);
        assert_eq!(grid.k_air[[c.2, c.1, c.0]], 6);
    }

    #[test]
    fn test_box_boundary_admittance() {
        let model = box_model(1.0, 1.0, 1.0);
        let mesh = model.to_mesh().unwrap();
        let mut materials =
            MaterialMatrix::uniform(mesh.triangle_count(), reflection_to_admittance(0.99));
        // Make the floor fully absorbing
        materials
            .set_layer(&model.layers()["floor"], 1.0)
            .unwrap();
        let grid = voxelize(&mesh, &materials, 10_000.0, 343.0).unwrap();

        // A boundary cell near the floor center carries the floor admittance
        let (i, j, k) = grid
            .cell_at(&Point3D::new(0.5, 0.5, 0.01), "probe")
            .unwrap();
        assert_eq!(grid.kind[[k, j, i]], CellKind::Boundary);
        assert_relative_eq!(grid.admittance[[k, j, i]], 1.0, epsilon = 1e-12);

        // And one near the ceiling carries the near-rigid default
        let (i, j, k) = grid
            .cell_at(&Point3D::new(0.5, 0.5, 0.99), "probe")
            .unwrap();
        assert_relative_eq!(
            grid.admittance[[k, j, i]],
            reflection_to_admittance(0.99),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_material_shape_checked() {
        let model = box_model(1.0, 1.0, 1.0);
        let mesh = model.to_mesh().unwrap();
        let materials = MaterialMatrix::uniform(5, 0.1);
        assert!(voxelize(&mesh, &materials, 10_000.0, 343.0).is_err());
    }
}
