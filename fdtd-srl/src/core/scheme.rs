//! SRL update kernels
//!
//! The interior update is the standard rectilinear leapfrog at the 3D
//! Courant limit (`lambda^2 = 1/3`):
//!
//! ```text
//! p_next = lambda^2 * S + (2 - 6 lambda^2) * p - p_prev
//! ```
//!
//! where `S` sums the six neighbor pressures. Solid cells hold zero
//! pressure, so the sum over all six neighbors equals the sum over air
//! neighbors without branching.
//!
//! At boundary cells with `K` air neighbors and normalized admittance `xi`,
//! the loss term `beta = lambda * xi * (6 - K) / 2` enters through the time
//! discretization of the boundary derivative:
//!
//! - forward difference (`forward`, `sliced`):
//!   `p_next = (lambda^2 S + (2 - K lambda^2 + 2 beta) p - p_prev) / (1 + 2 beta)`
//! - centered difference (`centered`):
//!   `p_next = (lambda^2 S + (2 - K lambda^2) p + (beta - 1) p_prev) / (1 + beta)`
//!
//! Both reduce to the rigid-wall update at `xi = 0`.

use crate::core::grid::{CellKind, GridScalar};
use crate::core::partition;
use fdtd_common::{constants, UpdateScheme};
use ndarray::{Array3, Axis};
use rayon::prelude::*;

/// Scheme-independent per-step constants, precomputed in the grid scalar type
#[derive(Debug, Clone, Copy)]
struct Coefficients<T> {
    lambda: T,
    lambda2: T,
    two: T,
    one: T,
    six: T,
}

impl<T: GridScalar> Coefficients<T> {
    fn new() -> Self {
        Self {
            lambda: T::from_f64(constants::SRL_COURANT).unwrap_or_else(T::one),
            lambda2: T::from_f64(constants::SRL_COURANT_SQ).unwrap_or_else(T::one),
            two: T::from_f64(2.0).unwrap_or_else(T::one),
            one: T::one(),
            six: T::from_f64(6.0).unwrap_or_else(T::one),
        }
    }
}

/// Advance the pressure field by one step
///
/// Reads `p` and `p_prev`, writes `p_next`. The grid is split into
/// `partitions` z-slabs computed in parallel; the update is a synchronous
/// stencil, so results do not depend on the slab count.
pub fn step_grid<T: GridScalar>(
    scheme: UpdateScheme,
    kind: &Array3<CellKind>,
    k_air: &Array3<u8>,
    xi: &Array3<T>,
    p: &Array3<T>,
    p_prev: &Array3<T>,
    p_next: &mut Array3<T>,
    partitions: usize,
) {
    let (nz, _ny, _nx) = p.dim();
    let coefs = Coefficients::<T>::new();
    let chunk = partition::slab_chunk(nz, partition::effective_partitions(nz, partitions));

    let slabs: Vec<_> = p_next.axis_chunks_iter_mut(Axis(0), chunk).collect();
    slabs.into_par_iter().enumerate().for_each(|(ci, mut slab)| {
        let z0 = ci * chunk;
        match scheme {
            UpdateScheme::Forward | UpdateScheme::Centered => {
                let (sz, sy, sx) = slab.dim();
                for dz in 0..sz {
                    for j in 0..sy {
                        for i in 0..sx {
                            slab[[dz, j, i]] =
                                update_cell(scheme, &coefs, kind, k_air, xi, p, p_prev, z0 + dz, j, i);
                        }
                    }
                }
            }
            UpdateScheme::Sliced => {
                // Same numerics as forward, swept one z-plane at a time
                for (dz, mut plane) in slab.axis_iter_mut(Axis(0)).enumerate() {
                    let z = z0 + dz;
                    let (sy, sx) = plane.dim();
                    for j in 0..sy {
                        for i in 0..sx {
                            plane[[j, i]] =
                                update_cell(scheme, &coefs, kind, k_air, xi, p, p_prev, z, j, i);
                        }
                    }
                }
            }
        }
    });
}

#[inline]
fn update_cell<T: GridScalar>(
    scheme: UpdateScheme,
    coefs: &Coefficients<T>,
    kind: &Array3<CellKind>,
    k_air: &Array3<u8>,
    xi: &Array3<T>,
    p: &Array3<T>,
    p_prev: &Array3<T>,
    z: usize,
    j: usize,
    i: usize,
) -> T {
    match kind[[z, j, i]] {
        CellKind::Solid => T::zero(),
        CellKind::Air => {
            let s = neighbor_sum(p, z, j, i);
            let c = coefs.two - coefs.six * coefs.lambda2;
            coefs.lambda2 * s + c * p[[z, j, i]] - p_prev[[z, j, i]]
        }
        CellKind::Boundary => {
            let s = neighbor_sum(p, z, j, i);
            let k = T::from_u8(k_air[[z, j, i]]).unwrap_or_else(T::zero);
            let beta =
                coefs.lambda * xi[[z, j, i]] * (coefs.six - k) / coefs.two;
            let stiff = coefs.two - k * coefs.lambda2;
            match scheme {
                UpdateScheme::Forward | UpdateScheme::Sliced => {
                    let two_beta = beta + beta;
                    (coefs.lambda2 * s + (stiff + two_beta) * p[[z, j, i]]
                        - p_prev[[z, j, i]])
                        / (coefs.one + two_beta)
                }
                UpdateScheme::Centered => {
                    (coefs.lambda2 * s + stiff * p[[z, j, i]]
                        + (beta - coefs.one) * p_prev[[z, j, i]])
                        / (coefs.one + beta)
                }
            }
        }
    }
}

/// Sum of the six neighbor pressures; out-of-grid neighbors contribute zero
#[inline]
fn neighbor_sum<T: GridScalar>(p: &Array3<T>, z: usize, j: usize, i: usize) -> T {
    let (nz, ny, nx) = p.dim();
    let mut s = T::zero();
    if i > 0 {
        s = s + p[[z, j, i - 1]];
    }
    if i + 1 < nx {
        s = s + p[[z, j, i + 1]];
    }
    if j > 0 {
        s = s + p[[z, j - 1, i]];
    }
    if j + 1 < ny {
        s = s + p[[z, j + 1, i]];
    }
    if z > 0 {
        s = s + p[[z - 1, j, i]];
    }
    if z + 1 < nz {
        s = s + p[[z + 1, j, i]];
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn open_air(n: usize) -> (Array3<CellKind>, Array3<u8>, Array3<f64>) {
        let kind = Array3::from_elem((n, n, n), CellKind::Air);
        let k_air = Array3::from_elem((n, n, n), 6u8);
        let xi = Array3::zeros((n, n, n));
        (kind, k_air, xi)
    }

    #[test]
    fn test_impulse_spreads_to_neighbors() {
        let n = 7;
        let (kind, k_air, xi) = open_air(n);
        let mut p = Array3::<f64>::zeros((n, n, n));
        let p_prev = Array3::<f64>::zeros((n, n, n));
        let mut p_next = Array3::<f64>::zeros((n, n, n));
        p[[3, 3, 3]] = 1.0;

        step_grid(
            UpdateScheme::Forward,
            &kind,
            &k_air,
            &xi,
            &p,
            &p_prev,
            &mut p_next,
            1,
        );

        // Each face neighbor receives lambda^2 of the impulse
        assert_relative_eq!(p_next[[3, 3, 2]], 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(p_next[[3, 3, 4]], 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(p_next[[2, 3, 3]], 1.0 / 3.0, epsilon = 1e-12);
        // The (2 - 6 lambda^2) self term vanishes at the Courant limit
        assert_relative_eq!(p_next[[3, 3, 3]], 0.0, epsilon = 1e-12);
        // Diagonal neighbors are untouched after one step
        assert_relative_eq!(p_next[[2, 2, 3]], 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_schemes_agree_in_interior() {
        let n = 7;
        let (kind, k_air, xi) = open_air(n);
        let mut p = Array3::<f64>::zeros((n, n, n));
        let p_prev = Array3::<f64>::zeros((n, n, n));
        p[[3, 3, 3]] = 1.0;

        let mut next_fwd = Array3::<f64>::zeros((n, n, n));
        let mut next_sliced = Array3::<f64>::zeros((n, n, n));
        let mut next_cent = Array3::<f64>::zeros((n, n, n));
        step_grid(UpdateScheme::Forward, &kind, &k_air, &xi, &p, &p_prev, &mut next_fwd, 1);
        step_grid(UpdateScheme::Sliced, &kind, &k_air, &xi, &p, &p_prev, &mut next_sliced, 2);
        step_grid(UpdateScheme::Centered, &kind, &k_air, &xi, &p, &p_prev, &mut next_cent, 1);

        // Away from boundaries all three variants are the same update
        assert_eq!(next_fwd, next_sliced);
        assert_eq!(next_fwd, next_cent);
    }

    #[test]
    fn test_rigid_boundary_matches_lossless_formula() {
        // One boundary cell with K = 5 air neighbors and xi = 0
        let n = 5;
        let (mut kind, mut k_air, xi) = open_air(n);
        kind[[2, 2, 2]] = CellKind::Boundary;
        k_air[[2, 2, 2]] = 5;
        kind[[2, 2, 1]] = CellKind::Solid;

        let mut p = Array3::<f64>::zeros((n, n, n));
        let mut p_prev = Array3::<f64>::zeros((n, n, n));
        p[[2, 2, 2]] = 0.8;
        p[[2, 2, 3]] = 0.1;
        p_prev[[2, 2, 2]] = 0.2;

        let mut p_next = Array3::<f64>::zeros((n, n, n));
        step_grid(UpdateScheme::Forward, &kind, &k_air, &xi, &p, &p_prev, &mut p_next, 1);

        let lambda2 = 1.0 / 3.0;
        let expected = lambda2 * 0.1 + (2.0 - 5.0 * lambda2) * 0.8 - 0.2;
        assert_relative_eq!(p_next[[2, 2, 2]], expected, epsilon = 1e-12);

        // Centered agrees at xi = 0 as well
        let mut p_cent = Array3::<f64>::zeros((n, n, n));
        step_grid(UpdateScheme::Centered, &kind, &k_air, &xi, &p, &p_prev, &mut p_cent, 1);
        assert_relative_eq!(p_cent[[2, 2, 2]], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_lossy_boundary_reduces_magnitude() {
        let n = 5;
        let (mut kind, mut k_air, mut xi) = open_air(n);
        kind[[2, 2, 2]] = CellKind::Boundary;
        k_air[[2, 2, 2]] = 5;
        kind[[2, 2, 1]] = CellKind::Solid;

        let mut p = Array3::<f64>::zeros((n, n, n));
        let p_prev = Array3::<f64>::zeros((n, n, n));
        p[[2, 2, 2]] = 1.0;

        let mut rigid = Array3::<f64>::zeros((n, n, n));
        step_grid(UpdateScheme::Forward, &kind, &k_air, &xi, &p, &p_prev, &mut rigid, 1);

        xi[[2, 2, 2]] = 1.0;
        let mut lossy = Array3::<f64>::zeros((n, n, n));
        step_grid(UpdateScheme::Forward, &kind, &k_air, &xi, &p, &p_prev, &mut lossy, 1);

        assert!(lossy[[2, 2, 2]].abs() < rigid[[2, 2, 2]].abs());
    }

    #[test]
    fn test_partition_count_does_not_change_results() {
        let n = 9;
        let (kind, k_air, xi) = open_air(n);
        let mut p = Array3::<f64>::zeros((n, n, n));
        let p_prev = Array3::<f64>::zeros((n, n, n));
        p[[4, 4, 4]] = 1.0;
        p[[2, 6, 3]] = -0.5;

        let mut one = Array3::<f64>::zeros((n, n, n));
        let mut four = Array3::<f64>::zeros((n, n, n));
        step_grid(UpdateScheme::Forward, &kind, &k_air, &xi, &p, &p_prev, &mut one, 1);
        step_grid(UpdateScheme::Forward, &kind, &k_air, &xi, &p, &p_prev, &mut four, 4);
        assert_eq!(one, four);
    }

    #[test]
    fn test_solid_cells_stay_zero() {
        let n = 5;
        let (mut kind, k_air, xi) = open_air(n);
        kind[[2, 2, 2]] = CellKind::Solid;
        let mut p = Array3::<f64>::zeros((n, n, n));
        let p_prev = Array3::<f64>::zeros((n, n, n));
        p[[2, 2, 3]] = 1.0;

        let mut p_next = Array3::<f64>::zeros((n, n, n));
        step_grid(UpdateScheme::Forward, &kind, &k_air, &xi, &p, &p_prev, &mut p_next, 1);
        assert_eq!(p_next[[2, 2, 2]], 0.0);
    }
}
