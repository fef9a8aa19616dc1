//! Generic FDTD engine
//!
//! Owns the pressure state for one simulation and advances it step by step.
//! The engine is generic over the grid scalar; the solver facade instantiates
//! it with `f32` or `f64` according to the configured precision.

use crate::core::grid::{GridScalar, VoxelGrid};
use crate::core::scheme::step_grid;
use crate::Result;
use fdtd_common::{Point3D, Source, SourceType, UpdateScheme};
use ndarray::Array3;

/// One running simulation
#[derive(Debug)]
pub struct Engine<T: GridScalar> {
    grid: VoxelGrid,
    scheme: UpdateScheme,
    partitions: usize,
    xi: Array3<T>,
    p: Array3<T>,
    p_prev: Array3<T>,
    p_next: Array3<T>,
    sources: Vec<(Source, (usize, usize, usize))>,
    receivers: Vec<(usize, usize, usize)>,
    responses: Vec<Vec<T>>,
    source_data: Vec<Vec<f64>>,
    step: usize,
}

impl<T: GridScalar> Engine<T> {
    /// Build an engine over a voxelized grid
    ///
    /// Source and receiver positions are resolved to air cells here; a
    /// position outside the domain or inside solid geometry is an error.
    pub fn new(
        grid: VoxelGrid,
        scheme: UpdateScheme,
        partitions: usize,
        sources: &[Source],
        receivers: &[Point3D],
        source_data: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let shape = grid.shape();

        let sources = sources
            .iter()
            .map(|s| Ok((s.clone(), grid.cell_at(&s.position, "source")?)))
            .collect::<Result<Vec<_>>>()?;

        let receivers = receivers
            .iter()
            .map(|p| grid.cell_at(p, "receiver"))
            .collect::<Result<Vec<_>>>()?;

        let xi = grid
            .admittance
            .mapv(|v| T::from_f64(v).unwrap_or_else(T::zero));

        let responses = vec![Vec::new(); receivers.len()];

        Ok(Self {
            grid,
            scheme,
            partitions,
            xi,
            p: Array3::zeros(shape),
            p_prev: Array3::zeros(shape),
            p_next: Array3::zeros(shape),
            sources,
            receivers,
            responses,
            source_data,
            step: 0,
        })
    }

    /// The voxel grid the engine runs on
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Number of completed steps
    pub fn steps_done(&self) -> usize {
        self.step
    }

    /// The current pressure field
    pub fn pressure(&self) -> &Array3<T> {
        &self.p
    }

    /// Advance the simulation by one step
    pub fn step(&mut self) -> Result<()> {
        step_grid(
            self.scheme,
            &self.grid.kind,
            &self.grid.k_air,
            &self.xi,
            &self.p,
            &self.p_prev,
            &mut self.p_next,
            self.partitions,
        );

        self.inject_sources()?;
        self.sample_receivers();

        // Rotate the planes: prev <- current <- next
        std::mem::swap(&mut self.p_prev, &mut self.p);
        std::mem::swap(&mut self.p, &mut self.p_next);
        self.step += 1;
        Ok(())
    }

    fn inject_sources(&mut self) -> Result<()> {
        let lambda2 = T::from_f64(fdtd_common::constants::SRL_COURANT_SQ).unwrap_or_else(T::one);
        for (source, (i, j, k)) in &self.sources {
            let sample = source.sample(self.step, self.grid.fs, &self.source_data)?;
            let v = T::from_f64(sample).unwrap_or_else(T::zero);
            let cell = &mut self.p_next[[*k, *j, *i]];
            match source.source_type {
                SourceType::Hard => *cell = v,
                SourceType::Soft => *cell = *cell + lambda2 * v,
                SourceType::Transparent => *cell = *cell + v,
            }
        }
        Ok(())
    }

    fn sample_receivers(&mut self) {
        for (r, (i, j, k)) in self.receivers.iter().enumerate() {
            self.responses[r].push(self.p_next[[*k, *j, *i]]);
        }
    }

    /// Per-receiver responses in the engine's native precision
    pub fn responses(&self) -> &[Vec<T>] {
        &self.responses
    }

    /// Per-receiver responses converted to f64
    pub fn responses_f64(&self) -> Vec<Vec<f64>> {
        self.responses
            .iter()
            .map(|r| r.iter().map(|v| v.to_f64().unwrap_or(0.0)).collect())
            .collect()
    }

    /// Total squared pressure over the grid, a cheap energy proxy
    pub fn field_energy(&self) -> f64 {
        self.p
            .iter()
            .map(|v| {
                let v = v.to_f64().unwrap_or(0.0);
                v * v
            })
            .sum()
    }
}
