//! Solver facade
//!
//! [`FdtdSolver`] carries the full lifecycle of a simulation: configure the
//! engine, load geometry and materials, register sources and receivers,
//! execute one of the three mutually exclusive run modes, and retrieve the
//! per-receiver responses. All resources are owned; dropping the solver
//! releases everything, so no explicit teardown call exists.

use crate::core::capture::{extract_frame, validate_capture};
use crate::core::engine::Engine;
use crate::core::grid::GridScalar;
use crate::core::voxelizer::voxelize;
use crate::{FdtdError, Result};
use fdtd_common::{
    reflection_to_admittance, CaptureConfig, InputType, MaterialMatrix, MetadataConfig,
    ModelError, Orientation, Point3D, Precision, SimulationConfig, SimulationReport, SliceFrame,
    Source, TriangleMesh, UpdateScheme,
};

/// Default reflection coefficient applied when no materials are set
const DEFAULT_REFLECTION: f64 = 0.99;

/// Per-receiver responses in the precision the engine ran at
#[derive(Debug, Clone)]
enum Responses {
    Single(Vec<Vec<f32>>),
    Double(Vec<Vec<f64>>),
}

/// Results of a finished run
#[derive(Debug, Clone)]
struct RunArtifacts {
    responses: Responses,
    frames: Vec<SliceFrame>,
    dx: f64,
    dt: f64,
    num_steps: usize,
}

/// FDTD room acoustics solver
///
/// ```no_run
/// use fdtd_srl::FdtdSolver;
/// use fdtd_srl::common::{box_model, Point3D, Source};
///
/// # fn main() -> fdtd_srl::Result<()> {
/// let model = box_model(2.5, 3.0, 2.0);
/// let mut solver = FdtdSolver::new();
/// solver.set_spatial_fs(20_000.0)?;
/// solver.set_num_steps(400);
/// solver.set_geometry_mesh(model.to_mesh()?);
/// solver.add_source(Source::new(Point3D::new(1.2, 1.5, 1.0)));
/// solver.add_receiver(Point3D::new(1.8, 2.0, 1.2));
/// solver.run_simulation()?;
/// let response = solver.response(0)?;
/// assert_eq!(response.len(), 400);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FdtdSolver {
    scheme: UpdateScheme,
    precision: Precision,
    num_steps: usize,
    fs: f64,
    partitions: usize,
    speed_of_sound: f64,
    mesh: Option<TriangleMesh>,
    materials: Option<MaterialMatrix>,
    sources: Vec<Source>,
    receivers: Vec<Point3D>,
    source_data: Vec<Vec<f64>>,
    captures: Vec<CaptureConfig>,
    metadata: MetadataConfig,
    artifacts: Option<RunArtifacts>,
}

impl Default for FdtdSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FdtdSolver {
    /// Create a solver with default parameters (forward scheme, single
    /// precision, one partition, 100 kHz sampling)
    pub fn new() -> Self {
        Self {
            scheme: UpdateScheme::Forward,
            precision: Precision::Single,
            num_steps: 0,
            fs: 100_000.0,
            partitions: 1,
            speed_of_sound: fdtd_common::constants::SPEED_OF_SOUND_20C,
            mesh: None,
            materials: None,
            sources: Vec::new(),
            receivers: Vec::new(),
            source_data: Vec::new(),
            captures: Vec::new(),
            metadata: MetadataConfig::default(),
            artifacts: None,
        }
    }

    /// Build a fully configured solver from a [`SimulationConfig`]
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let model = config.model.load()?;
        let mesh = model.to_mesh()?;

        // Resolve the material table: the default coefficient everywhere,
        // then per-layer overrides
        let default_xi = config.materials.default.to_admittance()?;
        let mut materials = MaterialMatrix::uniform(mesh.triangle_count(), default_xi);
        let layers = model.layers();
        for (name, coefficient) in &config.materials.layers {
            let triangles = layers
                .get(name)
                .ok_or_else(|| ModelError::UnknownLayer { name: name.clone() })?;
            materials.set_layer(triangles, coefficient.to_admittance()?)?;
        }

        let mut solver = Self::new();
        solver.scheme = config.engine.scheme;
        solver.precision = config.engine.precision;
        solver.partitions = config.engine.partitions;
        solver.speed_of_sound = config.engine.speed_of_sound;
        solver.num_steps = config.timing.num_steps;
        solver.set_spatial_fs(config.timing.fs)?;
        solver.set_geometry_mesh(mesh);
        solver.set_materials_matrix(materials);
        for source in &config.sources {
            solver.add_source(source.clone());
        }
        for receiver in &config.receivers {
            solver.add_receiver((*receiver).into());
        }
        for capture in &config.captures {
            solver.add_slice_to_capture(capture.slice, capture.step_interval, capture.orientation)?;
        }
        solver.metadata = config.metadata.clone();
        Ok(solver)
    }

    /// Select the update scheme
    pub fn set_update_scheme(&mut self, scheme: UpdateScheme) {
        self.scheme = scheme;
    }

    /// Set the number of time steps to simulate
    pub fn set_num_steps(&mut self, num_steps: usize) {
        self.num_steps = num_steps;
    }

    /// Set the spatial sampling frequency in Hz
    pub fn set_spatial_fs(&mut self, fs: f64) -> Result<()> {
        if fs <= 0.0 {
            return Err(ModelError::InvalidParameter {
                name: "fs",
                value: fs,
            }
            .into());
        }
        self.fs = fs;
        Ok(())
    }

    /// Select single or double precision
    pub fn set_precision(&mut self, precision: Precision) {
        self.precision = precision;
    }

    /// Force the domain to be split into a given number of partitions
    ///
    /// The visualization run mode overrides this and uses one partition.
    pub fn force_partition_to(&mut self, partitions: usize) -> Result<()> {
        if partitions == 0 {
            return Err(ModelError::InvalidParameter {
                name: "partitions",
                value: 0.0,
            }
            .into());
        }
        self.partitions = partitions;
        Ok(())
    }

    /// Load geometry from flattened triangle-index and vertex lists
    ///
    /// Triangle indices are zero-based; `vertices` holds x, y, z triples in
    /// meters.
    pub fn set_geometry(&mut self, indices: &[usize], vertices: &[f64]) -> Result<()> {
        self.mesh = Some(TriangleMesh::from_flat(indices, vertices)?);
        Ok(())
    }

    /// Load geometry from an already constructed mesh
    pub fn set_geometry_mesh(&mut self, mesh: TriangleMesh) {
        self.mesh = Some(mesh);
    }

    /// Load a flattened per-triangle coefficient matrix (N × 20)
    pub fn set_materials(
        &mut self,
        coefficients: &[f64],
        triangle_count: usize,
        coefs_per_triangle: usize,
    ) -> Result<()> {
        self.materials = Some(MaterialMatrix::from_flat(
            coefficients,
            triangle_count,
            coefs_per_triangle,
        )?);
        Ok(())
    }

    /// Load an already constructed material matrix
    pub fn set_materials_matrix(&mut self, materials: MaterialMatrix) {
        self.materials = Some(materials);
    }

    /// Register a point source
    pub fn add_source(&mut self, source: Source) {
        self.sources.push(source);
    }

    /// Supply the sample vectors referenced by [`InputType::Data`] sources
    pub fn set_source_data(&mut self, data: Vec<Vec<f64>>) {
        self.source_data = data;
    }

    /// Register a point receiver
    pub fn add_receiver(&mut self, position: Point3D) {
        self.receivers.push(position);
    }

    /// Register a slice capture for the capture run mode
    pub fn add_slice_to_capture(
        &mut self,
        slice: usize,
        step_interval: usize,
        orientation: Orientation,
    ) -> Result<()> {
        if step_interval == 0 {
            return Err(ModelError::InvalidParameter {
                name: "step_interval",
                value: 0.0,
            }
            .into());
        }
        self.captures.push(CaptureConfig {
            slice,
            step_interval,
            orientation,
        });
        Ok(())
    }

    /// Grid spacing in meters implied by the current sampling frequency
    pub fn dx(&self) -> f64 {
        crate::core::grid::VoxelGrid::spacing_for(self.fs, self.speed_of_sound).0
    }

    /// Time step in seconds implied by the current sampling frequency
    pub fn dt(&self) -> f64 {
        1.0 / self.fs
    }

    /// The configured sampling frequency in Hz
    pub fn fs(&self) -> f64 {
        self.fs
    }

    /// Run a headless simulation
    pub fn run_simulation(&mut self) -> Result<()> {
        self.run_internal(false, None)
    }

    /// Run a headless simulation recording the registered slice captures
    pub fn run_capture(&mut self) -> Result<()> {
        self.run_internal(true, None)
    }

    /// Run while streaming a slice frame to `on_frame` after every step
    ///
    /// Visualization always runs in single precision on a single partition,
    /// overriding the configured values. When no capture was registered, a
    /// mid-grid horizontal slice is streamed.
    pub fn run_visualization<F>(&mut self, mut on_frame: F) -> Result<()>
    where
        F: FnMut(&SliceFrame),
    {
        let saved = (self.precision, self.partitions);
        self.precision = Precision::Single;
        self.partitions = 1;
        let result = self.run_internal(true, Some(&mut on_frame));
        (self.precision, self.partitions) = saved;
        result
    }

    fn run_internal(
        &mut self,
        record_captures: bool,
        on_frame: Option<&mut dyn FnMut(&SliceFrame)>,
    ) -> Result<()> {
        let mesh = self.mesh.as_ref().ok_or(FdtdError::GeometryNotSet)?;
        if self.sources.is_empty() {
            return Err(ModelError::NoSources.into());
        }

        // Materials default to a near-rigid uniform surface
        let materials = match &self.materials {
            Some(m) => m.clone(),
            None => MaterialMatrix::uniform(
                mesh.triangle_count(),
                reflection_to_admittance(DEFAULT_REFLECTION),
            ),
        };

        let grid = voxelize(mesh, &materials, self.fs, self.speed_of_sound)?;

        // A streaming run without captures falls back to a mid-grid slice
        let mut captures = self.captures.clone();
        if record_captures && on_frame.is_some() && captures.is_empty() {
            captures.push(CaptureConfig {
                slice: grid.nz / 2,
                step_interval: 1,
                orientation: Orientation::Xy,
            });
        }
        for capture in &captures {
            validate_capture(capture, grid.shape())?;
        }

        let artifacts = match self.precision {
            Precision::Single => self.drive::<f32>(grid, &captures, record_captures, on_frame)?,
            Precision::Double => self.drive::<f64>(grid, &captures, record_captures, on_frame)?,
        };
        self.artifacts = Some(artifacts);
        Ok(())
    }

    fn drive<T: GridScalar>(
        &self,
        grid: crate::core::grid::VoxelGrid,
        captures: &[CaptureConfig],
        record_captures: bool,
        mut on_frame: Option<&mut dyn FnMut(&SliceFrame)>,
    ) -> Result<RunArtifacts>
    where
        RunArtifacts: FromEngine<T>,
    {
        let dx = grid.dx;
        let dt = grid.dt;
        let mut engine = Engine::<T>::new(
            grid,
            self.scheme,
            self.partitions,
            &self.sources,
            &self.receivers,
            self.source_data.clone(),
        )?;

        let mut frames = Vec::new();
        for step in 0..self.num_steps {
            engine.step()?;
            if record_captures {
                for capture in captures {
                    if step % capture.step_interval == 0 {
                        let frame = extract_frame(engine.pressure(), capture, step)?;
                        if let Some(observer) = on_frame.as_mut() {
                            observer(&frame);
                        }
                        frames.push(frame);
                    }
                }
            }
        }

        Ok(RunArtifacts::from_engine(&engine, frames, dx, dt, self.num_steps))
    }

    /// Response of a receiver as single-precision samples
    pub fn response(&self, receiver: usize) -> Result<Vec<f32>> {
        let artifacts = self.artifacts.as_ref().ok_or(FdtdError::NotRun)?;
        match &artifacts.responses {
            Responses::Single(all) => all
                .get(receiver)
                .cloned()
                .ok_or(FdtdError::ReceiverIndexOutOfRange {
                    index: receiver,
                    count: all.len(),
                }),
            Responses::Double(all) => all
                .get(receiver)
                .map(|r| r.iter().map(|&v| v as f32).collect())
                .ok_or(FdtdError::ReceiverIndexOutOfRange {
                    index: receiver,
                    count: all.len(),
                }),
        }
    }

    /// Response of a receiver as double-precision samples
    pub fn response_double(&self, receiver: usize) -> Result<Vec<f64>> {
        let artifacts = self.artifacts.as_ref().ok_or(FdtdError::NotRun)?;
        match &artifacts.responses {
            Responses::Single(all) => all
                .get(receiver)
                .map(|r| r.iter().map(|&v| v as f64).collect())
                .ok_or(FdtdError::ReceiverIndexOutOfRange {
                    index: receiver,
                    count: all.len(),
                }),
            Responses::Double(all) => all.get(receiver).cloned().ok_or(
                FdtdError::ReceiverIndexOutOfRange {
                    index: receiver,
                    count: all.len(),
                },
            ),
        }
    }

    /// Captured slice frames of the last run
    pub fn frames(&self) -> Result<&[SliceFrame]> {
        Ok(&self.artifacts.as_ref().ok_or(FdtdError::NotRun)?.frames)
    }

    /// Assemble the output report of the last run
    ///
    /// The grid constants `dx` and `dt` come from the engine that actually
    /// ran; the report cannot be built without them.
    pub fn report(&self) -> Result<SimulationReport> {
        let artifacts = self.artifacts.as_ref().ok_or(FdtdError::NotRun)?;
        let responses = match &artifacts.responses {
            Responses::Single(all) => all
                .iter()
                .map(|r| r.iter().map(|&v| v as f64).collect())
                .collect(),
            Responses::Double(all) => all.clone(),
        };
        let source_positions: Vec<Point3D> = self.sources.iter().map(|s| s.position).collect();
        let scheme = match self.scheme {
            UpdateScheme::Forward => "forward",
            UpdateScheme::Sliced => "sliced",
            UpdateScheme::Centered => "centered",
        };
        Ok(SimulationReport::new(
            responses,
            &source_positions,
            &self.receivers,
            artifacts.dx,
            artifacts.dt,
            self.fs,
            artifacts.num_steps,
            scheme,
        )
        .with_captures(artifacts.frames.clone())
        .with_metadata(self.metadata.clone()))
    }

    /// Number of registered receivers
    pub fn receiver_count(&self) -> usize {
        self.receivers.len()
    }
}

/// Collect engine responses into run artifacts at the engine's precision
trait FromEngine<T: GridScalar> {
    /// Build artifacts from a finished engine
    fn from_engine(
        engine: &Engine<T>,
        frames: Vec<SliceFrame>,
        dx: f64,
        dt: f64,
        num_steps: usize,
    ) -> Self;
}

impl FromEngine<f32> for RunArtifacts {
    fn from_engine(
        engine: &Engine<f32>,
        frames: Vec<SliceFrame>,
        dx: f64,
        dt: f64,
        num_steps: usize,
    ) -> Self {
        RunArtifacts {
            responses: Responses::Single(engine.responses().to_vec()),
            frames,
            dx,
            dt,
            num_steps,
        }
    }
}

impl FromEngine<f64> for RunArtifacts {
    fn from_engine(
        engine: &Engine<f64>,
        frames: Vec<SliceFrame>,
        dx: f64,
        dt: f64,
        num_steps: usize,
    ) -> Self {
        RunArtifacts {
            responses: Responses::Double(engine.responses().to_vec()),
            frames,
            dx,
            dt,
            num_steps,
        }
    }
}
