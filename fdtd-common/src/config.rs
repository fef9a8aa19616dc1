//! JSON configuration for FDTD room acoustics simulations

use crate::geometry::MeshModel;
use crate::material::SurfaceCoefficient;
use crate::source::Source;
use crate::types::{constants, Point3D};
use crate::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Complete simulation configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Where the mesh model comes from
    pub model: ModelConfig,
    /// Surface material assignment
    #[serde(default)]
    pub materials: MaterialConfig,
    /// Sound sources
    pub sources: Vec<Source>,
    /// Receiver positions
    pub receivers: Vec<Point3DConfig>,
    /// Sampling frequency and step count
    pub timing: TimingConfig,
    /// Engine configuration
    #[serde(default)]
    pub engine: EngineConfig,
    /// Slice captures to record
    #[serde(default)]
    pub captures: Vec<CaptureConfig>,
    /// Which of the mutually exclusive run modes to execute
    #[serde(default)]
    pub run_mode: RunMode,
    /// Simulation metadata
    #[serde(default)]
    pub metadata: MetadataConfig,
}

/// Mesh model source: a file path or an inline model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModelConfig {
    /// Load the model from a JSON file
    #[serde(rename = "file")]
    File {
        /// Path to the mesh model JSON
        path: String,
    },
    /// The model is embedded in the configuration
    #[serde(rename = "inline")]
    Inline {
        /// The embedded model
        model: MeshModel,
    },
}

impl ModelConfig {
    /// Resolve to a loaded, validated mesh model
    pub fn load(&self) -> Result<MeshModel> {
        match self {
            ModelConfig::File { path } => MeshModel::from_file(path),
            ModelConfig::Inline { model } => {
                model.validate()?;
                Ok(model.clone())
            }
        }
    }
}

/// Surface material assignment: a default coefficient plus per-layer overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialConfig {
    /// Coefficient applied to every triangle not covered by an override
    #[serde(default)]
    pub default: SurfaceCoefficient,
    /// Per-layer overrides, keyed by layer name
    #[serde(default)]
    pub layers: BTreeMap<String, SurfaceCoefficient>,
}

/// 3D point configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point3DConfig {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl From<Point3DConfig> for Point3D {
    fn from(p: Point3DConfig) -> Self {
        Point3D::new(p.x, p.y, p.z)
    }
}

impl From<Point3D> for Point3DConfig {
    fn from(p: Point3D) -> Self {
        Point3DConfig {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

/// Sampling frequency and step count
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Spatial sampling frequency in Hz; a 10× oversampling of the highest
    /// frequency of interest keeps SRL dispersion error near 2 %
    pub fs: f64,
    /// Number of time steps to simulate
    pub num_steps: usize,
}

/// SRL update scheme selection
///
/// Which update performs best is hardware dependent; `forward` is usually
/// the right choice. `sliced` sweeps the grid slab by slab and can be faster
/// with some memory systems, in particular in double precision. `centered`
/// discretizes the boundary loss term with a centered difference and has the
/// worst computational performance of the three.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateScheme {
    /// Forward-difference boundary loss, whole-grid sweep
    #[default]
    Forward,
    /// Forward-difference boundary loss, slab-by-slab sweep
    Sliced,
    /// Centered-difference boundary loss
    Centered,
}

impl UpdateScheme {
    /// Numeric wire value (0 = forward, 1 = sliced, 2 = centered)
    pub fn index(self) -> usize {
        match self {
            UpdateScheme::Forward => 0,
            UpdateScheme::Sliced => 1,
            UpdateScheme::Centered => 2,
        }
    }

    /// Decode a numeric wire value
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(UpdateScheme::Forward),
            1 => Some(UpdateScheme::Sliced),
            2 => Some(UpdateScheme::Centered),
            _ => None,
        }
    }
}

/// Floating point precision of the engine
///
/// Double precision should be used when simulating impulse responses; single
/// precision suffices for visualizing early reflections and scattering and is
/// the only precision the visualization mode supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 32-bit floating point
    #[default]
    Single,
    /// 64-bit floating point
    Double,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Update scheme
    #[serde(default)]
    pub scheme: UpdateScheme,
    /// Numeric precision
    #[serde(default)]
    pub precision: Precision,
    /// Forced domain partition count; the visualization mode overrides this
    /// to one
    #[serde(default = "default_partitions")]
    pub partitions: usize,
    /// Speed of sound in m/s
    #[serde(default = "default_speed_of_sound")]
    pub speed_of_sound: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scheme: UpdateScheme::default(),
            precision: Precision::default(),
            partitions: default_partitions(),
            speed_of_sound: default_speed_of_sound(),
        }
    }
}

fn default_partitions() -> usize {
    1
}

fn default_speed_of_sound() -> f64 {
    constants::SPEED_OF_SOUND_20C
}

/// Orientation of a captured slice, named by the plane it spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Slice normal to the x axis
    Yz,
    /// Slice normal to the y axis
    Xz,
    /// Slice normal to the z axis
    Xy,
}

impl Orientation {
    /// Numeric wire value (0 = yz, 1 = xz, 2 = xy)
    pub fn index(self) -> usize {
        match self {
            Orientation::Yz => 0,
            Orientation::Xz => 1,
            Orientation::Xy => 2,
        }
    }

    /// Decode a numeric wire value
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Orientation::Yz),
            1 => Some(Orientation::Xz),
            2 => Some(Orientation::Xy),
            _ => None,
        }
    }
}

/// A slice capture request: which slice to record, and how often
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Grid index of the slice along the orientation's normal axis
    pub slice: usize,
    /// Record a frame every this many steps
    pub step_interval: usize,
    /// Slice orientation
    pub orientation: Orientation,
}

/// The three mutually exclusive run modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Headless simulation
    #[default]
    Simulation,
    /// Headless simulation recording the configured slice captures
    Capture,
    /// Stream slice frames to an observer while stepping; forces single
    /// precision and a single partition
    Visualization,
}

/// Simulation metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Simulation description
    #[serde(default)]
    pub description: String,
    /// Author name
    #[serde(default)]
    pub author: String,
    /// Simulation date
    #[serde(default)]
    pub date: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            description: String::new(),
            author: String::new(),
            date: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    /// Parse configuration from a JSON string and validate it
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.timing.fs <= 0.0 {
            return Err(ModelError::InvalidParameter {
                name: "fs",
                value: self.timing.fs,
            });
        }
        if self.timing.num_steps == 0 {
            return Err(ModelError::InvalidParameter {
                name: "num_steps",
                value: 0.0,
            });
        }
        if self.engine.partitions == 0 {
            return Err(ModelError::InvalidParameter {
                name: "partitions",
                value: 0.0,
            });
        }
        if self.engine.speed_of_sound <= 0.0 {
            return Err(ModelError::InvalidParameter {
                name: "speed_of_sound",
                value: self.engine.speed_of_sound,
            });
        }
        if self.sources.is_empty() {
            return Err(ModelError::NoSources);
        }
        if self.receivers.is_empty() {
            return Err(ModelError::NoReceivers);
        }
        for capture in &self.captures {
            if capture.step_interval == 0 {
                return Err(ModelError::InvalidParameter {
                    name: "step_interval",
                    value: 0.0,
                });
            }
        }
        Ok(())
    }
}
