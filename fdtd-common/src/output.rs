//! Output records for FDTD simulations
//!
//! A finished run is persisted as a single JSON document carrying the
//! per-receiver responses (`ret`), the source and receiver positions
//! (`src`, `rec`), and the grid constants `dx`, `dt`, `fs`. The grid
//! constants are required constructor inputs: the engine computes them and
//! the writer cannot invent or omit them.

use crate::config::{MetadataConfig, Orientation};
use crate::types::Point3D;
use crate::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One captured pressure slice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceFrame {
    /// Time step the frame was taken at
    pub step: usize,
    /// Grid index of the slice along its normal axis
    pub slice_index: usize,
    /// Slice orientation
    pub orientation: Orientation,
    /// Pressure values over the slice
    pub data: Array2<f64>,
}

/// Complete results of a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Per-receiver time-domain responses
    #[serde(rename = "ret")]
    pub responses: Vec<Vec<f64>>,
    /// Source positions
    #[serde(rename = "src")]
    pub sources: Vec<[f64; 3]>,
    /// Receiver positions
    #[serde(rename = "rec")]
    pub receivers: Vec<[f64; 3]>,
    /// Grid spacing in meters
    pub dx: f64,
    /// Time step in seconds
    pub dt: f64,
    /// Sampling frequency in Hz
    pub fs: f64,
    /// Number of simulated steps
    pub num_steps: usize,
    /// Name of the update scheme used
    pub scheme: String,
    /// Captured slice frames, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captures: Vec<SliceFrame>,
    /// Simulation metadata
    #[serde(default)]
    pub metadata: MetadataConfig,
}

impl SimulationReport {
    /// Assemble a report from run results and the engine's grid constants
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        responses: Vec<Vec<f64>>,
        sources: &[Point3D],
        receivers: &[Point3D],
        dx: f64,
        dt: f64,
        fs: f64,
        num_steps: usize,
        scheme: &str,
    ) -> Self {
        Self {
            responses,
            sources: sources.iter().map(|p| [p.x, p.y, p.z]).collect(),
            receivers: receivers.iter().map(|p| [p.x, p.y, p.z]).collect(),
            dx,
            dt,
            fs,
            num_steps,
            scheme: scheme.to_string(),
            captures: Vec::new(),
            metadata: MetadataConfig::default(),
        }
    }

    /// Attach captured slice frames
    pub fn with_captures(mut self, captures: Vec<SliceFrame>) -> Self {
        self.captures = captures;
        self
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: MetadataConfig) -> Self {
        self.metadata = metadata;
        self
    }

    /// Save the report as pretty-printed JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Conventional output file name: `<stem>_<fs>.json`
    pub fn default_file_name(&self, stem: &str) -> String {
        format!("{}_{}.json", stem, self.fs.round() as i64)
    }

    /// Print a human-readable run summary to stdout
    pub fn print_summary(&self) {
        println!("\n=== Simulation Results ===");
        println!("Scheme: {}", self.scheme);
        println!(
            "Grid: dx = {:.4} m, dt = {:.2e} s, fs = {:.0} Hz",
            self.dx, self.dt, self.fs
        );
        println!("Steps: {}", self.num_steps);
        println!("Sources: {}", self.sources.len());
        println!("Receivers: {}", self.receivers.len());
        for (i, response) in self.responses.iter().enumerate() {
            let peak = response.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
            println!("  receiver {}: {} samples, peak {:.3e}", i, response.len(), peak);
        }
        if !self.captures.is_empty() {
            println!("Captures: {} frames", self.captures.len());
        }
    }
}
