//! Sound source and receiver definitions
//!
//! A source couples a grid position with an injection mode and an input
//! waveform. The choice of precision and source type affects simulation
//! stability; hard sources scatter, soft and transparent sources do not.

use crate::types::Point3D;
use crate::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How a source couples its signal into the pressure grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Overwrite the node pressure with the signal (scatters incoming waves)
    #[default]
    Hard,
    /// Add the signal scaled by the Courant term into the update
    Soft,
    /// Add the signal directly to the updated pressure
    Transparent,
}

impl SourceType {
    /// Numeric wire value (0 = hard, 1 = soft, 2 = transparent)
    pub fn index(self) -> usize {
        match self {
            SourceType::Hard => 0,
            SourceType::Soft => 1,
            SourceType::Transparent => 2,
        }
    }

    /// Decode a numeric wire value
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(SourceType::Hard),
            1 => Some(SourceType::Soft),
            2 => Some(SourceType::Transparent),
            _ => None,
        }
    }
}

/// The input waveform driven through a source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Unit impulse at the first step
    Delta,
    /// Gaussian pulse band-limited to a tenth of the sampling frequency
    #[default]
    Gaussian,
    /// Continuous sine
    Sine,
    /// Externally supplied sample vector, selected by `input_data_idx`
    Data,
}

impl InputType {
    /// Numeric wire value (0 = delta, 1 = gaussian, 2 = sine, 3 = data)
    pub fn index(self) -> usize {
        match self {
            InputType::Delta => 0,
            InputType::Gaussian => 1,
            InputType::Sine => 2,
            InputType::Data => 3,
        }
    }

    /// Decode a numeric wire value
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(InputType::Delta),
            1 => Some(InputType::Gaussian),
            2 => Some(InputType::Sine),
            3 => Some(InputType::Data),
            _ => None,
        }
    }
}

/// A point sound source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Position in meters
    pub position: Point3D,
    /// Injection mode
    #[serde(default)]
    pub source_type: SourceType,
    /// Input waveform
    #[serde(default)]
    pub input_type: InputType,
    /// Index into the externally supplied input data vectors; only used when
    /// `input_type` is [`InputType::Data`]
    #[serde(default)]
    pub input_data_idx: usize,
    /// Linear amplitude scale
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    /// Sine frequency in Hz; defaults to a tenth of the sampling frequency
    /// (the usable band of a 10× oversampled SRL grid)
    #[serde(default)]
    pub frequency: Option<f64>,
}

fn default_amplitude() -> f64 {
    1.0
}

impl Source {
    /// Create a source at a position with default hard/Gaussian settings
    pub fn new(position: Point3D) -> Self {
        Self {
            position,
            source_type: SourceType::default(),
            input_type: InputType::default(),
            input_data_idx: 0,
            amplitude: 1.0,
            frequency: None,
        }
    }

    /// Set the injection mode
    pub fn with_source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = source_type;
        self
    }

    /// Set the input waveform
    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Set the external input data index
    pub fn with_input_data_idx(mut self, idx: usize) -> Self {
        self.input_data_idx = idx;
        self
    }

    /// Sample the source waveform at a time step
    ///
    /// `fs` is the grid sampling frequency, `data` the externally supplied
    /// sample vectors for [`InputType::Data`] sources.
    pub fn sample(&self, step: usize, fs: f64, data: &[Vec<f64>]) -> Result<f64> {
        let dt = 1.0 / fs;
        let value = match self.input_type {
            InputType::Delta => {
                if step == 0 {
                    1.0
                } else {
                    0.0
                }
            }
            InputType::Gaussian => {
                // Band limit at fs/10; delay by 4 sigma so the pulse starts
                // near zero
                let sigma = 10.0 / (2.0 * PI * fs);
                let t0 = 4.0 * sigma;
                let t = step as f64 * dt;
                let arg = (t - t0) / sigma;
                (-0.5 * arg * arg).exp()
            }
            InputType::Sine => {
                let f0 = self.frequency.unwrap_or(fs / 10.0);
                (2.0 * PI * f0 * step as f64 * dt).sin()
            }
            InputType::Data => {
                let vec = data.get(self.input_data_idx).ok_or(
                    ModelError::InvalidParameter {
                        name: "input_data_idx",
                        value: self.input_data_idx as f64,
                    },
                )?;
                vec.get(step).copied().unwrap_or(0.0)
            }
        };
        Ok(self.amplitude * value)
    }
}
