//! Slice captures
//!
//! A capture records a 2D pressure slice every fixed number of steps. The
//! same extraction feeds the visualization run mode, which streams a frame
//! to its observer on every step.

use crate::core::grid::GridScalar;
use crate::{FdtdError, Result};
use fdtd_common::{CaptureConfig, Orientation, SliceFrame};
use ndarray::{Array3, Axis};

/// Check that a capture's slice index fits the grid
pub fn validate_capture(capture: &CaptureConfig, shape: (usize, usize, usize)) -> Result<()> {
    let (nz, ny, nx) = shape;
    let extent = match capture.orientation {
        Orientation::Yz => nx,
        Orientation::Xz => ny,
        Orientation::Xy => nz,
    };
    if capture.slice >= extent {
        return Err(FdtdError::SliceOutOfRange {
            slice: capture.slice,
            extent,
        });
    }
    Ok(())
}

/// Extract one frame from the pressure field
///
/// Frame rows and columns follow the array layout: `yz` frames are
/// `(nz, ny)`, `xz` frames `(nz, nx)`, and `xy` frames `(ny, nx)`.
pub fn extract_frame<T: GridScalar>(
    p: &Array3<T>,
    capture: &CaptureConfig,
    step: usize,
) -> Result<SliceFrame> {
    validate_capture(capture, p.dim())?;
    let axis = match capture.orientation {
        Orientation::Yz => Axis(2),
        Orientation::Xz => Axis(1),
        Orientation::Xy => Axis(0),
    };
    let data = p
        .index_axis(axis, capture.slice)
        .mapv(|v| v.to_f64().unwrap_or(0.0));
    Ok(SliceFrame {
        step,
        slice_index: capture.slice,
        orientation: capture.orientation,
        data,
    })
}
