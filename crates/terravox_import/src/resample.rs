//! Height resampling: source height grid to fixed-point voxel heights.
//!
//! Bilinear interpolation maps the source grid onto the voxel grid, then
//! each column quantizes independently through the surface's vertical
//! transform. No column ever reads a previously quantized neighbor, so
//! quantization error cannot accumulate; at equal resolutions the whole
//! stage is the identity transform up to one fixed-point step.

use std::sync::atomic::{AtomicBool, Ordering};

use terravox_asset::{FixedHeight, HeightGrid};
use terravox_surface::{SurfaceError, SurfaceProvider};

use crate::error::{ImportError, ImportResult};

/// Resamples the surface height grid to the target voxel resolution.
///
/// Source positions are `target * (source_dim / target_dim)` per axis,
/// bilinearly interpolated, edge-clamped at the boundaries (no wraparound).
/// Checks `cancel` between rows.
///
/// # Errors
///
/// - [`ImportError::SurfaceLost`] if the surface dies mid-resample
/// - [`ImportError::Cancelled`] if a newer request raised the cancel flag
pub fn resample_heights<S: SurfaceProvider + ?Sized>(
    surface: &S,
    target: (u32, u32),
    cancel: &AtomicBool,
) -> ImportResult<HeightGrid> {
    let (source_width, source_height) = surface.get_dimensions()?;
    let (scale, offset) = surface.get_scale_offset()?;
    let (target_width, target_height) = target;

    let x_ratio = f64::from(source_width) / f64::from(target_width);
    let y_ratio = f64::from(source_height) / f64::from(target_height);

    let mut data = Vec::with_capacity((target_width as usize) * (target_height as usize));

    for target_y in 0..target_height {
        if cancel.load(Ordering::Relaxed) {
            return Err(ImportError::Cancelled);
        }
        let source_y = f64::from(target_y) * y_ratio;
        for target_x in 0..target_width {
            let source_x = f64::from(target_x) * x_ratio;
            let raw = sample_bilinear(surface, source_x, source_y, source_width, source_height)?;
            // Quantized from source data alone; neighbors play no part
            data.push(FixedHeight::quantize(raw, scale, offset));
        }
    }

    Ok(HeightGrid::new(target_width, target_height, data)?)
}

/// Bilinearly interpolates the source height at a fractional position.
///
/// The four corner texels are edge-clamped, so positions at or past the
/// last row/column interpolate against the boundary sample instead of
/// wrapping.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_bilinear<S: SurfaceProvider + ?Sized>(
    surface: &S,
    source_x: f64,
    source_y: f64,
    source_width: u32,
    source_height: u32,
) -> Result<f32, SurfaceError> {
    let max_x = source_width - 1;
    let max_y = source_height - 1;

    let x0 = (source_x.floor().max(0.0) as u32).min(max_x);
    let y0 = (source_y.floor().max(0.0) as u32).min(max_y);
    let x1 = (x0 + 1).min(max_x);
    let y1 = (y0 + 1).min(max_y);

    let fx = (source_x - f64::from(x0)).clamp(0.0, 1.0);
    let fy = (source_y - f64::from(y0)).clamp(0.0, 1.0);

    let h00 = f64::from(surface.get_height(x0, y0)?);
    let h10 = f64::from(surface.get_height(x1, y0)?);
    let h01 = f64::from(surface.get_height(x0, y1)?);
    let h11 = f64::from(surface.get_height(x1, y1)?);

    let top = h00 + (h10 - h00) * fx;
    let bottom = h01 + (h11 - h01) * fx;
    Ok((top + (bottom - top) * fy) as f32)
}
