//! Channel decoding: packed surface channels to per-cell material weights.
//!
//! [`ChannelDecoder`] is the per-texel contract: pure with respect to
//! `(x, y)`, no hidden state, identical inputs always produce identical
//! samples. [`decode_materials`] drives it over a whole target grid with
//! row-granular cancellation, producing the material half of the asset.

use std::sync::atomic::{AtomicBool, Ordering};

use terravox_asset::{MaterialGrid, MaterialWeights};
use terravox_surface::{RgbaChannel, SurfaceError, SurfaceProvider};

use crate::config::MaterialConfigMode;
use crate::error::{ImportError, ImportResult};
use crate::mapping::MappingTable;

/// One decoded voxel column's material data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialSample {
    /// Weights in table-slot order.
    pub weights: MaterialWeights,
    /// Set when single-index decoding met an index with no table entry;
    /// the weights are all-zero in that case.
    pub undefined_index: Option<u8>,
}

/// Decodes packed channel data at single texels.
pub struct ChannelDecoder<'a, S: SurfaceProvider + ?Sized> {
    /// The surface being read.
    surface: &'a S,
    /// Validated mapping table; its mode drives the decode path.
    table: &'a MappingTable,
    /// Channel holding the discrete index in single-index mode.
    index_channel: RgbaChannel,
}

impl<'a, S: SurfaceProvider + ?Sized> ChannelDecoder<'a, S> {
    /// Creates a decoder over a surface and a validated table.
    #[must_use]
    pub const fn new(surface: &'a S, table: &'a MappingTable, index_channel: RgbaChannel) -> Self {
        Self {
            surface,
            table,
            index_channel,
        }
    }

    /// Decodes the material sample at a source texel.
    ///
    /// Blend mode reads every mapped channel, clamps to `[0, 1]` (non-finite
    /// data reads as zero) and passes the values through without
    /// renormalization; if mapped weights do not sum to one, that is the
    /// caller's policy question, not ours. Single-index mode resolves the
    /// index through the table; an unmapped index yields an all-zero sample
    /// tagged with the index, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the surface dies or the texel is out of
    /// bounds.
    pub fn decode(&self, x: u32, y: u32) -> Result<MaterialSample, SurfaceError> {
        match self.table.mode() {
            MaterialConfigMode::BlendedWeights => {
                let mut weights = MaterialWeights::ZERO;
                for (slot, entry) in self.table.entries().iter().enumerate() {
                    let raw = self.surface.get_weight(entry.channel, x, y)?;
                    let clamped = if raw.is_finite() {
                        raw.clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                    weights.set(slot, clamped);
                }
                Ok(MaterialSample {
                    weights,
                    undefined_index: None,
                })
            }
            MaterialConfigMode::SingleIndex => {
                let index = self.surface.get_material_index(self.index_channel, x, y)?;
                match self.table.entry_for_index(index) {
                    Some((slot, _)) => Ok(MaterialSample {
                        weights: MaterialWeights::single(slot),
                        undefined_index: None,
                    }),
                    None => Ok(MaterialSample {
                        weights: MaterialWeights::ZERO,
                        undefined_index: Some(index),
                    }),
                }
            }
        }
    }
}

/// The decode stage's output: the material grid plus warning bookkeeping.
pub struct DecodeOutput {
    /// Decoded per-cell weights at target resolution.
    pub grid: MaterialGrid,
    /// Number of cells whose index had no table entry.
    pub undefined_cells: u64,
    /// One of the unmapped index values, if any were seen.
    pub example_index: Option<u8>,
}

/// Decodes material data for every cell of the target grid.
///
/// Each target cell samples its nearest source texel (pixel-center mapping,
/// edge-clamped); discrete indices cannot be interpolated, so blend weights
/// use the same mapping for consistency between the two modes. At equal
/// resolutions this is the identity mapping. Checks `cancel` between rows.
///
/// # Errors
///
/// - [`ImportError::SurfaceLost`] if the surface dies mid-decode
/// - [`ImportError::Cancelled`] if a newer request raised the cancel flag
pub fn decode_materials<S: SurfaceProvider + ?Sized>(
    surface: &S,
    table: &MappingTable,
    index_channel: RgbaChannel,
    target: (u32, u32),
    cancel: &AtomicBool,
) -> ImportResult<DecodeOutput> {
    let (source_width, source_height) = surface.get_dimensions()?;
    let (target_width, target_height) = target;

    let x_ratio = f64::from(source_width) / f64::from(target_width);
    let y_ratio = f64::from(source_height) / f64::from(target_height);

    let decoder = ChannelDecoder::new(surface, table, index_channel);
    let mut data = Vec::with_capacity((target_width as usize) * (target_height as usize));
    let mut undefined_cells = 0u64;
    let mut example_index = None;

    for target_y in 0..target_height {
        if cancel.load(Ordering::Relaxed) {
            return Err(ImportError::Cancelled);
        }
        let source_y = nearest_source(target_y, y_ratio, source_height);
        for target_x in 0..target_width {
            let source_x = nearest_source(target_x, x_ratio, source_width);
            let sample = decoder.decode(source_x, source_y)?;
            if let Some(index) = sample.undefined_index {
                undefined_cells += 1;
                example_index.get_or_insert(index);
            }
            data.push(sample.weights);
        }
    }

    Ok(DecodeOutput {
        grid: MaterialGrid::new(target_width, target_height, data)?,
        undefined_cells,
        example_index,
    })
}

/// Maps a target cell to its nearest source texel, edge-clamped.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn nearest_source(target: u32, ratio: f64, source_extent: u32) -> u32 {
    let source = ((f64::from(target) + 0.5) * ratio).floor() as u32;
    source.min(source_extent.saturating_sub(1))
}
