//! Dense grids and the immutable heightmap asset.
//!
//! [`HeightGrid`] and [`MaterialGrid`] are the intermediate buffers the
//! resampling and decoding stages fill independently; [`HeightmapAsset`]
//! zips them together once both are complete. The asset enforces the
//! dimensional and layer-count invariants at build time and is read-only
//! afterwards.

use std::fmt;

use crate::error::{AssetError, AssetResult};
use crate::height::FixedHeight;
use crate::layers::{LayerId, MaterialWeights, MAX_MATERIAL_LAYERS};

/// Dense row-major grid of fixed-point heights.
pub struct HeightGrid {
    /// Width in cells.
    width: u32,
    /// Height in cells.
    height: u32,
    /// Cell data, row-major.
    data: Box<[FixedHeight]>,
}

impl HeightGrid {
    /// Wraps a row-major buffer of `width * height` cells.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::GridSizeMismatch`] if the buffer length does
    /// not match the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<FixedHeight>) -> AssetResult<Self> {
        let expected = (width as usize) * (height as usize);
        if data.len() != expected {
            return Err(AssetError::GridSizeMismatch {
                len: data.len(),
                width,
                height,
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            data: data.into_boxed_slice(),
        })
    }

    /// Returns the grid dimensions as `(width, height)`.
    #[inline]
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the height at a cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> FixedHeight {
        assert!(x < self.width && y < self.height, "cell out of bounds");
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }
}

/// Dense row-major grid of per-cell material weights.
pub struct MaterialGrid {
    /// Width in cells.
    width: u32,
    /// Height in cells.
    height: u32,
    /// Cell data, row-major.
    data: Box<[MaterialWeights]>,
}

impl MaterialGrid {
    /// Wraps a row-major buffer of `width * height` cells.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::GridSizeMismatch`] if the buffer length does
    /// not match the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<MaterialWeights>) -> AssetResult<Self> {
        let expected = (width as usize) * (height as usize);
        if data.len() != expected {
            return Err(AssetError::GridSizeMismatch {
                len: data.len(),
                width,
                height,
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            data: data.into_boxed_slice(),
        })
    }

    /// Returns the grid dimensions as `(width, height)`.
    #[inline]
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the weights at a cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> MaterialWeights {
        assert!(x < self.width && y < self.height, "cell out of bounds");
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }
}

/// The immutable output of one successful import.
///
/// A dense voxel-column grid of fixed-point heights and material weights,
/// plus the ordered list of destination layers the weight slots map to.
/// There are no mutating accessors; a re-import builds a new instance.
pub struct HeightmapAsset {
    /// Width in voxel columns.
    width: u32,
    /// Height in voxel columns.
    height: u32,
    /// Bound destination layers, in weight-slot order.
    layers: Box<[LayerId]>,
    /// Column heights, row-major.
    heights: Box<[FixedHeight]>,
    /// Column material weights, row-major.
    weights: Box<[MaterialWeights]>,
}

impl HeightmapAsset {
    /// Assembles an asset from independently produced grids.
    ///
    /// # Errors
    ///
    /// - [`AssetError::DimensionMismatch`] if the grids disagree on size;
    ///   a mismatch is rejected, never cropped.
    /// - [`AssetError::TooManyLayers`] if more than
    ///   [`MAX_MATERIAL_LAYERS`] destination layers are bound.
    pub fn build(
        heights: HeightGrid,
        materials: MaterialGrid,
        layers: &[LayerId],
    ) -> AssetResult<Self> {
        let (height_width, height_height) = heights.dimensions();
        let (material_width, material_height) = materials.dimensions();
        if (height_width, height_height) != (material_width, material_height) {
            return Err(AssetError::DimensionMismatch {
                height_width,
                height_height,
                material_width,
                material_height,
            });
        }
        if layers.len() > MAX_MATERIAL_LAYERS {
            return Err(AssetError::TooManyLayers {
                count: layers.len(),
            });
        }
        Ok(Self {
            width: height_width,
            height: height_height,
            layers: layers.to_vec().into_boxed_slice(),
            heights: heights.data,
            weights: materials.data,
        })
    }

    /// Returns the asset dimensions in voxel columns as `(width, height)`.
    #[inline]
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the total number of voxel columns.
    #[inline]
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Returns the bound destination layers in weight-slot order.
    #[inline]
    #[must_use]
    pub fn layers(&self) -> &[LayerId] {
        &self.layers
    }

    /// Returns the height of a voxel column.
    ///
    /// # Panics
    ///
    /// Panics if the column is out of bounds.
    #[inline]
    #[must_use]
    pub fn height_at(&self, x: u32, y: u32) -> FixedHeight {
        self.heights[self.cell_index(x, y)]
    }

    /// Returns the material weights of a voxel column.
    ///
    /// # Panics
    ///
    /// Panics if the column is out of bounds.
    #[inline]
    #[must_use]
    pub fn weights_at(&self, x: u32, y: u32) -> MaterialWeights {
        self.weights[self.cell_index(x, y)]
    }

    /// Returns the weight a specific destination layer received at a column,
    /// or `0.0` if the layer is not bound in this asset.
    ///
    /// # Panics
    ///
    /// Panics if the column is out of bounds.
    #[must_use]
    pub fn weight_for_layer(&self, x: u32, y: u32, layer: LayerId) -> f32 {
        let weights = self.weights_at(x, y);
        self.layers
            .iter()
            .position(|&bound| bound == layer)
            .map_or(0.0, |slot| weights.get(slot))
    }

    /// Views the height grid as raw bytes.
    ///
    /// Deterministic imports produce bit-identical byte views; the engine
    /// also uses this for zero-copy upload.
    #[must_use]
    pub fn height_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.heights)
    }

    /// Views the weight grid as raw bytes.
    #[must_use]
    pub fn weight_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.weights)
    }

    /// Row-major index of a column.
    ///
    /// # Panics
    ///
    /// Panics if the column is out of bounds.
    #[inline]
    fn cell_index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "column out of bounds");
        (y as usize) * (self.width as usize) + (x as usize)
    }
}

// Grids are too large to dump; show the shape only.
impl fmt::Debug for HeightmapAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeightmapAsset")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}
