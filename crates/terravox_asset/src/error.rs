//! # Asset Error Types
//!
//! Structural errors detected while assembling a heightmap asset.

use thiserror::Error;

use crate::layers::MAX_MATERIAL_LAYERS;

/// Errors that can occur while building asset data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// Height and material grids must cover the same cells; a mismatch is a
    /// configuration error, never a silent crop.
    #[error("height grid {height_width}x{height_height} does not match material grid {material_width}x{material_height}")]
    DimensionMismatch {
        /// Height grid width.
        height_width: u32,
        /// Height grid height.
        height_height: u32,
        /// Material grid width.
        material_width: u32,
        /// Material grid height.
        material_height: u32,
    },

    /// A grid buffer does not hold `width * height` cells.
    #[error("grid buffer holds {len} cells, dimensions {width}x{height} need {expected}")]
    GridSizeMismatch {
        /// Actual buffer length.
        len: usize,
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// `width * height`.
        expected: usize,
    },

    /// More destination layers bound than the asset format carries.
    #[error("{count} material layers bound, maximum is {max}", max = MAX_MATERIAL_LAYERS)]
    TooManyLayers {
        /// Number of layers requested.
        count: usize,
    },
}

/// Result type for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;
