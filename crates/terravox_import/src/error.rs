//! # Import Error Types
//!
//! Three severities, matching how the pipeline reacts:
//!
//! - [`ConfigError`]: fatal to the current import, recoverable by the user
//!   correcting the configuration
//! - [`ImportError`]: fatal, including the surface dying mid-import and
//!   cancellation by a newer request
//! - [`ImportWarning`]: non-fatal, surfaced alongside a successful asset
//!
//! Malformed *data* (out-of-range weights, unmapped indices, non-finite
//! heights) is never an error: it is clamped, zeroed, or warned about.

use std::fmt;

use thiserror::Error;

use terravox_asset::{AssetError, LayerId};
use terravox_surface::{RgbaChannel, SurfaceError};

/// Structural configuration problems, detected before any grid work starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// No surface is bound to the importer.
    #[error("no surface bound to the importer")]
    MissingSurface,

    /// The bound reference does not resolve to a readable surface.
    #[error("surface reference does not resolve to a readable surface")]
    InvalidSurface,

    /// The bound surface has no texels to import.
    #[error("surface is empty ({width}x{height})")]
    EmptySurface {
        /// Surface width.
        width: u32,
        /// Surface height.
        height: u32,
    },

    /// The voxel grid scale factor is unusable.
    #[error("voxel scale {0} is not finite and positive")]
    InvalidVoxelScale(f32),

    /// A mapping entry's packed slot is outside the four-channel range.
    #[error("packed slot {slot} out of range 0..=3 for layer {layer:?}")]
    SlotOutOfRange {
        /// The entry's destination layer.
        layer: LayerId,
        /// The offending slot value.
        slot: u8,
    },

    /// A destination layer is bound by more than one entry. Every layer
    /// must have exactly one source.
    #[error("destination layer {layer:?} is bound more than once")]
    DuplicateDestination {
        /// The twice-bound layer.
        layer: LayerId,
    },

    /// Two blend-mode entries read the same source channel.
    #[error("source channel {channel:?} is bound more than once in blend mode")]
    DuplicateChannel {
        /// The twice-read channel.
        channel: RgbaChannel,
    },

    /// Two single-index entries claim the same discrete index value, so a
    /// column holding that index would resolve ambiguously.
    #[error("material index {index} is claimed by more than one mapping entry")]
    IndexCollision {
        /// The contested index value.
        index: u8,
    },

    /// A structural asset invariant failed (dimension mismatch, too many
    /// layers).
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Fatal import failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    /// The configuration is unusable; nothing was resampled or decoded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The surface became invalid or unreadable after validation. Possibly
    /// transient: the host may rebuild the surface and re-trigger.
    #[error("source surface became unreadable: {0}")]
    SurfaceLost(#[from] SurfaceError),

    /// The import was cancelled by a newer request before it finished.
    #[error("import cancelled by a newer request")]
    Cancelled,
}

impl From<AssetError> for ImportError {
    fn from(error: AssetError) -> Self {
        Self::Config(ConfigError::Asset(error))
    }
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Non-fatal conditions reported alongside a successfully built asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportWarning {
    /// Discrete indices with no mapping entry were encountered; the
    /// affected cells fell back to all-zero weights.
    UndefinedMaterial {
        /// Number of affected cells.
        cells: u64,
        /// One of the unmapped index values, for diagnostics.
        example_index: u8,
    },

    /// The mapping table is empty but the surface is non-trivial; the asset
    /// carries uniform-zero material weights.
    EmptyMappingTable,
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedMaterial {
                cells,
                example_index,
            } => write!(
                f,
                "{cells} cells hold material indices with no mapping entry (e.g. {example_index}); their weights are zero"
            ),
            Self::EmptyMappingTable => {
                write!(f, "no layer mappings bound; material weights are uniformly zero")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_errors_fold_into_config_errors() {
        let error: ImportError = AssetError::TooManyLayers { count: 9 }.into();
        assert!(matches!(
            error,
            ImportError::Config(ConfigError::Asset(AssetError::TooManyLayers { count: 9 }))
        ));
    }

    #[test]
    fn test_warning_messages_name_the_condition() {
        let warning = ImportWarning::UndefinedMaterial {
            cells: 16,
            example_index: 2,
        };
        let text = warning.to_string();
        assert!(text.contains("16 cells"));
        assert!(text.contains("e.g. 2"));
    }
}
