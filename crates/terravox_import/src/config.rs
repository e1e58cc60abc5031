//! Importer configuration.
//!
//! The host editor owns and edits these values; the pipeline only reads
//! them. Everything here is serde-serializable so the host can persist a
//! configuration alongside its scene, but file formats stay the host's
//! responsibility.

use serde::{Deserialize, Serialize};
use terravox_asset::LayerId;
use terravox_surface::RgbaChannel;

/// How the packed channel data is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialConfigMode {
    /// Up to four weight channels are blended per voxel column.
    #[default]
    BlendedWeights,
    /// A single discrete index read from one channel selects exactly one
    /// layer per voxel column.
    SingleIndex,
}

/// One row of the layer mapping table: where one destination layer's data
/// comes from.
///
/// In [`MaterialConfigMode::BlendedWeights`] the entry reads `channel`; in
/// [`MaterialConfigMode::SingleIndex`] the entry instead claims the discrete
/// index value `slot`, and the channel field is unused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMapping {
    /// The voxel-engine material layer receiving the data.
    pub layer: LayerId,
    /// The packed weight channel the data is read from (blend mode).
    pub channel: RgbaChannel,
    /// Packed slot position, `0..=3`. In single-index mode this is the
    /// index value the entry claims.
    pub slot: u8,
}

impl LayerMapping {
    /// Creates a mapping entry.
    #[inline]
    #[must_use]
    pub const fn new(layer: LayerId, channel: RgbaChannel, slot: u8) -> Self {
        Self {
            layer,
            channel,
            slot,
        }
    }
}

/// Full importer configuration, mirrored from the host's property surface.
///
/// Any change to any field is a trigger for re-validation and re-import.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImporterConfig {
    /// How packed channels are interpreted.
    pub mode: MaterialConfigMode,
    /// Ordered layer mapping entries. Order is meaningful: it fixes the
    /// weight-slot order of the output asset.
    pub mappings: Vec<LayerMapping>,
    /// The channel the discrete index is read from in single-index mode.
    pub index_channel: RgbaChannel,
    /// Voxel grid scale factor: target resolution = surface resolution
    /// times this, per axis. Must be finite and positive.
    pub voxel_scale: f32,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            mode: MaterialConfigMode::default(),
            mappings: Vec::new(),
            index_channel: RgbaChannel::R,
            voxel_scale: 1.0,
        }
    }
}

impl ImporterConfig {
    /// Derives the voxel grid dimensions from the surface dimensions.
    ///
    /// Rounds to the nearest cell count and never goes below 1x1. Only
    /// meaningful for a validated (finite, positive) scale factor.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn target_dimensions(&self, source: (u32, u32)) -> (u32, u32) {
        let scale = f64::from(self.voxel_scale);
        let width = (f64::from(source.0) * scale).round().max(1.0) as u32;
        let height = (f64::from(source.1) * scale).round().max(1.0) as u32;
        (width, height)
    }
}
