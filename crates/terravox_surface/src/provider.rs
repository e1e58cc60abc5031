//! The read-only surface sampling interface.
//!
//! Hosts expose their terrain surface through [`SurfaceProvider`]. The
//! pipeline treats the surface as immutable for the duration of one import,
//! but takes no lock on the host's data; instead every sampling method
//! returns a [`SurfaceError`] so a provider can report that the surface was
//! destroyed or rebuilt under us.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a surface provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The surface reference is no longer valid (the host destroyed or
    /// rebuilt it since the import started).
    #[error("surface is no longer valid")]
    Invalidated,

    /// A sample was requested outside the surface bounds.
    #[error("sample ({x}, {y}) outside surface bounds {width}x{height}")]
    OutOfBounds {
        /// Requested X coordinate.
        x: u32,
        /// Requested Y coordinate.
        y: u32,
        /// Surface width in texels.
        width: u32,
        /// Surface height in texels.
        height: u32,
    },
}

/// One channel of the packed RGBA weight data.
///
/// The editor packs up to four material weight layers into the channels of a
/// single RGBA texture; a mapping entry names the channel its layer lives in.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RgbaChannel {
    /// Red channel.
    #[default]
    R = 0,
    /// Green channel.
    G = 1,
    /// Blue channel.
    B = 2,
    /// Alpha channel.
    A = 3,
}

impl RgbaChannel {
    /// All four channels in packed order.
    pub const ALL: [Self; 4] = [Self::R, Self::G, Self::B, Self::A];

    /// Returns the packed position of this channel (0-3).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Read-only view of the host editor's terrain surface.
///
/// Coordinates are texel coordinates in `0..width` x `0..height`. Heights
/// are in the editor's native floating range; the pair returned by
/// [`get_scale_offset`] converts them to world units
/// (`world = raw * scale + offset`). Weights are normalized to `[0, 1]` by
/// convention, but the pipeline does not trust that and clamps on decode.
///
/// [`get_scale_offset`]: SurfaceProvider::get_scale_offset
pub trait SurfaceProvider: Send + Sync {
    /// Returns the surface dimensions in texels as `(width, height)`.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Invalidated`] if the surface is gone.
    fn get_dimensions(&self) -> Result<(u32, u32), SurfaceError>;

    /// Returns the vertical `(scale, offset)` converting raw heights to
    /// world units.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Invalidated`] if the surface is gone.
    fn get_scale_offset(&self) -> Result<(f32, f32), SurfaceError>;

    /// Samples the raw height at a texel.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the surface is gone or the coordinates
    /// are out of bounds.
    fn get_height(&self, x: u32, y: u32) -> Result<f32, SurfaceError>;

    /// Samples one packed weight channel at a texel.
    ///
    /// Channels the host never painted read as `0.0`.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the surface is gone or the coordinates
    /// are out of bounds.
    fn get_weight(&self, channel: RgbaChannel, x: u32, y: u32) -> Result<f32, SurfaceError>;

    /// Reads a discrete material index (0-255) from a channel at a texel.
    ///
    /// The default implementation re-quantizes the normalized channel value;
    /// providers that store raw index bytes should override it to return
    /// them directly. Non-finite channel data reads as index `0`.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the surface is gone or the coordinates
    /// are out of bounds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn get_material_index(
        &self,
        channel: RgbaChannel,
        x: u32,
        y: u32,
    ) -> Result<u8, SurfaceError> {
        let weight = self.get_weight(channel, x, y)?;
        if !weight.is_finite() {
            return Ok(0);
        }
        Ok((weight.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstSurface(f32);

    impl SurfaceProvider for ConstSurface {
        fn get_dimensions(&self) -> Result<(u32, u32), SurfaceError> {
            Ok((1, 1))
        }

        fn get_scale_offset(&self) -> Result<(f32, f32), SurfaceError> {
            Ok((1.0, 0.0))
        }

        fn get_height(&self, _x: u32, _y: u32) -> Result<f32, SurfaceError> {
            Ok(0.0)
        }

        fn get_weight(&self, _channel: RgbaChannel, _x: u32, _y: u32) -> Result<f32, SurfaceError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_channel_packed_order() {
        for (slot, channel) in RgbaChannel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), slot);
        }
    }

    #[test]
    fn test_default_index_quantization() {
        let surface = ConstSurface(1.0);
        assert_eq!(surface.get_material_index(RgbaChannel::R, 0, 0), Ok(255));

        let surface = ConstSurface(0.0);
        assert_eq!(surface.get_material_index(RgbaChannel::R, 0, 0), Ok(0));

        // 2/255 stored as a normalized weight must round-trip to index 2
        let surface = ConstSurface(2.0 / 255.0);
        assert_eq!(surface.get_material_index(RgbaChannel::R, 0, 0), Ok(2));
    }

    #[test]
    fn test_default_index_handles_garbage() {
        let surface = ConstSurface(f32::NAN);
        assert_eq!(surface.get_material_index(RgbaChannel::R, 0, 0), Ok(0));

        let surface = ConstSurface(17.5);
        assert_eq!(surface.get_material_index(RgbaChannel::R, 0, 0), Ok(255));
    }
}
