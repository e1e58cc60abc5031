//! Fixed-point height representation.
//!
//! Voxel column heights are stored as signed 16.16 fixed point. The format
//! was chosen over raw floats so that quantization is explicit and the same
//! surface always converts to the same bits, on every platform.

use bytemuck::{Pod, Zeroable};

/// A height value in signed 16.16 fixed point.
///
/// One step is `1 / 65536` world units. Conversion from world space rounds
/// to the nearest step, saturates at the `i32` range, and maps non-finite
/// input to zero; malformed height data is normalized, never fatal.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
pub struct FixedHeight(i32);

impl FixedHeight {
    /// Number of fractional bits.
    pub const FRACTIONAL_BITS: u32 = 16;

    /// The smallest representable height difference, in world units.
    pub const STEP: f32 = 1.0 / 65536.0;

    /// Zero height.
    pub const ZERO: Self = Self(0);

    /// One world unit.
    pub const ONE: Self = Self(1 << Self::FRACTIONAL_BITS);

    /// Wraps a raw fixed-point value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw fixed-point value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Quantizes a world-space height to the nearest representable step.
    ///
    /// The multiply happens in `f64`, so for any height the engine can
    /// represent the error is bounded by the quantization step rather than
    /// by `f32` mantissa precision.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_world(world: f32) -> Self {
        // `as` saturates at the i32 range and maps NaN to zero, which is
        // exactly the normalization policy for malformed height data.
        Self((f64::from(world) * 65536.0).round() as i32)
    }

    /// Applies the surface's vertical transform, then quantizes.
    ///
    /// `world = raw * scale + offset`, computed in `f64` so each column's
    /// quantization is independent and exact.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn quantize(raw: f32, scale: f32, offset: f32) -> Self {
        let world = f64::from(raw).mul_add(f64::from(scale), f64::from(offset));
        Self((world * 65536.0).round() as i32)
    }

    /// Converts back to a world-space height.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_world(self) -> f32 {
        (f64::from(self.0) / 65536.0) as f32
    }
}
