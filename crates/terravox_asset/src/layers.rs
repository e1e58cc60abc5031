//! Material layer handles and per-cell weight storage.
//!
//! The voxel engine identifies material layers by opaque 16-bit handles.
//! Ownership of whatever the handle names (textures, physics materials)
//! stays with the engine; the importer only routes weight data to slots.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Maximum number of destination layers one asset can carry.
///
/// Matches the four channels of a packed RGBA weight source.
pub const MAX_MATERIAL_LAYERS: usize = 4;

/// Opaque handle to a voxel-engine material layer.
#[repr(transparent)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct LayerId(pub u16);

impl LayerId {
    /// Creates a new layer handle.
    #[inline]
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Returns the raw handle value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

/// Per-cell material weights, one slot per bound destination layer.
///
/// Slot order is the mapping table's insertion order. Slots with no bound
/// layer stay at weight zero. Weights are not renormalized anywhere in the
/// pipeline; whatever the decoder produced is what the cell carries.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MaterialWeights(pub [f32; MAX_MATERIAL_LAYERS]);

impl MaterialWeights {
    /// All-zero weights (no material).
    pub const ZERO: Self = Self([0.0; MAX_MATERIAL_LAYERS]);

    /// A sample fully owned by one slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= MAX_MATERIAL_LAYERS`; slot indices come from a
    /// validated mapping table, so a violation is a programmer error.
    #[inline]
    #[must_use]
    pub fn single(slot: usize) -> Self {
        let mut weights = [0.0; MAX_MATERIAL_LAYERS];
        weights[slot] = 1.0;
        Self(weights)
    }

    /// Returns the weight in a slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= MAX_MATERIAL_LAYERS`.
    #[inline]
    #[must_use]
    pub fn get(self, slot: usize) -> f32 {
        self.0[slot]
    }

    /// Sets the weight in a slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= MAX_MATERIAL_LAYERS`.
    #[inline]
    pub fn set(&mut self, slot: usize, weight: f32) {
        self.0[slot] = weight;
    }

    /// Returns true if every slot is exactly zero.
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == [0.0; MAX_MATERIAL_LAYERS]
    }
}
