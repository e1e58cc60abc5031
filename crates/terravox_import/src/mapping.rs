//! Layer mapping table validation.
//!
//! The raw entry list is whatever the user last typed into the editor; the
//! pipeline never touches it directly. [`MappingTable::validate`] is the
//! single gate between that list and the decode stage: a pure function that
//! either proves the list unambiguous or names the first conflict.

use terravox_asset::{AssetError, LayerId, MAX_MATERIAL_LAYERS};

use crate::config::{LayerMapping, MaterialConfigMode};
use crate::error::ConfigError;

/// A validated, insertion-ordered layer mapping table.
///
/// Table position doubles as the output weight slot: entry `i` writes slot
/// `i` of every cell's [`MaterialWeights`](terravox_asset::MaterialWeights).
/// Iteration order is the insertion order, so decode output is
/// deterministic for a given configuration.
pub struct MappingTable {
    /// The mode the entries were validated against.
    mode: MaterialConfigMode,
    /// Validated entries, insertion order preserved.
    entries: Vec<LayerMapping>,
}

impl MappingTable {
    /// Validates an entry list against a material configuration mode.
    ///
    /// Pure: no side effects, no mutation of the input.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Asset`] (`TooManyLayers`) for more than four entries
    /// - [`ConfigError::SlotOutOfRange`] for a packed slot outside `0..=3`
    /// - [`ConfigError::DuplicateDestination`] if a layer is bound twice,
    ///   in any mode and regardless of entry order
    /// - [`ConfigError::IndexCollision`] if two single-index entries claim
    ///   the same index value
    /// - [`ConfigError::DuplicateChannel`] if two blend entries read the
    ///   same channel (rejected outright rather than resolved last-wins)
    pub fn validate(
        entries: &[LayerMapping],
        mode: MaterialConfigMode,
    ) -> Result<Self, ConfigError> {
        if entries.len() > MAX_MATERIAL_LAYERS {
            return Err(ConfigError::Asset(AssetError::TooManyLayers {
                count: entries.len(),
            }));
        }

        for (position, entry) in entries.iter().enumerate() {
            if entry.slot as usize >= MAX_MATERIAL_LAYERS {
                return Err(ConfigError::SlotOutOfRange {
                    layer: entry.layer,
                    slot: entry.slot,
                });
            }

            for earlier in &entries[..position] {
                if earlier.layer == entry.layer {
                    return Err(ConfigError::DuplicateDestination { layer: entry.layer });
                }
                match mode {
                    MaterialConfigMode::SingleIndex => {
                        if earlier.slot == entry.slot {
                            return Err(ConfigError::IndexCollision { index: entry.slot });
                        }
                    }
                    MaterialConfigMode::BlendedWeights => {
                        if earlier.channel == entry.channel {
                            return Err(ConfigError::DuplicateChannel {
                                channel: entry.channel,
                            });
                        }
                    }
                }
            }
        }

        Ok(Self {
            mode,
            entries: entries.to_vec(),
        })
    }

    /// Returns the mode the table was validated against.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> MaterialConfigMode {
        self.mode
    }

    /// Returns the validated entries in insertion order.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[LayerMapping] {
        &self.entries
    }

    /// Returns the number of bound layers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no layers are bound.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the bound destination layers in weight-slot order.
    #[must_use]
    pub fn bound_layers(&self) -> Vec<LayerId> {
        self.entries.iter().map(|entry| entry.layer).collect()
    }

    /// Resolves a discrete index value to its weight slot and entry, if any
    /// entry claims it. Only meaningful in single-index mode.
    #[must_use]
    pub fn entry_for_index(&self, index: u8) -> Option<(usize, &LayerMapping)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.slot == index)
    }
}
