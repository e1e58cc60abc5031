//! # TERRAVOX Import
//!
//! The terrain import pipeline: converts a host editor surface (height grid
//! plus packed material weight channels) into an immutable voxel heightmap
//! asset.
//!
//! ## Data Flow
//!
//! ```text
//! SurfaceProvider ──┬──> resample_heights ──> HeightGrid ──┐
//!                   │                                      ├──> HeightmapAsset
//!                   └──> decode_materials ──> MaterialGrid ┘
//!                              ▲
//!                     MappingTable (validated)
//! ```
//!
//! ## Design Principles
//!
//! 1. **Fail fast**: configuration is validated before a single texel is
//!    read; a bad mapping table never costs grid work
//! 2. **Deterministic**: the same surface and configuration always build
//!    bit-identical asset grids
//! 3. **Non-destructive**: a failed or cancelled re-import leaves the
//!    previously ready asset untouched
//! 4. **Tolerant of bad data**: out-of-range weights clamp, unmapped
//!    indices warn; only structural configuration problems and a lost
//!    surface are fatal
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use terravox_import::{HeightmapImporter, ImporterConfig, LayerMapping};
//! use terravox_surface::{GridSurface, RgbaChannel};
//! use terravox_asset::LayerId;
//!
//! let config = ImporterConfig {
//!     mappings: vec![LayerMapping::new(LayerId::new(1), RgbaChannel::R, 0)],
//!     ..ImporterConfig::default()
//! };
//! let importer = HeightmapImporter::new(config);
//! let outcome = importer.set_surface(Arc::new(surface))?;
//! println!("imported {:?}", outcome.asset.dimensions());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod decode;
pub mod error;
pub mod mapping;
pub mod orchestrator;
pub mod resample;

pub use config::{ImporterConfig, LayerMapping, MaterialConfigMode};
pub use decode::{decode_materials, ChannelDecoder, DecodeOutput, MaterialSample};
pub use error::{ConfigError, ImportError, ImportResult, ImportWarning};
pub use mapping::MappingTable;
pub use orchestrator::{
    HeightmapImporter, ImportEvent, ImportOutcome, ImportState, ImportStats,
};
pub use resample::resample_heights;
