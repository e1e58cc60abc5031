//! # TERRAVOX Asset
//!
//! Engine-native heightmap data: what the import pipeline produces and the
//! voxel world engine consumes.
//!
//! ## Design Principles
//!
//! 1. **Immutable**: an asset never changes after [`HeightmapAsset::build`];
//!    a re-import builds a new asset instance
//! 2. **Deterministic**: identical inputs build bit-identical grids, and the
//!    grids can be compared as bytes to prove it
//! 3. **Fixed point**: heights are signed 16.16, so quantization is exact
//!    and reproducible across platforms
//!
//! ## Core Components
//!
//! - [`FixedHeight`]: signed 16.16 fixed-point height
//! - [`LayerId`]: opaque handle to a voxel-engine material layer
//! - [`MaterialWeights`]: per-cell weights, one slot per bound layer
//! - [`HeightGrid`] / [`MaterialGrid`]: dense intermediate grids
//! - [`HeightmapAsset`]: the immutable output asset

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod height;
pub mod heightmap;
pub mod layers;

pub use error::AssetError;
pub use height::FixedHeight;
pub use heightmap::{HeightGrid, HeightmapAsset, MaterialGrid};
pub use layers::{LayerId, MaterialWeights, MAX_MATERIAL_LAYERS};
