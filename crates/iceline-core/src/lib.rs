//! Steady-state moisture transport and ice accumulation over a global
//! elevation raster.
//!
//! Pipeline (recomputed from scratch on every parameter change):
//!   raster → land mask → continental field → moisture transport →
//!   thermal / ice model → [`fields::FieldBank`].
//!
//! [`controller::WorldController`] owns the loaded raster and the current
//! field bank and serves point queries between recomputes.

pub mod climate;
pub mod controller;
pub mod error;
pub mod fields;
pub mod geometry;
pub mod params;
pub mod raster;

pub use controller::{WorldController, WorldState};
pub use error::{ClimateError, Result};
pub use fields::{CellSnapshot, FieldBank, FieldKind, FieldSummary};
pub use params::{ClimateParams, ModelConstants};
pub use raster::{RasterCache, RasterSource, WorldRaster};
