use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::{ClimateError, Result};

/// The world elevation snapshot: one 0–255 code per cell, row-major,
/// row 0 at the northern edge. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldRaster {
    width: usize,
    height: usize,
    elevation: Vec<u8>,
}

impl WorldRaster {
    /// Wrap decoded elevation codes. Dimensions come from the decoded image,
    /// so a length mismatch or an empty grid is a load error.
    pub fn new(width: usize, height: usize, elevation: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 || elevation.len() != width * height {
            return Err(ClimateError::RasterShape { width, height, len: elevation.len() });
        }
        Ok(Self { width, height, elevation })
    }

    /// Build a raster by evaluating `f(row, col)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u8) -> Result<Self> {
        let mut elevation = Vec::with_capacity(width * height);
        for r in 0..height {
            for c in 0..width {
                elevation.push(f(r, c));
            }
        }
        Self::new(width, height, elevation)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elevation.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elevation.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.elevation[row * self.width + col]
    }

    pub fn elevation(&self) -> &[u8] {
        &self.elevation
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Anything that can fetch and decode the world raster: an image file, an
/// HTTP tile, an in-memory buffer. Decoding formats live with the caller.
pub trait RasterSource {
    fn load(&self) -> Result<WorldRaster>;
}

impl<F> RasterSource for F
where
    F: Fn() -> Result<WorldRaster>,
{
    fn load(&self) -> Result<WorldRaster> {
        self()
    }
}

/// Memoized raster load.
///
/// Callers that arrive while a load is in flight block on the same slot and
/// receive the one result. Only successes are cached: after a failed load
/// the slot stays empty and the next caller retries.
#[derive(Debug, Default)]
pub struct RasterCache {
    slot: Mutex<Option<Arc<WorldRaster>>>,
}

impl RasterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load<S: RasterSource + ?Sized>(&self, source: &S) -> Result<Arc<WorldRaster>> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(raster) = slot.as_ref() {
            return Ok(Arc::clone(raster));
        }
        match source.load() {
            Ok(raster) => {
                log::info!("world raster loaded: {}×{}", raster.width(), raster.height());
                let raster = Arc::new(raster);
                *slot = Some(Arc::clone(&raster));
                Ok(raster)
            }
            Err(e) => {
                log::warn!("world raster load failed, will retry on next request: {e}");
                Err(e)
            }
        }
    }

    /// The cached raster, if a load has succeeded.
    pub fn get(&self) -> Option<Arc<WorldRaster>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
