//! World lifecycle: `Uninitialized → Ready` on raster load, `Ready → Ready`
//! on every accepted parameter change.
//!
//! The current [`FieldBank`] sits behind an `Arc` inside an `RwLock`. A
//! recompute builds a complete new bank without touching that lock, then
//! swaps the `Arc` under a short write lock. Readers clone the `Arc` and never
//! observe a partially built bank.
//!
//! Writers are serialized by a separate mutex. Every `recompute` call takes a
//! ticket on entry; a call that reaches the writer slot after a newer ticket
//! has already been applied is dropped, so the most recently requested
//! parameter set is the one that stays current.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::climate::run_pipeline;
use crate::error::{ClimateError, Result};
use crate::fields::{CellSnapshot, FieldBank};
use crate::geometry::LatLon;
use crate::params::{ClimateParams, ModelConstants};
use crate::raster::{RasterCache, RasterSource, WorldRaster};

#[derive(Debug, Clone, Default)]
pub enum WorldState {
    #[default]
    Uninitialized,
    Ready {
        raster: Arc<WorldRaster>,
        params: ClimateParams,
        fields: Arc<FieldBank>,
    },
}

impl WorldState {
    pub fn is_ready(&self) -> bool {
        matches!(self, WorldState::Ready { .. })
    }
}

/// Owns the raster cache, the model constants and the current world state.
#[derive(Debug, Default)]
pub struct WorldController {
    cache: RasterCache,
    constants: ModelConstants,
    state: RwLock<WorldState>,
    /// Last ticket that took the writer slot.
    writer: Mutex<u64>,
    tickets: AtomicU64,
}

impl WorldController {
    pub fn new(constants: ModelConstants) -> Self {
        Self {
            cache: RasterCache::new(),
            constants,
            state: RwLock::new(WorldState::Uninitialized),
            writer: Mutex::new(0),
            tickets: AtomicU64::new(0),
        }
    }

    pub fn constants(&self) -> &ModelConstants {
        &self.constants
    }

    /// Load the raster (memoized) and compute the first bank.
    ///
    /// Already-ready controllers return their current bank untouched. A load
    /// failure leaves the controller uninitialized; calling again retries.
    pub fn load<S: RasterSource + ?Sized>(&self, source: &S, params: ClimateParams) -> Result<Arc<FieldBank>> {
        if let WorldState::Ready { fields, .. } = &*self.read() {
            return Ok(Arc::clone(fields));
        }

        let raster = self.cache.get_or_load(source)?;
        let _writer = self.writer();
        if let WorldState::Ready { fields, .. } = &*self.read() {
            // Another caller finished first.
            return Ok(Arc::clone(fields));
        }
        let started = Instant::now();
        let fields = Arc::new(run_pipeline(&raster, &params, &self.constants)?);
        log::info!("initial climate computed in {} ms", started.elapsed().as_millis());

        *self.write() = WorldState::Ready { raster, params, fields: Arc::clone(&fields) };
        Ok(fields)
    }

    pub fn is_ready(&self) -> bool {
        self.read().is_ready()
    }

    /// Rebuild every field for `params` and swap the result in.
    ///
    /// Invalid parameters are rejected before any stage runs and the previous
    /// bank stays current. Parameters equal to the current ones return the
    /// current bank without recomputing. A call overtaken by a newer one
    /// while waiting for the writer slot returns the newer bank unchanged.
    pub fn recompute(&self, params: ClimateParams) -> Result<Arc<FieldBank>> {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        let mut applied = self.writer();
        if ticket < *applied {
            log::debug!("recompute #{ticket} superseded by #{}", *applied);
            return self.fields();
        }
        *applied = ticket;

        let raster = match &*self.read() {
            WorldState::Uninitialized => return Err(ClimateError::NotReady),
            WorldState::Ready { raster, params: current, fields } => {
                if *current == params {
                    return Ok(Arc::clone(fields));
                }
                Arc::clone(raster)
            }
        };

        let started = Instant::now();
        let fields = match run_pipeline(&raster, &params, &self.constants) {
            Ok(bank) => Arc::new(bank),
            Err(e) => {
                log::warn!("parameter set rejected, keeping previous fields: {e}");
                return Err(e);
            }
        };
        log::info!("climate recomputed in {} ms", started.elapsed().as_millis());

        *self.write() = WorldState::Ready { raster, params, fields: Arc::clone(&fields) };
        Ok(fields)
    }

    /// Apply the debouncer's pending parameters once its quiet period has
    /// elapsed. Returns `Ok(None)` when nothing was due.
    pub fn recompute_if_due(
        &self,
        debouncer: &mut ParamDebouncer,
        now: Instant,
    ) -> Result<Option<Arc<FieldBank>>> {
        match debouncer.take_ready(now) {
            Some(params) => self.recompute(params).map(Some),
            None => Ok(None),
        }
    }

    pub fn fields(&self) -> Result<Arc<FieldBank>> {
        match &*self.read() {
            WorldState::Ready { fields, .. } => Ok(Arc::clone(fields)),
            WorldState::Uninitialized => Err(ClimateError::NotReady),
        }
    }

    pub fn params(&self) -> Result<ClimateParams> {
        match &*self.read() {
            WorldState::Ready { params, .. } => Ok(params.clone()),
            WorldState::Uninitialized => Err(ClimateError::NotReady),
        }
    }

    pub fn query(&self, index: usize) -> Result<CellSnapshot> {
        self.fields()?.snapshot(index)
    }

    pub fn query_latlon(&self, ll: LatLon) -> Result<CellSnapshot> {
        let fields = self.fields()?;
        fields.snapshot(fields.cell_for_latlon(ll))
    }

    fn writer(&self) -> MutexGuard<'_, u64> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, WorldState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, WorldState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Debounce ──────────────────────────────────────────────────────────────────

/// Coalesces rapid parameter changes: only the latest submission is kept,
/// and it becomes ready once `quiet` has passed since it arrived.
#[derive(Debug, Clone)]
pub struct ParamDebouncer {
    quiet: Duration,
    pending: Option<(ClimateParams, Instant)>,
}

impl ParamDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, pending: None }
    }

    pub fn submit(&mut self, params: ClimateParams, now: Instant) {
        self.pending = Some((params, now));
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn take_ready(&mut self, now: Instant) -> Option<ClimateParams> {
        match &self.pending {
            Some((_, at)) if now.saturating_duration_since(*at) >= self.quiet => {
                self.pending.take().map(|(p, _)| p)
            }
            _ => None,
        }
    }
}
