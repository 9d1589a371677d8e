//! Moisture transport engine.
//!
//! The raster is an implicit 4-connected graph (columns wrap, rows do not).
//! Every ocean cell is a source seeded with `−ln(clamp(evaporation, ε, 1))`,
//! which turns a multiplicative moisture loss along a route into an additive
//! path cost. A multi-source Dijkstra then finds, for every cell, the
//! cheapest route from any ocean source:
//!
//!   moistureAvailability = exp(−pathCost)
//!
//! Edge costs are anisotropic and state dependent; see [`EdgeCostModel`].
//! The heap uses lazy deletion: a popped entry whose cost exceeds the cell's
//! current best is stale and skipped.

pub mod penalties;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Sentinel for "no cell" in source and predecessor arrays.
pub const NO_CELL: i64 = -1;

/// Step direction on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    West,
    South,
    North,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::East, Direction::West, Direction::South, Direction::North];

    #[inline]
    pub fn is_zonal(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }
}

/// Neighbour of `idx` in direction `dir`, wrapping east-west. `None` past the
/// northern or southern edge, or when wrapping lands back on `idx`.
#[inline]
pub fn neighbor(idx: usize, dir: Direction, width: usize, height: usize) -> Option<usize> {
    let r = idx / width;
    let c = idx % width;
    let n = match dir {
        Direction::East => r * width + (c + 1) % width,
        Direction::West => r * width + (c + width - 1) % width,
        Direction::South if r + 1 < height => idx + width,
        Direction::North if r > 0 => idx - width,
        _ => return None,
    };
    (n != idx).then_some(n)
}

// ── Pluggable cost terms ──────────────────────────────────────────────────────

/// Per-target-cell multiplier on the base step cost. Clamped to ≥ 1.
pub trait CellMultiplier {
    fn multiplier(&self, cell: usize) -> f64;
}

/// Additive cost for one directed step. Clamped to ≥ 0.
pub trait EdgePenalty {
    fn penalty(&self, from: usize, to: usize, dir: Direction) -> f64;
}

/// Edge cost for `u → v`:
///
/// ```text
/// base = oceanStepCost if v is ocean, else landStepCost
/// cost = base·cold(v) + orographic(u,v,dir) + wind(u,v,dir) + continental(u,v,dir)
/// cost = max(cost, 0)
/// ```
///
/// Every term after the base is optional.
#[derive(Clone, Copy, Default)]
pub struct EdgeCostModel<'a> {
    pub ocean_step_cost: f64,
    pub land_step_cost: f64,
    pub cold: Option<&'a dyn CellMultiplier>,
    pub orographic: Option<&'a dyn EdgePenalty>,
    pub wind: Option<&'a dyn EdgePenalty>,
    pub continental: Option<&'a dyn EdgePenalty>,
}

impl<'a> EdgeCostModel<'a> {
    /// Base step costs only, no optional terms.
    pub fn flat(ocean_step_cost: f64, land_step_cost: f64) -> Self {
        Self { ocean_step_cost, land_step_cost, ..Self::default() }
    }

    #[inline]
    pub fn edge_cost(&self, from: usize, to: usize, dir: Direction, to_is_land: bool) -> f64 {
        let base = if to_is_land { self.land_step_cost } else { self.ocean_step_cost };
        let cold = self.cold.map_or(1.0, |m| m.multiplier(to).max(1.0));
        let mut cost = base * cold;
        for term in [self.orographic, self.wind, self.continental].into_iter().flatten() {
            cost += term.penalty(from, to, dir).max(0.0);
        }
        cost.max(0.0)
    }
}

/// `landStepCost = pixelSpacingKm / eFoldingKm · landMultiplier`.
pub fn land_step_cost(pixel_spacing_km: f64, e_folding_km: f64, land_multiplier: f64) -> f64 {
    pixel_spacing_km / e_folding_km * land_multiplier
}

/// Seed cost of an ocean source: `−ln(clamp(capacity, ε, 1))`, ≥ 0.
#[inline]
pub fn seed_cost(evaporation: f64, epsilon: f64) -> f64 {
    0.0 - evaporation.clamp(epsilon, 1.0).ln()
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Graph inputs of one transport run.
#[derive(Debug, Clone, Copy)]
pub struct TransportGrid<'a> {
    pub width: usize,
    pub height: usize,
    pub is_land: &'a [bool],
    pub evaporation: &'a [f32],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportOptions {
    pub epsilon: f64,
    /// Ocean sources keep their seed and are never relaxed.
    pub pin_ocean_sources: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self { epsilon: 1e-6, pin_ocean_sources: true }
    }
}

/// Output of the transport engine. Row-major, length = `width × height`.
#[derive(Debug, Clone, PartialEq)]
pub struct MoistureField {
    /// Accumulated cost from the cheapest source; +∞ where unreachable.
    pub path_cost: Vec<f64>,
    /// `exp(−pathCost)`; 0 where unreachable.
    pub moisture: Vec<f64>,
    /// Originating ocean cell, or [`NO_CELL`].
    pub source: Vec<i64>,
    /// Previous cell on the cheapest route, or [`NO_CELL`] at a source.
    pub predecessor: Vec<i64>,
}

#[derive(Clone, Copy, Debug)]
struct HeapItem {
    cost: f64,
    idx: usize,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapItem {}

// Min-heap by cost via reversed ordering; ties pop the lower index first so
// runs are reproducible.
impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost).then_with(|| other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Run the multi-source shortest-path search.
///
/// With no ocean cells there are no sources: every cell keeps cost +∞,
/// moisture 0 and no source or predecessor.
pub fn transport_moisture(
    grid: &TransportGrid<'_>,
    model: &EdgeCostModel<'_>,
    opts: &TransportOptions,
) -> MoistureField {
    let (w, h) = (grid.width, grid.height);
    let n = w * h;
    let mut cost = vec![f64::INFINITY; n];
    let mut source = vec![NO_CELL; n];
    let mut predecessor = vec![NO_CELL; n];
    let mut heap = BinaryHeap::with_capacity(n);

    for p in 0..n {
        if !grid.is_land[p] {
            let c = seed_cost(grid.evaporation[p] as f64, opts.epsilon);
            cost[p] = c;
            source[p] = p as i64;
            heap.push(HeapItem { cost: c, idx: p });
        }
    }
    let sources = heap.len();

    let mut pops = 0usize;
    while let Some(HeapItem { cost: c, idx: u }) = heap.pop() {
        if c > cost[u] {
            continue;
        }
        pops += 1;

        for dir in Direction::ALL {
            let Some(v) = neighbor(u, dir, w, h) else { continue };
            let v_land = grid.is_land[v];
            if opts.pin_ocean_sources && !v_land {
                continue;
            }
            let next = c + model.edge_cost(u, v, dir, v_land);
            if next < cost[v] {
                cost[v] = next;
                predecessor[v] = u as i64;
                source[v] = source[u];
                heap.push(HeapItem { cost: next, idx: v });
            }
        }
    }
    log::debug!("moisture transport: {sources} sources, {pops} settled of {n} cells");

    let moisture = cost.iter().map(|&c| moisture_from_cost(c)).collect();

    MoistureField { path_cost: cost, moisture, source, predecessor }
}

/// `exp(−cost)` for reachable cells, floored at the smallest positive normal
/// so that very long routes stay distinguishable from unreachable ones.
#[inline]
pub fn moisture_from_cost(cost: f64) -> f64 {
    if cost.is_finite() {
        (-cost).exp().max(f64::MIN_POSITIVE)
    } else {
        0.0
    }
}

/// Cells on the cheapest route into `cell`, source first. Empty when the
/// cell is unreachable or out of range.
pub fn trace_path(field: &MoistureField, cell: usize) -> Vec<usize> {
    if cell >= field.predecessor.len() || field.source[cell] == NO_CELL {
        return Vec::new();
    }
    let mut path = vec![cell];
    let mut cur = cell;
    // A predecessor chain is acyclic; the bound guards against a corrupted field.
    while field.predecessor[cur] != NO_CELL && path.len() <= field.predecessor.len() {
        cur = field.predecessor[cur] as usize;
        path.push(cur);
    }
    path.reverse();
    path
}
