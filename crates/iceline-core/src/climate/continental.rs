//! Continental-effect field: a wind-biased windowed land fraction.
//!
//! Each pass averages the previous pass's field over a (2R+1)² window using a
//! summed-area table, so one pass costs O(N) regardless of R. The window
//! centre is shifted upwind by `bias × R` columns according to the local
//! prevailing wind; a cell downwind of a large landmass therefore reads a
//! higher continental value than one the same distance upwind.
//!
//! Columns wrap (cylindrical world); rows are clamped to the raster. A window
//! that straddles the wrap seam is split into two rectangles whose sums and
//! areas are combined before the single division.
//!
//! Passes chain: pass k averages the output of pass k−1, starting from the
//! 0/1 land mask.

use crate::geometry::pixel_spacing_km;
use crate::params::ModelConstants;

/// Window configuration in grid cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinentalConfig {
    pub radius_cells: usize,
    pub passes: u32,
    /// Upwind shift of the window centre as a fraction of the radius.
    pub upwind_bias: f64,
}

impl ContinentalConfig {
    /// Convert the km radius to cells using the equatorial pixel spacing.
    /// Radii beyond the grid's larger side already cover the whole grid and
    /// are clamped to it.
    pub fn from_constants(constants: &ModelConstants, width: usize, height: usize) -> Self {
        let cells = (constants.continental_radius_km / pixel_spacing_km(width)).round();
        Self {
            radius_cells: (cells as usize).clamp(1, width.max(height).max(1)),
            passes: constants.continental_passes,
            upwind_bias: constants.continental_upwind_bias,
        }
    }
}

// ── Summed-area table ─────────────────────────────────────────────────────────

/// Inclusive prefix sums with a zero guard row and column:
/// `sums[(r+1)·(w+1) + (c+1)] = Σ values[0..=r][0..=c]`.
pub struct SummedAreaTable {
    width: usize,
    sums: Vec<f64>,
}

impl SummedAreaTable {
    pub fn build(values: &[f64], width: usize, height: usize) -> Self {
        let stride = width + 1;
        let mut sums = vec![0.0f64; stride * (height + 1)];
        for r in 0..height {
            let mut row_sum = 0.0;
            for c in 0..width {
                row_sum += values[r * width + c];
                sums[(r + 1) * stride + c + 1] = sums[r * stride + c + 1] + row_sum;
            }
        }
        Self { width, sums }
    }

    /// Sum over rows `r0..=r1`, columns `c0..=c1` (both inclusive, in bounds).
    #[inline]
    pub fn rect_sum(&self, r0: usize, r1: usize, c0: usize, c1: usize) -> f64 {
        let s = self.width + 1;
        self.sums[(r1 + 1) * s + c1 + 1] - self.sums[r0 * s + c1 + 1] - self.sums[(r1 + 1) * s + c0]
            + self.sums[r0 * s + c0]
    }
}

/// Sum and cell count of a window whose column span `[c_lo, c_hi]` may leave
/// `0..width` on either side and is wrapped back into the grid.
fn wrapped_window(
    sat: &SummedAreaTable,
    r0: usize,
    r1: usize,
    c_lo: isize,
    c_hi: isize,
    width: usize,
) -> (f64, usize) {
    let rows = r1 - r0 + 1;
    let span = (c_hi - c_lo + 1) as usize;
    if span >= width {
        return (sat.rect_sum(r0, r1, 0, width - 1), rows * width);
    }

    let w = width as isize;
    let a = c_lo.rem_euclid(w) as usize;
    let b = c_hi.rem_euclid(w) as usize;
    if a <= b {
        (sat.rect_sum(r0, r1, a, b), rows * span)
    } else {
        let east = sat.rect_sum(r0, r1, a, width - 1);
        let west = sat.rect_sum(r0, r1, 0, b);
        (east + west, rows * span)
    }
}

// ── Field ─────────────────────────────────────────────────────────────────────

/// Compute the continental value in [0, 1] for every cell.
///
/// `zonal_wind` holds one value per row (+1 blowing east, −1 blowing west).
pub fn continental_field(
    is_land: &[bool],
    width: usize,
    height: usize,
    zonal_wind: &[f64],
    cfg: &ContinentalConfig,
) -> Vec<f32> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut field: Vec<f64> = is_land.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();
    let radius_cells = cfg.radius_cells.min(width.max(height));
    let radius = radius_cells as isize;

    for _ in 0..cfg.passes {
        let sat = SummedAreaTable::build(&field, width, height);
        let mut next = vec![0.0f64; width * height];

        for r in 0..height {
            let r0 = r.saturating_sub(radius_cells);
            let r1 = (r + radius_cells).min(height - 1);
            // Upwind is opposite to where the wind blows.
            let shift = (-zonal_wind[r] * cfg.upwind_bias * radius as f64).round() as isize;

            for c in 0..width {
                let centre = c as isize + shift;
                let (sum, area) = wrapped_window(&sat, r0, r1, centre - radius, centre + radius, width);
                next[r * width + c] = (sum / area as f64).clamp(0.0, 1.0);
            }
        }
        field = next;
    }

    field.into_iter().map(|v| v as f32).collect()
}

/// Thresholded continental ramp shared by the transport penalty and the
/// thermal model:
///   clamp01((value·scale − threshold) / (1 − threshold))^exponent
pub fn continental_ramp(value: f64, scale: f64, threshold: f64, exponent: f64) -> f64 {
    let denom = 1.0 - threshold;
    if denom <= f64::EPSILON {
        return 0.0;
    }
    ((value * scale - threshold) / denom).clamp(0.0, 1.0).powf(exponent)
}
