//! Optional edge-cost terms for the transport engine.

use super::{CellMultiplier, Direction, EdgePenalty};
use crate::climate::continental::continental_ramp;
use crate::climate::wind::zonal_wind_per_row;

// ── Cold amplification ────────────────────────────────────────────────────────

/// Amplifies the base step cost poleward, where cold air holds less vapour:
///   multiplier = 1 + strength·(|lat|/90)²
pub struct ColdAmplification {
    per_row: Vec<f64>,
    width: usize,
}

impl ColdAmplification {
    pub fn new(lats: &[f64], width: usize, strength: f64) -> Self {
        let per_row = lats
            .iter()
            .map(|lat| {
                let t = (lat.abs() / 90.0).clamp(0.0, 1.0);
                (1.0 + strength * t * t).max(1.0)
            })
            .collect();
        Self { per_row, width }
    }
}

impl CellMultiplier for ColdAmplification {
    #[inline]
    fn multiplier(&self, cell: usize) -> f64 {
        self.per_row[cell / self.width]
    }
}

// ── Orographic lift ───────────────────────────────────────────────────────────

/// Rain-out on forced ascent. Only upslope steps pay; the penalty grows
/// quadratically through the knee and linearly beyond it:
///
/// ```text
/// rise < knee:  rise² / (2·knee)
/// rise ≥ knee:  rise − knee/2
/// penalty = rainout · ramp(rise_m) / 1000
/// ```
pub struct OrographicLift<'a> {
    height_above_sea: &'a [f32],
    metres_per_unit: f64,
    knee_m: f64,
    rainout: f64,
}

impl<'a> OrographicLift<'a> {
    pub fn new(height_above_sea: &'a [f32], metres_per_unit: f64, knee_m: f64, rainout: f64) -> Self {
        Self { height_above_sea, metres_per_unit, knee_m, rainout }
    }
}

fn soft_knee(x: f64, knee: f64) -> f64 {
    if knee <= 0.0 {
        x
    } else if x < knee {
        x * x / (2.0 * knee)
    } else {
        x - knee / 2.0
    }
}

impl EdgePenalty for OrographicLift<'_> {
    fn penalty(&self, from: usize, to: usize, _dir: Direction) -> f64 {
        let rise_m =
            (self.height_above_sea[to] - self.height_above_sea[from]) as f64 * self.metres_per_unit;
        if rise_m <= 0.0 {
            return 0.0;
        }
        self.rainout * soft_knee(rise_m, self.knee_m) / 1000.0
    }
}

// ── Prevailing wind ───────────────────────────────────────────────────────────

/// Penalizes zonal steps against the band's prevailing wind, in proportion
/// to the wind's strength, and charges a flat cost on meridional steps.
/// The band is read at the departing cell's row.
pub struct PrevailingWind {
    zonal: Vec<f64>,
    width: usize,
    against: f64,
    crosswind: f64,
}

impl PrevailingWind {
    pub fn new(lats: &[f64], width: usize, half_width_deg: f64, against: f64, crosswind: f64) -> Self {
        Self { zonal: zonal_wind_per_row(lats, half_width_deg), width, against, crosswind }
    }
}

impl EdgePenalty for PrevailingWind {
    fn penalty(&self, from: usize, _to: usize, dir: Direction) -> f64 {
        let wind = self.zonal[from / self.width];
        match dir {
            Direction::East => self.against * (-wind).max(0.0),
            Direction::West => self.against * wind.max(0.0),
            Direction::North | Direction::South => self.crosswind,
        }
    }
}

// ── Continental dryness ───────────────────────────────────────────────────────

/// Extra cost once the target's continental value passes the coastal
/// threshold: `dryness · continental_ramp(value)`.
pub struct ContinentalDryness<'a> {
    continental: &'a [f32],
    scale: f64,
    threshold: f64,
    exponent: f64,
    dryness: f64,
}

impl<'a> ContinentalDryness<'a> {
    pub fn new(continental: &'a [f32], scale: f64, threshold: f64, exponent: f64, dryness: f64) -> Self {
        Self { continental, scale, threshold, exponent, dryness }
    }
}

impl EdgePenalty for ContinentalDryness<'_> {
    fn penalty(&self, _from: usize, to: usize, _dir: Direction) -> f64 {
        self.dryness * continental_ramp(self.continental[to] as f64, self.scale, self.threshold, self.exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::transport::{
        transport_moisture, EdgeCostModel, TransportGrid, TransportOptions,
    };
    use crate::geometry::row_latitudes;

    #[test]
    fn cold_multiplier_grows_poleward() {
        let lats = row_latitudes(9);
        let cold = ColdAmplification::new(&lats, 2, 1.0);
        let equator = cold.multiplier(4 * 2);
        let polar = cold.multiplier(0);
        assert_eq!(equator, 1.0);
        assert!(polar > 1.5, "polar multiplier {polar:.3}");
        let off = ColdAmplification::new(&lats, 2, 0.0);
        assert_eq!(off.multiplier(0), 1.0);
    }

    #[test]
    fn orographic_only_charges_upslope() {
        let heights = [0.0f32, 100.0];
        let oro = OrographicLift::new(&heights, 10.0, 500.0, 1.0);
        // 1000 m rise: 1000 − 250 = 750 m → 0.75.
        assert!((oro.penalty(0, 1, Direction::East) - 0.75).abs() < 1e-12);
        assert_eq!(oro.penalty(1, 0, Direction::West), 0.0);

        let small = [0.0f32, 25.0];
        let oro = OrographicLift::new(&small, 10.0, 500.0, 2.0);
        // 250 m rise inside the knee: 250²/1000 = 62.5 m → 2·0.0625.
        assert!((oro.penalty(0, 1, Direction::East) - 0.125).abs() < 1e-12);
    }

    #[test]
    fn wind_penalizes_against_the_band() {
        // One row on the equator: trade easterlies blow west.
        let wind = PrevailingWind::new(&[0.0], 4, 10.0, 0.5, 0.1);
        assert!((wind.penalty(1, 2, Direction::East) - 0.5).abs() < 1e-12);
        assert_eq!(wind.penalty(1, 0, Direction::West), 0.0);
        assert_eq!(wind.penalty(1, 0, Direction::North), 0.1);

        let westerlies = PrevailingWind::new(&[45.0], 4, 10.0, 0.5, 0.1);
        assert_eq!(westerlies.penalty(1, 2, Direction::East), 0.0);
        assert!((westerlies.penalty(1, 0, Direction::West) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn continental_penalty_starts_past_threshold() {
        let cont = [0.1f32, 1.0];
        let dry = ContinentalDryness::new(&cont, 1.0, 0.3, 2.0, 3.0);
        assert_eq!(dry.penalty(1, 0, Direction::West), 0.0);
        assert!((dry.penalty(0, 1, Direction::East) - 3.0).abs() < 1e-9);
    }

    /// Ocean in the middle of an equatorial strip: easterlies carry more
    /// moisture to the western shore than to the eastern one.
    #[test]
    fn downwind_shore_is_wetter() {
        let w = 11;
        let is_land: Vec<bool> = (0..w).map(|c| c != 5).collect();
        let evap: Vec<f32> = (0..w).map(|c| if c == 5 { 1.0 } else { 0.0 }).collect();
        let wind = PrevailingWind::new(&[0.0], w, 10.0, 0.2, 0.0);
        let model = EdgeCostModel { wind: Some(&wind), ..EdgeCostModel::flat(0.001, 0.1) };
        let grid = TransportGrid { width: w, height: 1, is_land: &is_land, evaporation: &evap };
        let f = transport_moisture(&grid, &model, &TransportOptions::default());

        let west_shore = f.moisture[3];
        let east_shore = f.moisture[7];
        assert!(
            west_shore > east_shore,
            "downwind (west) {west_shore:.4} should exceed upwind (east) {east_shore:.4}"
        );
    }
}
