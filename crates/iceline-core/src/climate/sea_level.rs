//! Sea-level and land-mask stage.
//!
//! The effective sea level falls as ice locks up water:
//!   effective = clamp(seaLevel − iceLevel·seaLevel·drop, 0, 255)
//! A cell is land when its elevation code reaches the effective level.

use crate::params::ClimateParams;
use crate::raster::WorldRaster;

/// Land/ocean partition of the raster at one effective sea level.
#[derive(Debug, Clone, PartialEq)]
pub struct LandMask {
    pub effective_sea_level: f64,
    /// Row-major, length = `width × height`.
    pub is_land: Vec<bool>,
    /// Elevation codes above the effective sea level; 0 on ocean.
    pub height_above_sea: Vec<f32>,
}

impl LandMask {
    pub fn land_cells(&self) -> usize {
        self.is_land.iter().filter(|&&l| l).count()
    }
}

pub fn effective_sea_level(sea_level: f64, ice_level: f64, drop_due_to_ice: f64) -> f64 {
    (sea_level - ice_level * sea_level * drop_due_to_ice).clamp(0.0, 255.0)
}

pub fn compute_land_mask(raster: &WorldRaster, params: &ClimateParams) -> LandMask {
    let sea = effective_sea_level(
        params.sea_level,
        params.ice_level,
        params.sea_level_drop_due_to_ice,
    );

    let mut is_land = Vec::with_capacity(raster.len());
    let mut height_above_sea = Vec::with_capacity(raster.len());
    for &e in raster.elevation() {
        let e = e as f64;
        let land = e >= sea;
        is_land.push(land);
        height_above_sea.push(if land { (e - sea).clamp(0.0, 255.0) as f32 } else { 0.0 });
    }

    LandMask { effective_sea_level: sea, is_land, height_above_sea }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn zero_params(sea_level: f64) -> ClimateParams {
        ClimateParams {
            sea_level,
            ice_level: 0.0,
            sea_level_drop_due_to_ice: 0.0,
            ..ClimateParams::default()
        }
    }

    /// Gradient 0..255 across columns, sea level 128: land starts exactly at
    /// column 128.
    #[test]
    fn threshold_column_has_no_off_by_one() {
        let raster = WorldRaster::from_fn(256, 2, |_, c| c as u8).unwrap();
        let mask = compute_land_mask(&raster, &zero_params(128.0));
        assert_eq!(mask.effective_sea_level, 128.0);
        for r in 0..2 {
            for c in 0..256 {
                let i = r * 256 + c;
                assert_eq!(mask.is_land[i], c >= 128, "col {c}");
            }
        }
        assert_eq!(mask.height_above_sea[128], 0.0);
        assert_eq!(mask.height_above_sea[255], 127.0);
        assert_eq!(mask.height_above_sea[10], 0.0);
    }

    #[test]
    fn ice_lowers_sea_level() {
        let sea = effective_sea_level(100.0, 1.0, 0.2);
        assert!((sea - 80.0).abs() < 1e-12, "got {sea}");
        assert_eq!(effective_sea_level(100.0, 1.0, 5.0), 0.0);
        assert_eq!(effective_sea_level(255.0, 0.0, 0.0), 255.0);
    }

    /// Raising the sea level never lowers the effective level and never
    /// turns an ocean cell into land.
    #[test]
    fn raising_sea_level_is_monotone() {
        let mut rng = StdRng::seed_from_u64(7);
        let raster = WorldRaster::from_fn(16, 8, |_, _| rng.gen()).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let ice = rng.gen_range(0.0..=1.0);
            let drop = rng.gen_range(0.0..2.0);
            let lo = rng.gen_range(0.0..255.0);
            let hi = rng.gen_range(lo..=255.0);

            let base = ClimateParams {
                ice_level: ice,
                sea_level_drop_due_to_ice: drop,
                ..ClimateParams::default()
            };
            let a = compute_land_mask(&raster, &ClimateParams { sea_level: lo, ..base.clone() });
            let b = compute_land_mask(&raster, &ClimateParams { sea_level: hi, ..base });

            assert!(
                b.effective_sea_level >= a.effective_sea_level,
                "sea {lo:.2}→{hi:.2} (ice {ice:.2}, drop {drop:.2}) lowered effective level"
            );
            for (i, (&la, &lb)) in a.is_land.iter().zip(&b.is_land).enumerate() {
                assert!(la || !lb, "cell {i} turned from ocean to land");
            }
        }
    }

    #[test]
    fn ocean_cells_have_zero_height() {
        let raster = WorldRaster::new(3, 1, vec![10, 128, 200]).unwrap();
        let mask = compute_land_mask(&raster, &zero_params(128.0));
        assert_eq!(mask.is_land, vec![false, true, true]);
        assert_eq!(mask.height_above_sea, vec![0.0, 0.0, 72.0]);
        assert_eq!(mask.land_cells(), 2);
    }
}
