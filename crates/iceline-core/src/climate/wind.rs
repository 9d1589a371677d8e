//! Fixed three-band prevailing wind.
//!
//!   - |lat| < 30°: trade easterlies (blowing west)
//!   - 30–60°:      westerlies (blowing east)
//!   - |lat| > 60°: polar easterlies (blowing west)
//!
//! Band edges are blended with a smoothstep of configurable half-width so the
//! wind, and everything derived from it, has no discontinuity at 30° or 60°.

use crate::geometry::smoothstep;

/// Zonal wind component at `lat_deg`: +1 blowing east, −1 blowing west,
/// 0 exactly on a band boundary.
pub fn zonal_wind(lat_deg: f64, half_width_deg: f64) -> f64 {
    let a = lat_deg.abs();
    let hw = half_width_deg.max(0.0);
    let into_westerlies = smoothstep(30.0 - hw, 30.0 + hw, a);
    let into_polar = smoothstep(60.0 - hw, 60.0 + hw, a);
    -1.0 + 2.0 * into_westerlies - 2.0 * into_polar
}

/// One zonal wind value per row.
pub fn zonal_wind_per_row(lats: &[f64], half_width_deg: f64) -> Vec<f64> {
    lats.iter().map(|&lat| zonal_wind(lat, half_width_deg)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_centres_have_full_strength() {
        assert_eq!(zonal_wind(0.0, 10.0), -1.0);
        assert_eq!(zonal_wind(45.0, 10.0), 1.0);
        assert_eq!(zonal_wind(-45.0, 10.0), 1.0);
        assert_eq!(zonal_wind(80.0, 10.0), -1.0);
    }

    #[test]
    fn boundaries_are_continuous() {
        assert!(zonal_wind(30.0, 10.0).abs() < 1e-12);
        assert!(zonal_wind(60.0, 10.0).abs() < 1e-12);
        let mut prev = zonal_wind(0.0, 10.0);
        for i in 1..=900 {
            let w = zonal_wind(i as f64 * 0.1, 10.0);
            assert!((w - prev).abs() < 0.05, "jump at {:.1}°: {prev:.3} → {w:.3}", i as f64 * 0.1);
            prev = w;
        }
    }

    #[test]
    fn zero_half_width_gives_hard_bands() {
        assert_eq!(zonal_wind(29.9, 0.0), -1.0);
        assert_eq!(zonal_wind(30.1, 0.0), 1.0);
        assert_eq!(zonal_wind(60.1, 0.0), -1.0);
    }
}
