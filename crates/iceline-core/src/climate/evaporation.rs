//! Ocean evaporation capacity.
//!
//! Warm low-latitude water supplies the most vapour:
//!   capacity = cos(lat)^vaporLatitudeExponent   (ocean)
//!   capacity = 0                                 (land)

/// Capacity in [0, 1] per cell. `lats` holds one latitude per row.
pub fn evaporation_capacity(is_land: &[bool], lats: &[f64], width: usize, exponent: f64) -> Vec<f32> {
    let row_capacity: Vec<f32> = lats
        .iter()
        .map(|lat| {
            let c = lat.to_radians().cos().max(0.0);
            c.powf(exponent).clamp(0.0, 1.0) as f32
        })
        .collect();

    is_land
        .iter()
        .enumerate()
        .map(|(i, &land)| if land { 0.0 } else { row_capacity[i / width] })
        .collect()
}
