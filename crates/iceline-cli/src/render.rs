//! Diagnostic PNGs for a computed field bank.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use iceline_core::{FieldBank, FieldKind};

// ── Colour helpers ────────────────────────────────────────────────────────────

const OCEAN: [u8; 3] = [30, 60, 110];

/// Moisture [0, 1] → white (dry) to deep blue (saturated).
fn moisture_rgb(m: f32) -> [u8; 3] {
    let t = m.clamp(0.0, 1.0);
    let lo = (255.0 * (1.0 - t)) as u8;
    let b = (255.0 - 75.0 * t) as u8;
    [lo, lo, b]
}

/// Temperature → blue below freezing, red above, saturating at ±30 °C.
fn temperature_rgb(t: f32) -> [u8; 3] {
    let x = (t / 30.0).clamp(-1.0, 1.0);
    if x < 0.0 {
        let k = (255.0 * (1.0 + x)) as u8;
        [k, k, 255]
    } else {
        let k = (255.0 * (1.0 - x)) as u8;
        [255, k, k]
    }
}

fn land_rgb(height_above_sea: f32) -> [u8; 3] {
    let g = (90.0 + height_above_sea.clamp(0.0, 255.0) * 0.6) as u8;
    [g, g, g]
}

// ── Writers ───────────────────────────────────────────────────────────────────

fn write_png(
    bank: &FieldBank,
    path: PathBuf,
    mut colour: impl FnMut(usize) -> [u8; 3],
) -> Result<PathBuf> {
    let (w, h) = (bank.width(), bank.height());
    let mut img = image::RgbImage::new(w as u32, h as u32);
    for r in 0..h {
        for c in 0..w {
            img.put_pixel(c as u32, r as u32, image::Rgb(colour(r * w + c)));
        }
    }
    img.save(&path).with_context(|| format!("saving {}", path.display()))?;
    Ok(path)
}

/// Write every diagnostic image into `dir`; returns the written paths.
pub fn write_all(bank: &FieldBank, dir: &Path) -> Result<Vec<PathBuf>> {
    let land = &bank.land.is_land;
    let height = bank.field(FieldKind::HeightAboveSea);
    let moisture = bank.field(FieldKind::MoistureAvailability);
    let t_mean = bank.field(FieldKind::TMean);
    let net_ice = bank.field(FieldKind::NetIce);
    let ice = &bank.thermal.ice_mask;

    let mut written = Vec::with_capacity(4);

    written.push(write_png(bank, dir.join("land.png"), |i| {
        if land[i] { land_rgb(height[i]) } else { OCEAN }
    })?);

    written.push(write_png(bank, dir.join("moisture.png"), |i| moisture_rgb(moisture[i]))?);

    written.push(write_png(bank, dir.join("t_mean.png"), |i| {
        if land[i] { temperature_rgb(t_mean[i]) } else { OCEAN }
    })?);

    // Ice in white over land shading, with net ablation tinted brown.
    written.push(write_png(bank, dir.join("ice.png"), |i| {
        if !land[i] {
            OCEAN
        } else if ice[i] {
            [245, 250, 255]
        } else if net_ice[i] < 0.0 {
            [150, 120, 90]
        } else {
            land_rgb(height[i])
        }
    })?);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_ramp_endpoints() {
        assert_eq!(temperature_rgb(-30.0), [0, 0, 255]);
        assert_eq!(temperature_rgb(0.0), [255, 255, 255]);
        assert_eq!(temperature_rgb(45.0), [255, 0, 0]);
    }

    #[test]
    fn moisture_ramp_endpoints() {
        assert_eq!(moisture_rgb(0.0), [255, 255, 255]);
        assert_eq!(moisture_rgb(1.0), [0, 0, 180]);
    }
}
