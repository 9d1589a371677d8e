//! Climate pipeline.
//!
//! Stages, in fixed order:
//!   sea level & land mask → evaporation capacity → continental field →
//!   moisture transport → thermal / ice model.
//!
//! Every stage is a pure function of its inputs. [`run_pipeline`] builds a
//! complete, fresh [`FieldBank`]; nothing is updated in place.

pub mod continental;
pub mod evaporation;
pub mod sea_level;
pub mod thermal;
pub mod transport;
pub mod wind;

use std::time::Instant;

use crate::error::Result;
use crate::fields::FieldBank;
use crate::geometry::{pixel_spacing_km, row_latitudes};
use crate::params::{ClimateParams, ModelConstants};
use crate::raster::WorldRaster;

use continental::{continental_field, ContinentalConfig};
use evaporation::evaporation_capacity;
use sea_level::compute_land_mask;
use thermal::{compute_thermal_ice, ThermalInputs, ThermalParams};
use transport::penalties::{ColdAmplification, ContinentalDryness, OrographicLift, PrevailingWind};
use transport::{land_step_cost, transport_moisture, EdgeCostModel, TransportGrid, TransportOptions};
use wind::zonal_wind_per_row;

/// Run every stage for one (raster, parameter set) pair.
///
/// Fails only on invalid parameters or constants, before any stage runs.
pub fn run_pipeline(
    raster: &WorldRaster,
    params: &ClimateParams,
    constants: &ModelConstants,
) -> Result<FieldBank> {
    params.validate()?;
    constants.validate()?;

    let started = Instant::now();
    let (w, h) = (raster.width(), raster.height());
    let lats = row_latitudes(h);

    // ── 1. Sea level & land mask ────────────────────────────────────────────
    let land = compute_land_mask(raster, params);
    log::debug!(
        "land mask: effective sea level {:.2}, {} of {} cells land",
        land.effective_sea_level,
        land.land_cells(),
        w * h
    );

    // ── 2. Evaporation capacity ─────────────────────────────────────────────
    let evaporation = evaporation_capacity(&land.is_land, &lats, w, params.vapor_latitude_exponent);

    // ── 3. Continental field ────────────────────────────────────────────────
    let zonal = zonal_wind_per_row(&lats, constants.wind_band_half_width_deg);
    let continental_cfg = ContinentalConfig::from_constants(constants, w, h);
    let continental = continental_field(&land.is_land, w, h, &zonal, &continental_cfg);
    log::debug!(
        "continental field: radius {} cells, {} passes",
        continental_cfg.radius_cells,
        continental_cfg.passes
    );

    // ── 4. Moisture transport ───────────────────────────────────────────────
    let metres_per_unit = constants.max_elevation_m / 255.0;
    let cold = ColdAmplification::new(&lats, w, constants.cold_amplification);
    let orographic = OrographicLift::new(
        &land.height_above_sea,
        metres_per_unit,
        constants.orographic_knee_m,
        params.mountain_rainout,
    );
    let wind = PrevailingWind::new(
        &lats,
        w,
        constants.wind_band_half_width_deg,
        constants.wind_penalty,
        constants.crosswind_penalty,
    );
    let dryness = ContinentalDryness::new(
        &continental,
        params.continental_scale,
        params.coastal_threshold,
        constants.continental_exponent,
        params.continental_dryness,
    );
    let model = EdgeCostModel {
        ocean_step_cost: constants.ocean_step_cost,
        land_step_cost: land_step_cost(pixel_spacing_km(w), constants.e_folding_km, constants.land_multiplier),
        cold: Some(&cold),
        orographic: Some(&orographic),
        wind: Some(&wind),
        continental: Some(&dryness),
    };
    let grid = TransportGrid { width: w, height: h, is_land: &land.is_land, evaporation: &evaporation };
    let opts = TransportOptions {
        epsilon: constants.evaporation_epsilon,
        pin_ocean_sources: constants.pin_ocean_sources,
    };
    let moisture = transport_moisture(&grid, &model, &opts);

    // ── 5. Thermal / ice model ──────────────────────────────────────────────
    let thermal = compute_thermal_ice(
        &ThermalInputs {
            width: w,
            lats: &lats,
            is_land: &land.is_land,
            height_above_sea: &land.height_above_sea,
            continental: &continental,
            moisture: &moisture.moisture,
        },
        &ThermalParams::new(params, constants),
    );

    log::debug!("pipeline finished in {} ms", started.elapsed().as_millis());

    Ok(FieldBank::new(w, h, land, evaporation, continental, moisture, thermal))
}
