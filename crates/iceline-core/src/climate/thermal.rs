//! Seasonal temperature decomposition and ice mass balance.
//!
//! Per land cell:
//!
//! ```text
//! T_lat      = T_pole + (T_eq − T_pole)·cos(lat)^1.3
//! T_elev     = −lapseRate · elevation_m / 1000
//! T_global   = −maxGlobalCooling · iceLevel
//! T_mean     = T_lat + T_elev + T_global
//! T_seasonal = seasonalAmplitude·|sin(lat)| + continentalSeasonBoost·continental01
//! T_winter   = T_mean − T_seasonal,   T_summer = T_mean + T_seasonal
//!
//! accum        = moisture · moistureScale
//! coldFraction = share of the sinusoidal year below 0 °C (0 if T_winter ≥ 0)
//! ice          = accum · coldFraction
//! warmFraction = clamp01(max(0, T_summer) / (T_summer − T_winter))
//! melt         = k · max(0, T_summer) · warmFraction
//! netIce       = ice − melt
//! ```
//!
//! Any fraction whose denominator is near zero is 0. Ocean cells are zeroed.

use crate::climate::continental::continental_ramp;
use crate::params::{ClimateParams, ModelConstants};

/// Guard for the seasonal span denominator.
const SPAN_EPSILON: f64 = 1e-9;

/// Scalars the thermal model needs, resolved from params and constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalParams {
    pub t_pole: f64,
    pub t_equator: f64,
    pub latitude_exponent: f64,
    pub lapse_rate: f64,
    pub seasonal_amplitude: f64,
    pub continental_season_boost: f64,
    pub max_global_cooling: f64,
    pub ice_level: f64,
    pub moisture_scale: f64,
    pub continental_scale: f64,
    pub coastal_threshold: f64,
    pub continental_exponent: f64,
    pub metres_per_unit: f64,
    pub melt_rate_k: f64,
}

impl ThermalParams {
    pub fn new(params: &ClimateParams, constants: &ModelConstants) -> Self {
        Self {
            t_pole: params.t_pole,
            t_equator: constants.t_equator,
            latitude_exponent: constants.latitude_temperature_exponent,
            lapse_rate: params.lapse_rate,
            seasonal_amplitude: params.seasonal_amplitude,
            continental_season_boost: params.continental_season_boost,
            max_global_cooling: params.max_global_cooling,
            ice_level: params.ice_level,
            moisture_scale: params.moisture_scale,
            continental_scale: params.continental_scale,
            coastal_threshold: params.coastal_threshold,
            continental_exponent: constants.continental_exponent,
            metres_per_unit: constants.max_elevation_m / 255.0,
            melt_rate_k: constants.melt_rate_k,
        }
    }
}

/// Every derived scalar for one land cell.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellClimate {
    pub t_lat: f64,
    pub t_elev: f64,
    pub t_global: f64,
    pub t_mean: f64,
    pub t_seasonal: f64,
    pub t_continental: f64,
    pub t_winter: f64,
    pub t_summer: f64,
    pub cold_fraction: f64,
    pub warm_fraction: f64,
    pub accumulation: f64,
    pub ice_formation: f64,
    pub melt_rate: f64,
    pub net_ice: f64,
}

/// Evaluate the model for a single land cell.
pub fn cell_climate(
    lat_deg: f64,
    height_above_sea: f64,
    continental: f64,
    moisture: f64,
    p: &ThermalParams,
) -> CellClimate {
    let lat = lat_deg.to_radians();

    let t_lat = p.t_pole + (p.t_equator - p.t_pole) * lat.cos().max(0.0).powf(p.latitude_exponent);
    let t_elev = -p.lapse_rate * height_above_sea * p.metres_per_unit / 1000.0;
    let t_global = -p.max_global_cooling * p.ice_level;
    let t_mean = t_lat + t_elev + t_global;

    let continental01 =
        continental_ramp(continental, p.continental_scale, p.coastal_threshold, p.continental_exponent);
    let t_continental = p.continental_season_boost * continental01;
    let t_seasonal = p.seasonal_amplitude * lat.sin().abs() + t_continental;
    let t_winter = t_mean - t_seasonal;
    let t_summer = t_mean + t_seasonal;
    let span = t_summer - t_winter;

    let accumulation = moisture * p.moisture_scale;
    let cold_fraction = if t_winter >= 0.0 || span <= SPAN_EPSILON {
        0.0
    } else {
        (-t_winter / span).clamp(0.0, 1.0)
    };
    let ice_formation = accumulation * cold_fraction;

    let melt_pressure = t_summer.max(0.0);
    let warm_fraction = if span > SPAN_EPSILON { (melt_pressure / span).clamp(0.0, 1.0) } else { 0.0 };
    let melt_rate = p.melt_rate_k * melt_pressure * warm_fraction;
    let net_ice = ice_formation - melt_rate;

    CellClimate {
        t_lat,
        t_elev,
        t_global,
        t_mean,
        t_seasonal,
        t_continental,
        t_winter,
        t_summer,
        cold_fraction,
        warm_fraction,
        accumulation,
        ice_formation,
        melt_rate,
        net_ice,
    }
}

/// All thermal and ice outputs. Row-major, length = `width × height`;
/// ocean cells hold zeros.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThermalIceField {
    pub t_lat: Vec<f32>,
    pub t_elev: Vec<f32>,
    pub t_global: Vec<f32>,
    pub t_mean: Vec<f32>,
    pub t_seasonal: Vec<f32>,
    pub t_continental: Vec<f32>,
    pub t_winter: Vec<f32>,
    pub t_summer: Vec<f32>,
    pub cold_fraction: Vec<f32>,
    pub warm_fraction: Vec<f32>,
    pub accumulation: Vec<f32>,
    pub ice_formation: Vec<f32>,
    pub melt_rate: Vec<f32>,
    pub net_ice: Vec<f32>,
    pub ice_mask: Vec<bool>,
}

impl ThermalIceField {
    fn zeroed(n: usize) -> Self {
        let z = || vec![0.0f32; n];
        Self {
            t_lat: z(),
            t_elev: z(),
            t_global: z(),
            t_mean: z(),
            t_seasonal: z(),
            t_continental: z(),
            t_winter: z(),
            t_summer: z(),
            cold_fraction: z(),
            warm_fraction: z(),
            accumulation: z(),
            ice_formation: z(),
            melt_rate: z(),
            net_ice: z(),
            ice_mask: vec![false; n],
        }
    }

    /// Scalars of cell `i` as stored (zeros on ocean).
    pub fn cell(&self, i: usize) -> CellClimate {
        CellClimate {
            t_lat: self.t_lat[i] as f64,
            t_elev: self.t_elev[i] as f64,
            t_global: self.t_global[i] as f64,
            t_mean: self.t_mean[i] as f64,
            t_seasonal: self.t_seasonal[i] as f64,
            t_continental: self.t_continental[i] as f64,
            t_winter: self.t_winter[i] as f64,
            t_summer: self.t_summer[i] as f64,
            cold_fraction: self.cold_fraction[i] as f64,
            warm_fraction: self.warm_fraction[i] as f64,
            accumulation: self.accumulation[i] as f64,
            ice_formation: self.ice_formation[i] as f64,
            melt_rate: self.melt_rate[i] as f64,
            net_ice: self.net_ice[i] as f64,
        }
    }

    fn write(&mut self, i: usize, c: &CellClimate) {
        self.t_lat[i] = c.t_lat as f32;
        self.t_elev[i] = c.t_elev as f32;
        self.t_global[i] = c.t_global as f32;
        self.t_mean[i] = c.t_mean as f32;
        self.t_seasonal[i] = c.t_seasonal as f32;
        self.t_continental[i] = c.t_continental as f32;
        self.t_winter[i] = c.t_winter as f32;
        self.t_summer[i] = c.t_summer as f32;
        self.cold_fraction[i] = c.cold_fraction as f32;
        self.warm_fraction[i] = c.warm_fraction as f32;
        self.accumulation[i] = c.accumulation as f32;
        self.ice_formation[i] = c.ice_formation as f32;
        self.melt_rate[i] = c.melt_rate as f32;
        self.net_ice[i] = c.net_ice as f32;
    }
}

/// Per-cell inputs of the thermal stage.
#[derive(Debug, Clone, Copy)]
pub struct ThermalInputs<'a> {
    pub width: usize,
    /// One latitude per row.
    pub lats: &'a [f64],
    pub is_land: &'a [bool],
    pub height_above_sea: &'a [f32],
    pub continental: &'a [f32],
    pub moisture: &'a [f64],
}

pub fn compute_thermal_ice(inputs: &ThermalInputs<'_>, p: &ThermalParams) -> ThermalIceField {
    let n = inputs.is_land.len();
    let mut out = ThermalIceField::zeroed(n);

    for i in 0..n {
        if !inputs.is_land[i] {
            continue;
        }
        let c = cell_climate(
            inputs.lats[i / inputs.width],
            inputs.height_above_sea[i] as f64,
            inputs.continental[i] as f64,
            inputs.moisture[i],
            p,
        );
        out.write(i, &c);
        // Read back the stored value so the mask agrees with `net_ice`.
        out.ice_mask[i] = out.net_ice[i] > 0.0;
    }

    out
}
