use serde::{Deserialize, Serialize};

use crate::error::{ClimateError, Result};

// ── User-facing parameter surface ─────────────────────────────────────────────

/// The parameter set driven by the configuration panel. Any change triggers a
/// full recompute. Defaults are calibrated to a present-day Earth.
///
/// Serialized in camelCase so the UI can send `{"seaLevel": 120, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClimateParams {
    /// Raw sea-level threshold on the 0–255 elevation scale.
    pub sea_level: f64,
    /// 0–1. Global ice extent: lowers sea level and cools the planet.
    pub ice_level: f64,
    /// Fraction of `sea_level` removed at `ice_level = 1`.
    pub sea_level_drop_due_to_ice: f64,
    /// Polar baseline temperature, °C.
    pub t_pole: f64,
    /// °C lost per km of height above sea level.
    pub lapse_rate: f64,
    /// Half the annual temperature swing at the poles, °C.
    pub seasonal_amplitude: f64,
    /// Extra seasonal swing deep inside continents, °C.
    pub continental_season_boost: f64,
    /// Global cooling at `ice_level = 1`, °C.
    pub max_global_cooling: f64,
    /// Converts moisture availability into ice accumulation units.
    pub moisture_scale: f64,
    /// Multiplier on the continental value before thresholding.
    pub continental_scale: f64,
    /// Transport cost added deep inside continents.
    pub continental_dryness: f64,
    /// Orographic rain-out strength on upslope steps.
    pub mountain_rainout: f64,
    /// Continental value below which a cell counts as coastal (0–1).
    pub coastal_threshold: f64,
    /// Exponent on cos(latitude) for ocean evaporation capacity.
    pub vapor_latitude_exponent: f64,
}

impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            sea_level: 128.0,
            ice_level: 0.0,
            sea_level_drop_due_to_ice: 0.10,
            t_pole: -30.0,
            lapse_rate: 6.5,
            seasonal_amplitude: 15.0,
            continental_season_boost: 10.0,
            max_global_cooling: 6.0,
            moisture_scale: 1.0,
            continental_scale: 1.0,
            continental_dryness: 2.0,
            mountain_rainout: 1.0,
            coastal_threshold: 0.30,
            vapor_latitude_exponent: 2.0,
        }
    }
}

impl ClimateParams {
    /// Parse a JSON parameter record. Missing fields take their defaults.
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Reject parameter sets the pipeline cannot give a meaning to.
    /// A rejected set never reaches the stages, so the previous field bank
    /// stays in place.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("seaLevel", self.sea_level),
            ("iceLevel", self.ice_level),
            ("seaLevelDropDueToIce", self.sea_level_drop_due_to_ice),
            ("tPole", self.t_pole),
            ("lapseRate", self.lapse_rate),
            ("seasonalAmplitude", self.seasonal_amplitude),
            ("continentalSeasonBoost", self.continental_season_boost),
            ("maxGlobalCooling", self.max_global_cooling),
            ("moistureScale", self.moisture_scale),
            ("continentalScale", self.continental_scale),
            ("continentalDryness", self.continental_dryness),
            ("mountainRainout", self.mountain_rainout),
            ("coastalThreshold", self.coastal_threshold),
            ("vaporLatitudeExponent", self.vapor_latitude_exponent),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(invalid(name, value, "must be finite"));
            }
        }

        check_range("seaLevel", self.sea_level, 0.0, 255.0)?;
        check_range("iceLevel", self.ice_level, 0.0, 1.0)?;
        check_non_negative("seaLevelDropDueToIce", self.sea_level_drop_due_to_ice)?;
        check_non_negative("moistureScale", self.moisture_scale)?;
        check_non_negative("continentalScale", self.continental_scale)?;
        check_non_negative("continentalDryness", self.continental_dryness)?;
        check_non_negative("mountainRainout", self.mountain_rainout)?;
        check_non_negative("vaporLatitudeExponent", self.vapor_latitude_exponent)?;
        if !(0.0..1.0).contains(&self.coastal_threshold) {
            return Err(invalid(
                "coastalThreshold",
                self.coastal_threshold,
                "must lie in [0, 1)",
            ));
        }
        Ok(())
    }
}

// ── Model constants ───────────────────────────────────────────────────────────

/// Tuning constants that are not exposed on the parameter panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelConstants {
    /// Equatorial baseline temperature, °C.
    pub t_equator: f64,
    /// Exponent on cos(latitude) in the latitudinal temperature profile.
    pub latitude_temperature_exponent: f64,
    /// Metres represented by elevation code 255.
    pub max_elevation_m: f64,
    /// Lower clamp on evaporation capacity before taking its logarithm.
    pub evaporation_epsilon: f64,

    /// Distance over which moisture over land falls by a factor of e, km.
    pub e_folding_km: f64,
    /// Cost of one step onto an ocean cell.
    pub ocean_step_cost: f64,
    /// Multiplier on the derived land step cost.
    pub land_multiplier: f64,
    /// Poleward amplification of the base step cost (0 disables).
    pub cold_amplification: f64,
    /// Rise in metres over which the orographic penalty eases in.
    pub orographic_knee_m: f64,
    /// Cost of a zonal step straight against the prevailing wind.
    pub wind_penalty: f64,
    /// Cost of a meridional step.
    pub crosswind_penalty: f64,
    /// Power applied to the thresholded continental ramp.
    pub continental_exponent: f64,
    /// When set, ocean sources keep their seed cost and are never relaxed.
    pub pin_ocean_sources: bool,

    /// Continental averaging window radius, km.
    pub continental_radius_km: f64,
    /// Number of chained box-filter passes.
    pub continental_passes: u32,
    /// Upwind shift of the window centre as a fraction of its radius.
    pub continental_upwind_bias: f64,
    /// Half-width of the smoothstep blend between wind bands, degrees.
    pub wind_band_half_width_deg: f64,

    /// Melt conversion constant: melt = k · meltPressure · warmFraction.
    pub melt_rate_k: f64,
}

impl Default for ModelConstants {
    fn default() -> Self {
        Self {
            t_equator: 27.0,
            latitude_temperature_exponent: 1.3,
            max_elevation_m: 6000.0,
            evaporation_epsilon: 1e-6,
            e_folding_km: 1500.0,
            ocean_step_cost: 0.001,
            land_multiplier: 1.0,
            cold_amplification: 1.0,
            orographic_knee_m: 500.0,
            wind_penalty: 0.05,
            crosswind_penalty: 0.01,
            continental_exponent: 2.0,
            pin_ocean_sources: true,
            continental_radius_km: 1000.0,
            continental_passes: 2,
            continental_upwind_bias: 0.5,
            wind_band_half_width_deg: 10.0,
            melt_rate_k: 0.05,
        }
    }
}

impl ModelConstants {
    pub fn validate(&self) -> Result<()> {
        if !(self.e_folding_km.is_finite() && self.e_folding_km > 0.0) {
            return Err(invalid("eFoldingKm", self.e_folding_km, "must be positive"));
        }
        if !(self.evaporation_epsilon > 0.0 && self.evaporation_epsilon < 1.0) {
            return Err(invalid(
                "evaporationEpsilon",
                self.evaporation_epsilon,
                "must lie in (0, 1)",
            ));
        }
        check_non_negative("oceanStepCost", self.ocean_step_cost)?;
        check_non_negative("landMultiplier", self.land_multiplier)?;
        check_non_negative("coldAmplification", self.cold_amplification)?;
        check_non_negative("windPenalty", self.wind_penalty)?;
        check_non_negative("crosswindPenalty", self.crosswind_penalty)?;
        check_non_negative("continentalRadiusKm", self.continental_radius_km)?;
        check_non_negative("orographicKneeM", self.orographic_knee_m)?;
        check_non_negative("meltRateK", self.melt_rate_k)?;
        check_non_negative("maxElevationM", self.max_elevation_m)?;
        check_range("continentalUpwindBias", self.continental_upwind_bias, 0.0, 1.0)?;
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn invalid(name: &'static str, value: f64, reason: &'static str) -> ClimateError {
    ClimateError::InvalidParameter { name, value, reason }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(name, value, "must be finite and ≥ 0"))
    }
}

fn check_range(name: &'static str, value: f64, lo: f64, hi: f64) -> Result<()> {
    if value.is_finite() && (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(invalid(name, value, "out of range"))
    }
}
