use serde::{Deserialize, Serialize};

use crate::climate::sea_level::LandMask;
use crate::climate::thermal::ThermalIceField;
use crate::climate::transport::MoistureField;
use crate::error::{ClimateError, Result};
use crate::geometry::{cell_for_latlon, latlon_for_cell, LatLon};

/// Every derived per-cell field for one (raster, parameter set) pair.
///
/// Width and height are stored once here; every array is row-major with
/// length `width × height`. A bank is immutable after construction and is
/// replaced wholesale on recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBank {
    width: usize,
    height: usize,
    pub land: LandMask,
    /// Ocean evaporation capacity in [0, 1]; 0 on land.
    pub evaporation: Vec<f32>,
    /// Windowed land fraction in [0, 1].
    pub continental: Vec<f32>,
    pub moisture: MoistureField,
    pub thermal: ThermalIceField,
}

/// Read-only view of every derived scalar at one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSnapshot {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub lat: f64,
    pub lon: f64,
    pub is_land: bool,
    pub effective_sea_level: f64,
    pub height_above_sea: f32,
    pub evaporation_capacity: f32,
    pub continental_value: f32,
    pub moisture_availability: f64,
    /// `None` where no ocean source reaches the cell.
    pub path_cost: Option<f64>,
    pub path_source: i64,
    pub path_predecessor: i64,
    pub t_lat: f32,
    pub t_elev: f32,
    pub t_global: f32,
    pub t_mean: f32,
    pub t_seasonal: f32,
    pub t_continental: f32,
    pub t_winter: f32,
    pub t_summer: f32,
    pub cold_fraction: f32,
    pub warm_fraction: f32,
    pub accumulation: f32,
    pub ice_formation: f32,
    pub melt_rate: f32,
    pub net_ice: f32,
    pub ice_mask: bool,
}

/// Dense fields a renderer can ask for by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Land,
    HeightAboveSea,
    EvaporationCapacity,
    ContinentalValue,
    MoistureAvailability,
    PathCost,
    TLat,
    TElev,
    TGlobal,
    TMean,
    TSeasonal,
    TContinental,
    TWinter,
    TSummer,
    ColdFraction,
    WarmFraction,
    Accumulation,
    IceFormation,
    MeltRate,
    NetIce,
    IceMask,
}

impl FieldKind {
    pub const ALL: [FieldKind; 21] = [
        FieldKind::Land,
        FieldKind::HeightAboveSea,
        FieldKind::EvaporationCapacity,
        FieldKind::ContinentalValue,
        FieldKind::MoistureAvailability,
        FieldKind::PathCost,
        FieldKind::TLat,
        FieldKind::TElev,
        FieldKind::TGlobal,
        FieldKind::TMean,
        FieldKind::TSeasonal,
        FieldKind::TContinental,
        FieldKind::TWinter,
        FieldKind::TSummer,
        FieldKind::ColdFraction,
        FieldKind::WarmFraction,
        FieldKind::Accumulation,
        FieldKind::IceFormation,
        FieldKind::MeltRate,
        FieldKind::NetIce,
        FieldKind::IceMask,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Land => "land",
            FieldKind::HeightAboveSea => "heightAboveSea",
            FieldKind::EvaporationCapacity => "evaporationCapacity",
            FieldKind::ContinentalValue => "continentalValue",
            FieldKind::MoistureAvailability => "moistureAvailability",
            FieldKind::PathCost => "pathCost",
            FieldKind::TLat => "tLat",
            FieldKind::TElev => "tElev",
            FieldKind::TGlobal => "tGlobal",
            FieldKind::TMean => "tMean",
            FieldKind::TSeasonal => "tSeasonal",
            FieldKind::TContinental => "tContinental",
            FieldKind::TWinter => "tWinter",
            FieldKind::TSummer => "tSummer",
            FieldKind::ColdFraction => "coldFraction",
            FieldKind::WarmFraction => "warmFraction",
            FieldKind::Accumulation => "accumulation",
            FieldKind::IceFormation => "iceFormation",
            FieldKind::MeltRate => "meltRate",
            FieldKind::NetIce => "netIce",
            FieldKind::IceMask => "iceMask",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Whole-world aggregates for logs and tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub width: usize,
    pub height: usize,
    pub effective_sea_level: f64,
    pub land_fraction: f64,
    /// Share of land cells under the ice mask.
    pub ice_land_fraction: f64,
    pub mean_land_moisture: f64,
    pub mean_land_t_mean: f64,
    pub unreachable_land_cells: usize,
}

impl FieldBank {
    pub fn new(
        width: usize,
        height: usize,
        land: LandMask,
        evaporation: Vec<f32>,
        continental: Vec<f32>,
        moisture: MoistureField,
        thermal: ThermalIceField,
    ) -> Self {
        let n = width * height;
        debug_assert_eq!(land.is_land.len(), n);
        debug_assert_eq!(evaporation.len(), n);
        debug_assert_eq!(continental.len(), n);
        debug_assert_eq!(moisture.moisture.len(), n);
        debug_assert_eq!(thermal.ice_mask.len(), n);
        Self { width, height, land, evaporation, continental, moisture, thermal }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell_for_latlon(&self, ll: LatLon) -> usize {
        cell_for_latlon(ll, self.width, self.height)
    }

    /// Snapshot of every scalar at `index`.
    pub fn snapshot(&self, index: usize) -> Result<CellSnapshot> {
        if index >= self.len() {
            return Err(ClimateError::CellOutOfRange { index, len: self.len() });
        }
        let ll = latlon_for_cell(index, self.width, self.height);
        let t = self.thermal.cell(index);
        let cost = self.moisture.path_cost[index];

        Ok(CellSnapshot {
            index,
            row: index / self.width,
            col: index % self.width,
            lat: ll.lat,
            lon: ll.lon,
            is_land: self.land.is_land[index],
            effective_sea_level: self.land.effective_sea_level,
            height_above_sea: self.land.height_above_sea[index],
            evaporation_capacity: self.evaporation[index],
            continental_value: self.continental[index],
            moisture_availability: self.moisture.moisture[index],
            path_cost: cost.is_finite().then_some(cost),
            path_source: self.moisture.source[index],
            path_predecessor: self.moisture.predecessor[index],
            t_lat: t.t_lat as f32,
            t_elev: t.t_elev as f32,
            t_global: t.t_global as f32,
            t_mean: t.t_mean as f32,
            t_seasonal: t.t_seasonal as f32,
            t_continental: t.t_continental as f32,
            t_winter: t.t_winter as f32,
            t_summer: t.t_summer as f32,
            cold_fraction: t.cold_fraction as f32,
            warm_fraction: t.warm_fraction as f32,
            accumulation: t.accumulation as f32,
            ice_formation: t.ice_formation as f32,
            melt_rate: t.melt_rate as f32,
            net_ice: t.net_ice as f32,
            ice_mask: self.thermal.ice_mask[index],
        })
    }

    /// One field as a dense f32 array. Booleans become 0/1; unreachable path
    /// costs stay +∞. Reachable moisture keeps a positive f32 floor.
    pub fn field(&self, kind: FieldKind) -> Vec<f32> {
        let bools = |v: &[bool]| v.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect();
        let th = &self.thermal;
        match kind {
            FieldKind::Land => bools(&self.land.is_land),
            FieldKind::HeightAboveSea => self.land.height_above_sea.clone(),
            FieldKind::EvaporationCapacity => self.evaporation.clone(),
            FieldKind::ContinentalValue => self.continental.clone(),
            FieldKind::MoistureAvailability => self
                .moisture
                .moisture
                .iter()
                .map(|&m| if m > 0.0 { (m as f32).max(f32::MIN_POSITIVE) } else { 0.0 })
                .collect(),
            FieldKind::PathCost => self.moisture.path_cost.iter().map(|&c| c as f32).collect(),
            FieldKind::TLat => th.t_lat.clone(),
            FieldKind::TElev => th.t_elev.clone(),
            FieldKind::TGlobal => th.t_global.clone(),
            FieldKind::TMean => th.t_mean.clone(),
            FieldKind::TSeasonal => th.t_seasonal.clone(),
            FieldKind::TContinental => th.t_continental.clone(),
            FieldKind::TWinter => th.t_winter.clone(),
            FieldKind::TSummer => th.t_summer.clone(),
            FieldKind::ColdFraction => th.cold_fraction.clone(),
            FieldKind::WarmFraction => th.warm_fraction.clone(),
            FieldKind::Accumulation => th.accumulation.clone(),
            FieldKind::IceFormation => th.ice_formation.clone(),
            FieldKind::MeltRate => th.melt_rate.clone(),
            FieldKind::NetIce => th.net_ice.clone(),
            FieldKind::IceMask => bools(&th.ice_mask),
        }
    }

    pub fn summary(&self) -> FieldSummary {
        let n = self.len();
        let mut land = 0usize;
        let mut ice = 0usize;
        let mut unreachable = 0usize;
        let mut moisture_sum = 0.0f64;
        let mut t_sum = 0.0f64;

        for i in 0..n {
            if !self.land.is_land[i] {
                continue;
            }
            land += 1;
            if self.thermal.ice_mask[i] {
                ice += 1;
            }
            if self.moisture.source[i] < 0 {
                unreachable += 1;
            }
            moisture_sum += self.moisture.moisture[i];
            t_sum += self.thermal.t_mean[i] as f64;
        }

        let per_land = |v: f64| if land > 0 { v / land as f64 } else { 0.0 };
        FieldSummary {
            width: self.width,
            height: self.height,
            effective_sea_level: self.land.effective_sea_level,
            land_fraction: if n > 0 { land as f64 / n as f64 } else { 0.0 },
            ice_land_fraction: per_land(ice as f64),
            mean_land_moisture: per_land(moisture_sum),
            mean_land_t_mean: per_land(t_sum),
            unreachable_land_cells: unreachable,
        }
    }
}
