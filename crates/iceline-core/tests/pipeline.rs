//! End-to-end checks through the public API: raster in, field bank out.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use iceline_core::climate::run_pipeline;
use iceline_core::geometry::LatLon;
use iceline_core::{ClimateParams, FieldKind, ModelConstants, WorldController, WorldRaster};

/// Constants with every optional edge term switched off.
fn flat_constants() -> ModelConstants {
    ModelConstants {
        cold_amplification: 0.0,
        wind_penalty: 0.0,
        crosswind_penalty: 0.0,
        ..ModelConstants::default()
    }
}

fn zero_params(sea_level: f64) -> ClimateParams {
    ClimateParams {
        sea_level,
        ice_level: 0.0,
        sea_level_drop_due_to_ice: 0.0,
        t_pole: 0.0,
        lapse_rate: 0.0,
        seasonal_amplitude: 0.0,
        continental_season_boost: 0.0,
        max_global_cooling: 0.0,
        moisture_scale: 0.0,
        continental_scale: 0.0,
        continental_dryness: 0.0,
        mountain_rainout: 0.0,
        coastal_threshold: 0.0,
        vapor_latitude_exponent: 0.0,
    }
}

fn random_world(rng: &mut StdRng, w: usize, h: usize) -> WorldRaster {
    WorldRaster::from_fn(w, h, |_, _| rng.gen()).unwrap()
}

#[test]
fn coastal_row_saturates_and_decays_inland() {
    let raster = WorldRaster::from_fn(12, 3, |row, _| if row == 0 { 0 } else { 128 }).unwrap();
    let bank = run_pipeline(&raster, &zero_params(128.0), &flat_constants()).unwrap();

    for c in 0..12 {
        assert_eq!(bank.moisture.moisture[c], 1.0, "ocean cell {c} must hold exactly 1");
        assert_eq!(bank.moisture.path_cost[c], 0.0);
    }
    for c in 0..12 {
        let (m0, m1, m2) = (
            bank.moisture.moisture[c],
            bank.moisture.moisture[12 + c],
            bank.moisture.moisture[24 + c],
        );
        assert!(m0 > m1 && m1 > m2, "column {c}: {m0:.4} > {m1:.4} > {m2:.4} expected");
    }
}

#[test]
fn land_mask_threshold_has_no_off_by_one() {
    let raster = WorldRaster::from_fn(256, 2, |_, col| col as u8).unwrap();
    let bank = run_pipeline(&raster, &zero_params(128.0), &ModelConstants::default()).unwrap();

    for row in 0..2 {
        for col in 0..256 {
            assert_eq!(
                bank.land.is_land[row * 256 + col],
                col >= 128,
                "row {row} col {col}"
            );
        }
    }
}

#[test]
fn outputs_stay_in_range_on_random_worlds() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10 {
        let w = rng.gen_range(2..24);
        let h = rng.gen_range(1..12);
        let raster = random_world(&mut rng, w, h);
        let params = ClimateParams { sea_level: rng.gen_range(0.0..255.0), ..ClimateParams::default() };
        let bank = run_pipeline(&raster, &params, &ModelConstants::default()).unwrap();

        for i in 0..bank.len() {
            let m = bank.moisture.moisture[i];
            assert!((0.0..=1.0).contains(&m), "moisture {m} at cell {i}");
            assert!((0.0..=1.0).contains(&bank.continental[i]));
            if !bank.land.is_land[i] {
                assert!(!bank.thermal.ice_mask[i], "ocean cell {i} marked as ice");
                assert_eq!(bank.moisture.source[i], i as i64);
            }
            if bank.thermal.ice_mask[i] {
                assert!(bank.thermal.net_ice[i] > 0.0);
            }
        }
    }
}

#[test]
fn strong_dryness_never_reads_as_unreachable() {
    // One ocean column feeding a wide continent with harsh interior dryness.
    let raster = WorldRaster::from_fn(400, 3, |_, col| if col == 0 { 0 } else { 200 }).unwrap();
    let params = ClimateParams { continental_dryness: 50.0, ..ClimateParams::default() };
    let bank = run_pipeline(&raster, &params, &ModelConstants::default()).unwrap();

    let max_cost = bank.moisture.path_cost.iter().cloned().fold(0.0, f64::max);
    assert!(max_cost > 745.0, "interior cost {max_cost:.1} should be past exp underflow");

    let exported = bank.field(FieldKind::MoistureAvailability);
    for i in 0..bank.len() {
        assert!(bank.moisture.source[i] >= 0, "cell {i} unreachable");
        let m = bank.moisture.moisture[i];
        assert!(m > 0.0 && m <= 1.0, "cell {i}: moisture {m:e} at cost {:.1}", bank.moisture.path_cost[i]);
        assert!(exported[i] > 0.0, "cell {i}: exported moisture underflowed");
    }
    assert_eq!(bank.summary().unreachable_land_cells, 0);
}

#[test]
fn all_land_world_has_no_moisture_sources() {
    let raster = WorldRaster::from_fn(8, 4, |_, _| 255).unwrap();
    let bank = run_pipeline(&raster, &ClimateParams::default(), &ModelConstants::default()).unwrap();

    assert!(bank.moisture.moisture.iter().all(|&m| m == 0.0));
    assert!(bank.moisture.source.iter().all(|&s| s == -1));
    assert!(bank.thermal.ice_mask.iter().all(|&ice| !ice), "no moisture, no ice");
    let summary = bank.summary();
    assert_eq!(summary.unreachable_land_cells, 32);
    assert_relative_eq!(summary.land_fraction, 1.0);
}

#[test]
fn all_ocean_world_has_no_land_outputs() {
    let raster = WorldRaster::from_fn(8, 4, |_, _| 0).unwrap();
    let bank = run_pipeline(&raster, &ClimateParams::default(), &ModelConstants::default()).unwrap();

    assert!(bank.continental.iter().all(|&c| c == 0.0));
    assert!(bank.field(FieldKind::TMean).iter().all(|&t| t == 0.0));
    assert_eq!(bank.summary().land_fraction, 0.0);
}

#[test]
fn single_cell_world() {
    for e in [0u8, 255] {
        let raster = WorldRaster::new(1, 1, vec![e]).unwrap();
        let bank = run_pipeline(&raster, &ClimateParams::default(), &ModelConstants::default()).unwrap();
        assert_eq!(bank.len(), 1);
        assert!(bank.snapshot(0).is_ok());
    }
}

#[test]
fn identical_inputs_give_identical_banks() {
    let mut rng = StdRng::seed_from_u64(99);
    let raster = random_world(&mut rng, 20, 10);
    let a = run_pipeline(&raster, &ClimateParams::default(), &ModelConstants::default()).unwrap();
    let b = run_pipeline(&raster, &ClimateParams::default(), &ModelConstants::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn glaciation_cools_and_expands_land() {
    let mut rng = StdRng::seed_from_u64(3);
    let raster = random_world(&mut rng, 32, 16);
    let warm = run_pipeline(&raster, &ClimateParams::default(), &ModelConstants::default()).unwrap();
    let glacial = ClimateParams { ice_level: 1.0, ..ClimateParams::default() };
    let cold = run_pipeline(&raster, &glacial, &ModelConstants::default()).unwrap();

    let (ws, cs) = (warm.summary(), cold.summary());
    assert!(
        cs.land_fraction >= ws.land_fraction,
        "land fraction {:.3} → {:.3}",
        ws.land_fraction,
        cs.land_fraction
    );
    for i in 0..warm.len() {
        if warm.land.is_land[i] {
            assert!(cold.land.is_land[i], "cell {i} flooded by glaciation");
            assert!(cold.thermal.t_mean[i] < warm.thermal.t_mean[i]);
        }
    }
}

#[test]
fn controller_serves_point_queries() {
    let ctl = WorldController::new(ModelConstants::default());
    let source = || WorldRaster::from_fn(36, 18, |row, col| if (row + col) % 5 == 0 { 200 } else { 60 });
    ctl.load(&source, ClimateParams::default()).unwrap();

    let by_index = ctl.query(5).unwrap();
    assert_eq!(by_index.index, 5);
    let ll = LatLon::new(by_index.lat, by_index.lon + 0.5);
    let by_latlon = ctl.query_latlon(ll).unwrap();
    assert_eq!(by_latlon, by_index);
    assert!(ctl.query(36 * 18).is_err());
}
