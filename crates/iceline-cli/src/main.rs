//! Offline runner: decode a grayscale elevation PNG, compute the climate
//! fields, print a JSON report and optionally write diagnostic images.

mod render;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use iceline_core::climate::transport::trace_path;
use iceline_core::geometry::LatLon;
use iceline_core::{
    CellSnapshot, ClimateError, ClimateParams, FieldSummary, ModelConstants, RasterSource,
    WorldController, WorldRaster,
};

#[derive(Parser, Debug)]
#[command(name = "iceline", about = "Moisture transport and ice accumulation over an elevation raster")]
struct Args {
    /// Single-channel elevation image (0–255). Colour images are converted to luma.
    #[arg(short, long)]
    raster: PathBuf,

    /// JSON parameter set (camelCase keys; missing keys take defaults).
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// JSON model constants (camelCase keys; missing keys take defaults).
    #[arg(long)]
    constants: Option<PathBuf>,

    /// Cell indices to report.
    #[arg(long = "query-index")]
    query_index: Vec<usize>,

    /// Latitude of a point query, degrees north.
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude of a point query, degrees east.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Include the source-to-cell moisture route for every queried cell.
    #[arg(long)]
    trace: bool,

    /// Write land, moisture, temperature and ice PNGs to this directory.
    #[arg(long)]
    render_dir: Option<PathBuf>,
}

/// Raster source backed by an image file on disk.
struct PngRasterSource {
    path: PathBuf,
}

impl RasterSource for PngRasterSource {
    fn load(&self) -> iceline_core::Result<WorldRaster> {
        let img = image::open(&self.path)
            .map_err(|e| ClimateError::RasterLoad(format!("{}: {e}", self.path.display())))?
            .to_luma8();
        let (w, h) = img.dimensions();
        WorldRaster::new(w as usize, h as usize, img.into_raw())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CellReport {
    #[serde(flatten)]
    cell: CellSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<Vec<usize>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    params: ClimateParams,
    summary: FieldSummary,
    cells: Vec<CellReport>,
}

fn read_json<T: serde::de::DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", p.display()))
        }
        None => Ok(T::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let params: ClimateParams = read_json(args.params.as_deref())?;
    let constants: ModelConstants = read_json(args.constants.as_deref())?;

    let controller = WorldController::new(constants);
    let source = PngRasterSource { path: args.raster.clone() };
    let fields = controller
        .load(&source, params.clone())
        .with_context(|| format!("computing climate for {}", args.raster.display()))?;

    let mut indices = args.query_index.clone();
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        indices.push(fields.cell_for_latlon(LatLon::new(lat, lon)));
    }

    let mut cells = Vec::with_capacity(indices.len());
    for index in indices {
        let cell = controller.query(index).with_context(|| format!("querying cell {index}"))?;
        let route = args.trace.then(|| trace_path(&fields.moisture, index));
        cells.push(CellReport { cell, route });
    }

    if let Some(dir) = &args.render_dir {
        if dir.exists() && !dir.is_dir() {
            bail!("{} exists and is not a directory", dir.display());
        }
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        for path in render::write_all(&fields, dir)? {
            log::info!("wrote {}", path.display());
        }
    }

    let report = Report { params, summary: fields.summary(), cells };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
