//! Browser bindings. The page decodes the elevation image, hands over its
//! bytes once, then drives recomputes from the parameter panel and reads
//! fields back as `Float32Array`s.

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

use iceline_core::geometry::LatLon;
use iceline_core::{ClimateParams, FieldKind, ModelConstants, WorldController, WorldRaster};

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_err)
}

/// One loaded world and its current field bank.
#[wasm_bindgen]
pub struct ClimateWorld {
    controller: WorldController,
    width: usize,
    height: usize,
}

#[wasm_bindgen]
impl ClimateWorld {
    /// Build from raw elevation bytes (row-major, one byte per cell) and an
    /// optional parameter JSON string. Computes the first bank immediately.
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: usize,
        height: usize,
        elevation: Vec<u8>,
        params_json: Option<String>,
    ) -> Result<ClimateWorld, JsValue> {
        let params = match params_json {
            Some(s) => ClimateParams::from_json(&s).map_err(js_err)?,
            None => ClimateParams::default(),
        };
        let raster = WorldRaster::new(width, height, elevation).map_err(js_err)?;
        let controller = WorldController::new(ModelConstants::default());
        let source = move || -> iceline_core::Result<WorldRaster> { Ok(raster.clone()) };
        controller.load(&source, params).map_err(js_err)?;
        Ok(ClimateWorld { controller, width, height })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Apply a new parameter set. On rejection the previous fields stay
    /// current and the error message is thrown.
    pub fn recompute(&self, params_json: &str) -> Result<(), JsValue> {
        let params = ClimateParams::from_json(params_json).map_err(js_err)?;
        self.controller.recompute(params).map_err(js_err)?;
        Ok(())
    }

    /// Current parameters as a plain object.
    pub fn params(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.params().map_err(js_err)?)
    }

    /// Every scalar at one cell.
    pub fn query(&self, index: usize) -> Result<JsValue, JsValue> {
        to_js(&self.controller.query(index).map_err(js_err)?)
    }

    #[wasm_bindgen(js_name = queryLatLon)]
    pub fn query_lat_lon(&self, lat: f64, lon: f64) -> Result<JsValue, JsValue> {
        to_js(&self.controller.query_latlon(LatLon::new(lat, lon)).map_err(js_err)?)
    }

    /// Named field (`"moistureAvailability"`, `"iceMask"`, ...) as a dense array.
    pub fn field(&self, name: &str) -> Result<Float32Array, JsValue> {
        let kind = FieldKind::from_name(name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown field: {name}")))?;
        let data = self.controller.fields().map_err(js_err)?.field(kind);
        Ok(Float32Array::from(data.as_slice()))
    }

    pub fn summary(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.fields().map_err(js_err)?.summary())
    }
}

/// Default parameter set, for initialising the panel.
#[wasm_bindgen(js_name = defaultParams)]
pub fn default_params() -> Result<JsValue, JsValue> {
    to_js(&ClimateParams::default())
}

/// Names accepted by `ClimateWorld.field`.
#[wasm_bindgen(js_name = fieldNames)]
pub fn field_names() -> Vec<JsValue> {
    FieldKind::ALL.iter().map(|k| JsValue::from_str(k.name())).collect()
}
