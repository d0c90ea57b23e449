use log::{Level, LevelFilter, Log, Metadata, Record};
use serde::Serialize;
use verilens::render::{composite, rasterize};
use verilens::{Assessment, CanvasPolicy, DetectionResult, MapType, ScoreGrid};
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::console;

#[derive(Serialize)]
pub struct CanvasSize {
    pub width: usize,
    pub height: usize,
}

/// Renders detector output straight into canvas-ready RGBA
#[wasm_bindgen]
pub struct Renderer {
    policy: CanvasPolicy,
}

#[wasm_bindgen]
impl Renderer {
    #[wasm_bindgen(constructor)]
    pub fn new(size: usize, preserve_aspect: bool) -> Renderer {
        Renderer {
            policy: policy_for(size, preserve_aspect),
        }
    }

    /// Verdict tag for raw integrity / reliability scores
    #[wasm_bindgen]
    pub fn classify(&self, integrity: f64, evidence_reliability: f64) -> String {
        verilens::classify(integrity, evidence_reliability).to_string()
    }

    /// Full assessment for a detector result JSON string
    #[wasm_bindgen]
    pub fn assess(&self, result_json: &str) -> Result<JsValue, JsValue> {
        let result = DetectionResult::from_json_str(result_json).map_err(js_error)?;
        let assessment = Assessment::from_result(&result);
        serde_wasm_bindgen::to_value(&assessment).map_err(JsValue::from)
    }

    /// Canvas size this renderer would use for `result_json`
    #[wasm_bindgen(js_name = canvasSize)]
    pub fn canvas_size(&self, result_json: &str) -> Result<JsValue, JsValue> {
        let result = DetectionResult::from_json_str(result_json).map_err(js_error)?;
        let (width, height) = self.policy.dimensions(result.source_dimensions());
        serde_wasm_bindgen::to_value(&CanvasSize { width, height }).map_err(JsValue::from)
    }

    /// Heatmap pixels for one grid; pass straight to `new ImageData(px, w, h)`
    #[wasm_bindgen]
    pub fn heatmap(&self, grid_json: &str, map_type: &str, width: usize, height: usize) -> Result<Clamped<Vec<u8>>, JsValue> {
        let (grid, map_type) = parse_heatmap_args(grid_json, map_type).map_err(js_error)?;
        let buffer = rasterize(&grid, map_type, width, height).map_err(js_error)?;
        Ok(Clamped(buffer.into_raw()))
    }

    /// Translucent highlight pixels for an anomaly grid
    #[wasm_bindgen]
    pub fn overlay(&self, grid_json: &str, width: usize, height: usize) -> Result<Clamped<Vec<u8>>, JsValue> {
        let grid = parse_grid(grid_json).map_err(js_error)?;
        let buffer = composite(width, height, &grid).map_err(js_error)?;
        Ok(Clamped(buffer.into_raw()))
    }
}

fn policy_for(size: usize, preserve_aspect: bool) -> CanvasPolicy {
    if preserve_aspect {
        CanvasPolicy::AspectFit { max: size }
    } else {
        CanvasPolicy::Fixed { size }
    }
}

fn parse_grid(grid_json: &str) -> Result<ScoreGrid, String> {
    let rows: Vec<Vec<f64>> = serde_json::from_str(grid_json).map_err(|e| e.to_string())?;
    ScoreGrid::from_rows(rows).map_err(|e| e.to_string())
}

fn parse_heatmap_args(grid_json: &str, map_type: &str) -> Result<(ScoreGrid, MapType), String> {
    let map_type: MapType = map_type.parse()?;
    Ok((parse_grid(grid_json)?, map_type))
}

fn js_error(e: impl ToString) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

/// Routes the library's `log` output to the browser console
struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => console::error_1(&msg),
            Level::Warn => console::warn_1(&msg),
            _ => console::log_1(&msg),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Turn per-render diagnostics on or off
#[wasm_bindgen(js_name = setDebug)]
pub fn set_debug(enabled: bool) {
    log::set_max_level(if enabled { LevelFilter::Debug } else { LevelFilter::Warn });
}

#[wasm_bindgen(start)]
pub fn init() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Warn);
    }
}
