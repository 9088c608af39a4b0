use wasm_bindgen::prelude::*;

use crate::driver::{ManualScheduler, WiggleDriver};
use crate::params::WiggleParams;
use crate::svg::extract_first_path_data;

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// The `d` attribute of the first `<path>` in an SVG document. Throws if the
/// document is not well-formed.
#[wasm_bindgen]
pub fn first_path_data(svg: &str) -> Result<Option<String>, JsValue> {
    extract_first_path_data(svg).map_err(|e| JsValue::from_str(&e))
}

/// Wiggle animation for one path element.
///
/// The page owns the `requestAnimationFrame` loop and calls `next_frame` from
/// it. When the loop is torn down the page calls `stop`, after which
/// `next_frame` publishes nothing until the path or parameters change.
#[wasm_bindgen]
pub struct WasmWiggle {
    driver: WiggleDriver<ManualScheduler>,
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
impl WasmWiggle {
    #[wasm_bindgen(constructor)]
    pub fn new(d: &str, amplitude: f64, speed: f64, point_count: usize) -> Result<WasmWiggle, JsValue> {
        let mut driver = WiggleDriver::new(ManualScheduler::new());
        driver
            .start(d, WiggleParams::new(amplitude, speed, point_count))
            .map_err(to_js_error)?;
        log::info!("Wiggle created with {} samples", driver.samples().len());
        Ok(Self { driver })
    }

    /// Update parameters; restarts the animation only if something changed.
    pub fn set_params(&mut self, amplitude: f64, speed: f64, point_count: usize) -> Result<bool, JsValue> {
        self.driver
            .set_params(WiggleParams::new(amplitude, speed, point_count))
            .map_err(to_js_error)
    }

    /// Replace the animated path; restarts the animation if it differs.
    pub fn set_path(&mut self, d: &str) -> Result<bool, JsValue> {
        let params = self.driver.params();
        self.driver.update(d, params).map_err(to_js_error)
    }

    /// Advance one frame and return the curve to draw. Returns the last
    /// published curve unchanged when nothing is scheduled.
    pub fn next_frame(&mut self) -> String {
        if let Some(handle) = self.driver.scheduler_mut().take_pending() {
            self.driver.on_frame(handle);
        }
        self.driver.curve().to_string()
    }

    /// Advance one frame and write the curve into `element`'s `d` attribute.
    pub fn render_into(&mut self, element: &web_sys::Element) -> Result<(), JsValue> {
        let curve = self.next_frame();
        element.set_attribute("d", &curve)
    }

    /// Cancel the pending frame.
    pub fn stop(&mut self) {
        self.driver.stop();
    }

    /// Index of the next frame.
    pub fn frame(&self) -> f64 {
        self.driver.frame() as f64
    }

    /// Seed of the current sampling pass.
    pub fn seed(&self) -> f64 {
        self.driver.seed()
    }
}
