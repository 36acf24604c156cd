use wasm_bindgen::prelude::*;

use crate::config::ViewerConfig;

#[wasm_bindgen(start)]
pub fn start() {
    let config = ViewerConfig::default();
    crate::logging::init(config.preferences.log_level);
    log::info!("🧠 {} core loaded", config.app_name);
}
