//! Browser entry points.

use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::config::{Config, ShaderConfig};
use crate::error::{Error, Result};
use crate::renderer;

pub mod dom;
pub mod gl;
pub mod options;
mod render;

pub use dom::ScriptRegistry;
pub use gl::WebGl;
pub use render::ShadeHandle;

pub type WebConfig = Config<WebGl, HtmlCanvasElement>;

impl From<Error> for JsValue {
    fn from(error: Error) -> Self {
        let js = js_sys::Error::new(&error.to_string());
        js.set_name(error.class_name());
        js.into()
    }
}

#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
}

/// Starts shading `canvas`, or a new full-window background canvas.
///
/// Sources come from the `<script>` shaders in the document head. When
/// `config` lists no shaders, every script shader becomes a pass, in
/// document order. Returns `Ok(None)` when the error hook swallowed a setup
/// failure, e.g. the default fallback for missing WebGL features.
///
/// Once a canvas exists every setup error goes through the error hook, the
/// script lookup included. Only failing to create the canvas itself is
/// returned directly.
pub fn shade(canvas: Option<HtmlCanvasElement>, config: WebConfig) -> Result<Option<ShadeHandle>> {
    let mut config = config;
    let (canvas, placed) = match canvas {
        Some(canvas) => (canvas, Ok(())),
        None => {
            let canvas = dom::create_canvas()?;
            let placed = dom::place_in_background(&canvas);
            (canvas, placed)
        }
    };
    let registry = placed.and_then(|()| ScriptRegistry::from_document(&dom::document()?));
    let registry = match registry {
        Ok(registry) => registry,
        Err(e) => {
            return renderer::route(config.hooks.on_error.as_mut(), e, &canvas).map(|()| None)
        }
    };
    let config = if config.has_shaders() {
        config
    } else {
        registry
            .ids()
            .iter()
            .fold(config, |config, id| config.shader(id.clone(), ShaderConfig::new()))
    };
    let Some(renderer) = renderer::shade(canvas, &registry, WebGl::connect, config)? else {
        return Ok(None);
    };
    render::start(renderer)
        .map(Some)
        .map_err(gl::js_error)
}

/// Like [`shade`], once the page finished loading.
pub fn shade_on_load(canvas: Option<HtmlCanvasElement>, config: WebConfig) -> Result<()> {
    let document = dom::document()?;
    if document.ready_state() == "complete" {
        return shade(canvas, config).map(|_| ());
    }
    let on_load = Closure::once_into_js(move || {
        if let Err(e) = shade(canvas, config) {
            log::error!("shading failed: {e}");
        }
    });
    web_sys::window()
        .ok_or_else(|| Error::capability("no window available"))?
        .add_event_listener_with_callback("load", on_load.unchecked_ref())
        .map_err(gl::js_error)
}

/// JS entry: shades the page's `<script type="x-shader/x-fragment">` shaders.
/// `config` is an optional options object, see [`options`].
#[wasm_bindgen(js_name = shade)]
pub fn shade_js(config: JsValue) -> std::result::Result<Option<ShadeHandle>, JsValue> {
    let (canvas, config) = options::parse(&config)?;
    Ok(shade(canvas, config)?)
}

#[wasm_bindgen(js_name = shadeOnLoad)]
pub fn shade_on_load_js(config: JsValue) -> std::result::Result<(), JsValue> {
    let (canvas, config) = options::parse(&config)?;
    Ok(shade_on_load(canvas, config)?)
}
