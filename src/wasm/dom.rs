//! Canvas element and `<script>` shader sources.

use std::collections::HashMap;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{window, Document, HtmlCanvasElement, HtmlScriptElement};

use super::gl::js_error;
use crate::canvas::{Canvas, FALLBACK_CLASS};
use crate::error::{Error, Result};
use crate::registry::ShaderRegistry;

pub const FRAGMENT_SCRIPT_TYPE: &str = "x-shader/x-fragment";
pub const VERTEX_SCRIPT_TYPE: &str = "x-shader/x-vertex";
/// Suffix of the script id holding a pass's custom vertex shader.
pub const VERTEX_ID_SUFFIX: &str = "-vertex";

pub(crate) fn document() -> Result<Document> {
    window()
        .and_then(|w| w.document())
        .ok_or_else(|| Error::capability("no document available"))
}

impl Canvas for HtmlCanvasElement {
    fn client_size(&self) -> (f64, f64) {
        let rect = self.get_bounding_client_rect();
        (rect.width(), rect.height())
    }

    fn device_pixel_ratio(&self) -> f64 {
        window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0)
    }

    fn set_buffer_size(&self, width: u32, height: u32) {
        self.set_width(width);
        self.set_height(height);
    }

    fn mark_fallback(&self) {
        if let Err(e) = self.class_list().add_1(FALLBACK_CLASS) {
            log::error!("cannot add fallback class to canvas: {e:?}");
        }
        let root = self.owner_document().and_then(|d| d.document_element());
        if let Some(root) = root {
            if let Err(e) = root.class_list().add_1(FALLBACK_CLASS) {
                log::error!("cannot add fallback class to document: {e:?}");
            }
        }
    }
}

/// Checks that a JS value handed in as the canvas is a canvas element.
pub fn check_canvas(value: JsValue) -> Result<HtmlCanvasElement> {
    value
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| Error::config("config.canvas must be instance of canvas"))
}

/// Appends a fixed full-viewport canvas behind the page content.
pub fn new_background_canvas() -> Result<HtmlCanvasElement> {
    let canvas = create_canvas()?;
    place_in_background(&canvas)?;
    Ok(canvas)
}

pub(crate) fn create_canvas() -> Result<HtmlCanvasElement> {
    document()?
        .create_element("canvas")
        .map_err(js_error)?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| Error::capability("created element is not a canvas"))
}

pub(crate) fn place_in_background(canvas: &HtmlCanvasElement) -> Result<()> {
    let style = canvas.style();
    for (property, value) in [
        ("width", "100vw"),
        ("height", "100vh"),
        ("position", "fixed"),
        ("top", "0"),
        ("left", "0"),
        ("z-index", "-9999"),
    ] {
        style.set_property(property, value).map_err(js_error)?;
    }
    let body = document()?
        .body()
        .ok_or_else(|| Error::capability("document has no body"))?;
    body.append_child(canvas).map_err(js_error)?;
    Ok(())
}

/// Shader sources from `<script>` elements in the document head.
///
/// Fragment shaders are `<script type="x-shader/x-fragment" id="pass">`, in
/// document order. A pass may override the vertex shader with
/// `<script type="x-shader/x-vertex" id="pass-vertex">`.
#[derive(Clone, Debug, Default)]
pub struct ScriptRegistry {
    ids: Vec<String>,
    fragments: HashMap<String, String>,
    vertices: HashMap<String, String>,
}

impl ScriptRegistry {
    pub fn from_document(document: &Document) -> Result<Self> {
        let fragments = scripts(document, FRAGMENT_SCRIPT_TYPE)?;
        if fragments.is_empty() {
            return Err(Error::config(format!(
                "at least one <script type=\"{FRAGMENT_SCRIPT_TYPE}\"> required in document head"
            )));
        }
        let mut registry = ScriptRegistry::default();
        for (id, text) in fragments {
            if id.is_empty() {
                return Err(Error::config("each shader <script> needs unique id attribute"));
            }
            if registry.fragments.insert(id.clone(), text).is_some() {
                return Err(Error::config(format!("duplicate shader <script> id \"{id}\"")));
            }
            registry.ids.push(id);
        }
        for (id, text) in scripts(document, VERTEX_SCRIPT_TYPE)? {
            match id.strip_suffix(VERTEX_ID_SUFFIX) {
                Some(pass) => {
                    registry.vertices.insert(pass.to_string(), text);
                }
                None => log::warn!(
                    "vertex shader <script id=\"{id}\"> ignored, id must end with \"{VERTEX_ID_SUFFIX}\""
                ),
            }
        }
        Ok(registry)
    }

    /// Pass ids in document order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

impl ShaderRegistry for ScriptRegistry {
    fn fragment_source(&self, id: &str) -> Option<String> {
        self.fragments.get(id).cloned()
    }

    fn vertex_source(&self, id: &str) -> Option<String> {
        self.vertices.get(id).cloned()
    }
}

fn scripts(document: &Document, script_type: &str) -> Result<Vec<(String, String)>> {
    let head = document
        .head()
        .ok_or_else(|| Error::config("document has no head"))?;
    let nodes = head
        .query_selector_all(&format!("script[type='{script_type}']"))
        .map_err(js_error)?;
    let mut found = Vec::with_capacity(nodes.length() as usize);
    for index in 0..nodes.length() {
        let Some(script) = nodes
            .get(index)
            .and_then(|node| node.dyn_into::<HtmlScriptElement>().ok())
        else {
            continue;
        };
        let text = script.text().map_err(js_error)?;
        found.push((script.id(), text.trim().to_string()));
    }
    Ok(found)
}
