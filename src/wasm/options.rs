//! Configuration object passed to the JS entry points.
//!
//! ```js
//! shade({
//!   canvas: document.getElementById("bg"),   // optional
//!   precision: "half",                        // or "full"
//!   fallback: true,                           // false rethrows every error
//!   shaders: {
//!     sim:   { uniforms: { mouse: (gl, loc, ctx) => gl.uniform2f(loc, x, y), prev: "sim" },
//!              texture: gl => gl.texParameteri(gl.TEXTURE_2D, gl.TEXTURE_WRAP_S, gl.REPEAT) },
//!     final: { uniforms: { S: "sim" } },
//!   },
//!   onInit: ctx => {},
//!   onResize: (width, height, ctx) => {},
//!   onBeforeFrame: ctx => {},
//!   onAfterFrame: ctx => {},                  // alias: onFrameComplete
//!   onError: (error, canvas) => {},           // throw to rethrow
//! });
//! ```
//!
//! A string uniform value names the feedback pass sampled into it. `ctx` is
//! a snapshot with `width`, `height`, `minDimension`, `pixelRatio`, `time`
//! and `frame`.

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCanvasElement, WebGlUniformLocation};

use super::dom;
use super::gl::{js_error, WebGl};
use super::WebConfig;
use crate::capability::FeedbackPrecision;
use crate::config::ShaderConfig;
use crate::error::{Error, Result};
use crate::renderer::RenderContext;

/// Reads the canvas and configuration from `value`.
///
/// `undefined` and `null` give the defaults. A bare canvas element is
/// accepted in place of an options object.
pub fn parse(value: &JsValue) -> Result<(Option<HtmlCanvasElement>, WebConfig)> {
    if value.is_undefined() || value.is_null() {
        return Ok((None, WebConfig::new()));
    }
    if let Some(canvas) = value.dyn_ref::<HtmlCanvasElement>() {
        return Ok((Some(canvas.clone()), WebConfig::new()));
    }
    if !value.is_object() {
        return Err(Error::config("config must be an object"));
    }

    let canvas = field(value, "canvas")?.map(dom::check_canvas).transpose()?;
    let mut config = WebConfig::new();
    if let Some(precision) = field(value, "precision")? {
        config = config.precision(parse_precision(&precision)?);
    }
    if let Some(shaders) = field(value, "shaders")? {
        for id in keys(&shaders)? {
            let shader = Reflect::get(&shaders, &JsValue::from_str(&id)).map_err(js_error)?;
            config = config.shader(id.clone(), parse_shader(&id, &shader)?);
        }
    }

    if let Some(hook) = function(value, "onInit", "onInit")? {
        config = config.on_init(move |ctx| report("onInit", call_with_context(&hook, ctx, &[])));
    }
    if let Some(hook) = function(value, "onResize", "onResize")? {
        config = config.on_resize(move |width, height, ctx| {
            let size = [JsValue::from(width), JsValue::from(height)];
            report("onResize", call_with_context(&hook, ctx, &size));
        });
    }
    if let Some(hook) = function(value, "onBeforeFrame", "onBeforeFrame")? {
        config = config.on_before_frame(move |ctx| {
            report("onBeforeFrame", call_with_context(&hook, ctx, &[]))
        });
    }
    let after = match function(value, "onAfterFrame", "onAfterFrame")? {
        Some(hook) => Some(hook),
        None => function(value, "onFrameComplete", "onFrameComplete")?,
    };
    if let Some(hook) = after {
        config = config.on_after_frame(move |ctx| {
            report("onAfterFrame", call_with_context(&hook, ctx, &[]))
        });
    }

    let fallback = match field(value, "fallback")? {
        Some(flag) => Some(
            flag.as_bool()
                .ok_or_else(|| Error::config("config.fallback must be a boolean"))?,
        ),
        None => None,
    };
    if let Some(hook) = function(value, "onError", "onError")? {
        config = config.on_error(move |error, canvas| {
            let value = JsValue::from(error.clone());
            match hook.call2(&JsValue::NULL, &value, canvas) {
                Ok(_) => Ok(()),
                Err(thrown) => {
                    log::debug!("onError rethrew: {thrown:?}");
                    Err(error)
                }
            }
        });
    } else if fallback == Some(false) {
        config = config.on_error(|error, _| Err(error));
    }
    Ok((canvas, config))
}

fn parse_precision(value: &JsValue) -> Result<FeedbackPrecision> {
    match value.as_string().as_deref() {
        Some("half") => Ok(FeedbackPrecision::Half),
        Some("full") => Ok(FeedbackPrecision::Full),
        _ => Err(Error::config("config.precision must be \"half\" or \"full\"")),
    }
}

fn parse_shader(id: &str, value: &JsValue) -> Result<ShaderConfig<WebGl>> {
    let mut shader = ShaderConfig::new();
    if !value.is_object() {
        return Err(Error::config(format!("config.shaders.{id} must be an object")));
    }
    if let Some(uniforms) = field(value, "uniforms")? {
        for name in keys(&uniforms)? {
            let setter = Reflect::get(&uniforms, &JsValue::from_str(&name)).map_err(js_error)?;
            shader = match (setter.as_string(), setter.dyn_into::<Function>()) {
                (Some(pass_id), _) => shader.sampler(name, pass_id),
                (None, Ok(function)) => {
                    let label = format!("uniform setter \"{name}\" of shader \"{id}\"");
                    shader.uniform(name, js_setter(function, label))
                }
                (None, Err(_)) => {
                    return Err(Error::config(format!(
                        "config.shaders.{id}.uniforms.{name} must be a function or a shader id"
                    )))
                }
            };
        }
    }
    if let Some(initializer) = function(value, "texture", &format!("shaders.{id}.texture"))? {
        shader = shader.texture(move |gl: &WebGl| {
            report("texture initializer", initializer.call1(&JsValue::NULL, &gl.js_context()))
        });
    }
    Ok(shader)
}

fn js_setter(
    function: Function,
    label: String,
) -> impl FnMut(&mut RenderContext<WebGl>, &WebGlUniformLocation) -> Result<()> {
    move |ctx, location| {
        let gl = ctx.gl().js_context();
        let snapshot = context_snapshot(ctx)?;
        function
            .call3(&JsValue::NULL, &gl, &JsValue::from(location.clone()), &snapshot)
            .map(|_| ())
            .map_err(|e| Error::config(format!("{label} failed: {e:?}")))
    }
}

fn call_with_context(
    function: &Function,
    ctx: &RenderContext<WebGl>,
    leading: &[JsValue],
) -> std::result::Result<JsValue, JsValue> {
    let snapshot = context_snapshot(ctx).map_err(JsValue::from)?;
    let args: js_sys::Array = leading.iter().cloned().collect();
    args.push(&snapshot);
    function.apply(&JsValue::NULL, &args)
}

fn context_snapshot(ctx: &RenderContext<WebGl>) -> Result<JsValue> {
    let snapshot = Object::new();
    for (key, value) in [
        ("width", f64::from(ctx.width())),
        ("height", f64::from(ctx.height())),
        ("minDimension", f64::from(ctx.min_dimension())),
        ("pixelRatio", ctx.pixel_ratio()),
        ("time", ctx.time()),
        ("frame", f64::from(ctx.frame())),
    ] {
        Reflect::set(&snapshot, &JsValue::from_str(key), &JsValue::from(value)).map_err(js_error)?;
    }
    Ok(snapshot.into())
}

fn report(hook: &str, result: std::result::Result<JsValue, JsValue>) {
    if let Err(e) = result {
        log::error!("{hook} failed: {e:?}");
    }
}

fn field(object: &JsValue, key: &str) -> Result<Option<JsValue>> {
    let value = Reflect::get(object, &JsValue::from_str(key)).map_err(js_error)?;
    Ok((!value.is_undefined() && !value.is_null()).then_some(value))
}

fn function(object: &JsValue, key: &str, path: &str) -> Result<Option<Function>> {
    field(object, key)?
        .map(|value| {
            value
                .dyn_into::<Function>()
                .map_err(|_| Error::config(format!("config.{path} must be a function")))
        })
        .transpose()
}

fn keys(object: &JsValue) -> Result<Vec<String>> {
    let object = object
        .dyn_ref::<Object>()
        .ok_or_else(|| Error::config("expected an object"))?;
    Ok(Object::keys(object).iter().filter_map(|key| key.as_string()).collect())
}
