use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};
use web_sys::window;

use crate::canvas::Canvas;
use crate::renderer::Renderer;
use crate::wasm::gl::WebGl;

/// Stops a running animation loop.
#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct ShadeHandle {
    stopped: Rc<Cell<bool>>,
}

#[wasm_bindgen]
impl ShadeHandle {
    /// Ends the loop; GPU resources are released on the next animation frame.
    pub fn stop(&self) {
        self.stopped.set(true);
    }

    #[wasm_bindgen(getter)]
    pub fn stopped(&self) -> bool {
        self.stopped.get()
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn request_frame(callback: &FrameCallback) -> Result<i32, JsValue> {
    let callback = callback.borrow();
    let callback = callback.as_ref().ok_or("animation callback missing")?;
    window()
        .ok_or("no window")?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

/// Drives `renderer` from `requestAnimationFrame` until stopped or a frame
/// fails and the error hook does not swallow the error.
pub fn start<C: Canvas + 'static>(renderer: Renderer<WebGl, C>) -> Result<ShadeHandle, JsValue> {
    let handle = ShadeHandle::default();
    let stopped = handle.stopped.clone();

    // `f` holds the animation-frame closure so it can reschedule itself.
    // The closure keeps `f` alive in turn, so it is leaked on purpose once the
    // loop ends; dropping it from inside its own call is unsound. Only the
    // renderer and its GPU resources are released.
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    let mut renderer = Some(renderer);
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
        let Some(active) = renderer.as_mut() else {
            return;
        };
        if stopped.get() {
            active.release();
            renderer = None;
            log::info!("shading stopped");
            return;
        }
        if let Err(error) = active.tick(timestamp / 1000.0) {
            log::error!("frame failed: {error}");
            if let Err(error) = active.fail(error) {
                log::error!("shading aborted: {error}");
            }
            active.release();
            renderer = None;
            return;
        }
        if let Err(e) = request_frame(&f) {
            log::error!("cannot schedule next frame: {e:?}");
        }
    }) as Box<dyn FnMut(f64)>));

    request_frame(&g)?;
    Ok(handle)
}
