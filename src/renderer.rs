//! Pass orchestration: setup, resize detection and the per-frame tick.

use crate::buffer::{DoubleBuffer, TextureInitializer};
use crate::canvas::{self, Canvas};
use crate::config::{Config, ContextAttributes, ErrorHook, Hooks, ShaderConfig};
use crate::device::GlDevice;
use crate::error::{Error, Result};
use crate::gl::Gl;
use crate::program::{Program, Target};
use crate::registry::{self, ShaderRegistry};
use crate::uniform::{BufferSide, TextureSource};

/// State shared by all passes of one `shade` session.
///
/// Uniform setters and hooks receive it to read the canvas size, time and
/// frame counter, and to bind feedback buffers as sampler inputs.
pub struct RenderContext<G: Gl> {
    device: GlDevice<G>,
    buffers: Vec<(String, DoubleBuffer<G>)>,
    width: u32,
    height: u32,
    css_size: Option<(f64, f64)>,
    pixel_ratio: f64,
    time: f64,
    frame: u32,
    texture_units: u32,
    current: Target,
}

impl<G: Gl> RenderContext<G> {
    fn new(device: GlDevice<G>) -> Self {
        Self {
            device,
            buffers: Vec::new(),
            width: 0,
            height: 0,
            css_size: None,
            pixel_ratio: 1.0,
            time: 0.0,
            frame: 0,
            texture_units: 0,
            current: Target::Screen,
        }
    }

    pub fn gl(&self) -> &G {
        self.device.gl()
    }

    pub fn device(&self) -> &GlDevice<G> {
        &self.device
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn min_dimension(&self) -> u32 {
        self.width.min(self.height)
    }

    pub fn css_size(&self) -> (f64, f64) {
        self.css_size.unwrap_or((0.0, 0.0))
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Seconds since the first frame. Never decreases.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Frames completed since the last resize.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Maps a CSS-pixel pointer position (top-left origin) to device pixels
    /// with GL's bottom-left origin.
    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.pixel_ratio, self.height as f64 - y * self.pixel_ratio)
    }

    /// Feedback buffer of pass `id`, absent for the last pass.
    pub fn buffer(&self, id: &str) -> Option<&DoubleBuffer<G>> {
        self.buffer_index(id).map(|i| &self.buffers[i].1)
    }

    pub fn buffer_ids(&self) -> impl Iterator<Item = &str> {
        self.buffers.iter().map(|(id, _)| id.as_str())
    }

    fn buffer_index(&self, id: &str) -> Option<usize> {
        self.buffers.iter().position(|(name, _)| name == id)
    }

    /// Binds `source` to the next free texture unit and points the sampler
    /// at `location` to it. Returns the unit used.
    pub fn texture(
        &mut self,
        location: &G::UniformLocation,
        source: TextureSource<'_, G::Texture>,
    ) -> Result<u32> {
        let unit = self.texture_units;
        let texture = match source {
            TextureSource::Raw(texture) => texture,
            TextureSource::Buffered(id, side) => self.buffered_texture(id, side)?,
        };
        self.device.gl().bind_texture(unit, Some(texture));
        self.device.gl().uniform1i(location, unit as i32);
        self.texture_units += 1;
        Ok(unit)
    }

    fn buffered_texture(&self, id: &str, side: BufferSide) -> Result<&G::Texture> {
        let index = self.buffer_index(id).ok_or_else(|| {
            Error::config(format!("no feedback buffer \"{id}\", the last shader is not buffered"))
        })?;
        if side == BufferSide::Output && self.current == Target::Feedback(index) {
            return Err(Error::config(format!(
                "shader \"{id}\" cannot sample the texture it renders into"
            )));
        }
        let buffer = &self.buffers[index].1;
        let texture = match side {
            BufferSide::Input => buffer.input(),
            BufferSide::Output => buffer.output(),
        };
        texture.ok_or_else(|| Error::config(format!("feedback buffer \"{id}\" is not initialized")))
    }

    fn add_buffer(&mut self, id: &str, initializer: Option<TextureInitializer<G>>) -> Result<usize> {
        let buffer = DoubleBuffer::new(&self.device, initializer)?;
        self.buffers.push((id.to_string(), buffer));
        Ok(self.buffers.len() - 1)
    }

    pub(crate) fn begin_pass(&mut self, target: Target) {
        self.current = target;
    }

    pub(crate) fn draw(&mut self, target: Target, vertex: u32) {
        let device = &self.device;
        match target {
            Target::Feedback(index) => {
                let buffer = &mut self.buffers[index].1;
                buffer.draw(device.gl(), || device.draw_quad(vertex));
                buffer.swap();
            }
            Target::Screen => {
                device.gl().bind_framebuffer(None);
                device.draw_quad(vertex);
            }
        }
    }

    /// Unbinds the texture units used by the pass and resets the counter.
    pub(crate) fn end_pass(&mut self) {
        for unit in 0..self.texture_units {
            self.device.gl().bind_texture(unit, None);
        }
        self.texture_units = 0;
        self.current = Target::Screen;
    }

    fn resize(&mut self, css: (f64, f64), ratio: f64) -> Result<()> {
        let (width, height) = canvas::device_size(css, ratio);
        log::debug!("canvas resized to {css:?} CSS px, {width}x{height} device px");
        self.css_size = Some(css);
        self.pixel_ratio = ratio;
        self.width = width;
        self.height = height;
        self.frame = 0;
        self.device.update_viewport(width, height);
        for (_, buffer) in &mut self.buffers {
            buffer.init(&self.device, width, height)?;
        }
        Ok(())
    }

    fn release(&mut self) {
        for (_, buffer) in &mut self.buffers {
            buffer.release(self.device.gl());
        }
        self.buffers.clear();
        self.device.release();
    }
}

/// A running set of passes bound to one canvas.
pub struct Renderer<G: Gl, C: Canvas> {
    canvas: C,
    context: RenderContext<G>,
    programs: Vec<Program<G>>,
    hooks: Hooks<G, C>,
    start: Option<f64>,
}

impl<G: Gl, C: Canvas> Renderer<G, C> {
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn context(&self) -> &RenderContext<G> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut RenderContext<G> {
        &mut self.context
    }

    pub fn programs(&self) -> &[Program<G>] {
        &self.programs
    }

    /// Forced initial resize, then `on_init` and the initial `on_resize`.
    fn start(&mut self) -> Result<()> {
        self.resize(true)?;
        if let Some(hook) = self.hooks.on_init.as_mut() {
            hook(&mut self.context);
        }
        self.notify_resize();
        Ok(())
    }

    /// Reallocates buffers when the CSS size or the pixel ratio changed.
    /// Returns whether a resize happened.
    fn resize(&mut self, force: bool) -> Result<bool> {
        let css = self.canvas.client_size();
        let ratio = self.canvas.device_pixel_ratio();
        if !force && self.context.css_size == Some(css) && self.context.pixel_ratio == ratio {
            return Ok(false);
        }
        self.context.resize(css, ratio)?;
        self.canvas.set_buffer_size(self.context.width, self.context.height);
        Ok(true)
    }

    fn notify_resize(&mut self) {
        if let Some(hook) = self.hooks.on_resize.as_mut() {
            hook(self.context.width, self.context.height, &mut self.context);
        }
    }

    /// Renders one frame. `now` is a timestamp in seconds from a monotonic
    /// host clock, such as the `requestAnimationFrame` argument.
    pub fn tick(&mut self, now: f64) -> Result<()> {
        let start = *self.start.get_or_insert(now);
        self.context.time = (now - start).max(self.context.time);

        if self.resize(false)? {
            self.notify_resize();
        }
        if let Some(hook) = self.hooks.on_before_frame.as_mut() {
            hook(&mut self.context);
        }
        for program in &mut self.programs {
            program.render(&mut self.context)?;
        }
        self.context.frame += 1;
        if let Some(hook) = self.hooks.on_after_frame.as_mut() {
            hook(&mut self.context);
        }
        Ok(())
    }

    pub fn fail(&mut self, error: Error) -> Result<()> {
        route(self.hooks.on_error.as_mut(), error, &self.canvas)
    }

    pub fn release(&mut self) {
        let gl = self.context.device.gl();
        for program in &self.programs {
            program.release(gl);
        }
        self.programs.clear();
        self.context.release();
    }
}

/// Logs capability errors and marks the canvas with the fallback class;
/// configuration errors are returned to the caller.
pub fn default_error_handler<C: Canvas>(error: Error, canvas: &C) -> Result<()> {
    match error {
        Error::Config(_) => Err(error),
        Error::Capability(message) => {
            log::warn!("could not start shading, adding fallback class to canvas: {message}");
            canvas.mark_fallback();
            Ok(())
        }
    }
}

pub(crate) fn route<C: Canvas>(hook: Option<&mut ErrorHook<C>>, error: Error, canvas: &C) -> Result<()> {
    match hook {
        Some(hook) => hook(error, canvas),
        None => default_error_handler(error, canvas),
    }
}

fn validate<G: Gl>(shaders: &[(String, ShaderConfig<G>)]) -> Result<()> {
    if shaders.is_empty() {
        return Err(Error::config("at least one shader is required"));
    }
    for (index, (id, _)) in shaders.iter().enumerate() {
        if id.is_empty() {
            return Err(Error::config("each shader needs a non-empty id"));
        }
        if shaders[..index].iter().any(|(other, _)| other == id) {
            return Err(Error::config(format!("duplicate shader id \"{id}\"")));
        }
    }
    Ok(())
}

type Parts<G, C> = (RenderContext<G>, Vec<Program<G>>, Hooks<G, C>);

fn build<G, C, R, F>(canvas: &C, registry: &R, connect: F, config: Config<G, C>) -> Result<Parts<G, C>>
where
    G: Gl,
    C: Canvas,
    R: ShaderRegistry + ?Sized,
    F: FnOnce(&C, &ContextAttributes) -> Result<G>,
{
    let Config {
        shaders,
        attributes,
        precision,
        hooks,
    } = config;
    validate(&shaders)?;
    let sources = shaders
        .iter()
        .map(|(id, _)| registry::resolve(registry, id))
        .collect::<Result<Vec<_>>>()?;

    let device = GlDevice::new(connect(canvas, &attributes)?, precision)?;
    let mut context = RenderContext::new(device);
    let mut programs = Vec::with_capacity(shaders.len());
    if let Err(e) = add_passes(&mut context, &mut programs, shaders, sources) {
        for program in &programs {
            program.release(context.gl());
        }
        context.release();
        return Err(e);
    }
    Ok((context, programs, hooks))
}

/// Creates the feedback buffer and program of every pass, in order. On
/// failure `programs` holds the passes built so far.
fn add_passes<G: Gl>(
    context: &mut RenderContext<G>,
    programs: &mut Vec<Program<G>>,
    shaders: Vec<(String, ShaderConfig<G>)>,
    sources: Vec<(String, String)>,
) -> Result<()> {
    let last = shaders.len() - 1;
    for (index, ((id, shader), (vertex, fragment))) in shaders.into_iter().zip(sources).enumerate() {
        let ShaderConfig { texture, uniforms } = shader;
        let target = if index < last {
            Target::Feedback(context.add_buffer(&id, texture)?)
        } else {
            if texture.is_some() {
                log::warn!("shader \"{id}\" renders to the canvas, its texture initializer is unused");
            }
            Target::Screen
        };
        programs.push(Program::new(&context.device, id, &vertex, &fragment, uniforms, target)?);
    }
    Ok(())
}

/// Sets up every configured pass on `canvas` and runs the initial resize and
/// lifecycle hooks.
///
/// `connect` creates the GPU context. Any error is handed to the `on_error`
/// hook (or [`default_error_handler`]); when the handler swallows it,
/// `Ok(None)` is returned and nothing renders.
pub fn shade<G, C, R, F>(
    canvas: C,
    registry: &R,
    connect: F,
    config: Config<G, C>,
) -> Result<Option<Renderer<G, C>>>
where
    G: Gl,
    C: Canvas,
    R: ShaderRegistry + ?Sized,
    F: FnOnce(&C, &ContextAttributes) -> Result<G>,
{
    let mut config = config;
    let mut on_error = config.hooks.on_error.take();
    let (context, programs, hooks) = match build(&canvas, registry, connect, config) {
        Ok(parts) => parts,
        Err(e) => return route(on_error.as_mut(), e, &canvas).map(|()| None),
    };
    let mut renderer = Renderer {
        canvas,
        context,
        programs,
        hooks,
        start: None,
    };
    match renderer.start() {
        Ok(()) => {
            renderer.hooks.on_error = on_error;
            Ok(Some(renderer))
        }
        Err(e) => {
            renderer.release();
            route(on_error.as_mut(), e, &renderer.canvas).map(|()| None)
        }
    }
}
