//! Startup configuration: ordered passes, context options and hooks.

use crate::buffer::TextureInitializer;
use crate::capability::FeedbackPrecision;
use crate::error::Result;
use crate::gl::Gl;
use crate::renderer::RenderContext;
use crate::uniform::{TextureSource, UniformSetter};

pub type InitHook<G> = Box<dyn FnMut(&mut RenderContext<G>)>;
pub type ResizeHook<G> = Box<dyn FnMut(u32, u32, &mut RenderContext<G>)>;
pub type FrameHook<G> = Box<dyn FnMut(&mut RenderContext<G>)>;
/// Receives setup and frame errors. Returning `Err` propagates the error to
/// the caller, returning `Ok` swallows it.
pub type ErrorHook<C> = Box<dyn FnMut(crate::Error, &C) -> Result<()>>;

/// WebGL context creation attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContextAttributes {
    pub antialias: bool,
    pub depth: bool,
    pub alpha: bool,
    pub premultiplied_alpha: bool,
    pub preserve_drawing_buffer: bool,
}

/// Per-pass options.
pub struct ShaderConfig<G: Gl> {
    pub(crate) texture: Option<TextureInitializer<G>>,
    pub(crate) uniforms: Vec<(String, UniformSetter<G>)>,
}

impl<G: Gl> Default for ShaderConfig<G> {
    fn default() -> Self {
        Self {
            texture: None,
            uniforms: Vec::new(),
        }
    }
}

impl<G: Gl> ShaderConfig<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets uniform `name` with `setter` on every frame. Replaces an earlier
    /// setter of the same name, including the built-in ones.
    pub fn uniform<F>(mut self, name: impl Into<String>, setter: F) -> Self
    where
        F: FnMut(&mut RenderContext<G>, &G::UniformLocation) -> Result<()> + 'static,
    {
        let name = name.into();
        self.uniforms.retain(|(n, _)| *n != name);
        self.uniforms.push((name, Box::new(setter)));
        self
    }

    /// Binds the latest output of feedback pass `pass_id` to sampler `name`.
    pub fn sampler(self, name: impl Into<String>, pass_id: impl Into<String>) -> Self {
        let pass_id = pass_id.into();
        self.uniform(name, move |ctx, location| {
            ctx.texture(location, TextureSource::buffer(&pass_id))
                .map(|_| ())
        })
    }

    /// Customizes feedback textures of this pass, e.g. wrapping or filtering.
    /// Ignored on the last pass, which has no feedback buffer.
    pub fn texture<F>(mut self, initializer: F) -> Self
    where
        F: Fn(&G) + 'static,
    {
        self.texture = Some(Box::new(initializer));
        self
    }
}

pub struct Hooks<G: Gl, C> {
    pub(crate) on_init: Option<InitHook<G>>,
    pub(crate) on_resize: Option<ResizeHook<G>>,
    pub(crate) on_before_frame: Option<FrameHook<G>>,
    pub(crate) on_after_frame: Option<FrameHook<G>>,
    pub(crate) on_error: Option<ErrorHook<C>>,
}

impl<G: Gl, C> Default for Hooks<G, C> {
    fn default() -> Self {
        Self {
            on_init: None,
            on_resize: None,
            on_before_frame: None,
            on_after_frame: None,
            on_error: None,
        }
    }
}

/// Everything [`shade`](crate::shade) needs besides the canvas and sources.
///
/// Passes run in the order they are added. All but the last render into a
/// feedback buffer; the last renders to the canvas.
pub struct Config<G: Gl, C> {
    pub(crate) shaders: Vec<(String, ShaderConfig<G>)>,
    pub(crate) attributes: ContextAttributes,
    pub(crate) precision: FeedbackPrecision,
    pub(crate) hooks: Hooks<G, C>,
}

impl<G: Gl, C> Default for Config<G, C> {
    fn default() -> Self {
        Self {
            shaders: Vec::new(),
            attributes: ContextAttributes::default(),
            precision: FeedbackPrecision::default(),
            hooks: Hooks::default(),
        }
    }
}

impl<G: Gl, C> Config<G, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pass. Duplicate ids are rejected by `shade`.
    pub fn shader(mut self, id: impl Into<String>, shader: ShaderConfig<G>) -> Self {
        self.shaders.push((id.into(), shader));
        self
    }

    pub fn attributes(mut self, attributes: ContextAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn precision(mut self, precision: FeedbackPrecision) -> Self {
        self.precision = precision;
        self
    }

    pub fn on_init(mut self, hook: impl FnMut(&mut RenderContext<G>) + 'static) -> Self {
        self.hooks.on_init = Some(Box::new(hook));
        self
    }

    pub fn on_resize(mut self, hook: impl FnMut(u32, u32, &mut RenderContext<G>) + 'static) -> Self {
        self.hooks.on_resize = Some(Box::new(hook));
        self
    }

    pub fn on_before_frame(mut self, hook: impl FnMut(&mut RenderContext<G>) + 'static) -> Self {
        self.hooks.on_before_frame = Some(Box::new(hook));
        self
    }

    pub fn on_after_frame(mut self, hook: impl FnMut(&mut RenderContext<G>) + 'static) -> Self {
        self.hooks.on_after_frame = Some(Box::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl FnMut(crate::Error, &C) -> Result<()> + 'static) -> Self {
        self.hooks.on_error = Some(Box::new(hook));
        self
    }

    pub fn shader_ids(&self) -> impl Iterator<Item = &str> {
        self.shaders.iter().map(|(id, _)| id.as_str())
    }

    pub fn has_shaders(&self) -> bool {
        !self.shaders.is_empty()
    }
}
