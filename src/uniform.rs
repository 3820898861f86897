//! Uniform setters and the built-in uniforms every pass can declare.

use crate::error::Result;
use crate::gl::Gl;
use crate::renderer::RenderContext;

/// Resolution of the canvas in device pixels, `vec2`.
pub const RESOLUTION: &str = "R";
/// Seconds elapsed since the first frame, `float`.
pub const TIME: &str = "T";
/// Frames drawn since the last resize, `int`.
pub const FRAME: &str = "F";
/// Smaller of the two canvas dimensions, `float`.
pub const MIN_DIMENSION: &str = "D";

pub const BUILTIN_UNIFORMS: [&str; 4] = [RESOLUTION, TIME, FRAME, MIN_DIMENSION];

/// Called once per frame, with the pass's program bound, to set one uniform.
pub type UniformSetter<G> =
    Box<dyn FnMut(&mut RenderContext<G>, &<G as Gl>::UniformLocation) -> Result<()>>;

/// Which texture of a feedback buffer to sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BufferSide {
    /// Latest completed output of the pass.
    #[default]
    Input,
    /// The older texture, next to be overwritten. Cannot be sampled by the
    /// pass that owns the buffer.
    Output,
}

/// Texture bound to a sampler uniform.
#[derive(Debug)]
pub enum TextureSource<'a, T> {
    Raw(&'a T),
    Buffered(&'a str, BufferSide),
}

impl<'a, T> TextureSource<'a, T> {
    /// Latest output of the feedback pass `pass_id`.
    pub fn buffer(pass_id: &'a str) -> Self {
        TextureSource::Buffered(pass_id, BufferSide::Input)
    }
}

/// A uniform resolved against a compiled program.
pub struct UniformBinding<G: Gl> {
    pub(crate) name: String,
    pub(crate) location: G::UniformLocation,
    pub(crate) setter: UniformSetter<G>,
}

impl<G: Gl> std::fmt::Debug for UniformBinding<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniformBinding").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<G: Gl> UniformBinding<G> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn apply(&mut self, context: &mut RenderContext<G>) -> Result<()> {
        (self.setter)(context, &self.location)
    }
}

/// Default setter for a built-in uniform name.
pub(crate) fn builtin<G: Gl>(name: &str) -> Option<UniformSetter<G>> {
    let setter: UniformSetter<G> = match name {
        RESOLUTION => Box::new(|ctx, location| {
            ctx.gl().uniform2f(location, ctx.width() as f32, ctx.height() as f32);
            Ok(())
        }),
        TIME => Box::new(|ctx, location| {
            ctx.gl().uniform1f(location, ctx.time() as f32);
            Ok(())
        }),
        FRAME => Box::new(|ctx, location| {
            ctx.gl().uniform1i(location, ctx.frame() as i32);
            Ok(())
        }),
        MIN_DIMENSION => Box::new(|ctx, location| {
            ctx.gl().uniform1f(location, ctx.min_dimension() as f32);
            Ok(())
        }),
        _ => return None,
    };
    Some(setter)
}

/// Strips the `[0]` suffix drivers report for array uniforms.
pub(crate) fn base_name(name: &str) -> &str {
    name.strip_suffix("[0]").unwrap_or(name)
}
