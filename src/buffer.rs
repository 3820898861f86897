//! Ping-pong texture pair behind one framebuffer.

use crate::device::GlDevice;
use crate::error::{Error, Result};
use crate::gl::{consts, Gl};

/// Runs while a freshly allocated feedback texture is bound, after the
/// default format, filtering and wrapping were applied.
pub type TextureInitializer<G> = Box<dyn Fn(&G)>;

/// Two textures sharing one framebuffer.
///
/// A draw always writes `output`; [`swap`](Self::swap) afterwards turns the
/// written texture into `input`, so `input` holds the latest completed frame
/// of this pass while `output` is the next write target.
pub struct DoubleBuffer<G: Gl> {
    framebuffer: G::Framebuffer,
    input: Option<G::Texture>,
    output: Option<G::Texture>,
    size: (u32, u32),
    initializer: Option<TextureInitializer<G>>,
}

impl<G: Gl> DoubleBuffer<G> {
    pub fn new(device: &GlDevice<G>, initializer: Option<TextureInitializer<G>>) -> Result<Self> {
        let framebuffer = device
            .gl()
            .create_framebuffer()
            .ok_or_else(|| Error::capability("cannot create framebuffer"))?;
        Ok(Self {
            framebuffer,
            input: None,
            output: None,
            size: (0, 0),
            initializer,
        })
    }

    /// Releases the current textures and allocates a fresh pair.
    pub fn init(&mut self, device: &GlDevice<G>, width: u32, height: u32) -> Result<()> {
        self.delete_textures(device.gl());
        self.input = Some(self.create_texture(device, width, height)?);
        self.output = Some(self.create_texture(device, width, height)?);
        self.size = (width, height);
        Ok(())
    }

    fn create_texture(&self, device: &GlDevice<G>, width: u32, height: u32) -> Result<G::Texture> {
        let gl = device.gl();
        let texture = gl
            .create_texture()
            .ok_or_else(|| Error::capability("cannot create texture"))?;
        gl.bind_texture(0, Some(&texture));
        let configured = device
            .strategy()
            .configure_feedback_texture(gl, width, height);
        if let Err(e) = configured {
            gl.bind_texture(0, None);
            gl.delete_texture(&texture);
            return Err(e);
        }
        gl.tex_parameter(consts::TEXTURE_WRAP_S, consts::CLAMP_TO_EDGE);
        gl.tex_parameter(consts::TEXTURE_WRAP_T, consts::CLAMP_TO_EDGE);
        if let Some(initializer) = &self.initializer {
            initializer(gl);
        }
        gl.bind_texture(0, None);
        Ok(texture)
    }

    /// Renders into `output` through this buffer's framebuffer.
    ///
    /// The framebuffer stays bound afterwards; the next pass binds its own
    /// target before drawing.
    pub fn draw(&self, gl: &G, draw: impl FnOnce()) {
        let Some(output) = &self.output else {
            log::warn!("feedback buffer drawn before init, skipping");
            return;
        };
        gl.bind_framebuffer(Some(&self.framebuffer));
        gl.attach_color_texture(Some(output));
        draw();
        gl.attach_color_texture(None);
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.input, &mut self.output);
    }

    pub fn input(&self) -> Option<&G::Texture> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&G::Texture> {
        self.output.as_ref()
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    fn delete_textures(&mut self, gl: &G) {
        for texture in [self.input.take(), self.output.take()].into_iter().flatten() {
            gl.delete_texture(&texture);
        }
    }

    pub fn release(&mut self, gl: &G) {
        self.delete_textures(gl);
        gl.bind_framebuffer(None);
        gl.delete_framebuffer(&self.framebuffer);
    }
}
