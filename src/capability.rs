//! Feedback texture format per WebGL generation.

use crate::error::{Error, Result};
use crate::gl::{consts, Generation, Gl, TextureFormat};

const HALF_FLOAT_EXT: &str = "OES_texture_half_float";
const HALF_FLOAT_LINEAR_EXT: &str = "OES_texture_half_float_linear";
const COLOR_BUFFER_FLOAT_EXT: &str = "EXT_color_buffer_float";
const FLOAT_LINEAR_EXT: &str = "OES_texture_float_linear";

/// Precision of feedback textures on WebGL 2. WebGL 1 is always half float.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeedbackPrecision {
    #[default]
    Half,
    Full,
}

/// How feedback textures are allocated on a given context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureStrategy {
    /// WebGL 1: RGBA storage with the `OES_texture_half_float` pixel type.
    HalfFloatExtension,
    /// WebGL 2: sized float formats, renderable through `EXT_color_buffer_float`.
    ColorBufferFloat {
        precision: FeedbackPrecision,
        linear: bool,
    },
}

impl TextureStrategy {
    /// Picks the strategy for `gl` and enables the extensions it relies on.
    pub fn detect<G: Gl>(gl: &G, precision: FeedbackPrecision) -> Result<Self> {
        match gl.generation() {
            Generation::WebGl1 => {
                require(gl, HALF_FLOAT_EXT)?;
                require(gl, HALF_FLOAT_LINEAR_EXT)?;
                Ok(TextureStrategy::HalfFloatExtension)
            }
            Generation::WebGl2 => {
                require(gl, COLOR_BUFFER_FLOAT_EXT)?;
                // RGBA16F filters linearly without any extension.
                let linear = match precision {
                    FeedbackPrecision::Half => true,
                    FeedbackPrecision::Full => gl.enable_extension(FLOAT_LINEAR_EXT),
                };
                if !linear {
                    log::debug!("{FLOAT_LINEAR_EXT} unavailable, feedback textures use NEAREST");
                }
                Ok(TextureStrategy::ColorBufferFloat { precision, linear })
            }
        }
    }

    pub fn format(&self) -> TextureFormat {
        match self {
            TextureStrategy::HalfFloatExtension => TextureFormat {
                internal_format: consts::RGBA,
                format: consts::RGBA,
                data_type: consts::HALF_FLOAT_OES,
            },
            TextureStrategy::ColorBufferFloat { precision: FeedbackPrecision::Half, .. } => {
                TextureFormat {
                    internal_format: consts::RGBA16F,
                    format: consts::RGBA,
                    data_type: consts::HALF_FLOAT,
                }
            }
            TextureStrategy::ColorBufferFloat { precision: FeedbackPrecision::Full, .. } => {
                TextureFormat {
                    internal_format: consts::RGBA32F,
                    format: consts::RGBA,
                    data_type: consts::FLOAT,
                }
            }
        }
    }

    pub fn filter(&self) -> i32 {
        match self {
            TextureStrategy::HalfFloatExtension => consts::LINEAR,
            TextureStrategy::ColorBufferFloat { linear: true, .. } => consts::LINEAR,
            TextureStrategy::ColorBufferFloat { linear: false, .. } => consts::NEAREST,
        }
    }

    /// Allocates storage and filtering for the currently bound texture.
    pub fn configure_feedback_texture<G: Gl>(&self, gl: &G, width: u32, height: u32) -> Result<()> {
        gl.tex_image_2d(self.format(), width as i32, height as i32)
            .map_err(|e| Error::capability(format!("cannot allocate {width}x{height} feedback texture: {e}")))?;
        let filter = self.filter();
        gl.tex_parameter(consts::TEXTURE_MIN_FILTER, filter);
        gl.tex_parameter(consts::TEXTURE_MAG_FILTER, filter);
        Ok(())
    }
}

fn require<G: Gl>(gl: &G, extension: &str) -> Result<()> {
    if gl.enable_extension(extension) {
        Ok(())
    } else {
        Err(Error::capability(format!("{extension} extension is not supported")))
    }
}
