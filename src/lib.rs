//! Full-window animated backgrounds from GLSL fragment shaders.
//!
//! A session runs an ordered list of shader passes once per animation frame.
//! Every pass but the last renders into a ping-pong [`DoubleBuffer`] that any
//! pass can sample, which enables stateful effects across frames; the last
//! pass renders to the visible canvas.
//!
//! The portable core works against the [`Gl`] and [`Canvas`] traits. The
//! browser binding lives in `wasm` and is only compiled for `wasm32`.

#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

pub mod buffer;
pub mod canvas;
pub mod capability;
pub mod config;
pub mod device;
pub mod error;
pub mod gl;
pub mod program;
pub mod registry;
pub mod renderer;
pub mod uniform;

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use buffer::{DoubleBuffer, TextureInitializer};
pub use canvas::{Canvas, FALLBACK_CLASS};
pub use capability::{FeedbackPrecision, TextureStrategy};
pub use config::{Config, ContextAttributes, ShaderConfig};
pub use device::GlDevice;
pub use error::{Error, Result};
pub use gl::{Generation, Gl, ShaderKind, TextureFormat};
pub use program::{Program, Target};
pub use registry::{ShaderRegistry, Sources};
pub use renderer::{default_error_handler, shade, RenderContext, Renderer};
pub use uniform::{BufferSide, TextureSource, UniformSetter};
