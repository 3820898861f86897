//! Capability-set interface over a GPU binding.
//!
//! Everything the passes need from the graphics API goes through [`Gl`]. The
//! browser build implements it on top of web-sys (see `wasm::gl`); anything
//! else that can compile GLSL ES and render to textures can plug in here.

use std::fmt::Debug;

/// GL enum values used by backend-neutral code. Identical across WebGL 1/2.
pub mod consts {
    pub const RGBA: u32 = 0x1908;
    pub const RGBA16F: u32 = 0x881A;
    pub const RGBA32F: u32 = 0x8814;
    pub const FLOAT: u32 = 0x1406;
    pub const HALF_FLOAT: u32 = 0x140B;
    pub const HALF_FLOAT_OES: u32 = 0x8D61;

    pub const TEXTURE_MAG_FILTER: u32 = 0x2800;
    pub const TEXTURE_MIN_FILTER: u32 = 0x2801;
    pub const TEXTURE_WRAP_S: u32 = 0x2802;
    pub const TEXTURE_WRAP_T: u32 = 0x2803;
    pub const NEAREST: i32 = 0x2600;
    pub const LINEAR: i32 = 0x2601;
    pub const CLAMP_TO_EDGE: i32 = 0x812F;
}

/// WebGL API generation of a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Generation {
    WebGl1,
    WebGl2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    pub fn label(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "vertex",
            ShaderKind::Fragment => "fragment",
        }
    }
}

/// Arguments of `texImage2D` that pick the color format of a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureFormat {
    pub internal_format: u32,
    pub format: u32,
    pub data_type: u32,
}

/// GPU operations used by the renderer.
///
/// Texture operations target `TEXTURE_2D`, buffer operations target
/// `ARRAY_BUFFER` and framebuffer operations target `FRAMEBUFFER`; the
/// implementation supplies those enums.
pub trait Gl: 'static {
    type Texture: Clone + PartialEq + Debug;
    type Framebuffer;
    type Buffer;
    type Shader;
    type Program;
    type UniformLocation;

    fn generation(&self) -> Generation;

    /// Enables an extension, returning whether it is available.
    fn enable_extension(&self, name: &str) -> bool;

    fn create_buffer(&self) -> Option<Self::Buffer>;
    fn delete_buffer(&self, buffer: &Self::Buffer);
    fn bind_array_buffer(&self, buffer: Option<&Self::Buffer>);
    /// Uploads `STATIC_DRAW` vertex data into the bound array buffer.
    fn array_buffer_data(&self, data: &[f32]);

    /// Compiles a shader, returning the info log on failure.
    fn compile_shader(&self, kind: ShaderKind, source: &str)
        -> Result<Self::Shader, String>;
    fn delete_shader(&self, shader: &Self::Shader);
    /// Links a program, returning the info log on failure.
    fn link_program(&self, vertex: &Self::Shader, fragment: &Self::Shader)
        -> Result<Self::Program, String>;
    fn delete_program(&self, program: &Self::Program);
    fn use_program(&self, program: Option<&Self::Program>);

    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;
    /// Names of the uniforms the compiler kept, as reported by the driver.
    fn active_uniforms(&self, program: &Self::Program) -> Vec<String>;
    fn uniform_location(&self, program: &Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    fn uniform1f(&self, location: &Self::UniformLocation, x: f32);
    fn uniform2f(&self, location: &Self::UniformLocation, x: f32, y: f32);
    fn uniform3f(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32);
    fn uniform4f(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32);
    fn uniform1i(&self, location: &Self::UniformLocation, x: i32);

    fn create_texture(&self) -> Option<Self::Texture>;
    fn delete_texture(&self, texture: &Self::Texture);
    /// Activates texture unit `unit` and binds `texture` to it.
    fn bind_texture(&self, unit: u32, texture: Option<&Self::Texture>);
    /// Allocates storage for the bound texture, without initial pixels.
    fn tex_image_2d(&self, format: TextureFormat, width: i32, height: i32)
        -> Result<(), String>;
    fn tex_parameter(&self, name: u32, value: i32);

    fn create_framebuffer(&self) -> Option<Self::Framebuffer>;
    fn delete_framebuffer(&self, framebuffer: &Self::Framebuffer);
    /// Binds a framebuffer; `None` binds the visible canvas.
    fn bind_framebuffer(&self, framebuffer: Option<&Self::Framebuffer>);
    /// Sets `COLOR_ATTACHMENT0` of the bound framebuffer.
    fn attach_color_texture(&self, texture: Option<&Self::Texture>);

    fn viewport(&self, width: i32, height: i32);

    fn enable_vertex_attrib_array(&self, location: u32);
    fn disable_vertex_attrib_array(&self, location: u32);
    /// Float attribute with `components` per vertex, tightly packed.
    fn vertex_attrib_pointer(&self, location: u32, components: i32);
    fn draw_triangle_strip(&self, count: i32);
}
