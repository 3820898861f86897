//! [`Gl`] over the web-sys WebGL 1 and WebGL 2 contexts.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext, WebGlBuffer, WebGlFramebuffer, WebGlProgram,
    WebGlRenderingContext as GL, WebGlShader, WebGlTexture, WebGlUniformLocation,
};

use crate::config::ContextAttributes;
use crate::error::{Error, Result};
use crate::gl::{Generation, Gl, ShaderKind, TextureFormat};

/// Either generation of a browser WebGL context.
#[derive(Clone, Debug)]
pub enum WebGl {
    V1(GL),
    V2(WebGl2RenderingContext),
}

// Both context types expose the same method names, so one body serves both.
macro_rules! with_gl {
    ($self:ident, $gl:ident => $body:expr) => {
        match $self {
            WebGl::V1($gl) => $body,
            WebGl::V2($gl) => $body,
        }
    };
}

impl WebGl {
    /// Creates a context on `canvas`, preferring WebGL 2.
    pub fn connect(canvas: &HtmlCanvasElement, attributes: &ContextAttributes) -> Result<Self> {
        let options = context_options(attributes).map_err(js_error)?;
        if let Some(context) = canvas
            .get_context_with_context_options("webgl2", &options)
            .map_err(js_error)?
        {
            let gl = context.dyn_into::<WebGl2RenderingContext>().map_err(js_error)?;
            return Ok(WebGl::V2(gl));
        }
        if let Some(context) = canvas
            .get_context_with_context_options("webgl", &options)
            .map_err(js_error)?
        {
            let gl = context.dyn_into::<GL>().map_err(js_error)?;
            return Ok(WebGl::V1(gl));
        }
        Err(Error::capability("webgl context not supported on supplied canvas element"))
    }

    /// The underlying rendering context, for JS callbacks.
    pub fn js_context(&self) -> JsValue {
        with_gl!(self, gl => JsValue::from(gl.clone()))
    }
}

fn context_options(attributes: &ContextAttributes) -> std::result::Result<js_sys::Object, JsValue> {
    let options = js_sys::Object::new();
    let set = |key: &str, value: bool| js_sys::Reflect::set(&options, &key.into(), &value.into());
    set("antialias", attributes.antialias)?;
    set("depth", attributes.depth)?;
    set("alpha", attributes.alpha)?;
    set("premultipliedAlpha", attributes.premultiplied_alpha)?;
    set("preserveDrawingBuffer", attributes.preserve_drawing_buffer)?;
    Ok(options)
}

pub(crate) fn js_error(value: JsValue) -> Error {
    Error::capability(
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}")),
    )
}

impl Gl for WebGl {
    type Texture = WebGlTexture;
    type Framebuffer = WebGlFramebuffer;
    type Buffer = WebGlBuffer;
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type UniformLocation = WebGlUniformLocation;

    fn generation(&self) -> Generation {
        match self {
            WebGl::V1(_) => Generation::WebGl1,
            WebGl::V2(_) => Generation::WebGl2,
        }
    }

    fn enable_extension(&self, name: &str) -> bool {
        with_gl!(self, gl => matches!(gl.get_extension(name), Ok(Some(_))))
    }

    fn create_buffer(&self) -> Option<WebGlBuffer> {
        with_gl!(self, gl => gl.create_buffer())
    }

    fn delete_buffer(&self, buffer: &WebGlBuffer) {
        with_gl!(self, gl => gl.delete_buffer(Some(buffer)))
    }

    fn bind_array_buffer(&self, buffer: Option<&WebGlBuffer>) {
        with_gl!(self, gl => gl.bind_buffer(GL::ARRAY_BUFFER, buffer))
    }

    fn array_buffer_data(&self, data: &[f32]) {
        let array = js_sys::Float32Array::from(data);
        with_gl!(self, gl => gl.buffer_data_with_array_buffer_view(
            GL::ARRAY_BUFFER,
            &array,
            GL::STATIC_DRAW,
        ))
    }

    fn compile_shader(&self, kind: ShaderKind, source: &str) -> std::result::Result<WebGlShader, String> {
        let kind = match kind {
            ShaderKind::Vertex => GL::VERTEX_SHADER,
            ShaderKind::Fragment => GL::FRAGMENT_SHADER,
        };
        with_gl!(self, gl => {
            let shader = gl
                .create_shader(kind)
                .ok_or_else(|| "cannot create shader".to_string())?;
            gl.shader_source(&shader, source);
            gl.compile_shader(&shader);
            if gl
                .get_shader_parameter(&shader, GL::COMPILE_STATUS)
                .as_bool()
                .unwrap_or(false)
            {
                Ok(shader)
            } else {
                let info = gl.get_shader_info_log(&shader).unwrap_or_default();
                gl.delete_shader(Some(&shader));
                Err(info)
            }
        })
    }

    fn delete_shader(&self, shader: &WebGlShader) {
        with_gl!(self, gl => gl.delete_shader(Some(shader)))
    }

    fn link_program(
        &self,
        vertex: &WebGlShader,
        fragment: &WebGlShader,
    ) -> std::result::Result<WebGlProgram, String> {
        with_gl!(self, gl => {
            let program = gl
                .create_program()
                .ok_or_else(|| "cannot create program".to_string())?;
            gl.attach_shader(&program, vertex);
            gl.attach_shader(&program, fragment);
            gl.link_program(&program);
            if gl
                .get_program_parameter(&program, GL::LINK_STATUS)
                .as_bool()
                .unwrap_or(false)
            {
                Ok(program)
            } else {
                let info = gl.get_program_info_log(&program).unwrap_or_default();
                gl.delete_program(Some(&program));
                Err(info)
            }
        })
    }

    fn delete_program(&self, program: &WebGlProgram) {
        with_gl!(self, gl => gl.delete_program(Some(program)))
    }

    fn use_program(&self, program: Option<&WebGlProgram>) {
        with_gl!(self, gl => gl.use_program(program))
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> Option<u32> {
        let location = with_gl!(self, gl => gl.get_attrib_location(program, name));
        u32::try_from(location).ok()
    }

    fn active_uniforms(&self, program: &WebGlProgram) -> Vec<String> {
        with_gl!(self, gl => {
            let count = gl
                .get_program_parameter(program, GL::ACTIVE_UNIFORMS)
                .as_f64()
                .unwrap_or(0.0) as u32;
            (0..count)
                .filter_map(|index| gl.get_active_uniform(program, index))
                .map(|info| info.name())
                .collect()
        })
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        with_gl!(self, gl => gl.get_uniform_location(program, name))
    }

    fn uniform1f(&self, location: &WebGlUniformLocation, x: f32) {
        with_gl!(self, gl => gl.uniform1f(Some(location), x))
    }

    fn uniform2f(&self, location: &WebGlUniformLocation, x: f32, y: f32) {
        with_gl!(self, gl => gl.uniform2f(Some(location), x, y))
    }

    fn uniform3f(&self, location: &WebGlUniformLocation, x: f32, y: f32, z: f32) {
        with_gl!(self, gl => gl.uniform3f(Some(location), x, y, z))
    }

    fn uniform4f(&self, location: &WebGlUniformLocation, x: f32, y: f32, z: f32, w: f32) {
        with_gl!(self, gl => gl.uniform4f(Some(location), x, y, z, w))
    }

    fn uniform1i(&self, location: &WebGlUniformLocation, x: i32) {
        with_gl!(self, gl => gl.uniform1i(Some(location), x))
    }

    fn create_texture(&self) -> Option<WebGlTexture> {
        with_gl!(self, gl => gl.create_texture())
    }

    fn delete_texture(&self, texture: &WebGlTexture) {
        with_gl!(self, gl => gl.delete_texture(Some(texture)))
    }

    fn bind_texture(&self, unit: u32, texture: Option<&WebGlTexture>) {
        with_gl!(self, gl => {
            gl.active_texture(GL::TEXTURE0 + unit);
            gl.bind_texture(GL::TEXTURE_2D, texture);
        })
    }

    fn tex_image_2d(&self, format: TextureFormat, width: i32, height: i32) -> std::result::Result<(), String> {
        let allocated = with_gl!(self, gl => gl
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                GL::TEXTURE_2D,
                0,
                format.internal_format as i32,
                width,
                height,
                0,
                format.format,
                format.data_type,
                None,
            ));
        allocated.map_err(|e| format!("{e:?}"))
    }

    fn tex_parameter(&self, name: u32, value: i32) {
        with_gl!(self, gl => gl.tex_parameteri(GL::TEXTURE_2D, name, value))
    }

    fn create_framebuffer(&self) -> Option<WebGlFramebuffer> {
        with_gl!(self, gl => gl.create_framebuffer())
    }

    fn delete_framebuffer(&self, framebuffer: &WebGlFramebuffer) {
        with_gl!(self, gl => gl.delete_framebuffer(Some(framebuffer)))
    }

    fn bind_framebuffer(&self, framebuffer: Option<&WebGlFramebuffer>) {
        with_gl!(self, gl => gl.bind_framebuffer(GL::FRAMEBUFFER, framebuffer))
    }

    fn attach_color_texture(&self, texture: Option<&WebGlTexture>) {
        with_gl!(self, gl => gl.framebuffer_texture_2d(
            GL::FRAMEBUFFER,
            GL::COLOR_ATTACHMENT0,
            GL::TEXTURE_2D,
            texture,
            0,
        ))
    }

    fn viewport(&self, width: i32, height: i32) {
        with_gl!(self, gl => gl.viewport(0, 0, width, height))
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        with_gl!(self, gl => gl.enable_vertex_attrib_array(location))
    }

    fn disable_vertex_attrib_array(&self, location: u32) {
        with_gl!(self, gl => gl.disable_vertex_attrib_array(location))
    }

    fn vertex_attrib_pointer(&self, location: u32, components: i32) {
        with_gl!(self, gl => gl.vertex_attrib_pointer_with_i32(
            location,
            components,
            GL::FLOAT,
            false,
            0,
            0,
        ))
    }

    fn draw_triangle_strip(&self, count: i32) {
        with_gl!(self, gl => gl.draw_arrays(GL::TRIANGLE_STRIP, 0, count))
    }
}
