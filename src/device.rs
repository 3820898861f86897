//! GPU context wrapper: programs, the shared quad and the viewport.

use crate::capability::{FeedbackPrecision, TextureStrategy};
use crate::error::{Error, Result};
use crate::gl::{Gl, ShaderKind};
use crate::uniform::{self, UniformBinding, UniformSetter};

/// Triangle strip covering clip space.
const QUAD_POSITIONS: [f32; 8] = [-1.0, 1.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0];

/// Name of the vertex attribute receiving quad positions.
pub const VERTEX_ATTRIBUTE: &str = "V";

pub struct GlDevice<G: Gl> {
    gl: G,
    strategy: TextureStrategy,
    quad: G::Buffer,
}

impl<G: Gl> GlDevice<G> {
    /// Validates the context capabilities and uploads the full-screen quad.
    pub fn new(gl: G, precision: FeedbackPrecision) -> Result<Self> {
        let strategy = TextureStrategy::detect(&gl, precision)?;
        log::info!("using {:?} context, feedback textures: {:?}", gl.generation(), strategy);

        let quad = gl
            .create_buffer()
            .ok_or_else(|| Error::capability("cannot create vertex buffer"))?;
        gl.bind_array_buffer(Some(&quad));
        gl.array_buffer_data(&QUAD_POSITIONS);
        gl.bind_array_buffer(None);

        Ok(Self { gl, strategy, quad })
    }

    pub fn gl(&self) -> &G {
        &self.gl
    }

    pub fn strategy(&self) -> &TextureStrategy {
        &self.strategy
    }

    fn compile_shader(&self, pass: &str, kind: ShaderKind, source: &str) -> Result<G::Shader> {
        self.gl.compile_shader(kind, source).map_err(|info| {
            let listing = number_lines(source);
            log::error!("cannot compile {} shader of pass \"{pass}\": {info}\n{listing}", kind.label());
            Error::capability(format!(
                "cannot compile {} shader of pass \"{pass}\": {}\n{listing}",
                kind.label(),
                info.trim_end()
            ))
        })
    }

    /// Compiles and links the vertex and fragment source of one pass.
    pub fn compile_program(&self, pass: &str, vertex: &str, fragment: &str) -> Result<G::Program> {
        let vertex_shader = self.compile_shader(pass, ShaderKind::Vertex, vertex)?;
        let fragment_shader = match self.compile_shader(pass, ShaderKind::Fragment, fragment) {
            Ok(shader) => shader,
            Err(e) => {
                self.gl.delete_shader(&vertex_shader);
                return Err(e);
            }
        };
        let linked = self.gl.link_program(&vertex_shader, &fragment_shader);
        // Attached shaders are only flagged; they live as long as the program.
        self.gl.delete_shader(&vertex_shader);
        self.gl.delete_shader(&fragment_shader);
        linked.map_err(|info| {
            log::error!("cannot link program of pass \"{pass}\": {info}");
            Error::capability(format!("cannot link program of pass \"{pass}\": {}", info.trim_end()))
        })
    }

    /// Pairs every active uniform of `program` with a setter.
    ///
    /// Configured setters win over the built-in ones. An active uniform with
    /// no setter is a configuration error; a configured uniform the compiler
    /// dropped is only reported.
    pub fn bind_uniforms(
        &self,
        pass: &str,
        program: &G::Program,
        configured: Vec<(String, UniformSetter<G>)>,
    ) -> Result<Vec<UniformBinding<G>>> {
        let mut configured = configured;
        let mut bindings = Vec::new();
        for active in self.gl.active_uniforms(program) {
            let name = uniform::base_name(&active).to_string();
            let setter = match configured.iter().position(|(n, _)| *n == name) {
                Some(index) => configured.swap_remove(index).1,
                None => uniform::builtin(&name).ok_or_else(|| {
                    Error::config(format!(
                        "shader \"{pass}\": no setter configured for active uniform \"{name}\""
                    ))
                })?,
            };
            let location = self.gl.uniform_location(program, &name).ok_or_else(|| {
                Error::config(format!("shader \"{pass}\": cannot locate uniform \"{name}\""))
            })?;
            bindings.push(UniformBinding { name, location, setter });
        }
        for (name, _) in configured {
            log::warn!(
                "shader \"{pass}\": uniform \"{name}\" is configured but not active in the program, \
                 it may have been optimized out"
            );
        }
        Ok(bindings)
    }

    /// Draws the shared quad through the given attribute location.
    pub fn draw_quad(&self, vertex: u32) {
        let gl = &self.gl;
        gl.bind_array_buffer(Some(&self.quad));
        gl.enable_vertex_attrib_array(vertex);
        gl.vertex_attrib_pointer(vertex, 2);
        gl.draw_triangle_strip(4);
        gl.disable_vertex_attrib_array(vertex);
        gl.bind_array_buffer(None);
    }

    pub fn update_viewport(&self, width: u32, height: u32) {
        self.gl.viewport(width as i32, height as i32);
    }

    pub fn release(&self) {
        self.gl.delete_buffer(&self.quad);
    }
}

/// Prefixes every line with its 1-based number, as GLSL diagnostics refer to.
pub(crate) fn number_lines(source: &str) -> String {
    source
        .lines()
        .enumerate()
        .map(|(i, line)| format!("{:>4}: {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}
