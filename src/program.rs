//! One compiled shader pass and how it renders.

use crate::device::{GlDevice, VERTEX_ATTRIBUTE};
use crate::error::{Error, Result};
use crate::gl::Gl;
use crate::renderer::RenderContext;
use crate::uniform::{UniformBinding, UniformSetter};

/// Where a pass draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// Index of the pass's feedback buffer in the render context.
    Feedback(usize),
    /// The visible canvas. Only the last pass draws here.
    Screen,
}

pub struct Program<G: Gl> {
    id: String,
    program: G::Program,
    vertex: u32,
    uniforms: Vec<UniformBinding<G>>,
    target: Target,
}

impl<G: Gl> Program<G> {
    pub fn new(
        device: &GlDevice<G>,
        id: String,
        vertex_source: &str,
        fragment_source: &str,
        uniforms: Vec<(String, UniformSetter<G>)>,
        target: Target,
    ) -> Result<Self> {
        let program = device.compile_program(&id, vertex_source, fragment_source)?;
        let vertex = match device.gl().attrib_location(&program, VERTEX_ATTRIBUTE) {
            Some(location) => location,
            None => {
                device.gl().delete_program(&program);
                return Err(Error::config(format!(
                    "shader \"{id}\": vertex shader must use attribute \"{VERTEX_ATTRIBUTE}\""
                )));
            }
        };
        let uniforms = match device.bind_uniforms(&id, &program, uniforms) {
            Ok(uniforms) => uniforms,
            Err(e) => {
                device.gl().delete_program(&program);
                return Err(e);
            }
        };
        Ok(Self {
            id,
            program,
            vertex,
            uniforms,
            target,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Names of the uniforms set on every render, in driver order.
    pub fn uniform_names(&self) -> impl Iterator<Item = &str> {
        self.uniforms.iter().map(|u| u.name())
    }

    /// Binds the program, runs the uniform setters and draws the quad into
    /// this pass's target. Texture units used by the setters are unbound
    /// before returning, even when a setter fails.
    pub fn render(&mut self, context: &mut RenderContext<G>) -> Result<()> {
        context.gl().use_program(Some(&self.program));
        context.begin_pass(self.target);
        let result = self.set_uniforms(context);
        if result.is_ok() {
            context.draw(self.target, self.vertex);
        }
        context.end_pass();
        result
    }

    fn set_uniforms(&mut self, context: &mut RenderContext<G>) -> Result<()> {
        for uniform in &mut self.uniforms {
            uniform.apply(context)?;
        }
        Ok(())
    }

    pub fn release(&self, gl: &G) {
        gl.delete_program(&self.program);
    }
}
