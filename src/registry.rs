//! Shader source lookup by pass id.

use std::collections::HashMap;

use crate::error::{Error, Result};

const VERTEX_SHADER: &str = "attribute vec2 V;void main(){gl_Position=vec4(V,0,1);}";
const VERTEX_SHADER_300: &str = "#version 300 es\nin vec2 V;void main(){gl_Position=vec4(V,0,1);}";

/// Supplies shader source text keyed by pass id.
pub trait ShaderRegistry {
    fn fragment_source(&self, id: &str) -> Option<String>;

    /// Custom vertex shader; the pass-through one is used when absent.
    fn vertex_source(&self, _id: &str) -> Option<String> {
        None
    }
}

/// In-memory sources.
#[derive(Clone, Debug, Default)]
pub struct Sources {
    fragments: HashMap<String, String>,
    vertices: HashMap<String, String>,
}

impl Sources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fragment(mut self, id: impl Into<String>, source: impl AsRef<str>) -> Self {
        self.fragments.insert(id.into(), source.as_ref().trim().to_string());
        self
    }

    pub fn vertex(mut self, id: impl Into<String>, source: impl AsRef<str>) -> Self {
        self.vertices.insert(id.into(), source.as_ref().trim().to_string());
        self
    }
}

impl ShaderRegistry for Sources {
    fn fragment_source(&self, id: &str) -> Option<String> {
        self.fragments.get(id).cloned()
    }

    fn vertex_source(&self, id: &str) -> Option<String> {
        self.vertices.get(id).cloned()
    }
}

/// Pass-through vertex shader in the GLSL dialect of `fragment`.
pub fn default_vertex_shader(fragment: &str) -> &'static str {
    if fragment.trim_start().starts_with("#version 300 es") {
        VERTEX_SHADER_300
    } else {
        VERTEX_SHADER
    }
}

/// Resolves the `(vertex, fragment)` pair of a pass.
pub(crate) fn resolve<R: ShaderRegistry + ?Sized>(registry: &R, id: &str) -> Result<(String, String)> {
    let fragment = registry
        .fragment_source(id)
        .filter(|source| !source.trim().is_empty())
        .ok_or_else(|| Error::config(format!("no fragment shader source for \"{id}\"")))?;
    let vertex = registry
        .vertex_source(id)
        .unwrap_or_else(|| default_vertex_shader(&fragment).to_string());
    Ok((vertex, fragment))
}
