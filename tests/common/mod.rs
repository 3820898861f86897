//! Recording GPU and canvas doubles for host tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use shade_wasm::{Canvas, ContextAttributes, Error, Generation, Gl, ShaderKind, TextureFormat};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    UseProgram(Option<u32>),
    BindFramebuffer(Option<u32>),
    AttachColor(Option<u32>),
    BindTexture { unit: u32, texture: Option<u32> },
    TexImage { format: TextureFormat, width: i32, height: i32 },
    TexParameter(u32, i32),
    DeleteTexture(u32),
    DeleteFramebuffer(u32),
    DeleteProgram(u32),
    Uniform1f(String, f32),
    Uniform2f(String, f32, f32),
    Uniform1i(String, i32),
    Viewport(i32, i32),
    Draw,
}

pub type Log = Rc<RefCell<Vec<Call>>>;

/// GL double: handles are integers, uniform locations are uniform names.
///
/// A linked program reports every `uniform` declared in its sources as
/// active, minus the names listed in `stripped`.
pub struct MockGl {
    pub generation: Generation,
    pub extensions: HashSet<String>,
    pub stripped: HashSet<String>,
    pub log: Log,
    framebuffer_budget: Cell<Option<u32>>,
    next: Cell<u32>,
    shaders: RefCell<HashMap<u32, String>>,
    programs: RefCell<HashMap<u32, Vec<String>>>,
}

impl MockGl {
    pub fn new(generation: Generation, extensions: &[&str]) -> Self {
        Self {
            generation,
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            stripped: HashSet::new(),
            log: Rc::default(),
            framebuffer_budget: Cell::new(None),
            next: Cell::new(1),
            shaders: RefCell::default(),
            programs: RefCell::default(),
        }
    }

    pub fn webgl2() -> Self {
        Self::new(Generation::WebGl2, &["EXT_color_buffer_float"])
    }

    pub fn webgl1() -> Self {
        Self::new(
            Generation::WebGl1,
            &["OES_texture_half_float", "OES_texture_half_float_linear"],
        )
    }

    pub fn stripping(mut self, uniform: &str) -> Self {
        self.stripped.insert(uniform.to_string());
        self
    }

    /// Fails framebuffer creation once `count` framebuffers were handed out.
    pub fn with_framebuffer_budget(self, count: u32) -> Self {
        self.framebuffer_budget.set(Some(count));
        self
    }

    fn id(&self) -> u32 {
        let id = self.next.get();
        self.next.set(id + 1);
        id
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

fn declared_uniforms(source: &str) -> Vec<String> {
    source
        .split(';')
        .filter_map(|statement| {
            // uniform [precision] type name
            let words: Vec<&str> = statement.split_whitespace().collect();
            let start = words.iter().position(|w| *w == "uniform")?;
            let name = words[start + 1..].last()?;
            Some(match name.split_once('[') {
                Some((base, _)) => format!("{base}[0]"),
                None => name.to_string(),
            })
        })
        .collect()
}

impl Gl for MockGl {
    type Texture = u32;
    type Framebuffer = u32;
    type Buffer = u32;
    type Shader = u32;
    type Program = u32;
    type UniformLocation = String;

    fn generation(&self) -> Generation {
        self.generation
    }

    fn enable_extension(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    fn create_buffer(&self) -> Option<u32> {
        Some(self.id())
    }

    fn delete_buffer(&self, _buffer: &u32) {}

    fn bind_array_buffer(&self, _buffer: Option<&u32>) {}

    fn array_buffer_data(&self, data: &[f32]) {
        assert_eq!(data.len(), 8, "quad has four 2D vertices");
    }

    fn compile_shader(&self, kind: ShaderKind, source: &str) -> Result<u32, String> {
        if source.contains("#error") {
            return Err(format!("ERROR: 0:2: '#error' : {} failure", kind.label()));
        }
        let id = self.id();
        self.shaders.borrow_mut().insert(id, source.to_string());
        Ok(id)
    }

    fn delete_shader(&self, _shader: &u32) {}

    fn link_program(&self, vertex: &u32, fragment: &u32) -> Result<u32, String> {
        let shaders = self.shaders.borrow();
        let mut uniforms = Vec::new();
        for shader in [vertex, fragment] {
            for name in declared_uniforms(&shaders[shader]) {
                if !self.stripped.contains(&name) && !uniforms.contains(&name) {
                    uniforms.push(name);
                }
            }
        }
        let id = self.id();
        self.programs.borrow_mut().insert(id, uniforms);
        Ok(id)
    }

    fn delete_program(&self, program: &u32) {
        self.record(Call::DeleteProgram(*program));
    }

    fn use_program(&self, program: Option<&u32>) {
        self.record(Call::UseProgram(program.copied()));
    }

    fn attrib_location(&self, _program: &u32, name: &str) -> Option<u32> {
        (name == "V").then_some(0)
    }

    fn active_uniforms(&self, program: &u32) -> Vec<String> {
        self.programs.borrow()[program].clone()
    }

    fn uniform_location(&self, program: &u32, name: &str) -> Option<String> {
        self.programs.borrow()[program]
            .iter()
            .any(|u| u.strip_suffix("[0]").unwrap_or(u) == name)
            .then(|| name.to_string())
    }

    fn uniform1f(&self, location: &String, x: f32) {
        self.record(Call::Uniform1f(location.clone(), x));
    }

    fn uniform2f(&self, location: &String, x: f32, y: f32) {
        self.record(Call::Uniform2f(location.clone(), x, y));
    }

    fn uniform3f(&self, _location: &String, _x: f32, _y: f32, _z: f32) {}

    fn uniform4f(&self, _location: &String, _x: f32, _y: f32, _z: f32, _w: f32) {}

    fn uniform1i(&self, location: &String, x: i32) {
        self.record(Call::Uniform1i(location.clone(), x));
    }

    fn create_texture(&self) -> Option<u32> {
        Some(self.id())
    }

    fn delete_texture(&self, texture: &u32) {
        self.record(Call::DeleteTexture(*texture));
    }

    fn bind_texture(&self, unit: u32, texture: Option<&u32>) {
        self.record(Call::BindTexture { unit, texture: texture.copied() });
    }

    fn tex_image_2d(&self, format: TextureFormat, width: i32, height: i32) -> Result<(), String> {
        self.record(Call::TexImage { format, width, height });
        Ok(())
    }

    fn tex_parameter(&self, name: u32, value: i32) {
        self.record(Call::TexParameter(name, value));
    }

    fn create_framebuffer(&self) -> Option<u32> {
        match self.framebuffer_budget.get() {
            Some(0) => return None,
            Some(left) => self.framebuffer_budget.set(Some(left - 1)),
            None => {}
        }
        Some(self.id())
    }

    fn delete_framebuffer(&self, framebuffer: &u32) {
        self.record(Call::DeleteFramebuffer(*framebuffer));
    }

    fn bind_framebuffer(&self, framebuffer: Option<&u32>) {
        self.record(Call::BindFramebuffer(framebuffer.copied()));
    }

    fn attach_color_texture(&self, texture: Option<&u32>) {
        self.record(Call::AttachColor(texture.copied()));
    }

    fn viewport(&self, width: i32, height: i32) {
        self.record(Call::Viewport(width, height));
    }

    fn enable_vertex_attrib_array(&self, _location: u32) {}

    fn disable_vertex_attrib_array(&self, _location: u32) {}

    fn vertex_attrib_pointer(&self, _location: u32, components: i32) {
        assert_eq!(components, 2);
    }

    fn draw_triangle_strip(&self, count: i32) {
        assert_eq!(count, 4);
        self.record(Call::Draw);
    }
}

/// Canvas double; clones share state so tests can resize after handing
/// the canvas to the renderer.
#[derive(Clone)]
pub struct MockCanvas {
    pub size: Rc<Cell<(f64, f64)>>,
    pub ratio: Rc<Cell<f64>>,
    pub buffer_size: Rc<Cell<(u32, u32)>>,
    pub classes: Rc<RefCell<Vec<String>>>,
}

impl MockCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Rc::new(Cell::new((width, height))),
            ratio: Rc::new(Cell::new(1.0)),
            buffer_size: Rc::default(),
            classes: Rc::default(),
        }
    }

    pub fn with_ratio(self, ratio: f64) -> Self {
        self.ratio.set(ratio);
        self
    }
}

impl Canvas for MockCanvas {
    fn client_size(&self) -> (f64, f64) {
        self.size.get()
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.ratio.get()
    }

    fn set_buffer_size(&self, width: u32, height: u32) {
        self.buffer_size.set((width, height));
    }

    fn mark_fallback(&self) {
        self.classes.borrow_mut().push(shade_wasm::FALLBACK_CLASS.to_string());
    }
}

/// Connector handing out `gl` and keeping its call log.
pub fn connect(gl: MockGl) -> (Log, impl FnOnce(&MockCanvas, &ContextAttributes) -> Result<MockGl, Error>) {
    let log = gl.log.clone();
    (log, move |_: &MockCanvas, _: &ContextAttributes| Ok(gl))
}

pub const PLAIN: &str = "precision mediump float;\nvoid main(){gl_FragColor=vec4(1.);}";

/// Fragment shader declaring the given uniforms.
pub fn fragment(uniforms: &[&str]) -> String {
    let mut source = String::from("precision mediump float;\n");
    for uniform in uniforms {
        source.push_str(uniform);
        source.push('\n');
    }
    source.push_str("void main(){gl_FragColor=vec4(1.);}");
    source
}
