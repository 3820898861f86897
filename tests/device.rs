#![cfg(not(target_arch = "wasm32"))]

mod common;

use common::{fragment, Call, MockGl, PLAIN};
use shade_wasm::registry::default_vertex_shader;
use shade_wasm::uniform::UniformSetter;
use shade_wasm::{Error, FeedbackPrecision, Generation, GlDevice};

fn device(gl: MockGl) -> GlDevice<MockGl> {
    GlDevice::new(gl, FeedbackPrecision::Half).unwrap()
}

fn noop() -> UniformSetter<MockGl> {
    Box::new(|_, _| Ok(()))
}

#[test]
fn missing_context_extension_fails_creation() {
    let result = GlDevice::new(MockGl::new(Generation::WebGl2, &[]), FeedbackPrecision::Half);
    assert!(matches!(result, Err(Error::Capability(_))));
}

#[test]
fn compile_failure_names_pass_and_numbers_source() {
    let device = device(MockGl::webgl2());
    let source = "precision mediump float;\n#error broken\nvoid main(){}";
    let err = device
        .compile_program("sim", default_vertex_shader(source), source)
        .unwrap_err();

    assert!(err.is_capability());
    let message = err.to_string();
    assert!(message.contains("fragment shader of pass \"sim\""), "{message}");
    assert!(message.contains("   2: #error broken"), "{message}");
}

#[test]
fn builtins_bind_without_configuration() {
    let device = device(MockGl::webgl2());
    let source = fragment(&["uniform vec2 R;", "uniform float T;", "uniform int F;", "uniform float D;"]);
    let program = device
        .compile_program("main", default_vertex_shader(&source), &source)
        .unwrap();
    let bindings = device.bind_uniforms("main", &program, Vec::new()).unwrap();
    let names: Vec<_> = bindings.iter().map(|b| b.name()).collect();
    assert_eq!(names, ["R", "T", "F", "D"]);
}

#[test]
fn active_uniform_without_setter_is_config_error() {
    let device = device(MockGl::webgl2());
    let source = fragment(&["uniform vec2 R;", "uniform vec2 mouse;"]);
    let program = device
        .compile_program("color", default_vertex_shader(&source), &source)
        .unwrap();
    let err = device.bind_uniforms("color", &program, Vec::new()).unwrap_err();

    assert!(err.is_config());
    let message = err.to_string();
    assert!(message.contains("\"color\""), "{message}");
    assert!(message.contains("\"mouse\""), "{message}");
}

#[test]
fn stripped_uniform_only_warns() {
    let device = device(MockGl::webgl2().stripping("unused"));
    let source = fragment(&["uniform float unused;"]);
    let program = device
        .compile_program("main", default_vertex_shader(&source), &source)
        .unwrap();
    let bindings = device
        .bind_uniforms("main", &program, vec![("unused".to_string(), noop())])
        .unwrap();
    assert!(bindings.is_empty());
}

#[test]
fn array_uniforms_match_base_name() {
    let device = device(MockGl::webgl2());
    let source = fragment(&["uniform vec2 points[4];"]);
    let program = device
        .compile_program("main", default_vertex_shader(&source), &source)
        .unwrap();
    let bindings = device
        .bind_uniforms("main", &program, vec![("points".to_string(), noop())])
        .unwrap();
    assert_eq!(bindings[0].name(), "points");
}

#[test]
fn draw_quad_issues_one_strip() {
    let device = device(MockGl::webgl2());
    let log = device.gl().log.clone();
    device.draw_quad(0);
    assert_eq!(*log.borrow(), vec![Call::Draw]);
}

#[test]
fn viewport_follows_device_pixels() {
    let device = device(MockGl::webgl1());
    let log = device.gl().log.clone();
    device.update_viewport(640, 480);
    assert_eq!(*log.borrow(), vec![Call::Viewport(640, 480)]);
}

#[test]
fn pass_through_vertex_matches_fragment_dialect() {
    assert!(default_vertex_shader(PLAIN).starts_with("attribute vec2 V;"));
    let es3 = "#version 300 es\nprecision highp float;out vec4 o;void main(){o=vec4(1);}";
    assert!(default_vertex_shader(es3).starts_with("#version 300 es\nin vec2 V;"));
}
