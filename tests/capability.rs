#![cfg(not(target_arch = "wasm32"))]

mod common;

use common::MockGl;
use shade_wasm::gl::consts;
use shade_wasm::{Error, FeedbackPrecision, Generation, TextureStrategy};

#[test]
fn webgl1_uses_half_float_extension() {
    let strategy = TextureStrategy::detect(&MockGl::webgl1(), FeedbackPrecision::Full).unwrap();
    assert_eq!(strategy, TextureStrategy::HalfFloatExtension);
    let format = strategy.format();
    assert_eq!(format.internal_format, consts::RGBA);
    assert_eq!(format.data_type, consts::HALF_FLOAT_OES);
    assert_eq!(strategy.filter(), consts::LINEAR);
}

#[test]
fn webgl1_without_half_float_fails() {
    let gl = MockGl::new(Generation::WebGl1, &["OES_texture_half_float_linear"]);
    let err = TextureStrategy::detect(&gl, FeedbackPrecision::Half).unwrap_err();
    assert_eq!(
        err,
        Error::Capability("OES_texture_half_float extension is not supported".into())
    );
}

#[test]
fn webgl1_without_linear_half_float_fails() {
    let gl = MockGl::new(Generation::WebGl1, &["OES_texture_half_float"]);
    let err = TextureStrategy::detect(&gl, FeedbackPrecision::Half).unwrap_err();
    assert!(err.is_capability());
    assert!(err.to_string().contains("OES_texture_half_float_linear"));
}

#[test]
fn webgl2_requires_color_buffer_float() {
    let gl = MockGl::new(Generation::WebGl2, &[]);
    let err = TextureStrategy::detect(&gl, FeedbackPrecision::Half).unwrap_err();
    assert!(err.is_capability());
    assert!(err.to_string().contains("EXT_color_buffer_float"));
}

#[test]
fn webgl2_half_precision_is_rgba16f() {
    let strategy = TextureStrategy::detect(&MockGl::webgl2(), FeedbackPrecision::Half).unwrap();
    let format = strategy.format();
    assert_eq!(format.internal_format, consts::RGBA16F);
    assert_eq!(format.data_type, consts::HALF_FLOAT);
    assert_eq!(strategy.filter(), consts::LINEAR);
}

#[test]
fn webgl2_full_precision_filters_nearest_without_float_linear() {
    let strategy = TextureStrategy::detect(&MockGl::webgl2(), FeedbackPrecision::Full).unwrap();
    assert_eq!(strategy.format().internal_format, consts::RGBA32F);
    assert_eq!(strategy.format().data_type, consts::FLOAT);
    assert_eq!(strategy.filter(), consts::NEAREST);
}

#[test]
fn webgl2_full_precision_uses_float_linear_when_present() {
    let gl = MockGl::new(
        Generation::WebGl2,
        &["EXT_color_buffer_float", "OES_texture_float_linear"],
    );
    let strategy = TextureStrategy::detect(&gl, FeedbackPrecision::Full).unwrap();
    assert_eq!(strategy.filter(), consts::LINEAR);
}
