//! Error types.
//!
//! Two kinds of failure exist. [`Error::Config`] is a programmer mistake
//! (missing shader source, duplicate pass ids, uniform without setter) and is
//! always fatal. [`Error::Capability`] means the platform cannot run the
//! shaders (no WebGL, missing extension, rejected GLSL); the default error
//! handler degrades to a CSS fallback class instead of failing the page.

use thiserror::Error;

/// Failure raised while setting up or driving the shader passes.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Invalid caller-supplied setup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Missing platform or GPU feature.
    #[error("GL capability error: {0}")]
    Capability(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn capability(message: impl Into<String>) -> Self {
        Error::Capability(message.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    pub fn is_capability(&self) -> bool {
        matches!(self, Error::Capability(_))
    }

    /// Name of the error class exposed to JavaScript callers.
    pub fn class_name(&self) -> &'static str {
        match self {
            Error::Config(_) => "ConfigError",
            Error::Capability(_) => "GlError",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
