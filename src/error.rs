use thiserror::Error;

use crate::shader::ShaderStage;

/// A shader stage or program that could not be built. The log is the
/// diagnostic text produced by the shader front-end or the device.
#[derive(Error, Debug)]
pub enum ShaderError {
    #[error("Failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("Failed to link shader program: {log}")]
    Link { log: String },
}

/// Setup failures. Any of these aborts the process.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Failed to create the window: {0}")]
    Window(String),
    #[error("Failed to create the graphics context: {0}")]
    Context(String),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error("Invalid mesh: {0}")]
    Mesh(String),
}
