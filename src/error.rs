use crate::backend::ShaderStage;
use thiserror::Error;

/// Setup failures. Every variant is fatal to the bootstrap sequence.
#[derive(Debug, Error)]
pub enum Error {
    #[error("event loop: {0}")]
    EventLoop(String),
    #[error("window: {0}")]
    Window(#[from] glutin::CreationError),
    #[error("context: {0}")]
    Context(#[from] glutin::ContextError),
    #[error("loader: could not resolve {0}")]
    Loader(&'static str),
    #[error("allocation: {0}")]
    Allocation(String),
    #[error("compile: {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("link: {0}")]
    Link(String),
}
