//! Draws one hardcoded triangle into an OpenGL core-profile window and
//! presents it.
//!
//! The GPU work is written against [`backend::Backend`], so the same
//! bootstrap runs on a live context ([`window::GlWindow`]) or on the
//! instrumented `backend::recording::Recording`.

pub mod backend;
pub mod error;
pub mod renderer;
pub mod window;

pub use error::Error;
pub use renderer::Renderer;
pub use window::{GlWindow, Surface, WindowConfig};

/// Builds the triangle's GPU objects on `surface`, draws a single frame and
/// presents it. Objects are released before returning.
pub fn bootstrap<S: Surface>(surface: &S) -> Result<(), Error> {
    let renderer = Renderer::new(surface.backend())?;
    renderer.render();
    surface.present()?;
    log::info!("frame presented");
    Ok(())
}

/// Opens a surface with `open` and bootstraps it. Nothing is created on the
/// GPU unless `open` succeeds.
pub fn run_with<S, F>(config: &WindowConfig, open: F) -> Result<(), Error>
where
    S: Surface,
    F: FnOnce(&WindowConfig) -> Result<S, Error>,
{
    let surface = open(config)?;
    bootstrap(&surface)
}

pub fn run(config: &WindowConfig) -> Result<(), Error> {
    run_with(config, GlWindow::open)
}
