use crate::backend::{gl::Gl, Backend};
use crate::error::Error;
use glutin::{ContextBuilder, GlProfile, GlRequest, PossiblyCurrent, WindowedContext};
use std::fmt;
use winit::{dpi, event_loop::EventLoop, window::WindowBuilder};

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub gl_version: (u8, u8),
    pub stencil_bits: u8,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            title: "triangle".to_string(),
            width: 800,
            height: 600,
            resizable: true,
            gl_version: (3, 2),
            stencil_bits: 8,
        }
    }
}

/// Something the renderer can draw into and present.
pub trait Surface {
    type Backend: Backend;

    fn backend(&self) -> &Self::Backend;
    fn present(&self) -> Result<(), Error>;
}

impl<S: Surface> Surface for &S {
    type Backend = S::Backend;

    fn backend(&self) -> &Self::Backend {
        (**self).backend()
    }

    fn present(&self) -> Result<(), Error> {
        (**self).present()
    }
}

/// A winit window with a current core-profile OpenGL context.
///
/// Must be opened on the main thread; the event loop is created here and
/// never run.
pub struct GlWindow {
    gl: Gl,
    context: WindowedContext<PossiblyCurrent>,
    _event_loop: EventLoop<()>,
}

impl GlWindow {
    pub fn open(config: &WindowConfig) -> Result<Self, Error> {
        let event_loop = event_loop()?;
        let wb = WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(dpi::Size::Logical(dpi::LogicalSize::new(
                config.width as f64,
                config.height as f64,
            )))
            .with_resizable(config.resizable);

        let context = ContextBuilder::new()
            .with_gl(GlRequest::Specific(glutin::Api::OpenGl, config.gl_version))
            .with_gl_profile(GlProfile::Core)
            .with_stencil_buffer(config.stencil_bits)
            .build_windowed(wb, &event_loop)?;
        let context = unsafe { context.make_current() }.map_err(|(_, err)| err)?;

        // glow panics on the first call into a missing entry point
        if context.get_proc_address("glCreateShader").is_null() {
            return Err(Error::Loader("glCreateShader"));
        }
        let gl = unsafe { Gl::from_loader_function(|name| context.get_proc_address(name) as *const _) };
        log::info!("OpenGL {}", gl.version());

        Ok(GlWindow {
            gl,
            context,
            _event_loop: event_loop,
        })
    }
}

#[cfg(any(
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn event_loop() -> Result<EventLoop<()>, Error> {
    use winit::platform::unix::EventLoopExtUnix;
    event_loop_with(EventLoop::<()>::new_x11)
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn event_loop() -> Result<EventLoop<()>, Error> {
    Ok(EventLoop::new())
}

/// `EventLoop::new` panics when no display server answers. With a Wayland
/// socket advertised it is left to pick the backend; otherwise X11 is
/// opened through `x11`, whose failure is returned.
#[allow(dead_code)]
fn event_loop_with<F, E>(x11: F) -> Result<EventLoop<()>, Error>
where
    F: FnOnce() -> Result<EventLoop<()>, E>,
    E: fmt::Display,
{
    if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        return Ok(EventLoop::new());
    }
    x11().map_err(|err| Error::EventLoop(err.to_string()))
}

impl Surface for GlWindow {
    type Backend = Gl;

    fn backend(&self) -> &Gl {
        &self.gl
    }

    fn present(&self) -> Result<(), Error> {
        self.context.swap_buffers()?;
        Ok(())
    }
}

#[cfg(all(
    test,
    any(
        target_os = "linux",
        target_os = "dragonfly",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd"
    )
))]
mod tests {
    use super::*;
    use winit::platform::unix::EventLoopExtUnix;

    #[test]
    fn missing_display_is_an_error() {
        std::env::remove_var("WAYLAND_DISPLAY");
        std::env::remove_var("DISPLAY");

        match event_loop_with(EventLoop::<()>::new_x11_any_thread) {
            Err(err @ Error::EventLoop(_)) => assert!(err.to_string().starts_with("event loop:")),
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("event loop opened without a display"),
        }
    }
}
