//! [GLFW](https://crates.io/crates/glfw) backend for glint.

#![deny(missing_docs)]

use glfw::{self, Context as _, Glfw, InitError, SwapInterval, Window, WindowEvent, WindowMode};
use glint::context::GraphicsContext;
pub use glint_gl::gl33::StateQueryError;
use glint_gl::GL33;
use glint_windowing::{CursorMode, WindowDim, WindowOpt};
use std::{convert::Infallible, error, fmt, os::raw::c_void, sync::mpsc::Receiver};

/// Error that can be risen while creating a surface.
#[non_exhaustive]
#[derive(Debug)]
pub enum GlfwSurfaceError<E> {
  /// Initialization of the surface went wrong.
  ///
  /// This variant exposes a **glfw** error for further information about what went wrong.
  InitError(InitError),

  /// Window creation failed.
  WindowCreationFailed,

  /// User error.
  UserError(E),

  /// The graphics state is not available.
  ///
  /// This error is generated when the initialization code is called on a thread on which the
  /// graphics state has already been acquired.
  GraphicsStateError(StateQueryError),
}

impl<E> fmt::Display for GlfwSurfaceError<E>
where
  E: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GlfwSurfaceError::InitError(ref e) => write!(f, "initialization error: {}", e),
      GlfwSurfaceError::WindowCreationFailed => f.write_str("failed to create window"),
      GlfwSurfaceError::UserError(ref e) => write!(f, "user error: {}", e),
      GlfwSurfaceError::GraphicsStateError(ref e) => {
        write!(f, "failed to get graphics state: {}", e)
      }
    }
  }
}

impl<E> From<InitError> for GlfwSurfaceError<E> {
  fn from(e: InitError) -> Self {
    GlfwSurfaceError::InitError(e)
  }
}

impl<E> error::Error for GlfwSurfaceError<E>
where
  E: 'static + error::Error,
{
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GlfwSurfaceError::InitError(e) => Some(e),
      GlfwSurfaceError::WindowCreationFailed => None,
      GlfwSurfaceError::UserError(e) => Some(e),
      GlfwSurfaceError::GraphicsStateError(e) => Some(e),
    }
  }
}

/// Error of [`GlfwSurface::new_gl33`], which has no user error.
pub type GlfwSurfaceGL33Error = GlfwSurfaceError<Infallible>;

/// GLFW surface.
///
/// This type is a helper that exposes two important concepts: the GLFW event receiver that you
/// can use to poll events and the [`GL33Context`], which allows you to perform the rendering part.
#[derive(Debug)]
pub struct GlfwSurface {
  /// Wrapped GLFW events queue.
  pub events_rx: Receiver<(f64, WindowEvent)>,

  /// Wrapped glint context.
  pub context: GL33Context,
}

impl GlfwSurface {
  /// Initialize GLFW to provide a glint environment, with a window created by `create_window`.
  pub fn new<E>(
    create_window: impl FnOnce(
      &mut Glfw,
    )
      -> Result<(Window, Receiver<(f64, WindowEvent)>), GlfwSurfaceError<E>>,
  ) -> Result<Self, GlfwSurfaceError<E>> {
    #[cfg(feature = "log-errors")]
    let error_cbk = glfw::LOG_ERRORS;
    #[cfg(not(feature = "log-errors"))]
    let error_cbk = glfw::FAIL_ON_ERRORS;

    let mut glfw = glfw::init(error_cbk)?;

    // OpenGL hints
    glfw.window_hint(glfw::WindowHint::OpenGlProfile(
      glfw::OpenGlProfileHint::Core,
    ));
    glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
    glfw.window_hint(glfw::WindowHint::ContextVersionMajor(3));
    glfw.window_hint(glfw::WindowHint::ContextVersionMinor(3));

    let (mut window, events_rx) = create_window(&mut glfw)?;

    // init OpenGL
    gl::load_with(|s| window.get_proc_address(s) as *const c_void);

    let gl = GL33::new().map_err(GlfwSurfaceError::GraphicsStateError)?;
    let context = GL33Context { window, gl };
    let surface = GlfwSurface { events_rx, context };

    Ok(surface)
  }

  /// Open a window with an OpenGL 3.3 core context, configured by `win_opt`.
  pub fn new_gl33(
    title: impl AsRef<str>,
    win_opt: WindowOpt,
  ) -> Result<Self, GlfwSurfaceGL33Error> {
    GlfwSurface::new(|glfw| {
      glfw.window_hint(glfw::WindowHint::Samples(win_opt.num_samples()));

      let title = title.as_ref();
      let (mut window, events) = match *win_opt.dim() {
        WindowDim::Windowed { width, height } => {
          glfw.create_window(width, height, title, WindowMode::Windowed)
        }

        WindowDim::Fullscreen => glfw.with_primary_monitor(|glfw, monitor| {
          let monitor = monitor?;
          let vmode = monitor.get_video_mode()?;
          glfw.create_window(
            vmode.width,
            vmode.height,
            title,
            WindowMode::FullScreen(monitor),
          )
        }),

        WindowDim::FullscreenRestricted { width, height } => {
          glfw.with_primary_monitor(|glfw, monitor| {
            let monitor = monitor?;
            glfw.create_window(width, height, title, WindowMode::FullScreen(monitor))
          })
        }
      }
      .ok_or(GlfwSurfaceError::WindowCreationFailed)?;

      window.make_current();
      window.set_all_polling(true);
      window.set_cursor_mode(glfw_cursor_mode(win_opt.cursor_mode()));

      if win_opt.vsync() {
        glfw.set_swap_interval(SwapInterval::Sync(1));
      } else {
        glfw.set_swap_interval(SwapInterval::None);
      }

      Ok((window, events))
    })
  }
}

fn glfw_cursor_mode(mode: CursorMode) -> glfw::CursorMode {
  match mode {
    CursorMode::Visible => glfw::CursorMode::Normal,
    CursorMode::Invisible => glfw::CursorMode::Hidden,
    CursorMode::Disabled => glfw::CursorMode::Disabled,
  }
}

/// glint OpenGL 3.3 context.
///
/// This type also re-exports the GLFW window, if you need access to it.
#[derive(Debug)]
pub struct GL33Context {
  /// Wrapped GLFW window.
  pub window: Window,

  /// OpenGL 3.3 state.
  gl: GL33,
}

impl GL33Context {
  /// Size of the framebuffer of the window, in pixels.
  pub fn framebuffer_size(&self) -> [u32; 2] {
    let (w, h) = self.window.get_framebuffer_size();
    [w.max(0) as u32, h.max(0) as u32]
  }

  /// Hide, unhide or grab the cursor.
  pub fn set_cursor_mode(&mut self, mode: CursorMode) {
    self.window.set_cursor_mode(glfw_cursor_mode(mode));
  }
}

unsafe impl GraphicsContext for GL33Context {
  type Backend = GL33;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.gl
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn assert_error<E: error::Error>(_: &E) {}

  #[test]
  fn gl33_surface_errors_are_displayable() {
    let e: GlfwSurfaceGL33Error = GlfwSurfaceError::WindowCreationFailed;

    assert_error(&e);
    assert_eq!(e.to_string(), "failed to create window");
  }

  #[test]
  fn state_errors_keep_their_source() {
    let e: GlfwSurfaceGL33Error =
      GlfwSurfaceError::GraphicsStateError(StateQueryError::UnavailableGLState);

    assert_eq!(
      e.to_string(),
      "failed to get graphics state: unavailable graphics state"
    );
    assert!(error::Error::source(&e).is_some());
  }
}
