//! glint demos.
//!
//! This project provides a set of small OpenGL demos driving a fragment shader over the whole
//! window. Demos are platform-agnostic on purpose: they never see window-system events, only the
//! abstract [`InputAction`]s the platform code translates those events into, and they fetch their
//! textures through [`PlatformServices`].
//!
//! # Demo architecture
//!
//! A demo is a module exposing a `LocalExample` type implementing [`Example`]. It allocates its
//! resources in [`Example::bootstrap`] and renders one frame each time [`Example::render_frame`]
//! is called. Everything that touches the driver goes through the graphics context passed to
//! those two functions.
//!
//! # Error handling
//!
//! Bootstrapping returns a [`DemoError`] so that the platform code can report it. Errors while
//! rendering a frame (a uniform the shader doesn’t have, for instance) are logged and stop the
//! demo.

pub mod camera;
pub mod clock;
pub mod heart;
pub mod quad;
pub mod recursive_donut;
pub mod shader_fractal;
pub mod texture;

use glint::context::GraphicsContext;
use glint::shader::{ProgramError, UniformError};
use glint_gl::GL33;
use glint_windowing::CursorMode;
use std::{error, fmt};

use crate::texture::TextureError;

/// Example interface.
pub trait Example: Sized {
  /// Resources the example needs the platform to provide.
  fn features() -> Features {
    Features::default()
  }

  /// Bootstrap the example.
  fn bootstrap(
    platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<Self, DemoError>;

  /// Render a frame of the example.
  ///
  /// `time` is the wall time, in seconds, since the example started.
  fn render_frame(
    self,
    time: f32,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> LoopFeedback<Self>;

  /// Cursor mode the example wants, if it cares.
  fn cursor_mode(&self) -> Option<CursorMode> {
    None
  }
}

/// A type used to pass “inputs” to examples.
#[derive(Clone, Debug, PartialEq)]
pub enum InputAction {
  /// Quit the application.
  Quit,

  /// Main action. Typically used to switch an effect on and off or to pause it.
  MainToggle,

  /// Auxiliary action. Often used to toggle smaller parts of a bigger effect.
  AuxiliaryToggle,

  /// Up direction.
  Up,

  /// Down direction.
  Down,

  /// Left direction.
  Left,

  /// Right direction.
  Right,

  /// Forward direction.
  Forward,

  /// Backward direction.
  Backward,

  /// Primary action button pressed (left mouse button).
  PrimaryPressed,

  /// Primary action button released.
  PrimaryReleased,

  /// Secondary action button pressed (right mouse button).
  SecondaryPressed,

  /// Secondary action button released.
  SecondaryReleased,

  /// The cursor moved, in window coordinates.
  CursorMoved { x: f32, y: f32 },

  /// Framebuffer size changed.
  Resized { width: u32, height: u32 },

  /// Vertical scroll.
  VScroll { amount: f32 },
}

/// Should we continue after the current frame or not?
#[derive(Clone, Debug, PartialEq)]
pub enum LoopFeedback<T> {
  /// Continue with the stepped example.
  Continue(T),

  /// Stop the example.
  Exit,
}

/// Services the platform provides to examples.
pub trait PlatformServices {
  /// Error that can happen while fetching a texture.
  type FetchError: error::Error;

  /// Fetch a texture listed in the [`Features`] of the example.
  fn fetch_texture(&mut self, name: impl AsRef<str>)
    -> Result<&image::RgbaImage, Self::FetchError>;
}

/// Resources an example wants the platform to prepare.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Features {
  textures: Vec<String>,
}

impl Features {
  /// Create a new set of features from the texture names an example wants.
  pub fn new(textures: impl IntoIterator<Item = impl Into<String>>) -> Self {
    Self {
      textures: textures.into_iter().map(Into::into).collect(),
    }
  }

  /// Names of the textures to load.
  pub fn textures(&self) -> &[String] {
    &self.textures
  }
}

/// Errors that can happen while bootstrapping a demo.
#[derive(Debug)]
pub enum DemoError {
  /// The shader program couldn’t be built.
  Program(ProgramError),

  /// A uniform couldn’t be written.
  Uniform(UniformError),

  /// A texture couldn’t be created.
  Texture(TextureError),
}

impl fmt::Display for DemoError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      DemoError::Program(ref e) => write!(f, "cannot create shader program: {}", e),
      DemoError::Uniform(ref e) => write!(f, "cannot set uniform: {}", e),
      DemoError::Texture(ref e) => write!(f, "cannot create texture: {}", e),
    }
  }
}

impl error::Error for DemoError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      DemoError::Program(e) => Some(e),
      DemoError::Uniform(e) => Some(e),
      DemoError::Texture(e) => Some(e),
    }
  }
}

impl From<ProgramError> for DemoError {
  fn from(e: ProgramError) -> Self {
    DemoError::Program(e)
  }
}

impl From<UniformError> for DemoError {
  fn from(e: UniformError) -> Self {
    DemoError::Uniform(e)
  }
}

impl From<TextureError> for DemoError {
  fn from(e: TextureError) -> Self {
    DemoError::Texture(e)
  }
}

/// Color the window is cleared with before each frame.
pub const CLEAR_COLOR: [f32; 4] = [0.2, 0.3, 0.3, 1.];

// shared by every demo: clear the whole back buffer
fn clear_frame(context: &mut impl GraphicsContext<Backend = GL33>) {
  let backend = context.backend();
  backend.set_clear_color(CLEAR_COLOR);
  backend.clear_color_buffer();
}

/// Log the driver information.
pub fn log_driver_info(context: &mut impl GraphicsContext<Backend = GL33>) {
  let info = context.driver_info();

  for (label, value) in info.entries().iter() {
    log::info!("driver {}: {}", label, value.unwrap_or("unknown"));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn features_list_textures() {
    let features = Features::new(["palette.png"]);
    assert_eq!(features.textures(), ["palette.png".to_owned()]);
    assert!(Features::default().textures().is_empty());
  }

  #[test]
  fn demo_errors_chain_their_source() {
    use std::error::Error as _;

    let e = DemoError::from(UniformError::unknown("iTime"));

    assert_eq!(e.to_string(), "cannot set uniform: unknown uniform iTime");
    assert!(e.source().is_some());
  }
}
