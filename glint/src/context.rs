//! Graphics context.
//!
//! A graphics context is an object that abstracts all the low-level operations that happen on a
//! graphics device (it can be a GPU or a software implementation, for instance).
//!
//! This crate doesn’t provide you with creating such contexts. Instead, you must do it yourself
//! or rely on crates doing it for you (`glint-glfw`, for instance).
//!
//! # On context and threads
//!
//! This crate is designed to work with the following principles:
//!
//!   - An object which type implements `GraphicsContext` must be `!Send` and `!Sync`. This enforces
//!     that it cannot be moved nor shared between threads.
//!   - You can only create a single context per thread. Backends are expected to refuse creating a
//!     second state on the same thread.
//!   - Every operation of this crate takes the context explicitly, so the thread owning the driver
//!     is the only one able to compile, link, activate or write uniforms.

use crate::backend::query::Query as QueryBackend;
use crate::backend::shader::Shader;
use crate::query::DriverInfo;
use crate::shader::{Program, ProgramError};

/// Class of graphics context.
///
/// Such a context must not be Send nor Sync, which means that you cannot share it between
/// threads in any way (move / borrow).
pub unsafe trait GraphicsContext: Sized {
  /// Backend type.
  type Backend: ?Sized;

  /// Access the underlying backend.
  fn backend(&mut self) -> &mut Self::Backend;

  /// Compile and link a new shader program from vertex and fragment sources.
  ///
  /// This is a shortcut for [`Program::from_strings`].
  fn new_shader_program<V, F>(
    &mut self,
    vertex: V,
    fragment: F,
  ) -> Result<Program<Self::Backend>, ProgramError>
  where
    Self::Backend: Shader,
    V: AsRef<str>,
    F: AsRef<str>,
  {
    Program::from_strings(self, vertex, fragment)
  }

  /// Ask the driver to describe itself.
  fn driver_info(&mut self) -> DriverInfo
  where
    Self::Backend: QueryBackend,
  {
    self.backend().driver_info()
  }
}
