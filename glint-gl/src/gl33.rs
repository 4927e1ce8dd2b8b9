//! OpenGL 3.3 backend.
//!
//! This module implements an OpenGL 3.3 backend for glint. The backend type is [`GL33`].

mod query;
mod shader;
mod state;

pub use self::shader::{Program, Stage};
pub use self::state::{GLState, StateQueryError};
use std::cell::RefCell;
use std::rc::Rc;

/// An OpenGL 3.3 backend.
///
/// This type is to be used as a glint backend type. It implements the whole backend API.
#[derive(Debug)]
pub struct GL33 {
  pub(crate) state: Rc<RefCell<GLState>>,
}

impl GL33 {
  /// Create a new OpenGL 3.3 backend.
  ///
  /// An OpenGL context must be current on the calling thread and its functions loaded. Only one
  /// backend can exist per thread.
  pub fn new() -> Result<Self, StateQueryError> {
    GLState::new().map(|state| GL33 {
      state: Rc::new(RefCell::new(state)),
    })
  }

  /// Internal access to the backend state.
  ///
  /// # Unsafety
  ///
  /// This method is **highly unsafe** as it exposes the internals of the backend. Playing with it
  /// should be done with extreme caution.
  pub unsafe fn state(&self) -> &Rc<RefCell<GLState>> {
    &self.state
  }

  /// Set the viewport of the default framebuffer.
  pub fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
    unsafe {
      self
        .state
        .borrow_mut()
        .set_viewport([x, y, width as i32, height as i32])
    };
  }

  /// Set the color the color buffer gets cleared with.
  pub fn set_clear_color(&mut self, color: [f32; 4]) {
    unsafe { self.state.borrow_mut().set_clear_color(color) };
  }

  /// Clear the color buffer of the default framebuffer.
  pub fn clear_color_buffer(&mut self) {
    unsafe { gl::Clear(gl::COLOR_BUFFER_BIT) };
  }

  /// Make `unit` the active texture unit.
  pub fn set_texture_unit(&mut self, unit: u32) {
    unsafe { self.state.borrow_mut().set_texture_unit(unit) };
  }

  /// Bind a 2D texture to the active texture unit. `0` unbinds.
  pub fn bind_texture_2d(&mut self, handle: u32) {
    unsafe { gl::BindTexture(gl::TEXTURE_2D, handle) };
  }

  /// Bind a vertex array. `0` unbinds.
  pub fn bind_vertex_array(&mut self, handle: u32) {
    unsafe { gl::BindVertexArray(handle) };
  }
}
