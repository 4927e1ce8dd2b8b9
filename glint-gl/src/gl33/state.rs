//! Graphics state.

use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::ffi::CStr;
use std::fmt;
use std::marker::PhantomData;

// TLS synchronization barrier for `GLState`.
thread_local!(static TLS_ACQUIRE_GFX_STATE: RefCell<Option<()>> = RefCell::new(Some(())));

/// Cached value.
///
/// A cached value is used to prevent issuing costy GPU commands if we know the target value is
/// already set to what the command tries to set. For instance, if you ask to use the program `34`
/// once, that value will be set on the GPU and cached on our side. Later, if nothing else changed
/// the current program, asking to use `34` again is a no-op GPU-wise.
#[derive(Debug)]
struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  fn new(initial: T) -> Self {
    Cached(Some(initial))
  }

  /// Explicitly invalidate a value.
  ///
  /// This is necessary when we want to be able to force a GPU command to run.
  fn invalidate(&mut self) {
    self.0 = None;
  }

  fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  /// A non-cached value is always invalid. A cached one is invalid if it differs from `new_val`.
  fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(ref t) => t != new_val,
      _ => true,
    }
  }

  fn is(&self, val: &T) -> bool {
    self.0.as_ref() == Some(val)
  }

  /// Cache `value` and tell whether the GPU command must be issued.
  fn update(&mut self, value: T) -> bool {
    if self.is_invalid(&value) {
      self.set(value);
      true
    } else {
      false
    }
  }

  /// Invalidate the value if it’s `val`.
  fn forget(&mut self, val: &T) {
    if self.is(val) {
      self.invalidate();
    }
  }
}

/// The graphics state.
///
/// This type represents the current state of a given graphics context. It acts as a forward-gate
/// to the driver but adds a small cache layer over it to prevent from issuing the same API call
/// (with the same parameters) twice.
#[derive(Debug)]
pub struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  // viewport
  viewport: Cached<[GLint; 4]>,

  // clear buffers
  clear_color: Cached<[GLfloat; 4]>,

  // shader program
  current_program: Cached<GLuint>,

  // texture unit
  texture_unit: Cached<GLenum>,

  // driver information, fetched lazily
  vendor_name: Option<String>,
  renderer_name: Option<String>,
  gl_version: Option<String>,
  glsl_version: Option<String>,
}

impl GLState {
  /// Create a new `GLState`.
  ///
  /// > Note: keep in mind you can create only one per thread.
  pub(crate) fn new() -> Result<Self, StateQueryError> {
    TLS_ACQUIRE_GFX_STATE.with(|rc| {
      let mut inner = rc.borrow_mut();

      match *inner {
        Some(_) => {
          inner.take();
          Self::get_from_context()
        }

        None => Err(StateQueryError::UnavailableGLState),
      }
    })
  }

  fn get_from_context() -> Result<Self, StateQueryError> {
    unsafe {
      let viewport = Cached::new(get_ctx_viewport()?);
      let clear_color = Cached::new(get_ctx_clear_color()?);
      let current_program = Cached::new(get_ctx_current_program()?);
      let texture_unit = Cached::new(get_ctx_texture_unit()?);

      Ok(GLState {
        _a: PhantomData,
        viewport,
        clear_color,
        current_program,
        texture_unit,
        vendor_name: None,
        renderer_name: None,
        gl_version: None,
        glsl_version: None,
      })
    }
  }

  /// Invalidate the currently in-use shader program.
  ///
  /// Call this after binding a program behind glint’s back (a raw `glUseProgram`, for instance);
  /// otherwise activating the program glint thinks is still bound does nothing.
  pub fn invalidate_shader_program(&mut self) {
    self.current_program.invalidate();
  }

  /// Invalidate the currently in-use viewport.
  pub fn invalidate_viewport(&mut self) {
    self.viewport.invalidate()
  }

  /// Invalidate the currently in-use clear color.
  pub fn invalidate_clear_color(&mut self) {
    self.clear_color.invalidate()
  }

  /// Invalidate the currently active texture unit.
  pub fn invalidate_texture_unit(&mut self) {
    self.texture_unit.invalidate()
  }

  pub(crate) unsafe fn set_viewport(&mut self, viewport: [GLint; 4]) {
    if self.viewport.update(viewport) {
      gl::Viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
    }
  }

  pub(crate) unsafe fn set_clear_color(&mut self, clear_color: [GLfloat; 4]) {
    if self.clear_color.update(clear_color) {
      gl::ClearColor(
        clear_color[0],
        clear_color[1],
        clear_color[2],
        clear_color[3],
      );
    }
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.current_program.update(handle) {
      gl::UseProgram(handle);
    }
  }

  // the driver may hand out the name of a deleted program again
  pub(crate) fn forget_program(&mut self, handle: GLuint) {
    self.current_program.forget(&handle);
  }

  pub(crate) unsafe fn set_texture_unit(&mut self, unit: GLenum) {
    if self.texture_unit.update(unit) {
      gl::ActiveTexture(gl::TEXTURE0 + unit);
    }
  }

  pub(crate) fn get_vendor_name(&mut self) -> Option<String> {
    get_string_cached(&mut self.vendor_name, gl::VENDOR)
  }

  pub(crate) fn get_renderer_name(&mut self) -> Option<String> {
    get_string_cached(&mut self.renderer_name, gl::RENDERER)
  }

  pub(crate) fn get_gl_version(&mut self) -> Option<String> {
    get_string_cached(&mut self.gl_version, gl::VERSION)
  }

  pub(crate) fn get_glsl_version(&mut self) -> Option<String> {
    get_string_cached(&mut self.glsl_version, gl::SHADING_LANGUAGE_VERSION)
  }
}

fn get_string_cached(cache: &mut Option<String>, name: GLenum) -> Option<String> {
  if cache.is_none() {
    *cache = unsafe { get_ctx_string(name) };
  }

  cache.clone()
}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Debug)]
pub enum StateQueryError {
  /// The [`GLState`] object is unavailable.
  ///
  /// That might occur if the current thread doesn’t support allocating a new graphics state. It
  /// might happen if you try to have more than one state on the same thread, for instance.
  UnavailableGLState,

  /// The active texture unit reported by the driver isn’t a texture unit.
  UnknownTextureUnit(GLint),
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StateQueryError::UnavailableGLState => write!(f, "unavailable graphics state"),
      StateQueryError::UnknownTextureUnit(unit) => write!(f, "unknown texture unit: {}", unit),
    }
  }
}

impl error::Error for StateQueryError {}

unsafe fn get_ctx_viewport() -> Result<[GLint; 4], StateQueryError> {
  let mut data = [0; 4];
  gl::GetIntegerv(gl::VIEWPORT, data.as_mut_ptr());
  Ok(data)
}

unsafe fn get_ctx_clear_color() -> Result<[GLfloat; 4], StateQueryError> {
  let mut data = [0.; 4];
  gl::GetFloatv(gl::COLOR_CLEAR_VALUE, data.as_mut_ptr());
  Ok(data)
}

unsafe fn get_ctx_current_program() -> Result<GLuint, StateQueryError> {
  let mut used = 0 as GLint;
  gl::GetIntegerv(gl::CURRENT_PROGRAM, &mut used);
  Ok(used as GLuint)
}

unsafe fn get_ctx_texture_unit() -> Result<GLenum, StateQueryError> {
  let mut active_texture = gl::TEXTURE0 as GLint;
  gl::GetIntegerv(gl::ACTIVE_TEXTURE, &mut active_texture);

  match (active_texture as GLenum).checked_sub(gl::TEXTURE0) {
    Some(unit) => Ok(unit),
    None => Err(StateQueryError::UnknownTextureUnit(active_texture)),
  }
}

unsafe fn get_ctx_string(name: GLenum) -> Option<String> {
  let ptr = gl::GetString(name);

  if ptr.is_null() {
    None
  } else {
    let s = CStr::from_ptr(ptr as *const _);
    Some(s.to_string_lossy().into_owned())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cached_values_skip_identical_writes() {
    let mut program = Cached::new(3);

    assert!(!program.is_invalid(&3));
    assert!(program.is_invalid(&4));

    program.set(4);
    assert!(program.is(&4));
    assert!(!program.is_invalid(&4));
  }

  #[test]
  fn invalidated_values_always_write() {
    let mut viewport = Cached::new([0, 0, 800, 600]);
    viewport.invalidate();

    assert!(viewport.is_invalid(&[0, 0, 800, 600]));
    assert!(!viewport.is(&[0, 0, 800, 600]));
  }

  #[test]
  fn programs_are_bound_once() {
    let mut program = Cached::new(0);

    assert!(program.update(3));
    assert!(!program.update(3));
    assert!(program.update(4));
    assert!(program.update(3));
  }

  #[test]
  fn outside_binding_needs_an_invalidation() {
    let mut program = Cached::new(0);
    program.update(3);

    // a raw glUseProgram(0) went unnoticed: the cache still thinks 3 is bound
    assert!(!program.update(3));

    program.invalidate();
    assert!(program.update(3));
  }

  #[test]
  fn deleted_program_handle_is_bound_again() {
    let mut program = Cached::new(0);
    program.update(3);

    // 3 was deleted and the driver recycled the name for a new program
    program.forget(&3);
    assert!(program.update(3));
  }

  #[test]
  fn deleting_another_program_keeps_the_cache() {
    let mut program = Cached::new(0);
    program.update(3);

    program.forget(&4);
    assert!(!program.update(3));
  }

  #[test]
  fn texture_units_are_switched_once() {
    let mut unit = Cached::new(0);

    assert!(!unit.update(0));
    assert!(unit.update(2));
    assert!(!unit.update(2));
  }
}
