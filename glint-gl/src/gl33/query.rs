//! Driver information for OpenGL 3.3.

use crate::GL33;
use glint::backend::query::Query as QueryBackend;
use glint::query::DriverInfo;

unsafe impl QueryBackend for GL33 {
  fn driver_info(&mut self) -> DriverInfo {
    let mut state = self.state.borrow_mut();

    DriverInfo {
      vendor: state.get_vendor_name(),
      renderer: state.get_renderer_name(),
      version: state.get_gl_version(),
      shading_language_version: state.get_glsl_version(),
    }
  }
}
