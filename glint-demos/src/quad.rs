//! A quad covering the whole viewport.
//!
//! Every demo renders its effect in a fragment shader run over this quad. The vertex shader is
//! expected to read the positions from the attribute at location 0, as a `vec3`.

use gl::types::*;
use glint::context::GraphicsContext;
use glint_gl::GL33;
use std::mem;
use std::os::raw::c_void;
use std::ptr;

/// Attribute location of the corner positions.
pub const POSITION_ATTRIB: GLuint = 0;

/// Corners, in clip space.
pub const VERTICES: [[f32; 3]; 4] = [
  [1., 1., 0.],   // top right
  [1., -1., 0.],  // bottom right
  [-1., -1., 0.], // bottom left
  [-1., 1., 0.],  // top left
];

/// Two triangles sharing the top-right / bottom-left diagonal.
pub const INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Full-screen quad.
///
/// Owns a vertex array, its vertex buffer and its index buffer; all three are deleted on drop.
#[derive(Debug)]
pub struct FullscreenQuad {
  vao: GLuint,
  vbo: GLuint,
  ebo: GLuint,
}

impl FullscreenQuad {
  pub fn new(context: &mut impl GraphicsContext<Backend = GL33>) -> Self {
    let gl33 = context.backend();
    let mut vao: GLuint = 0;
    let mut buffers: [GLuint; 2] = [0; 2];

    unsafe {
      gl::GenVertexArrays(1, &mut vao);
      gl::GenBuffers(2, buffers.as_mut_ptr());
    }

    let [vbo, ebo] = buffers;

    // the element buffer binding is recorded in the vertex array, so bind it first
    gl33.bind_vertex_array(vao);

    unsafe {
      gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
      gl::BufferData(
        gl::ARRAY_BUFFER,
        mem::size_of_val(&VERTICES) as GLsizeiptr,
        VERTICES.as_ptr() as *const c_void,
        gl::STATIC_DRAW,
      );

      gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
      gl::BufferData(
        gl::ELEMENT_ARRAY_BUFFER,
        mem::size_of_val(&INDICES) as GLsizeiptr,
        INDICES.as_ptr() as *const c_void,
        gl::STATIC_DRAW,
      );

      gl::VertexAttribPointer(
        POSITION_ATTRIB,
        3,
        gl::FLOAT,
        gl::FALSE,
        mem::size_of::<[f32; 3]>() as GLsizei,
        ptr::null(),
      );
      gl::EnableVertexAttribArray(POSITION_ATTRIB);
    }

    gl33.bind_vertex_array(0);
    unsafe { gl::BindBuffer(gl::ARRAY_BUFFER, 0) };

    FullscreenQuad { vao, vbo, ebo }
  }

  /// Draw the quad with whatever program is active.
  pub fn draw(&self, context: &mut impl GraphicsContext<Backend = GL33>) {
    let gl33 = context.backend();
    gl33.bind_vertex_array(self.vao);

    unsafe {
      gl::DrawElements(
        gl::TRIANGLES,
        INDICES.len() as GLsizei,
        gl::UNSIGNED_INT,
        ptr::null(),
      );
    }

    gl33.bind_vertex_array(0);
  }
}

impl Drop for FullscreenQuad {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteVertexArrays(1, &self.vao);
      gl::DeleteBuffers(2, [self.vbo, self.ebo].as_ptr());
    }
  }
}
