use crate::gl33::state::GLState;
use crate::gl33::GL33;
use gl::{self, types::*};
use glint::{
  backend::shader::{Shader, Uniformable},
  shader::{
    types::{Mat22, Mat33, Mat44, Vec2, Vec3, Vec4},
    ActiveUniform, ProgramError, StageError, StageType, UniformType,
  },
};
use log::{debug, warn};
use std::{cell::RefCell, ffi::CString, ptr::null, rc::Rc};

/// A compiled OpenGL shader object.
#[derive(Debug)]
pub struct Stage {
  handle: GLuint,
  ty: StageType,
}

impl Drop for Stage {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteShader(self.handle);
    }
  }
}

impl Stage {
  /// OpenGL name of the shader object.
  pub fn handle(&self) -> GLuint {
    self.handle
  }

  /// Type of the stage.
  pub fn ty(&self) -> StageType {
    self.ty
  }
}

/// A linked OpenGL program object.
#[derive(Debug)]
pub struct Program {
  pub(crate) handle: GLuint,
  state: Rc<RefCell<GLState>>,
}

impl Drop for Program {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteProgram(self.handle);
    }

    self.state.borrow_mut().forget_program(self.handle);
  }
}

impl Program {
  /// OpenGL name of the program object.
  pub fn handle(&self) -> GLuint {
    self.handle
  }

  unsafe fn link(&self) -> Result<(), ProgramError> {
    let handle = self.handle;

    gl::LinkProgram(handle);

    let mut linked: GLint = gl::FALSE.into();
    gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

    if linked == gl::TRUE.into() {
      Ok(())
    } else {
      let mut log_len: GLint = 0;
      gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

      let mut log = vec![0u8; log_len.max(0) as usize];
      let mut written: GLsizei = 0;
      gl::GetProgramInfoLog(
        handle,
        log_len,
        &mut written,
        log.as_mut_ptr() as *mut GLchar,
      );
      log.truncate(written.max(0) as usize);

      Err(ProgramError::link_failed(info_log(log)))
    }
  }
}

unsafe impl Shader for GL33 {
  type StageRepr = Stage;

  type ProgramRepr = Program;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    let c_src = CString::new(glsl_source(src)).map_err(|e| {
      StageError::compilation_failed(
        ty,
        format!("source contains a NUL byte at offset {}", e.nul_position()),
      )
    })?;

    let handle = gl::CreateShader(opengl_shader_type(ty));

    if handle == 0 {
      return Err(StageError::compilation_failed(
        ty,
        "unable to create shader stage",
      ));
    }

    // from now on, dropping the stage deletes the shader object
    let stage = Stage { handle, ty };

    gl::ShaderSource(handle, 1, [c_src.as_ptr()].as_ptr(), null());
    gl::CompileShader(handle);

    let mut compiled: GLint = gl::FALSE.into();
    gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

    if compiled == gl::TRUE.into() {
      Ok(stage)
    } else {
      let mut log_len: GLint = 0;
      gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

      let mut log = vec![0u8; log_len.max(0) as usize];
      let mut written: GLsizei = 0;
      gl::GetShaderInfoLog(
        handle,
        log_len,
        &mut written,
        log.as_mut_ptr() as *mut GLchar,
      );
      log.truncate(written.max(0) as usize);

      Err(StageError::compilation_failed(ty, info_log(log)))
    }
  }

  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError> {
    let handle = gl::CreateProgram();

    if handle == 0 {
      return Err(ProgramError::link_failed("unable to create shader program"));
    }

    let program = Program {
      handle,
      state: self.state.clone(),
    };

    gl::AttachShader(handle, vertex.handle);
    gl::AttachShader(handle, fragment.handle);

    let linked = program.link();

    gl::DetachShader(handle, vertex.handle);
    gl::DetachShader(handle, fragment.handle);

    linked.map(move |_| program)
  }

  unsafe fn active_uniforms(&mut self, program: &Self::ProgramRepr) -> Vec<ActiveUniform> {
    let handle = program.handle;

    let mut count: GLint = 0;
    gl::GetProgramiv(handle, gl::ACTIVE_UNIFORMS, &mut count);

    let mut max_len: GLint = 0;
    gl::GetProgramiv(handle, gl::ACTIVE_UNIFORM_MAX_LENGTH, &mut max_len);

    let mut uniforms = Vec::with_capacity(count.max(0) as usize);

    for index in 0..count.max(0) as GLuint {
      let mut name = vec![0u8; max_len.max(1) as usize];
      let mut written: GLsizei = 0;
      let mut size: GLint = 0;
      let mut glty: GLenum = 0;

      gl::GetActiveUniform(
        handle,
        index,
        max_len,
        &mut written,
        &mut size,
        &mut glty,
        name.as_mut_ptr() as *mut GLchar,
      );
      name.truncate(written.max(0) as usize);
      let name = String::from_utf8_lossy(&name).into_owned();

      let ty = match uniform_type_from_gl(glty) {
        Some(ty) => ty,
        None => {
          warn!("skipping uniform {}: unsupported type 0x{:x}", name, glty);
          continue;
        }
      };

      let location = match CString::new(name.as_bytes()) {
        Ok(c_name) => gl::GetUniformLocation(handle, c_name.as_ptr() as *const GLchar),
        Err(_) => -1,
      };

      // uniform block members have no location
      if location < 0 {
        debug!("skipping uniform {}: no location", name);
        continue;
      }

      uniforms.push(ActiveUniform {
        name,
        location,
        ty,
        size: size.max(1) as usize,
      });
    }

    uniforms
  }

  unsafe fn use_program(&mut self, program: &Self::ProgramRepr) {
    self.state.borrow_mut().use_program(program.handle);
  }

  fn program_handle(program: &Self::ProgramRepr) -> u32 {
    program.handle
  }
}

fn opengl_shader_type(t: StageType) -> GLenum {
  match t {
    StageType::VertexShader => gl::VERTEX_SHADER,
    StageType::FragmentShader => gl::FRAGMENT_SHADER,
  }
}

const GLSL_PRAGMA: &str = "#version 330 core\n";

// Prepend the version directive, unless the source brings its own.
fn glsl_source(src: &str) -> String {
  if has_version_directive(src) {
    src.to_owned()
  } else {
    let mut pragma = String::from(GLSL_PRAGMA);
    pragma.push_str(src);
    pragma
  }
}

// Only whitespace and comments may come before `#version`.
fn has_version_directive(src: &str) -> bool {
  let mut rest = src;

  loop {
    rest = rest.trim_start();

    if let Some(comment) = rest.strip_prefix("//") {
      rest = comment.find('\n').map_or("", |eol| &comment[eol..]);
    } else if let Some(comment) = rest.strip_prefix("/*") {
      match comment.find("*/") {
        Some(end) => rest = &comment[end + 2..],
        None => return false,
      }
    } else {
      return rest.strip_prefix('#').map_or(false, |directive| {
        directive
          .trim_start_matches(|c: char| c == ' ' || c == '\t')
          .starts_with("version")
      });
    }
  }
}

// Info logs are NUL-terminated and not guaranteed to be UTF-8.
fn info_log(mut log: Vec<u8>) -> String {
  while log.last() == Some(&0) {
    log.pop();
  }

  String::from_utf8_lossy(&log).trim_end().to_owned()
}

fn uniform_type_from_gl(glty: GLenum) -> Option<UniformType> {
  // helper macro mapping OpenGL type enums to uniform types
  macro_rules! milkcheck {
    ($glty:expr, $( ( $v:tt, $t:tt ) ),* $(,)?) => {
      match $glty {
        $(
          gl::$t => Some(UniformType::$v),
        )*

        _ => None,
      }
    }
  }

  milkcheck!(
    glty,
    // scalars
    (Int, INT),
    (UInt, UNSIGNED_INT),
    (Float, FLOAT),
    (Bool, BOOL),
    // vectors
    (IVec2, INT_VEC2),
    (IVec3, INT_VEC3),
    (IVec4, INT_VEC4),
    (UIVec2, UNSIGNED_INT_VEC2),
    (UIVec3, UNSIGNED_INT_VEC3),
    (UIVec4, UNSIGNED_INT_VEC4),
    (Vec2, FLOAT_VEC2),
    (Vec3, FLOAT_VEC3),
    (Vec4, FLOAT_VEC4),
    (BVec2, BOOL_VEC2),
    (BVec3, BOOL_VEC3),
    (BVec4, BOOL_VEC4),
    // matrices
    (M22, FLOAT_MAT2),
    (M33, FLOAT_MAT3),
    (M44, FLOAT_MAT4),
    // textures
    (ISampler1D, INT_SAMPLER_1D),
    (ISampler2D, INT_SAMPLER_2D),
    (ISampler3D, INT_SAMPLER_3D),
    (UISampler1D, UNSIGNED_INT_SAMPLER_1D),
    (UISampler2D, UNSIGNED_INT_SAMPLER_2D),
    (UISampler3D, UNSIGNED_INT_SAMPLER_3D),
    (Sampler1D, SAMPLER_1D),
    (Sampler2D, SAMPLER_2D),
    (Sampler3D, SAMPLER_3D),
    (Sampler2DArray, SAMPLER_2D_ARRAY),
    (Cubemap, SAMPLER_CUBE),
  )
}

macro_rules! impl_Uniformable {
  (vec $t:ty, $uty:tt, $f:tt) => {
    unsafe impl Uniformable<$t> for GL33 {
      unsafe fn ty() -> UniformType {
        UniformType::$uty
      }

      unsafe fn update(&mut self, _: &mut Program, location: GLint, value: $t) {
        gl::$f(location, 1, value.as_ptr());
      }
    }
  };

  ($t:ty, $uty:tt, $f:tt) => {
    unsafe impl Uniformable<$t> for GL33 {
      unsafe fn ty() -> UniformType {
        UniformType::$uty
      }

      unsafe fn update(&mut self, _: &mut Program, location: GLint, value: $t) {
        gl::$f(location, value);
      }
    }
  };

  // matrix notation; matrices are row-major on our side
  (mat $t:ty, $uty:tt, $f:tt) => {
    unsafe impl Uniformable<$t> for GL33 {
      unsafe fn ty() -> UniformType {
        UniformType::$uty
      }

      unsafe fn update(&mut self, _: &mut Program, location: GLint, value: $t) {
        gl::$f(location, 1, gl::TRUE, value.to_row_major().as_ptr());
      }
    }
  };
}

impl_Uniformable!(i32, Int, Uniform1i);
impl_Uniformable!(vec Vec2<i32>, IVec2, Uniform2iv);
impl_Uniformable!(vec Vec3<i32>, IVec3, Uniform3iv);
impl_Uniformable!(vec Vec4<i32>, IVec4, Uniform4iv);

impl_Uniformable!(u32, UInt, Uniform1ui);
impl_Uniformable!(vec Vec2<u32>, UIVec2, Uniform2uiv);
impl_Uniformable!(vec Vec3<u32>, UIVec3, Uniform3uiv);
impl_Uniformable!(vec Vec4<u32>, UIVec4, Uniform4uiv);

impl_Uniformable!(f32, Float, Uniform1f);
impl_Uniformable!(vec Vec2<f32>, Vec2, Uniform2fv);
impl_Uniformable!(vec Vec3<f32>, Vec3, Uniform3fv);
impl_Uniformable!(vec Vec4<f32>, Vec4, Uniform4fv);

impl_Uniformable!(mat Mat22<f32>, M22, UniformMatrix2fv);
impl_Uniformable!(mat Mat33<f32>, M33, UniformMatrix3fv);
impl_Uniformable!(mat Mat44<f32>, M44, UniformMatrix4fv);

unsafe impl Uniformable<bool> for GL33 {
  unsafe fn ty() -> UniformType {
    UniformType::Bool
  }

  unsafe fn update(&mut self, _: &mut Program, location: GLint, value: bool) {
    gl::Uniform1ui(location, value as u32);
  }
}

unsafe impl Uniformable<Vec2<bool>> for GL33 {
  unsafe fn ty() -> UniformType {
    UniformType::BVec2
  }

  unsafe fn update(&mut self, _: &mut Program, location: GLint, value: Vec2<bool>) {
    let v = [value[0] as u32, value[1] as u32];
    gl::Uniform2uiv(location, 1, v.as_ptr());
  }
}

unsafe impl Uniformable<Vec3<bool>> for GL33 {
  unsafe fn ty() -> UniformType {
    UniformType::BVec3
  }

  unsafe fn update(&mut self, _: &mut Program, location: GLint, value: Vec3<bool>) {
    let v = [value[0] as u32, value[1] as u32, value[2] as u32];
    gl::Uniform3uiv(location, 1, v.as_ptr());
  }
}

unsafe impl Uniformable<Vec4<bool>> for GL33 {
  unsafe fn ty() -> UniformType {
    UniformType::BVec4
  }

  unsafe fn update(&mut self, _: &mut Program, location: GLint, value: Vec4<bool>) {
    let v = [
      value[0] as u32,
      value[1] as u32,
      value[2] as u32,
      value[3] as u32,
    ];
    gl::Uniform4uiv(location, 1, v.as_ptr());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn version_is_prepended_when_missing() {
    let src = glsl_source("void main() {}");
    assert_eq!(src, "#version 330 core\nvoid main() {}");
  }

  #[test]
  fn explicit_version_is_kept() {
    let src = "\n  #version 410 core\nvoid main() {}";
    assert_eq!(glsl_source(src), src);
  }

  #[test]
  fn version_must_come_first() {
    let src = "// #version 410 core\nvoid main() {}";
    assert!(glsl_source(src).starts_with("#version 330 core\n//"));
  }

  #[test]
  fn comments_may_precede_version() {
    let src = "// julia fractal\n#version 410 core\nvoid main() {}";
    assert_eq!(glsl_source(src), src);

    let src = "/* palette\n   lookup */ /**/\n# version 410 core\nvoid main() {}";
    assert_eq!(glsl_source(src), src);
  }

  #[test]
  fn unterminated_comment_gets_a_version() {
    let src = "/* #version 410 core\nvoid main() {}";
    assert!(glsl_source(src).starts_with("#version 330 core\n/*"));
  }

  #[test]
  fn other_directives_do_not_count() {
    let src = "#define STEPS 8\n#version 410 core\nvoid main() {}";
    assert!(glsl_source(src).starts_with("#version 330 core\n#define"));
  }

  #[test]
  fn info_log_is_trimmed() {
    let log = b"0:3(12): error: syntax error\n\0\0".to_vec();
    assert_eq!(info_log(log), "0:3(12): error: syntax error");
  }

  #[test]
  fn info_log_survives_invalid_utf8() {
    let log = vec![b'e', 0xff, b'r', 0];
    assert_eq!(info_log(log), "e\u{fffd}r");
  }

  #[test]
  fn gl_types_map_to_uniform_types() {
    assert_eq!(uniform_type_from_gl(gl::FLOAT_MAT4), Some(UniformType::M44));
    assert_eq!(uniform_type_from_gl(gl::SAMPLER_2D), Some(UniformType::Sampler2D));
    assert_eq!(uniform_type_from_gl(gl::UNSIGNED_INT_VEC3), Some(UniformType::UIVec3));
    assert_eq!(uniform_type_from_gl(gl::DOUBLE), None);
  }
}
