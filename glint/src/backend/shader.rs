//! Shader backend interface.
//!
//! This interface defines the low-level API shaders must implement to be usable.

use crate::shader::{ActiveUniform, ProgramError, StageError, StageType, UniformType};

/// Shader support.
///
/// Representations own their driver object: dropping a [`Shader::StageRepr`] or a
/// [`Shader::ProgramRepr`] must release it. glint relies on this to release everything allocated
/// while a construction fails half-way.
pub unsafe trait Shader {
  /// Backend representation of a shader stage.
  type StageRepr;

  /// Backend representation of a linked program.
  type ProgramRepr;

  /// Compile a new shader stage.
  ///
  /// On failure, the driver object allocated for the stage (if any) must already be released and
  /// the error must carry the driver diagnostic.
  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError>;

  /// Link a vertex and a fragment stage into a new program.
  ///
  /// Stages must be detached from the program before returning, whether linking succeeded or not.
  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError>;

  /// Enumerate the active uniforms of a linked program.
  ///
  /// This is called exactly once per program, right after linking.
  unsafe fn active_uniforms(&mut self, program: &Self::ProgramRepr) -> Vec<ActiveUniform>;

  /// Make a program the active one.
  unsafe fn use_program(&mut self, program: &Self::ProgramRepr);

  /// Driver handle of a program.
  fn program_handle(program: &Self::ProgramRepr) -> u32;
}

/// Types that can be written to uniforms.
///
/// Backends implement this trait for every value type they can upload.
pub unsafe trait Uniformable<T>: Shader {
  /// Type of uniform `T` maps to.
  unsafe fn ty() -> UniformType;

  /// Write `value` at `location` in `program`.
  ///
  /// `program` is guaranteed to be the active program of the backend.
  unsafe fn update(&mut self, program: &mut Self::ProgramRepr, location: i32, value: T);
}
