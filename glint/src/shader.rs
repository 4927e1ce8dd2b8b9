//! Shader programs.
//!
//! A [`Program`] is made of two [`Stage`]s: a vertex stage, transforming vertices, and a fragment
//! stage, computing the color of each rasterized fragment. Building a program goes through three
//! steps, all of them fatal on failure:
//!
//! 1. Each stage source is compiled on its own. A rejected source gives
//!    [`StageError::CompilationFailed`], carrying the stage type and the driver diagnostic.
//! 2. Both stages are linked together. A failure gives [`ProgramError::LinkFailed`] with the
//!    driver diagnostic.
//! 3. The active uniforms of the linked program are enumerated once and cached by name.
//!
//! No half-built program ever escapes: every driver object allocated on the way is released when
//! construction bails out, because every intermediate value releases its driver object on drop.
//!
//! # Uniforms
//!
//! A uniform is a named value that stays constant during a draw call. Writing one requires the
//! program to be the active one, which is why writes go through the [`ProgramInterface`] returned
//! by [`Program::activate`]:
//!
//! ```ignore
//! let mut iface = program.activate(&mut ctx);
//! iface.set("time", t)?;
//! iface.set("mvp", Mat44::from_rows(mvp))?;
//! ```
//!
//! Setting a uniform that the driver didn’t report as active fails with
//! [`UniformError::Unknown`]. Drivers optimize away uniforms that don’t contribute to the output,
//! so a declared-but-unused uniform is unknown too.

pub mod types;

use std::collections::hash_map::{self, HashMap};
use std::error;
use std::fmt;
use std::ops::Deref;

use crate::backend::shader::{Shader, Uniformable};
use crate::context::GraphicsContext;

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Fragment shader.
  FragmentShader,
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
    }
  }
}

/// Errors that shader stages can emit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StageError {
  /// Occurs when a shader fails to compile.
  ///
  /// The `String` is the diagnostic reported by the driver.
  CompilationFailed(StageType, String),
}

impl StageError {
  /// Create a compilation error.
  pub fn compilation_failed(ty: StageType, reason: impl Into<String>) -> Self {
    StageError::CompilationFailed(ty, reason.into())
  }

  /// Stage that failed.
  pub fn stage(&self) -> StageType {
    match *self {
      StageError::CompilationFailed(ty, _) => ty,
    }
  }
}

impl fmt::Display for StageError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageError::CompilationFailed(ref ty, ref r) => write!(f, "{} compilation error: {}", ty, r),
    }
  }
}

impl error::Error for StageError {}

/// Errors that a [`Program`] can generate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProgramError {
  /// A shader stage failed to compile.
  StageError(StageError),
  /// Program link failed. You can inspect the reason by looking at the contained `String`.
  LinkFailed(String),
}

impl ProgramError {
  /// Create a link error.
  pub fn link_failed(reason: impl Into<String>) -> Self {
    ProgramError::LinkFailed(reason.into())
  }
}

impl fmt::Display for ProgramError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ProgramError::StageError(ref e) => write!(f, "shader program has stage error: {}", e),

      ProgramError::LinkFailed(ref s) => write!(f, "shader program failed to link: {}", s),
    }
  }
}

impl error::Error for ProgramError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      ProgramError::StageError(e) => Some(e),
      ProgramError::LinkFailed(_) => None,
    }
  }
}

impl From<StageError> for ProgramError {
  fn from(e: StageError) -> Self {
    ProgramError::StageError(e)
  }
}

/// Errors that can happen while writing a uniform.
///
/// A failed write leaves the program untouched and usable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UniformError {
  /// No active uniform with this name in the program.
  Unknown(String),
  /// The value cannot be written to the uniform.
  ///
  /// The first `String` is the name of the uniform, followed by the type of the uniform in the
  /// shader and the type of the value that was written.
  TypeMismatch(String, UniformType, UniformType),
}

impl UniformError {
  /// Create an unknown uniform error.
  pub fn unknown(name: impl Into<String>) -> Self {
    UniformError::Unknown(name.into())
  }

  /// Create a type mismatch error.
  pub fn type_mismatch(name: impl Into<String>, found: UniformType, written: UniformType) -> Self {
    UniformError::TypeMismatch(name.into(), found, written)
  }
}

impl fmt::Display for UniformError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      UniformError::Unknown(ref name) => write!(f, "unknown uniform {}", name),

      UniformError::TypeMismatch(ref name, ref found, ref written) => write!(
        f,
        "type mismatch for uniform {}: declared as {}, written as {}",
        name, found, written
      ),
    }
  }
}

impl error::Error for UniformError {}

/// Type of a uniform.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UniformType {
  // scalars
  /// 32-bit signed integer.
  Int,
  /// 32-bit unsigned integer.
  UInt,
  /// 32-bit floating-point number.
  Float,
  /// Boolean.
  Bool,

  // vectors
  /// 2D signed integral vector.
  IVec2,
  /// 3D signed integral vector.
  IVec3,
  /// 4D signed integral vector.
  IVec4,
  /// 2D unsigned integral vector.
  UIVec2,
  /// 3D unsigned integral vector.
  UIVec3,
  /// 4D unsigned integral vector.
  UIVec4,
  /// 2D floating-point vector.
  Vec2,
  /// 3D floating-point vector.
  Vec3,
  /// 4D floating-point vector.
  Vec4,
  /// 2D boolean vector.
  BVec2,
  /// 3D boolean vector.
  BVec3,
  /// 4D boolean vector.
  BVec4,

  // matrices
  /// 2×2 floating-point matrix.
  M22,
  /// 3×3 floating-point matrix.
  M33,
  /// 4×4 floating-point matrix.
  M44,

  // textures
  /// Signed integral 1D texture sampler.
  ISampler1D,
  /// Signed integral 2D texture sampler.
  ISampler2D,
  /// Signed integral 3D texture sampler.
  ISampler3D,
  /// Unsigned integral 1D texture sampler.
  UISampler1D,
  /// Unsigned integral 2D texture sampler.
  UISampler2D,
  /// Unsigned integral 3D texture sampler.
  UISampler3D,
  /// Floating-point 1D texture sampler.
  Sampler1D,
  /// Floating-point 2D texture sampler.
  Sampler2D,
  /// Floating-point 3D texture sampler.
  Sampler3D,
  /// Floating-point 2D array texture sampler.
  Sampler2DArray,
  /// Floating-point cubemap sampler.
  Cubemap,
}

impl UniformType {
  /// Whether this is a texture sampler type.
  pub fn is_sampler(self) -> bool {
    matches!(
      self,
      UniformType::ISampler1D
        | UniformType::ISampler2D
        | UniformType::ISampler3D
        | UniformType::UISampler1D
        | UniformType::UISampler2D
        | UniformType::UISampler3D
        | UniformType::Sampler1D
        | UniformType::Sampler2D
        | UniformType::Sampler3D
        | UniformType::Sampler2DArray
        | UniformType::Cubemap
    )
  }

  /// Whether a value of type `written` can be written to a uniform declared with this type.
  ///
  /// Besides exact matches, boolean uniforms (and boolean vectors) accept integer, unsigned and
  /// floating-point values of the same dimension, and samplers accept a signed integer (the
  /// texture unit).
  pub fn accepts(self, written: UniformType) -> bool {
    if self == written {
      return true;
    }

    match self {
      UniformType::Bool => matches!(
        written,
        UniformType::Int | UniformType::UInt | UniformType::Float
      ),
      UniformType::BVec2 => matches!(
        written,
        UniformType::IVec2 | UniformType::UIVec2 | UniformType::Vec2
      ),
      UniformType::BVec3 => matches!(
        written,
        UniformType::IVec3 | UniformType::UIVec3 | UniformType::Vec3
      ),
      UniformType::BVec4 => matches!(
        written,
        UniformType::IVec4 | UniformType::UIVec4 | UniformType::Vec4
      ),
      ty if ty.is_sampler() => written == UniformType::Int,
      _ => false,
    }
  }
}

impl fmt::Display for UniformType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      UniformType::Int => f.write_str("int"),
      UniformType::UInt => f.write_str("uint"),
      UniformType::Float => f.write_str("float"),
      UniformType::Bool => f.write_str("bool"),
      UniformType::IVec2 => f.write_str("ivec2"),
      UniformType::IVec3 => f.write_str("ivec3"),
      UniformType::IVec4 => f.write_str("ivec4"),
      UniformType::UIVec2 => f.write_str("uvec2"),
      UniformType::UIVec3 => f.write_str("uvec3"),
      UniformType::UIVec4 => f.write_str("uvec4"),
      UniformType::Vec2 => f.write_str("vec2"),
      UniformType::Vec3 => f.write_str("vec3"),
      UniformType::Vec4 => f.write_str("vec4"),
      UniformType::BVec2 => f.write_str("bvec2"),
      UniformType::BVec3 => f.write_str("bvec3"),
      UniformType::BVec4 => f.write_str("bvec4"),
      UniformType::M22 => f.write_str("mat2"),
      UniformType::M33 => f.write_str("mat3"),
      UniformType::M44 => f.write_str("mat4"),
      UniformType::ISampler1D => f.write_str("isampler1D"),
      UniformType::ISampler2D => f.write_str("isampler2D"),
      UniformType::ISampler3D => f.write_str("isampler3D"),
      UniformType::UISampler1D => f.write_str("usampler1D"),
      UniformType::UISampler2D => f.write_str("usampler2D"),
      UniformType::UISampler3D => f.write_str("usampler3D"),
      UniformType::Sampler1D => f.write_str("sampler1D"),
      UniformType::Sampler2D => f.write_str("sampler2D"),
      UniformType::Sampler3D => f.write_str("sampler3D"),
      UniformType::Sampler2DArray => f.write_str("sampler2DArray"),
      UniformType::Cubemap => f.write_str("samplerCube"),
    }
  }
}

/// An active uniform, as reported by the driver once a program is linked.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActiveUniform {
  /// Name, as reported by the driver (arrays are reported as `name[0]`).
  pub name: String,
  /// Location of the uniform in its program.
  pub location: i32,
  /// Type of the uniform as declared in the shader.
  pub ty: UniformType,
  /// Number of elements; `1` for anything that is not an array.
  pub size: usize,
}

/// A compiled shader stage.
///
/// Stages are only needed to build [`Program`]s. Once a program is linked, its stages can be
/// dropped; they can also be kept around to be linked in other programs.
pub struct Stage<S>
where
  S: ?Sized + Shader,
{
  repr: S::StageRepr,
  ty: StageType,
}

impl<S> Stage<S>
where
  S: ?Sized + Shader,
{
  /// Compile a new shader stage.
  pub fn new<C, R>(ctx: &mut C, ty: StageType, src: R) -> Result<Self, StageError>
  where
    C: GraphicsContext<Backend = S>,
    R: AsRef<str>,
  {
    unsafe {
      ctx
        .backend()
        .new_stage(ty, src.as_ref())
        .map(|repr| Stage { repr, ty })
    }
  }

  /// Type of this stage.
  pub fn ty(&self) -> StageType {
    self.ty
  }
}

impl<S> fmt::Debug for Stage<S>
where
  S: ?Sized + Shader,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.debug_struct("Stage").field("ty", &self.ty).finish()
  }
}

/// A linked shader program and its uniform table.
///
/// The uniform table is filled once, right after linking, and never changes afterwards.
pub struct Program<S>
where
  S: ?Sized + Shader,
{
  repr: S::ProgramRepr,
  uniforms: HashMap<String, ActiveUniform>,
}

impl<S> Program<S>
where
  S: ?Sized + Shader,
{
  /// Compile both stages and link them into a new program.
  ///
  /// The intermediate stages are released before this function returns, whatever the outcome.
  pub fn from_strings<C, V, F>(ctx: &mut C, vertex: V, fragment: F) -> Result<Self, ProgramError>
  where
    C: GraphicsContext<Backend = S>,
    V: AsRef<str>,
    F: AsRef<str>,
  {
    let vs_stage = Stage::new(ctx, StageType::VertexShader, vertex)?;
    let fs_stage = Stage::new(ctx, StageType::FragmentShader, fragment)?;

    Self::from_stages(ctx, &vs_stage, &fs_stage)
  }

  /// Link already compiled stages into a new program.
  ///
  /// The stages are detached from the program once it’s linked, so they can be dropped or reused
  /// right away.
  pub fn from_stages<C>(
    ctx: &mut C,
    vertex: &Stage<S>,
    fragment: &Stage<S>,
  ) -> Result<Self, ProgramError>
  where
    C: GraphicsContext<Backend = S>,
  {
    let backend = ctx.backend();

    unsafe {
      let repr = backend.new_program(&vertex.repr, &fragment.repr)?;
      let uniforms = uniform_table(backend.active_uniforms(&repr));

      Ok(Program { repr, uniforms })
    }
  }

  /// Make this program the active one and get an interface to write its uniforms.
  ///
  /// Activating an already active program is a no-op; the program is the active one after each
  /// call, whatever was activated through glint before. Backends may cache the active program, so
  /// a program bound behind glint’s back must be reported to the backend before activating again
  /// (with `GLState::invalidate_shader_program` in `glint-gl`).
  pub fn activate<'a, C>(&'a mut self, ctx: &'a mut C) -> ProgramInterface<'a, S>
  where
    C: GraphicsContext<Backend = S>,
  {
    let backend = ctx.backend();

    unsafe { backend.use_program(&self.repr) };

    ProgramInterface {
      backend,
      program: self,
    }
  }

  /// Driver handle of the program.
  pub fn handle(&self) -> u32 {
    S::program_handle(&self.repr)
  }

  /// Look up an active uniform.
  pub fn uniform(&self, name: &str) -> Option<&ActiveUniform> {
    self.uniforms.get(name)
  }

  /// Whether `name` is an active uniform of this program.
  pub fn has_uniform(&self, name: &str) -> bool {
    self.uniforms.contains_key(name)
  }

  /// Iterate over the uniform table.
  ///
  /// Array uniforms appear twice: once under the name reported by the driver (`name[0]`) and
  /// once under their base name.
  pub fn uniforms(&self) -> Uniforms<'_> {
    Uniforms {
      iter: self.uniforms.iter(),
    }
  }
}

impl<S> fmt::Debug for Program<S>
where
  S: ?Sized + Shader,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.debug_struct("Program")
      .field("handle", &self.handle())
      .field("uniforms", &self.uniforms)
      .finish()
  }
}

/// Iterator over the uniform table of a [`Program`].
#[derive(Debug)]
pub struct Uniforms<'a> {
  iter: hash_map::Iter<'a, String, ActiveUniform>,
}

impl<'a> Iterator for Uniforms<'a> {
  type Item = (&'a str, &'a ActiveUniform);

  fn next(&mut self) -> Option<Self::Item> {
    self.iter.next().map(|(name, u)| (name.as_str(), u))
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    self.iter.size_hint()
  }
}

/// Active program.
///
/// This is obtained with [`Program::activate`] and borrows both the program and the backend, so
/// nothing else can become active while uniforms are being written.
pub struct ProgramInterface<'a, S>
where
  S: ?Sized + Shader,
{
  backend: &'a mut S,
  program: &'a mut Program<S>,
}

impl<'a, S> Deref for ProgramInterface<'a, S>
where
  S: ?Sized + Shader,
{
  type Target = Program<S>;

  fn deref(&self) -> &Self::Target {
    &*self.program
  }
}

impl<'a, S> ProgramInterface<'a, S>
where
  S: ?Sized + Shader,
{
  /// Write a uniform.
  ///
  /// The location comes from the uniform table; no driver query happens here.
  pub fn set<T>(&mut self, name: &str, value: T) -> Result<(), UniformError>
  where
    S: Uniformable<T>,
  {
    let uniform = self
      .program
      .uniforms
      .get(name)
      .ok_or_else(|| UniformError::unknown(name))?;

    let written = unsafe { <S as Uniformable<T>>::ty() };
    if !uniform.ty.accepts(written) {
      return Err(UniformError::type_mismatch(name, uniform.ty, written));
    }

    let location = uniform.location;
    unsafe {
      <S as Uniformable<T>>::update(self.backend, &mut self.program.repr, location, value);
    }

    Ok(())
  }
}

// Build the name → uniform table, also registering arrays under their base name.
fn uniform_table(active: Vec<ActiveUniform>) -> HashMap<String, ActiveUniform> {
  let mut uniforms = HashMap::with_capacity(active.len());

  for uniform in active {
    if let Some(base) = uniform.name.strip_suffix("[0]") {
      uniforms
        .entry(base.to_owned())
        .or_insert_with(|| uniform.clone());
    }

    uniforms.insert(uniform.name.clone(), uniform);
  }

  uniforms
}
