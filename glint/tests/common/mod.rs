//! In-process recording backend.
//!
//! `Soft` compiles a tiny subset of GLSL: it only looks at `uniform`, `in` and `out`
//! declarations and at whether `main` is defined. Everything else is kept as opaque text. The
//! driver side mimics what an OpenGL driver does with objects (allocation, attachment, deletion),
//! the current program and uniform storage, so tests can check what glint asks the driver to do.

#![allow(dead_code)]

use glint::backend::query::Query;
use glint::backend::shader::{Shader, Uniformable};
use glint::context::GraphicsContext;
use glint::query::DriverInfo;
use glint::shader::types::{Mat22, Mat33, Mat44, Vec2, Vec3, Vec4};
use glint::shader::{ActiveUniform, ProgramError, StageError, StageType, UniformType};
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

/// A value stored in a program uniform slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Stored {
  Ints(Vec<i32>),
  UInts(Vec<u32>),
  Floats(Vec<f32>),
}

/// Driver-side state.
#[derive(Debug, Default)]
pub struct Driver {
  next_id: u32,
  pub live_shaders: BTreeSet<u32>,
  pub live_programs: BTreeSet<u32>,
  pub attachments: BTreeMap<u32, Vec<u32>>,
  pub current_program: u32,
  // backend-side view of the current program, as GLState keeps it
  pub cached_program: Option<u32>,
  pub use_program_calls: usize,
  pub uniform_enumerations: usize,
  pub values: HashMap<(u32, i32), Stored>,
  pub errors: Vec<String>,
}

impl Driver {
  fn gen_id(&mut self) -> u32 {
    self.next_id += 1;
    self.next_id
  }

  fn write(&mut self, program: u32, location: i32, value: Stored) {
    if self.current_program != program {
      self.errors.push(format!(
        "GL_INVALID_OPERATION: uniform write to program {} while {} is active",
        program, self.current_program
      ));
      return;
    }

    self.values.insert((program, location), value);
  }

  // Matrices are kept column-major, like GPU memory.
  fn write_matrix(&mut self, program: u32, location: i32, n: usize, transpose: bool, data: &[f32]) {
    let mut storage = vec![0.; n * n];

    for r in 0..n {
      for c in 0..n {
        let src = if transpose { data[r * n + c] } else { data[c * n + r] };
        storage[c * n + r] = src;
      }
    }

    self.write(program, location, Stored::Floats(storage));
  }

  /// Value stored for a uniform location.
  pub fn value(&self, program: u32, location: i32) -> Option<&Stored> {
    self.values.get(&(program, location))
  }
}

#[derive(Clone, Debug, PartialEq)]
struct Decl {
  ty: String,
  name: String,
  size: usize,
}

#[derive(Debug)]
pub struct SoftStage {
  id: u32,
  ty: StageType,
  uniforms: Vec<Decl>,
  inputs: Vec<Decl>,
  outputs: Vec<Decl>,
  driver: Rc<RefCell<Driver>>,
}

impl Drop for SoftStage {
  fn drop(&mut self) {
    self.driver.borrow_mut().live_shaders.remove(&self.id);
  }
}

#[derive(Debug)]
pub struct SoftProgram {
  id: u32,
  uniforms: Vec<ActiveUniform>,
  driver: Rc<RefCell<Driver>>,
}

impl Drop for SoftProgram {
  fn drop(&mut self) {
    let mut driver = self.driver.borrow_mut();
    driver.live_programs.remove(&self.id);
    driver.attachments.remove(&self.id);

    if driver.current_program == self.id {
      driver.current_program = 0;
    }

    if driver.cached_program == Some(self.id) {
      driver.cached_program = None;
    }
  }
}

/// The recording backend.
#[derive(Debug, Default)]
pub struct Soft {
  driver: Rc<RefCell<Driver>>,
}

/// Context granting access to [`Soft`].
#[derive(Debug, Default)]
pub struct SoftContext {
  backend: Soft,
}

impl SoftContext {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn driver(&self) -> Ref<Driver> {
    self.backend.driver.borrow()
  }

  /// Make a program active behind glint’s back.
  /// Bind a program without telling the backend.
  pub fn use_program_raw(&mut self, handle: u32) {
    self.backend.driver.borrow_mut().current_program = handle;
  }

  /// Tell the backend its current program is unknown.
  pub fn invalidate_program(&mut self) {
    self.backend.driver.borrow_mut().cached_program = None;
  }
}

unsafe impl GraphicsContext for SoftContext {
  type Backend = Soft;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.backend
  }
}

// Extract a declaration of the form `<qualifier> <type> <name>;` or `<qualifier> <type> <name>[N];`.
fn parse_decl(line: &str, qualifier: &str) -> Option<Decl> {
  let rest = line.trim().strip_prefix(qualifier)?.strip_prefix(' ')?;
  let rest = rest.trim().strip_suffix(';')?;
  let mut words = rest.split_whitespace();
  let ty = words.next()?.to_owned();
  let declarator = words.next()?;

  let (name, size) = match declarator.find('[') {
    Some(open) => {
      let size = declarator[open + 1..].trim_end_matches(']').parse().ok()?;
      (declarator[..open].to_owned(), size)
    }
    None => (declarator.to_owned(), 1),
  };

  Some(Decl { ty, name, size })
}

fn is_ident_char(c: char) -> bool {
  c.is_alphanumeric() || c == '_'
}

// Whether `name` is referenced outside of declaration lines.
fn is_used(src: &str, name: &str) -> bool {
  src
    .lines()
    .filter(|line| parse_decl(line, "uniform").is_none())
    .any(|line| {
      line.match_indices(name).any(|(i, _)| {
        let before = line[..i].chars().next_back();
        let after = line[i + name.len()..].chars().next();
        !before.map_or(false, is_ident_char) && !after.map_or(false, is_ident_char)
      })
    })
}

fn uniform_type(ty: &str) -> Option<UniformType> {
  let ty = match ty {
    "int" => UniformType::Int,
    "uint" => UniformType::UInt,
    "float" => UniformType::Float,
    "bool" => UniformType::Bool,
    "ivec2" => UniformType::IVec2,
    "ivec3" => UniformType::IVec3,
    "ivec4" => UniformType::IVec4,
    "uvec2" => UniformType::UIVec2,
    "uvec3" => UniformType::UIVec3,
    "uvec4" => UniformType::UIVec4,
    "vec2" => UniformType::Vec2,
    "vec3" => UniformType::Vec3,
    "vec4" => UniformType::Vec4,
    "bvec2" => UniformType::BVec2,
    "bvec3" => UniformType::BVec3,
    "bvec4" => UniformType::BVec4,
    "mat2" => UniformType::M22,
    "mat3" => UniformType::M33,
    "mat4" => UniformType::M44,
    "sampler2D" => UniformType::Sampler2D,
    "samplerCube" => UniformType::Cubemap,
    _ => return None,
  };

  Some(ty)
}

unsafe impl Shader for Soft {
  type StageRepr = SoftStage;

  type ProgramRepr = SoftProgram;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    let id = self.driver.borrow_mut().gen_id();
    self.driver.borrow_mut().live_shaders.insert(id);

    let mut stage = SoftStage {
      id,
      ty,
      uniforms: src.lines().filter_map(|l| parse_decl(l, "uniform")).collect(),
      inputs: src.lines().filter_map(|l| parse_decl(l, "in")).collect(),
      outputs: src.lines().filter_map(|l| parse_decl(l, "out")).collect(),
      driver: self.driver.clone(),
    };

    if !src.contains("void main()") {
      // dropping the stage deletes the shader object
      return Err(StageError::compilation_failed(
        ty,
        "ERROR: 0:1: 'main' : function is not defined",
      ));
    }

    if let Some(line) = src.lines().position(|l| l.trim_start().starts_with("#error")) {
      return Err(StageError::compilation_failed(
        ty,
        format!("ERROR: 0:{}: '#error' : user error", line + 1),
      ));
    }

    if let Some(decl) = stage.uniforms.iter().find(|d| uniform_type(&d.ty).is_none()) {
      return Err(StageError::compilation_failed(
        ty,
        format!("ERROR: unknown type '{}'", decl.ty),
      ));
    }

    // keep only active uniforms
    stage.uniforms.retain(|d| is_used(src, &d.name));

    Ok(stage)
  }

  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError> {
    let id = {
      let mut driver = self.driver.borrow_mut();
      let id = driver.gen_id();
      driver.live_programs.insert(id);
      driver.attachments.insert(id, vec![vertex.id, fragment.id]);
      id
    };
    let mut program = SoftProgram {
      id,
      uniforms: Vec::new(),
      driver: self.driver.clone(),
    };

    let link = link(vertex, fragment);
    self.driver.borrow_mut().attachments.insert(id, Vec::new());

    // dropping the program on failure deletes it
    program.uniforms = link?;
    Ok(program)
  }

  unsafe fn active_uniforms(&mut self, program: &Self::ProgramRepr) -> Vec<ActiveUniform> {
    self.driver.borrow_mut().uniform_enumerations += 1;
    program.uniforms.clone()
  }

  unsafe fn use_program(&mut self, program: &Self::ProgramRepr) {
    let mut driver = self.driver.borrow_mut();

    if driver.cached_program != Some(program.id) {
      driver.use_program_calls += 1;
      driver.current_program = program.id;
      driver.cached_program = Some(program.id);
    }
  }

  fn program_handle(program: &Self::ProgramRepr) -> u32 {
    program.id
  }
}

fn link(vertex: &SoftStage, fragment: &SoftStage) -> Result<Vec<ActiveUniform>, ProgramError> {
  for input in &fragment.inputs {
    if !vertex.outputs.contains(input) {
      return Err(ProgramError::link_failed(format!(
        "error: fragment shader input '{}' is not written by the vertex shader",
        input.name
      )));
    }
  }

  let mut decls: Vec<&Decl> = Vec::new();
  for decl in vertex.uniforms.iter().chain(&fragment.uniforms) {
    match decls.iter().find(|d| d.name == decl.name) {
      Some(prev) if prev.ty != decl.ty => {
        return Err(ProgramError::link_failed(format!(
          "error: uniform '{}' declared with different types",
          decl.name
        )));
      }
      Some(_) => (),
      None => decls.push(decl),
    }
  }

  let mut location = 0;
  let uniforms = decls
    .into_iter()
    .filter_map(|decl| {
      let ty = uniform_type(&decl.ty)?;
      let name = if decl.size > 1 {
        format!("{}[0]", decl.name)
      } else {
        decl.name.clone()
      };
      let uniform = ActiveUniform {
        name,
        location,
        ty,
        size: decl.size,
      };

      location += decl.size as i32;
      Some(uniform)
    })
    .collect();

  Ok(uniforms)
}

macro_rules! impl_Uniformable {
  ($t:ty, $uty:tt, $variant:ident, |$v:ident| $flat:expr) => {
    unsafe impl Uniformable<$t> for Soft {
      unsafe fn ty() -> UniformType {
        UniformType::$uty
      }

      unsafe fn update(&mut self, program: &mut SoftProgram, location: i32, $v: $t) {
        self
          .driver
          .borrow_mut()
          .write(program.id, location, Stored::$variant($flat));
      }
    }
  };

  (mat $t:ty, $uty:tt, $n:literal) => {
    unsafe impl Uniformable<$t> for Soft {
      unsafe fn ty() -> UniformType {
        UniformType::$uty
      }

      unsafe fn update(&mut self, program: &mut SoftProgram, location: i32, value: $t) {
        self
          .driver
          .borrow_mut()
          .write_matrix(program.id, location, $n, true, &value.to_row_major());
      }
    }
  };
}

impl_Uniformable!(i32, Int, Ints, |v| vec![v]);
impl_Uniformable!(Vec2<i32>, IVec2, Ints, |v| v.to_vec());
impl_Uniformable!(Vec3<i32>, IVec3, Ints, |v| v.to_vec());
impl_Uniformable!(Vec4<i32>, IVec4, Ints, |v| v.to_vec());
impl_Uniformable!(u32, UInt, UInts, |v| vec![v]);
impl_Uniformable!(Vec2<u32>, UIVec2, UInts, |v| v.to_vec());
impl_Uniformable!(Vec3<u32>, UIVec3, UInts, |v| v.to_vec());
impl_Uniformable!(Vec4<u32>, UIVec4, UInts, |v| v.to_vec());
impl_Uniformable!(f32, Float, Floats, |v| vec![v]);
impl_Uniformable!(Vec2<f32>, Vec2, Floats, |v| v.to_vec());
impl_Uniformable!(Vec3<f32>, Vec3, Floats, |v| v.to_vec());
impl_Uniformable!(Vec4<f32>, Vec4, Floats, |v| v.to_vec());
impl_Uniformable!(bool, Bool, UInts, |v| vec![v as u32]);
impl_Uniformable!(mat Mat22<f32>, M22, 2);
impl_Uniformable!(mat Mat33<f32>, M33, 3);
impl_Uniformable!(mat Mat44<f32>, M44, 4);

unsafe impl Query for Soft {
  fn driver_info(&mut self) -> DriverInfo {
    DriverInfo {
      vendor: Some("glint".to_owned()),
      renderer: Some("soft".to_owned()),
      version: Some("3.3".to_owned()),
      shading_language_version: None,
    }
  }
}
