//! A beating heart, raymarched as an implicit surface and seen through an orbit camera.
//!
//! Press the <left action> and <right action> to orbit horizontally, the <forward action> and
//! <backward action> to orbit vertically, and scroll to zoom. Press the <main action> to pause and
//! resume the heartbeat.

use crate::camera::OrbitCamera;
use crate::clock::AnimationClock;
use crate::quad::FullscreenQuad;
use crate::{clear_frame, DemoError, Example, InputAction, LoopFeedback, PlatformServices};
use glint::context::GraphicsContext;
use glint::shader::types::{Mat44, Vec2};
use glint::shader::{Program, UniformError};
use glint_gl::GL33;

const VS: &str = include_str!("fullscreen-vs.glsl");
const FS: &str = include_str!("heart-fs.glsl");

const CAMERA_DISTANCE: f32 = 3.;
/// Angle, in degrees, the camera rotates by for each direction action.
const ORBIT_STEP: f32 = 5.;

pub struct LocalExample {
  program: Program<GL33>,
  quad: FullscreenQuad,
  clock: AnimationClock,
  camera: OrbitCamera,
  resolution: [u32; 2],
}

impl Example for LocalExample {
  fn bootstrap(
    _platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<Self, DemoError> {
    let program = context.new_shader_program(VS, FS)?;
    let quad = FullscreenQuad::new(context);
    let resolution = [800, 600];
    let camera = OrbitCamera::new(CAMERA_DISTANCE, aspect_ratio(resolution));

    Ok(Self {
      program,
      quad,
      clock: AnimationClock::new(),
      camera,
      resolution,
    })
  }

  fn render_frame(
    mut self,
    time: f32,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> LoopFeedback<Self> {
    for action in actions {
      match action {
        InputAction::Quit => return LoopFeedback::Exit,
        InputAction::MainToggle => self.clock.toggle(),

        InputAction::Left => self.camera.set_yaw(self.camera.yaw() - ORBIT_STEP),
        InputAction::Right => self.camera.set_yaw(self.camera.yaw() + ORBIT_STEP),
        InputAction::Forward => self.camera.set_pitch(self.camera.pitch() + ORBIT_STEP),
        InputAction::Backward => self.camera.set_pitch(self.camera.pitch() - ORBIT_STEP),
        InputAction::VScroll { amount } => self.camera.set_fov(self.camera.fov() - amount),

        InputAction::Resized { width, height } => {
          self.resolution = [width, height];
          self.camera.aspect_ratio = aspect_ratio(self.resolution);
          context.backend().set_viewport(0, 0, width, height);
        }

        _ => (),
      }
    }

    let t = self.clock.tick(time);

    match self.draw(t, context) {
      Ok(()) => LoopFeedback::Continue(self),
      Err(e) => {
        log::error!("cannot render frame: {}", e);
        LoopFeedback::Exit
      }
    }
  }
}

impl LocalExample {
  fn draw(
    &mut self,
    t: f32,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<(), UniformError> {
    let [width, height] = self.resolution;
    let view = view_uniform(&self.camera);

    clear_frame(context);

    {
      let mut iface = self.program.activate(context);
      iface.set("view", view)?;
      iface.set("fov", self.camera.fov_rad())?;
      iface.set("resolution", Vec2::new(width as f32, height as f32))?;
      iface.set("time", t)?;
    }

    self.quad.draw(context);
    Ok(())
  }
}

fn aspect_ratio([width, height]: [u32; 2]) -> f32 {
  width as f32 / height.max(1) as f32
}

// cgmath stores columns
fn view_uniform(camera: &OrbitCamera) -> Mat44<f32> {
  let cols: [[f32; 4]; 4] = camera.view_matrix().into();
  Mat44::from_cols(cols)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn view_uniform_is_row_major() {
    let camera = OrbitCamera::new(CAMERA_DISTANCE, 1.);
    let view = view_uniform(&camera);

    // the camera sits on -Z looking at the origin: the translation ends up in the last column
    assert!((view.0[2][3] + CAMERA_DISTANCE).abs() < 1e-5);
    assert_eq!(view.0[3], [0., 0., 0., 1.]);
  }

  #[test]
  fn degenerate_sizes_keep_a_finite_aspect_ratio() {
    assert_eq!(aspect_ratio([800, 600]), 800. / 600.);
    assert_eq!(aspect_ratio([800, 0]), 800.);
  }
}
