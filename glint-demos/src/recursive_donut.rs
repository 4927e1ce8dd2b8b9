//! Donuts spinning inside the tube of bigger donuts, raymarched in a fragment shader.
//!
//! The uniforms follow the usual shadertoy naming (`iResolution`, `iTime`, `iMouse`), so the
//! shader can be pasted there as is.
//!
//! Press the <primary action> to grab the cursor and the <secondary action> to release it. Moving
//! the cursor orbits the camera. Press the <main action> to pause and resume the animation.

use crate::clock::AnimationClock;
use crate::quad::FullscreenQuad;
use crate::{clear_frame, DemoError, Example, InputAction, LoopFeedback, PlatformServices};
use glint::context::GraphicsContext;
use glint::shader::types::{Vec3, Vec4};
use glint::shader::{Program, UniformError};
use glint_gl::GL33;
use glint_windowing::CursorMode;

const VS: &str = include_str!("fullscreen-vs.glsl");
const FS: &str = include_str!("donut-fs.glsl");

pub struct LocalExample {
  program: Program<GL33>,
  quad: FullscreenQuad,
  clock: AnimationClock,
  resolution: [u32; 2],
  mouse: [f32; 2],
  grabbed: bool,
}

impl Example for LocalExample {
  fn bootstrap(
    _platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<Self, DemoError> {
    let program = context.new_shader_program(VS, FS)?;
    let quad = FullscreenQuad::new(context);

    Ok(Self {
      program,
      quad,
      clock: AnimationClock::new(),
      resolution: [800, 600],
      mouse: [0., 0.],
      grabbed: false,
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
        InputAction::PrimaryPressed => self.grabbed = true,
        InputAction::SecondaryPressed => self.grabbed = false,
        InputAction::CursorMoved { x, y } => self.mouse = [x, y],
        InputAction::Resized { width, height } => {
          self.resolution = [width, height];
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

  fn cursor_mode(&self) -> Option<CursorMode> {
    if self.grabbed {
      Some(CursorMode::Disabled)
    } else {
      Some(CursorMode::Visible)
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
    let [mouse_x, mouse_y] = self.mouse;

    clear_frame(context);

    {
      let mut iface = self.program.activate(context);
      iface.set("iResolution", Vec3::new(width as f32, height as f32, 0.))?;
      iface.set("iTime", t)?;
      iface.set("iMouse", Vec4::new(mouse_x, mouse_y, 0., 0.))?;
    }

    self.quad.draw(context);
    Ok(())
  }
}
