//! An animated Julia set, colored by looking up a palette texture.
//!
//! The palette is read from `palette.png` in the texture directory. If it can’t be found, a
//! generated color ramp is used instead.
//!
//! Press the <main action> to pause and resume the animation.

use crate::clock::AnimationClock;
use crate::quad::FullscreenQuad;
use crate::texture::{palette_gradient, Texture};
use crate::{clear_frame, DemoError, Example, Features, InputAction, LoopFeedback, PlatformServices};
use glint::context::GraphicsContext;
use glint::shader::types::Vec2;
use glint::shader::{Program, UniformError};
use glint_gl::GL33;

const VS: &str = include_str!("fullscreen-vs.glsl");
const FS: &str = include_str!("fractal-fs.glsl");

const PALETTE: &str = "palette.png";
const PALETTE_UNIT: u32 = 0;
const FALLBACK_PALETTE_WIDTH: u32 = 256;

pub struct LocalExample {
  program: Program<GL33>,
  quad: FullscreenQuad,
  palette: Texture,
  clock: AnimationClock,
  resolution: [u32; 2],
}

impl Example for LocalExample {
  fn features() -> Features {
    Features::new([PALETTE])
  }

  fn bootstrap(
    platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<Self, DemoError> {
    let mut program = context.new_shader_program(VS, FS)?;

    // the sampler always reads from the same unit
    program
      .activate(context)
      .set("palette", PALETTE_UNIT as i32)?;

    let palette = match platform.fetch_texture(PALETTE) {
      Ok(image) => Texture::new(context, image)?,
      Err(e) => {
        log::warn!("{}; using a generated palette", e);
        Texture::new(context, &palette_gradient(FALLBACK_PALETTE_WIDTH))?
      }
    };
    let quad = FullscreenQuad::new(context);

    Ok(Self {
      program,
      quad,
      palette,
      clock: AnimationClock::new(),
      resolution: [800, 600],
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
}

impl LocalExample {
  fn draw(
    &mut self,
    t: f32,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<(), UniformError> {
    let [width, height] = self.resolution;

    clear_frame(context);
    self.palette.bind(context, PALETTE_UNIT);

    {
      let mut iface = self.program.activate(context);
      iface.set("resolution", Vec2::new(width as f32, height as f32))?;
      iface.set("time", t)?;
    }

    self.quad.draw(context);
    Ok(())
  }
}
