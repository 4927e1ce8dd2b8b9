mod platform;

use glfw::{Action, Context as _, Key, Modifiers, MouseButton, WindowEvent};
use glint_demos::clock::FpsCounter;
use glint_demos::{log_driver_info, Example, InputAction, LoopFeedback};
use glint_glfw::GlfwSurface;
use glint_windowing::{WindowDim, WindowOpt};
use platform::DesktopPlatformServices;
use std::{iter, path::PathBuf, process, time::Instant};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct CLIOpts {
  #[structopt(short, long)]
  /// Directory where to pick textures from.
  textures: Option<PathBuf>,

  #[structopt(short, long)]
  /// List available examples.
  list_examples: bool,

  /// Example to run.
  example: Option<String>,
}

/// Macro to declaratively add examples.
macro_rules! examples {
  ($($ex_name:literal, $ex_ident:ident),* $(,)?) => {
    fn show_available_examples() {
      println!("available examples:");
      $( println!("  - {}", $ex_name); )*
    }

    // run an example based on its name and return the process exit code
    fn pick_and_run_example(cli_opts: CLIOpts) -> i32 {
      let example_name = cli_opts.example.as_deref();
      match example_name {
        $(
          Some($ex_name) => {
            run_example::<glint_demos::$ex_ident::LocalExample>(&cli_opts, $ex_name)
          }
        ),*

        _ => {
          log::error!("no example found");
          show_available_examples();
          1
        }
      }
    }
  }
}

// Run an example until it exits.
fn run_example<E>(cli_opts: &CLIOpts, name: &str) -> i32
where
  E: Example,
{
  let mut services = DesktopPlatformServices::new(cli_opts, E::features());

  let dim = WindowDim::Windowed {
    width: 800,
    height: 600,
  };
  let surface = match GlfwSurface::new_gl33(name, WindowOpt::default().set_dim(dim)) {
    Ok(surface) => surface,
    Err(e) => {
      log::error!("cannot create the window: {}", e);
      return 1;
    }
  };
  let mut context = surface.context;
  let events = surface.events_rx;

  log_driver_info(&mut context);

  let example = match E::bootstrap(&mut services, &mut context) {
    Ok(example) => example,
    Err(e) => {
      log::error!("cannot bootstrap {}: {}", name, e);
      return 1;
    }
  };
  let start_t = Instant::now();

  // the first frame gets the actual framebuffer size, which might differ from the window size
  let [fb_w, fb_h] = context.framebuffer_size();
  let feedback = example.render_frame(
    0.,
    iter::once(InputAction::Resized {
      width: fb_w,
      height: fb_h,
    }),
    &mut context,
  );
  let mut example = match feedback {
    LoopFeedback::Exit => return 0,
    LoopFeedback::Continue(example) => example,
  };

  let mut cursor_mode = None;
  let mut fps = FpsCounter::new();
  let mut last_t = 0.;

  'app: loop {
    // handle events
    context.window.glfw.poll_events();
    let actions = glfw::flush_messages(&events).flat_map(|(_, event)| adapt_events(event));

    let t = start_t.elapsed().as_secs_f32();
    let feedback = example.render_frame(t, actions, &mut context);

    if let LoopFeedback::Continue(stepped) = feedback {
      example = stepped;
    } else {
      break 'app;
    }

    let wanted = example.cursor_mode();
    if wanted.is_some() && wanted != cursor_mode {
      if let Some(mode) = wanted {
        context.set_cursor_mode(mode);
      }
      cursor_mode = wanted;
    }

    if let Some(n) = fps.tick(t - last_t) {
      context.window.set_title(&format!("{} - FPS {}", name, n));
    }
    last_t = t;

    context.window.swap_buffers();
  }

  0
}

fn adapt_events(event: WindowEvent) -> Option<InputAction> {
  match event {
    WindowEvent::Close | WindowEvent::Key(Key::Escape, _, Action::Release, _) => {
      Some(InputAction::Quit)
    }

    WindowEvent::Key(Key::Space, _, Action::Release, mods) => {
      if mods.is_empty() {
        Some(InputAction::MainToggle)
      } else if mods == Modifiers::Shift {
        Some(InputAction::AuxiliaryToggle)
      } else {
        None
      }
    }

    WindowEvent::Key(key, _, Action::Press, _) | WindowEvent::Key(key, _, Action::Repeat, _) => {
      log::debug!("key press: {:?}", key);
      match key {
        Key::A | Key::Left => Some(InputAction::Left),
        Key::D | Key::Right => Some(InputAction::Right),
        Key::W | Key::Up => Some(InputAction::Forward),
        Key::S | Key::Down => Some(InputAction::Backward),
        Key::F => Some(InputAction::Up),
        Key::R => Some(InputAction::Down),
        _ => None,
      }
    }

    WindowEvent::MouseButton(MouseButton::Button1, action, _) => match action {
      Action::Press => Some(InputAction::PrimaryPressed),
      Action::Release => Some(InputAction::PrimaryReleased),
      _ => None,
    },

    WindowEvent::MouseButton(MouseButton::Button2, action, _) => match action {
      Action::Press => Some(InputAction::SecondaryPressed),
      Action::Release => Some(InputAction::SecondaryReleased),
      _ => None,
    },

    WindowEvent::CursorPos(x, y) => Some(InputAction::CursorMoved {
      x: x as _,
      y: y as _,
    }),

    WindowEvent::FramebufferSize(width, height) => Some(InputAction::Resized {
      width: width.max(0) as _,
      height: height.max(0) as _,
    }),

    WindowEvent::Scroll(_, amount) => Some(InputAction::VScroll {
      amount: amount as f32,
    }),

    _ => None,
  }
}

examples! {
  "shader-fractal", shader_fractal,
  "recursive-donut", recursive_donut,
  "heart", heart,
}

fn main() {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
  let cli_opts = CLIOpts::from_args();

  if cli_opts.list_examples {
    show_available_examples();
  } else {
    process::exit(pick_and_run_example(cli_opts));
  }
}
