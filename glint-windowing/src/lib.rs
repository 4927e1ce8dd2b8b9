//! # glint windowing
//!
//! This is the base, abstract crate for windowing common types in glint. The `glint` crate
//! abstracts over shader programs, but it doesn’t give you a way to create an OpenGL context.
//! Creating and managing contexts is tightly related to the kind of application you target, so
//! it’s left to the `glint-*` windowing crates (`glint-glfw`, for instance). They all share the
//! types of this crate to describe the window they open:
//!
//! - [`WindowDim`]: dimension of a window and its mode (windowed, fullscreen, fullscreen
//!   restricted).
//! - [`WindowOpt`]: hints to customize the window integration, such as whether the cursor should
//!   be hidden or whether buffer swaps wait for the vertical retrace.

#![deny(missing_docs)]

/// Dimension metrics.
///
///   - `Windowed` opens in windowed mode with the wished resolution.
///   - `Fullscreen` opens in fullscreen mode by using the primary monitor resolution.
///   - `FullscreenRestricted` is a mix between `Windowed` and `Fullscreen`. It opens in
///     fullscreen mode by using the wished resolution.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowDim {
  /// Windowed mode.
  Windowed {
    /// Width of the window.
    width: u32,
    /// Height of the window.
    height: u32,
  },
  /// Fullscreen mode (adapt to your screen).
  Fullscreen,
  /// Fullscreen mode with restricted viewport dimension.
  FullscreenRestricted {
    /// Width of the window.
    width: u32,
    /// Height of the window.
    height: u32,
  },
}

/// Cursor mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CursorMode {
  /// The cursor is always visible.
  Visible,
  /// The cursor exists yet has been disabled.
  Invisible,
  /// The cursor is disabled and grabbed by the window.
  Disabled,
}

/// Different window options.
///
/// Feel free to look at the different methods available to tweak the options. You may want to
/// start with `default()` though.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowOpt {
  dim: WindowDim,
  cursor_mode: CursorMode,
  num_samples: Option<u32>,
  vsync: bool,
}

impl Default for WindowOpt {
  /// Defaults:
  ///
  /// - `dim` set to `WindowDim::Windowed { width: 800, height: 600 }`.
  /// - `cursor_mode` set to `CursorMode::Visible`.
  /// - `num_samples` set to `None`.
  /// - `vsync` set to `true`.
  fn default() -> Self {
    WindowOpt {
      dim: WindowDim::Windowed {
        width: 800,
        height: 600,
      },
      cursor_mode: CursorMode::Visible,
      num_samples: None,
      vsync: true,
    }
  }
}

impl WindowOpt {
  /// Set the dimension of the window.
  #[inline]
  pub fn set_dim(self, dim: WindowDim) -> Self {
    WindowOpt { dim, ..self }
  }

  /// Get the dimension of the window.
  #[inline]
  pub fn dim(&self) -> &WindowDim {
    &self.dim
  }

  /// Hide, unhide or disable the cursor. Default to `CursorMode::Visible`.
  #[inline]
  pub fn set_cursor_mode(self, cursor_mode: CursorMode) -> Self {
    WindowOpt {
      cursor_mode,
      ..self
    }
  }

  /// Get the cursor mode.
  #[inline]
  pub fn cursor_mode(&self) -> CursorMode {
    self.cursor_mode
  }

  /// Set the number of samples to use for multisampling.
  ///
  /// Pass `None` to disable multisampling.
  #[inline]
  pub fn set_num_samples<S>(self, samples: S) -> Self
  where
    S: Into<Option<u32>>,
  {
    WindowOpt {
      num_samples: samples.into(),
      ..self
    }
  }

  /// Get the number of samples to use in multisampling, if any.
  #[inline]
  pub fn num_samples(&self) -> Option<u32> {
    self.num_samples
  }

  /// Synchronize buffer swaps with the vertical retrace.
  #[inline]
  pub fn set_vsync(self, vsync: bool) -> Self {
    WindowOpt { vsync, ..self }
  }

  /// Whether buffer swaps are synchronized with the vertical retrace.
  #[inline]
  pub fn vsync(&self) -> bool {
    self.vsync
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let opt = WindowOpt::default();

    assert_eq!(
      *opt.dim(),
      WindowDim::Windowed {
        width: 800,
        height: 600
      }
    );
    assert_eq!(opt.cursor_mode(), CursorMode::Visible);
    assert_eq!(opt.num_samples(), None);
    assert!(opt.vsync());
  }

  #[test]
  fn builders_only_touch_their_field() {
    let opt = WindowOpt::default()
      .set_dim(WindowDim::Fullscreen)
      .set_num_samples(4)
      .set_vsync(false);

    assert_eq!(*opt.dim(), WindowDim::Fullscreen);
    assert_eq!(opt.num_samples(), Some(4));
    assert!(!opt.vsync());
    assert_eq!(opt.cursor_mode(), CursorMode::Visible);
  }
}
