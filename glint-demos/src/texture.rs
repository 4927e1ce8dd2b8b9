//! 2D textures sampled by the demos.
//!
//! Images are loaded with the `image` crate, flipped so that their first row is the bottom one (the
//! way OpenGL expects texels) and uploaded as RGBA8.

use gl::types::*;
use glint::context::GraphicsContext;
use glint_gl::GL33;
use image::{ImageError, Rgba, RgbaImage};
use std::f32::consts::PI;
use std::path::Path;
use std::{error, fmt};

/// Errors that can happen while loading or creating a texture.
#[derive(Debug)]
pub enum TextureError {
  /// The image couldn’t be read or decoded.
  Image(ImageError),

  /// The image is too large for the driver.
  TooLarge { width: u32, height: u32 },
}

impl fmt::Display for TextureError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      TextureError::Image(ref e) => write!(f, "cannot load image: {}", e),
      TextureError::TooLarge { width, height } => {
        write!(f, "image too large: {}×{}", width, height)
      }
    }
  }
}

impl error::Error for TextureError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      TextureError::Image(e) => Some(e),
      TextureError::TooLarge { .. } => None,
    }
  }
}

impl From<ImageError> for TextureError {
  fn from(e: ImageError) -> Self {
    TextureError::Image(e)
  }
}

/// Load an image from disk, ready to be uploaded.
pub fn load_image(path: impl AsRef<Path>) -> Result<RgbaImage, TextureError> {
  let img = image::open(path)?;
  Ok(img.flipv().to_rgba8())
}

/// A one-pixel-high color ramp.
///
/// Used when no palette image is available.
pub fn palette_gradient(width: u32) -> RgbaImage {
  let last = width.saturating_sub(1).max(1) as f32;

  RgbaImage::from_fn(width, 1, |x, _| {
    let t = x as f32 / last;
    let channel = |phase: f32| {
      let c = 0.5 + 0.5 * (2. * PI * (t + phase)).cos();
      (c * 255.).round() as u8
    };

    Rgba([channel(0.), channel(0.33), channel(0.67), 255])
  })
}

/// A 2D RGBA texture living on the GPU.
#[derive(Debug)]
pub struct Texture {
  handle: GLuint,
}

impl Texture {
  /// Upload `image`.
  ///
  /// The texture uses linear filtering, repeats in both directions and gets a full mipmap chain.
  pub fn new(
    context: &mut impl GraphicsContext<Backend = GL33>,
    image: &RgbaImage,
  ) -> Result<Self, TextureError> {
    let (width, height) = image.dimensions();
    let too_large = || TextureError::TooLarge { width, height };
    let w = GLsizei::try_from(width).map_err(|_| too_large())?;
    let h = GLsizei::try_from(height).map_err(|_| too_large())?;

    let gl33 = context.backend();
    let mut handle: GLuint = 0;

    unsafe { gl::GenTextures(1, &mut handle) };
    gl33.bind_texture_2d(handle);

    unsafe {
      gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::REPEAT as GLint);
      gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::REPEAT as GLint);
      gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
      gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);

      gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
      gl::TexImage2D(
        gl::TEXTURE_2D,
        0,
        gl::RGBA8 as GLint,
        w,
        h,
        0,
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        image.as_raw().as_ptr() as *const _,
      );
      gl::GenerateMipmap(gl::TEXTURE_2D);
    }

    gl33.bind_texture_2d(0);

    Ok(Texture { handle })
  }

  /// Bind the texture to the texture unit `unit`.
  ///
  /// Sampler uniforms reading this texture must be set to `unit`.
  pub fn bind(&self, context: &mut impl GraphicsContext<Backend = GL33>, unit: u32) {
    let gl33 = context.backend();
    gl33.set_texture_unit(unit);
    gl33.bind_texture_2d(self.handle);
  }
}

impl Drop for Texture {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteTextures(1, &self.handle);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gradient_is_a_single_opaque_row() {
    let gradient = palette_gradient(64);

    assert_eq!(gradient.dimensions(), (64, 1));
    assert!(gradient.pixels().all(|p| p[3] == 255));
    // the red channel starts at full intensity
    assert_eq!(gradient.get_pixel(0, 0)[0], 255);
    assert_eq!(gradient.get_pixel(63, 0)[0], 255);
    assert!(gradient.get_pixel(32, 0)[0] < 10);
  }

  #[test]
  fn tiny_gradients() {
    assert_eq!(palette_gradient(0).dimensions(), (0, 1));
    assert_eq!(palette_gradient(1).get_pixel(0, 0)[0], 255);
  }

  #[test]
  fn missing_images_are_reported() {
    let err = load_image("no/such/palette.png").unwrap_err();

    assert!(matches!(err, TextureError::Image(_)));
    assert!(err.to_string().starts_with("cannot load image: "));
  }
}
