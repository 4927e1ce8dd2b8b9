//! Platform services implementation.

use crate::CLIOpts;
use glint_demos::texture::{load_image, TextureError};
use glint_demos::{Features, PlatformServices};
use std::{collections::HashMap, error::Error, fmt};

/// Desktop implementation of the [`PlatformServices`] API.
///
/// Textures are loaded from the directory passed with `--textures` when the services are created.
/// A texture that can’t be loaded is only reported when the example asks for it.
#[derive(Debug)]
pub struct DesktopPlatformServices {
  textures: HashMap<String, Result<image::RgbaImage, TextureError>>,
}

impl DesktopPlatformServices {
  pub fn new(cli_opts: &CLIOpts, features: Features) -> Self {
    let textures = match cli_opts.textures {
      Some(ref texture_root) => features
        .textures()
        .iter()
        .map(|name| {
          let path = texture_root.join(name);
          log::info!("loading texture {}", path.display());
          (name.clone(), load_image(&path))
        })
        .collect(),

      None => {
        if !features.textures().is_empty() {
          log::warn!("no texture directory; pass one with --textures");
        }

        HashMap::new()
      }
    };

    Self { textures }
  }
}

#[derive(Debug)]
pub enum DesktopFetchError {
  UnknownTexture(String),
  CannotLoad(String, String),
}

impl fmt::Display for DesktopFetchError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      DesktopFetchError::UnknownTexture(ref name) => write!(f, "unknown texture: {}", name),
      DesktopFetchError::CannotLoad(ref name, ref reason) => {
        write!(f, "cannot fetch texture {}: {}", name, reason)
      }
    }
  }
}

impl Error for DesktopFetchError {}

impl PlatformServices for DesktopPlatformServices {
  type FetchError = DesktopFetchError;

  fn fetch_texture(
    &mut self,
    name: impl AsRef<str>,
  ) -> Result<&image::RgbaImage, Self::FetchError> {
    let name = name.as_ref();

    match self.textures.get(name) {
      Some(Ok(texture)) => Ok(texture),
      Some(Err(e)) => Err(DesktopFetchError::CannotLoad(name.to_owned(), e.to_string())),
      None => Err(DesktopFetchError::UnknownTexture(name.to_owned())),
    }
  }
}
