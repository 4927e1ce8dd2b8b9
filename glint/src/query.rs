//! Driver information.
//!
//! Drivers describe themselves with a handful of strings. glint gathers them in a [`DriverInfo`],
//! mostly to log them when a context starts, since shader diagnostics are driver-specific.

use std::fmt;

/// What the driver reports about itself.
///
/// Drivers may leave any of those empty.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct DriverInfo {
  /// Company responsible for the driver.
  pub vendor: Option<String>,
  /// Name of the renderer, usually the GPU model.
  pub renderer: Option<String>,
  /// Version of the graphics API the driver implements.
  pub version: Option<String>,
  /// Version of the shading language the driver compiles.
  pub shading_language_version: Option<String>,
}

impl DriverInfo {
  /// Labelled fields, in display order.
  pub fn entries(&self) -> [(&'static str, Option<&str>); 4] {
    [
      ("vendor", self.vendor.as_deref()),
      ("renderer", self.renderer.as_deref()),
      ("version", self.version.as_deref()),
      ("shading language", self.shading_language_version.as_deref()),
    ]
  }
}

impl fmt::Display for DriverInfo {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    for (i, (label, value)) in self.entries().iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }

      write!(f, "{}: {}", label, value.unwrap_or("unknown"))?;
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_fields_are_unknown() {
    let info = DriverInfo {
      vendor: Some("Mesa".to_owned()),
      shading_language_version: Some("4.60".to_owned()),
      ..DriverInfo::default()
    };

    assert_eq!(
      info.to_string(),
      "vendor: Mesa, renderer: unknown, version: unknown, shading language: 4.60"
    );
    assert_eq!(info.entries()[1], ("renderer", None));
  }
}
