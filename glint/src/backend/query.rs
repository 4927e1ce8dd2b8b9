//! Driver information backend interface.

use crate::query::DriverInfo;

/// Backends able to describe the driver they run on.
pub unsafe trait Query {
  /// Gather the driver information.
  ///
  /// Backends may fetch the strings once and serve them from a cache afterwards.
  fn driver_info(&mut self) -> DriverInfo;
}
