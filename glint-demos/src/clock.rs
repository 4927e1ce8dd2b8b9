//! Time keeping for the demos.

/// Animation time runs at this fraction of the wall time.
const TIME_SCALE: f32 = 0.25;

/// Animation clock that can be paused.
///
/// The clock is fed with the wall time every frame and advances its own time by a quarter of the
/// elapsed wall time, unless it’s paused.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationClock {
  time: f32,
  last_wall_t: Option<f32>,
  running: bool,
}

impl Default for AnimationClock {
  fn default() -> Self {
    Self::new()
  }
}

impl AnimationClock {
  /// Create a running clock starting at zero.
  pub fn new() -> Self {
    AnimationClock {
      time: 0.,
      last_wall_t: None,
      running: true,
    }
  }

  /// Feed the clock with the current wall time, in seconds, and return the animation time.
  pub fn tick(&mut self, wall_t: f32) -> f32 {
    let dt = self.last_wall_t.map_or(0., |last| (wall_t - last).max(0.));
    self.last_wall_t = Some(wall_t);

    if self.running {
      self.time += dt * TIME_SCALE;
    }

    self.time
  }

  /// Pause a running clock or resume a paused one.
  pub fn toggle(&mut self) {
    self.running = !self.running;
  }

  /// Current animation time.
  pub fn time(&self) -> f32 {
    self.time
  }

  pub fn is_running(&self) -> bool {
    self.running
  }
}

/// Frames-per-second counter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FpsCounter {
  frames: u32,
  elapsed: f32,
}

impl FpsCounter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Count a frame that lasted `dt` seconds.
  ///
  /// Once at least one second has been accumulated, the number of frames rendered during that
  /// period is returned and the counter starts over.
  pub fn tick(&mut self, dt: f32) -> Option<u32> {
    self.frames += 1;
    self.elapsed += dt.max(0.);

    if self.elapsed >= 1. {
      let fps = self.frames;
      self.frames = 0;
      self.elapsed = 0.;
      Some(fps)
    } else {
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clock_runs_at_a_quarter_of_wall_time() {
    let mut clock = AnimationClock::new();

    assert_eq!(clock.tick(10.), 0.);
    assert_eq!(clock.tick(12.), 0.5);
    assert_eq!(clock.tick(14.), 1.);
  }

  #[test]
  fn paused_clock_keeps_its_time() {
    let mut clock = AnimationClock::new();
    clock.tick(0.);
    clock.tick(4.);

    clock.toggle();
    assert!(!clock.is_running());
    assert_eq!(clock.tick(8.), 1.);
    assert_eq!(clock.time(), 1.);

    // no catch up on resume
    clock.toggle();
    assert_eq!(clock.tick(12.), 2.);
  }

  #[test]
  fn wall_time_going_backward_is_ignored() {
    let mut clock = AnimationClock::new();
    clock.tick(4.);
    clock.tick(8.);

    assert_eq!(clock.tick(2.), 1.);
    assert_eq!(clock.tick(6.), 2.);
  }

  #[test]
  fn fps_is_reported_once_per_second() {
    let mut fps = FpsCounter::new();

    for _ in 0..3 {
      assert_eq!(fps.tick(0.25), None);
    }
    assert_eq!(fps.tick(0.25), Some(4));
    assert_eq!(fps.tick(0.5), None);
  }
}
