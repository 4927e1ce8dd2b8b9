//! A camera orbiting around the origin and always looking at it.
//!
//! The camera sits on a sphere of radius `distance`. Its position on that sphere is given by two
//! Euler angles, expressed in degrees: the _pitch_ (rotation around X) and the _yaw_ (rotation
//! around Y).

use cgmath::{
  perspective, Deg, EuclideanSpace as _, InnerSpace as _, Matrix4, Point3, Rad, Vector3,
};

/// Closest distance a fragment can be from the camera.
pub const Z_NEAR: f32 = 0.01;

/// Farthest distance a fragment can be from the camera.
pub const Z_FAR: f32 = 100.;

const MIN_FOV_DEG: f32 = 1.;
const MAX_FOV_DEG: f32 = 45.;
const MAX_PITCH_DEG: f32 = 89.;

/// Orbit camera.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
  position: Vector3<f32>,
  up: Vector3<f32>,
  right: Vector3<f32>,
  pitch: Rad<f32>,
  yaw: Rad<f32>,
  fov: Rad<f32>,
  /// Distance between the camera and the origin.
  pub distance: f32,
  /// Aspect ratio of the viewport, used by the projection.
  pub aspect_ratio: f32,
}

impl OrbitCamera {
  /// Create a camera looking at the origin from the negative Z axis.
  pub fn new(distance: f32, aspect_ratio: f32) -> Self {
    OrbitCamera {
      position: -Vector3::unit_z(),
      up: Vector3::unit_y(),
      right: Vector3::unit_x(),
      pitch: Rad(0.),
      yaw: Deg(-90.).into(),
      fov: Deg(90.).into(),
      distance,
      aspect_ratio,
    }
  }

  /// Unit vector from the origin to the camera.
  pub fn position(&self) -> Vector3<f32> {
    self.position
  }

  /// Up vector of the camera.
  pub fn up(&self) -> Vector3<f32> {
    self.up
  }

  /// Right vector of the camera.
  pub fn right(&self) -> Vector3<f32> {
    self.right
  }

  /// Pitch, in degrees.
  pub fn pitch(&self) -> f32 {
    Deg::from(self.pitch).0
  }

  /// Set the pitch, in degrees. It’s clamped to [-89°, 89°] so that the camera never flips over
  /// the poles.
  pub fn set_pitch(&mut self, degrees: f32) {
    let degrees = degrees.max(-MAX_PITCH_DEG).min(MAX_PITCH_DEG);
    self.pitch = Deg(degrees).into();
    self.update_vectors();
  }

  /// Yaw, in degrees.
  pub fn yaw(&self) -> f32 {
    Deg::from(self.yaw).0
  }

  /// Set the yaw, in degrees.
  pub fn set_yaw(&mut self, degrees: f32) {
    self.yaw = Deg(degrees).into();
    self.update_vectors();
  }

  /// Vertical field of view, in degrees.
  pub fn fov(&self) -> f32 {
    Deg::from(self.fov).0
  }

  /// Vertical field of view, in radians.
  pub fn fov_rad(&self) -> f32 {
    self.fov.0
  }

  /// Set the vertical field of view, in degrees. It’s clamped to [1°, 45°].
  pub fn set_fov(&mut self, degrees: f32) {
    let degrees = degrees.max(MIN_FOV_DEG).min(MAX_FOV_DEG);
    self.fov = Deg(degrees).into();
  }

  /// World to view transformation.
  pub fn view_matrix(&self) -> Matrix4<f32> {
    Matrix4::look_at_rh(
      Point3::from_vec(self.position * self.distance),
      Point3::new(0., 0., 0.),
      self.up,
    )
  }

  /// View to clip transformation.
  pub fn projection_matrix(&self) -> Matrix4<f32> {
    perspective(self.fov, self.aspect_ratio, Z_NEAR, Z_FAR)
  }

  fn update_vectors(&mut self) {
    let (pitch, yaw) = (self.pitch.0, self.yaw.0);

    self.position = Vector3::new(
      pitch.cos() * yaw.cos(),
      pitch.sin(),
      pitch.cos() * yaw.sin(),
    )
    .normalize();

    // right is computed from the global up
    self.right = self.position.cross(Vector3::unit_y()).normalize();
    self.up = self.right.cross(self.position).normalize();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cgmath::{Transform as _, Vector4};

  const EPSILON: f32 = 1e-5;

  fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
    assert!((a - b).magnitude() < EPSILON, "{:?} != {:?}", a, b);
  }

  #[test]
  fn starts_on_negative_z() {
    let mut camera = OrbitCamera::new(3., 1.);
    assert_close(camera.position(), -Vector3::unit_z());
    assert!((camera.yaw() + 90.).abs() < EPSILON);

    // recomputing the vectors from the initial angles changes nothing
    camera.set_yaw(-90.);
    assert_close(camera.position(), -Vector3::unit_z());
    assert_close(camera.up(), Vector3::unit_y());
  }

  #[test]
  fn pitch_is_clamped() {
    let mut camera = OrbitCamera::new(3., 1.);

    camera.set_pitch(120.);
    assert!((camera.pitch() - 89.).abs() < 1e-3);

    camera.set_pitch(-120.);
    assert!((camera.pitch() + 89.).abs() < 1e-3);
    assert!(camera.up().magnitude() > 0.99);
  }

  #[test]
  fn fov_is_clamped() {
    let mut camera = OrbitCamera::new(3., 1.);

    camera.set_fov(0.);
    assert!((camera.fov() - 1.).abs() < 1e-3);

    camera.set_fov(60.);
    assert!((camera.fov() - 45.).abs() < 1e-3);
    assert!((camera.fov_rad() - std::f32::consts::FRAC_PI_4).abs() < EPSILON);
  }

  #[test]
  fn position_stays_on_the_unit_sphere() {
    let mut camera = OrbitCamera::new(3., 1.);
    camera.set_yaw(30.);
    camera.set_pitch(40.);

    assert!((camera.position().magnitude() - 1.).abs() < EPSILON);
    assert!(camera.right().dot(camera.position()).abs() < EPSILON);
    assert!(camera.up().dot(camera.position()).abs() < EPSILON);
  }

  #[test]
  fn view_puts_the_origin_in_front_of_the_camera() {
    let mut camera = OrbitCamera::new(5., 16. / 9.);
    camera.set_yaw(10.);
    camera.set_pitch(25.);

    let origin = camera.view_matrix().transform_point(Point3::origin());
    assert_close(origin.to_vec(), Vector3::new(0., 0., -5.));
  }

  #[test]
  fn projection_maps_clip_planes_to_the_depth_range() {
    let camera = OrbitCamera::new(3., 16. / 9.);
    let projection = camera.projection_matrix();

    let ndc_depth = |z: f32| {
      let clip = projection * Vector4::new(0., 0., -z, 1.);
      clip.z / clip.w
    };

    assert!((ndc_depth(Z_NEAR) + 1.).abs() < 1e-3);
    assert!((ndc_depth(Z_FAR) - 1.).abs() < 1e-3);

    // a 90° field of view: the vertical scale is 1 and the horizontal one follows the aspect ratio
    assert!((projection.y.y - 1.).abs() < EPSILON);
    assert!((projection.x.x - 9. / 16.).abs() < EPSILON);
  }
}
