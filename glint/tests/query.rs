mod common;

use common::SoftContext;
use glint::context::GraphicsContext;

#[test]
fn context_describes_its_driver() {
  let mut ctx = SoftContext::new();
  let info = ctx.driver_info();

  assert_eq!(info.renderer.as_deref(), Some("soft"));
  assert_eq!(info.shading_language_version, None);
  assert_eq!(
    info.to_string(),
    "vendor: glint, renderer: soft, version: 3.3, shading language: unknown"
  );
}
