//! OpenGL backends.
//!
//! This crate exports [OpenGL](https://www.khronos.org/opengl/) backends for glint. Pick a
//! backend type (for now, [`GL33`]) and hand it to a windowing crate, such as `glint-glfw`, that
//! creates the OpenGL context and wraps the backend into a graphics context.

pub mod gl33;

pub use gl33::GL33;
