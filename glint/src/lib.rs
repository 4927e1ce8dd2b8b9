//! # A small shader program wrapper
//!
//! glint wraps the one piece of an OpenGL demo that has a real contract: the _shader program_.
//! A [`Program`] is built from two source texts (a vertex stage and a fragment stage). Both stages
//! are compiled, linked together and then thrown away; the active uniforms of the linked program
//! are enumerated once and cached by name so that writing a uniform later on is a table lookup
//! instead of a driver round-trip.
//!
//! glint is not a renderer. It doesn’t know about buffers, textures, framebuffers or draw calls.
//! Those are left to the code driving the frame loop.
//!
//! # Backends
//!
//! glint itself never talks to a graphics API. Every driver operation goes through the traits
//! in [`backend`], which are implemented by _backend types_ living in other crates (for
//! instance `glint-gl` and its OpenGL 3.3 `GL33` type). Backend interfaces are `unsafe trait`s:
//! implementing them wrongly breaks the guarantees glint gives to its users.
//!
//! # Graphics context
//!
//! Every operation takes a [`GraphicsContext`] explicitly. A context is the capability to use a
//! backend on the thread that owns the driver; it cannot be sent or shared between threads, so the
//! single-threaded nature of graphics drivers shows up in the signatures instead of being a
//! convention.
//!
//! # Quick look
//!
//! ```ignore
//! let mut program = Program::from_strings(&mut ctx, VS, FS)?;
//!
//! // in the frame loop
//! let mut iface = program.activate(&mut ctx);
//! iface.set("time", t)?;
//! iface.set("resolution", Vec2::new(w, h))?;
//! ```
//!
//! [`Program`]: crate::shader::Program
//! [`GraphicsContext`]: crate::context::GraphicsContext

#![deny(missing_docs)]

pub mod backend;
pub mod context;
pub mod query;
pub mod shader;
