//! Backend interfacing.
//!
//! Backend types implement the traits of this module to be usable with glint. Those traits are
//! `unsafe`: glint trusts backends to uphold what is documented on each method.

pub mod query;
pub mod shader;
