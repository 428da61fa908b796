//! REPRO Backend
//!
//! The contract a pluggable compiler backend implements, the version table
//! that maps keys to installed backends, and the session that drives one
//! compile. A small reference backend ships with the crate so the harness
//! can run end to end.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod reference;
pub mod registry;
pub mod session;

pub use backend::{Backend, Program};
pub use reference::{ReferenceBackend, bundled_lib_dir};
pub use registry::{BackendRegistry, SessionFactory};
pub use session::{CompileResult, Session};
