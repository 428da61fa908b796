//! REPRO Host
//!
//! The file-resolution contract a backend compiles against, and the
//! in-memory project store that satisfies it without touching real storage
//! (except for the backend's own bundled library files).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod path;
pub mod store;

pub use contract::{CompilerHost, HostServices, LanguageVersion, SourceHandle};
pub use path::{LIB_ROOT, PROJECT_ROOT, canonicalize, is_library_path};
pub use store::VirtualProjectStore;
