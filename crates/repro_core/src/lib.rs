//! REPRO Core Types
//!
//! Pure types shared by every harness crate: the error taxonomy,
//! backend diagnostics, typed compiler options, and harness configuration.
//! Nothing here performs I/O except loading a configuration file.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod options;

// Re-exports
pub use config::HarnessConfig;
pub use diagnostic::{Diagnostic, DiagnosticCategory, DiagnosticLocation, MessageChain};
pub use error::{HarnessError, HarnessResult};
pub use options::{
    HarnessFlags, OptionCatalog, OptionDecl, OptionKind, OptionSet, OptionValue, PrimitiveKind,
};
