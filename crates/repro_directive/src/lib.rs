//! REPRO Directive Parser
//!
//! Unpacks a repro blob into virtual files and option assignments.
//!
//! ```text
//! // @strict
//! // @module: umd
//! // @filename: a.ts
//! export const m: number = 23;
//! // @filename: b.ts
//! import { m } from "./a";
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod directive;
pub mod reader;
pub mod repro;

pub use directive::{Directive, FILENAME_DIRECTIVE};
pub use reader::ReproReader;
pub use repro::{DEFAULT_FILE_NAME, Repro, ReproEntry, ReproTarget, load_repro};
