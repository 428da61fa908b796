//! REPRO Regress
//!
//! Runs one repro against a sequence of backend versions and reports where
//! the rendered output changes from one version to the next. Each version
//! gets a fresh session; a version that fails outright becomes its own
//! entry and the sweep continues.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod diff;
pub mod runner;

pub use block::{BlockOptions, render_block};
pub use diff::{LineChange, diff_lines};
pub use runner::{Outcome, RegressionEntry, RegressionReport, RegressionRunner, RegressionSummary};
