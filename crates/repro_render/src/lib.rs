//! REPRO Render
//!
//! Turns backend diagnostics into text: the offending source line, a tilde
//! underline beneath the span, and a `category code: message` line. Also
//! lists emitted files and decorates reports as Markdown or console text.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagnostic;
pub mod outputs;
pub mod report;

pub use diagnostic::{TAB_WIDTH, render_diagnostic};
pub use outputs::{output_header, render_outputs};
pub use report::{Console, Markdown, ReportFormatter, formatter};
