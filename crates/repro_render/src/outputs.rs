//! Emitted file listing.

use indexmap::IndexMap;

/// Header line introducing one emitted file
#[must_use]
pub fn output_header(path: &str) -> String {
    format!("--- output {path} ---")
}

/// List emitted files in write order, each under an `--- output <path> ---` header
///
/// Trailing line breaks of each file are dropped so listings join cleanly.
#[must_use]
pub fn render_outputs(outputs: &IndexMap<String, String>) -> String {
    outputs
        .iter()
        .map(|(path, text)| {
            format!(
                "{}\n{}",
                output_header(path),
                text.trim_end_matches(['\r', '\n'])
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
