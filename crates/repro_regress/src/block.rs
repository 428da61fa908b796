//! Per-version output blocks.

use indexmap::IndexMap;
use repro_render::render_outputs;
use serde::{Deserialize, Serialize};

/// What goes into a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOptions {
    /// Rendered diagnostics kept before truncating, `None` keeps all
    pub max_diagnostics: Option<usize>,
    /// Whether the emitted file listing follows the diagnostics
    pub include_outputs: bool,
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self {
            max_diagnostics: None,
            include_outputs: true,
        }
    }
}

impl BlockOptions {
    /// Set the truncation limit
    #[must_use]
    pub fn with_max_diagnostics(mut self, max: Option<usize>) -> Self {
        self.max_diagnostics = max;
        self
    }

    /// Set whether emitted files are listed
    #[must_use]
    pub fn with_outputs(mut self, include: bool) -> Self {
        self.include_outputs = include;
        self
    }
}

/// Join rendered diagnostics and the emitted file listing into one block
///
/// Past the limit, the remaining diagnostics collapse into a single
/// `... N more errors not shown` line.
#[must_use]
pub fn render_block(
    rendered: &[String],
    outputs: &IndexMap<String, String>,
    options: &BlockOptions,
) -> String {
    let limit = options
        .max_diagnostics
        .map_or(rendered.len(), |max| max.min(rendered.len()));
    let mut parts: Vec<String> = rendered[..limit].to_vec();
    if rendered.len() > limit {
        parts.push(format!(
            "... {} more errors not shown",
            rendered.len() - limit
        ));
    }
    if options.include_outputs && !outputs.is_empty() {
        parts.push(render_outputs(outputs));
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostics(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("error {i}")).collect()
    }

    #[test]
    fn test_block_without_limit() {
        let mut outputs = IndexMap::new();
        outputs.insert("a.js".to_string(), "var a = 1;\r\n".to_string());
        let block = render_block(&diagnostics(2), &outputs, &BlockOptions::default());
        assert_eq!(block, "error 0\nerror 1\n--- output a.js ---\nvar a = 1;");
    }

    #[test]
    fn test_truncation() {
        let options = BlockOptions::default().with_max_diagnostics(Some(10));
        let block = render_block(&diagnostics(13), &IndexMap::new(), &options);
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[9], "error 9");
        assert_eq!(lines[10], "... 3 more errors not shown");
    }

    #[test]
    fn test_limit_not_reached() {
        let options = BlockOptions::default().with_max_diagnostics(Some(10));
        let block = render_block(&diagnostics(10), &IndexMap::new(), &options);
        assert!(!block.contains("more errors"));
    }

    #[test]
    fn test_errors_only() {
        let mut outputs = IndexMap::new();
        outputs.insert("a.js".to_string(), "var a;".to_string());
        let options = BlockOptions::default().with_outputs(false);
        assert_eq!(render_block(&[], &outputs, &options), "");
    }
}
