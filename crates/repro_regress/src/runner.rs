//! Cross-version regression runner.
//!
//! Runs one repro against an ordered list of backend versions and compares
//! each rendered block with the block of the version right before it.

use crate::block::{BlockOptions, render_block};
use crate::diff::{LineChange, diff_lines};
use repro_backend::{Backend, SessionFactory};
use repro_core::HarnessResult;
use repro_directive::{DEFAULT_FILE_NAME, Repro};
use repro_render::ReportFormatter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How one version's run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Compiled, possibly with diagnostics
    Compiled {
        /// Number of diagnostics reported
        diagnostics: usize,
        /// Number of files emitted
        outputs: usize,
    },
    /// A fatal harness error stopped the run
    Failed {
        /// Error text
        error: String,
    },
}

impl Outcome {
    /// Check if the run hit a fatal error
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result for one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressionEntry {
    /// Version label
    pub label: String,
    /// Backend version string
    pub version: String,
    /// How the run ended
    pub outcome: Outcome,
    /// Rendered diagnostics and outputs, or the error line
    pub block: String,
    /// Whether the block equals the previous entry's block
    pub same_as_previous: bool,
    /// Line changes against the previous block, empty for the first entry
    pub changes: Vec<LineChange>,
}

/// Counts over a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressionSummary {
    /// Versions run
    pub versions: usize,
    /// Entries whose block differs from the previous one, counting the first
    pub distinct: usize,
    /// Entries that ended in a fatal error
    pub failed: usize,
}

/// Ordered results of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressionReport {
    /// One entry per version, in run order
    pub entries: Vec<RegressionEntry>,
    /// Whether every version was run
    pub regression: bool,
}

impl RegressionReport {
    /// Counts over the entries
    #[must_use]
    pub fn summary(&self) -> RegressionSummary {
        RegressionSummary {
            versions: self.entries.len(),
            distinct: self.entries.iter().filter(|e| !e.same_as_previous).count(),
            failed: self.entries.iter().filter(|e| e.outcome.is_failure()).count(),
        }
    }

    /// First entry whose block differs from the one before it
    #[must_use]
    pub fn first_divergence(&self) -> Option<&RegressionEntry> {
        self.entries
            .iter()
            .skip(1)
            .find(|entry| !entry.same_as_previous)
    }

    /// Render every entry as a section headed by its label
    #[must_use]
    pub fn render(&self, formatter: &dyn ReportFormatter) -> String {
        let mut sections = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let body = if entry.same_as_previous {
                "(same as previous)".to_string()
            } else {
                formatter.literal(&entry.block)
            };
            sections.push(format!("{}\n{body}", formatter.section_header(&entry.label)));
        }
        sections.join("\n")
    }

    /// Render only the changed lines of each entry that differs from its predecessor
    #[must_use]
    pub fn render_changes(&self, formatter: &dyn ReportFormatter) -> String {
        let mut sections = Vec::new();
        for entry in self.entries.iter().filter(|e| e.changes.iter().any(LineChange::is_change)) {
            let lines: Vec<String> = entry.changes.iter().flat_map(LineChange::marked_lines).collect();
            sections.push(format!(
                "{}\n{}",
                formatter.section_header(&entry.label),
                formatter.literal(&lines.join("\n"))
            ));
        }
        sections.join("\n")
    }
}

/// Runs a repro against several backend versions
#[derive(Debug, Clone)]
pub struct RegressionRunner {
    factories: Vec<SessionFactory>,
    default_file_name: String,
    force: bool,
    block: BlockOptions,
}

impl RegressionRunner {
    /// Create a runner over factories in the order given
    #[must_use]
    pub fn new(factories: Vec<SessionFactory>) -> Self {
        Self {
            factories,
            default_file_name: DEFAULT_FILE_NAME.to_string(),
            force: false,
            block: BlockOptions::default(),
        }
    }

    /// Run every version even when the repro does not ask for it
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Name of the file that collects text before any `@filename`
    #[must_use]
    pub fn with_default_file_name(mut self, name: impl Into<String>) -> Self {
        self.default_file_name = name.into();
        self
    }

    /// Block rendering options
    #[must_use]
    pub fn with_block_options(mut self, block: BlockOptions) -> Self {
        self.block = block;
        self
    }

    /// Parse `text` and run it
    #[must_use]
    pub fn run(&self, text: &str) -> RegressionReport {
        let repro = Repro::parse(text, &self.default_file_name);
        self.run_repro(&repro)
    }

    /// Run an already parsed repro
    #[must_use]
    pub fn run_repro(&self, repro: &Repro) -> RegressionReport {
        let regression = self.force || repro.requests_regression();
        let limit = if regression { self.factories.len() } else { 1 };
        info!(versions = limit, regression, "running repro");

        let mut entries: Vec<RegressionEntry> = Vec::with_capacity(limit);
        for factory in self.factories.iter().take(limit) {
            let (version, outcome, block) = match self.run_one(factory, repro) {
                Ok(run) => run,
                Err(e) => {
                    warn!(version = %factory.label, error = %e, "version failed");
                    let error = e.to_string();
                    (
                        factory.backend.version().to_string(),
                        Outcome::Failed {
                            error: error.clone(),
                        },
                        error,
                    )
                }
            };

            let (same_as_previous, changes) = match entries.last() {
                Some(prev) if prev.block == block => (true, Vec::new()),
                Some(prev) => (false, diff_lines(&prev.block, &block)),
                None => (false, Vec::new()),
            };
            debug!(version = %factory.label, same_as_previous, "version done");

            entries.push(RegressionEntry {
                label: factory.label.clone(),
                version,
                outcome,
                block,
                same_as_previous,
                changes,
            });
        }

        RegressionReport {
            entries,
            regression,
        }
    }

    fn run_one(
        &self,
        factory: &SessionFactory,
        repro: &Repro,
    ) -> HarnessResult<(String, Outcome, String)> {
        let mut session = factory.create();
        repro.apply(&mut session)?;
        let result = session.compile()?;
        let rendered = session.render_diagnostics(&result.diagnostics);
        let block = render_block(&rendered, &result.emitted_files, &self.block);
        let outcome = Outcome::Compiled {
            diagnostics: result.diagnostics.len(),
            outputs: result.emitted_files.len(),
        };
        Ok((session.backend_version().to_string(), outcome, block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repro_backend::{Backend, BackendRegistry, ReferenceBackend, bundled_lib_dir};
    use repro_render::{Console, Markdown};
    use std::sync::Arc;

    fn registry(keys: &[&str]) -> BackendRegistry {
        let mut registry = BackendRegistry::new();
        for key in keys {
            let backend: Arc<dyn Backend> = Arc::new(ReferenceBackend::new(key));
            registry.register(key, backend, bundled_lib_dir()).unwrap();
        }
        registry
    }

    fn runner(keys: &[&str]) -> RegressionRunner {
        RegressionRunner::new(registry(keys).session_factories())
    }

    #[test]
    fn test_adjacent_comparison_only() {
        let report = runner(&["2.0.0", "1.0.0", "3.0.0"])
            .with_force(true)
            .run("let x: number = \"s\";");

        assert_eq!(report.entries.len(), 3);
        assert!(report.entries.iter().all(|e| !e.same_as_previous));
        assert_eq!(report.entries[0].block, report.entries[2].block);
        assert_ne!(report.entries[0].block, report.entries[1].block);
        assert!(report.entries[0].block.contains("Type '\"s\"'"));
        assert!(report.entries[1].block.contains("Type 'string'"));
        assert_eq!(report.summary().distinct, 3);
        assert_eq!(report.first_divergence().map(|e| e.label.as_str()), Some("1.0.0"));
    }

    #[test]
    fn test_identical_blocks_collapse() {
        let report = runner(&["3.0.0", "2.0.0"])
            .with_force(true)
            .run("let x: number = \"s\";");
        assert!(!report.entries[0].same_as_previous);
        assert!(report.entries[1].same_as_previous);
        assert!(report.entries[1].changes.is_empty());
        assert!(report.first_divergence().is_none());

        let text = report.render(&Console);
        assert!(text.contains("(same as previous)"));
        assert_eq!(text.matches("Type '\"s\"'").count(), 1);
    }

    #[test]
    fn test_changes_against_previous() {
        let report = runner(&["2.0.0", "1.0.0"])
            .with_force(true)
            .run("let x: number = \"s\";");
        let changes = &report.entries[1].changes;
        assert!(changes.iter().any(|c| matches!(
            c,
            LineChange::Modified { old, new }
                if old.contains("'\"s\"'") && new.contains("'string'")
        )));
    }

    #[test]
    fn test_render_changes() {
        let report = runner(&["3.0.0", "2.0.0", "1.0.0"])
            .with_force(true)
            .run("let x: number = \"s\";");
        let text = report.render_changes(&Console);
        assert!(!text.contains("3.0.0"));
        assert!(!text.contains("2.0.0"));
        assert!(text.contains("1.0.0"));
        assert!(text.contains("- ") && text.contains("'\"s\"'"));
        assert!(text.contains("+ ") && text.contains("'string'"));

        let single = runner(&["3.0.0"]).run("let a = 1;");
        assert!(single.render_changes(&Console).is_empty());
    }

    #[test]
    fn test_only_first_version_without_regress() {
        let report = runner(&["3.0.0", "2.0.0", "1.0.0"]).run("let a = 1;");
        assert!(!report.regression);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].label, "3.0.0");
    }

    #[test]
    fn test_regress_directive_runs_every_version() {
        let report = runner(&["3.0.0", "2.0.0", "1.0.0"]).run("// @regress: true\nlet a = 1;");
        assert!(report.regression);
        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.summary().distinct, 1);
    }

    #[test]
    fn test_failing_version_is_an_entry() {
        let report = runner(&["3.0.0", "2.0.0", "1.0.0"]).run(
            "// @regress: true\n// @isolatedDeclarations: true\n// @declaration: true\nlet base = 1;\nexport let a = base;",
        );
        assert_eq!(report.entries.len(), 3);
        assert!(!report.entries[0].outcome.is_failure());
        assert!(report.entries[0].block.contains("9010"));
        assert_eq!(
            report.entries[1].outcome,
            Outcome::Failed {
                error: "Unknown compiler option \"isolatedDeclarations\"".to_string()
            }
        );
        assert!(report.entries[2].same_as_previous);
        assert_eq!(report.summary().failed, 2);
    }

    #[test]
    fn test_fresh_sessions_are_deterministic() {
        let runner = runner(&["3.0.0"]);
        let first = runner.run("let x: number = \"s\";\nlet y = z;");
        let second = runner.run("let x: number = \"s\";\nlet y = z;");
        assert_eq!(first.entries[0].block, second.entries[0].block);
    }

    #[test]
    fn test_block_options_apply() {
        let text = "let a = q1;\nlet b = q2;\nlet c = q3;";
        let report = runner(&["3.0.0"])
            .with_block_options(
                BlockOptions::default()
                    .with_max_diagnostics(Some(2))
                    .with_outputs(false),
            )
            .run(text);
        let block = &report.entries[0].block;
        assert!(block.ends_with("... 1 more errors not shown"));
        assert!(!block.contains("--- output"));
    }

    #[test]
    fn test_default_file_name() {
        let report = runner(&["3.0.0"])
            .with_default_file_name("input.ts")
            .run("let a = 1;");
        assert!(report.entries[0].block.contains("--- output input.js ---"));
    }

    #[test]
    fn test_markdown_sections() {
        let report = runner(&["3.0.0"]).run("let a = 1;");
        let text = report.render(&Markdown);
        assert!(text.starts_with("**3.0.0**\n```\r\n"));
    }
}
