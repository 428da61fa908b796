//! One backend bound to one project store.

use crate::backend::Backend;
use indexmap::IndexMap;
use repro_core::{Diagnostic, HarnessError, HarnessFlags, HarnessResult, OptionSet};
use repro_directive::{Repro, ReproTarget, load_repro};
use repro_host::VirtualProjectStore;
use repro_render::render_diagnostic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Output of a compile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileResult {
    /// Emitted text by output path, in first-write order
    pub emitted_files: IndexMap<String, String>,
    /// Syntactic, semantic, global, declaration, option, then emit diagnostics
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile session
///
/// Holds the store, the ordered root list, and the option set for a single
/// compile. A session compiles at most once.
pub struct Session {
    /// Version label this session was created under
    label: String,
    /// Backend driving the compile
    backend: Arc<dyn Backend>,
    /// Virtual project
    store: VirtualProjectStore,
    /// Entry points in insertion order
    root_files: Vec<String>,
    /// Options forwarded to the backend
    options: OptionSet,
    /// Options consumed by the harness
    flags: HarnessFlags,
    /// Whether `compile` already ran
    compiled: bool,
}

impl Session {
    /// Create a session for `backend`, reading library files from `lib_dir`
    #[must_use]
    pub fn new(label: impl Into<String>, backend: Arc<dyn Backend>, lib_dir: impl Into<PathBuf>) -> Self {
        let store = VirtualProjectStore::new(backend.services(), lib_dir);
        let options = backend.default_options();
        Self {
            label: label.into(),
            backend,
            store,
            root_files: Vec::new(),
            options,
            flags: HarnessFlags::default(),
            compiled: false,
        }
    }

    /// Version label
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Backend version identifier
    #[must_use]
    pub fn backend_version(&self) -> &str {
        self.backend.version()
    }

    /// Current backend options
    #[must_use]
    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    /// Current harness flags
    #[must_use]
    pub fn flags(&self) -> HarnessFlags {
        self.flags
    }

    /// Root files in the order they were added
    #[must_use]
    pub fn root_files(&self) -> &[String] {
        &self.root_files
    }

    /// Project store
    #[must_use]
    pub fn store(&self) -> &VirtualProjectStore {
        &self.store
    }

    /// Add an entry-point file
    pub fn add_root_file(&mut self, path: &str, content: &str) {
        self.store.add_file(path, content);
        self.root_files.push(path.to_string());
    }

    /// Add a file reachable only through imports
    pub fn add_extra_file(&mut self, path: &str, content: &str) {
        self.store.add_file(path, content);
    }

    /// Assign an option from its raw text
    ///
    /// Harness-internal names are tried first, then the backend catalog.
    ///
    /// # Errors
    ///
    /// Returns `UnknownOption` if the name matches nothing, or
    /// `InvalidOptionValue` if the value does not parse. The option set is
    /// unchanged on error.
    pub fn set_option(&mut self, name: &str, raw: &str) -> HarnessResult<()> {
        if let Some(result) = self.flags.apply(name, raw) {
            return result;
        }
        let decl = self
            .backend
            .option_catalog()
            .lookup(name)
            .ok_or_else(|| HarnessError::UnknownOption {
                name: name.to_string(),
            })?;
        let value = decl.parse_value(raw)?;
        debug!(option = %decl.name, ?value, "option set");
        self.options.set(&decl.name, value);
        Ok(())
    }

    /// Parse a repro blob and apply it to this session
    ///
    /// # Errors
    ///
    /// Returns the first option error; nothing after it is applied
    pub fn load_repro(&mut self, text: &str, default_file_name: &str) -> HarnessResult<Repro> {
        load_repro(self, text, default_file_name)
    }

    /// Run the backend once
    ///
    /// # Errors
    ///
    /// Returns `SessionConsumed` on a second call, or any fatal host error
    pub fn compile(&mut self) -> HarnessResult<CompileResult> {
        if self.compiled {
            return Err(HarnessError::SessionConsumed);
        }
        self.compiled = true;

        info!(
            version = self.backend.version(),
            roots = self.root_files.len(),
            "compiling"
        );
        let program = self
            .backend
            .create_program(&self.root_files, &self.options, &mut self.store)?;

        let mut diagnostics = Vec::new();
        diagnostics.extend(program.syntactic_diagnostics());
        diagnostics.extend(program.semantic_diagnostics());
        diagnostics.extend(program.global_diagnostics());
        diagnostics.extend(program.declaration_diagnostics());
        diagnostics.extend(program.options_diagnostics());
        diagnostics.extend(program.emit(&mut self.store));

        debug!(
            diagnostics = diagnostics.len(),
            outputs = self.store.outputs().len(),
            "compile finished"
        );
        Ok(CompileResult {
            emitted_files: self.store.outputs().clone(),
            diagnostics,
        })
    }

    /// Render diagnostics against this session's sources
    #[must_use]
    pub fn render_diagnostics(&self, diagnostics: &[Diagnostic]) -> Vec<String> {
        diagnostics
            .iter()
            .map(|d| {
                let source = d
                    .location
                    .as_ref()
                    .and_then(|loc| self.store.source_text(&loc.file));
                render_diagnostic(d, source.as_deref())
            })
            .collect()
    }
}

impl ReproTarget for Session {
    fn add_root_file(&mut self, name: &str, content: &str) {
        Session::add_root_file(self, name, content);
    }

    fn set_option(&mut self, name: &str, raw: &str) -> HarnessResult<()> {
        Session::set_option(self, name, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{ReferenceBackend, bundled_lib_dir};
    use repro_core::OptionValue;

    fn make_session() -> Session {
        Session::new(
            "latest",
            Arc::new(ReferenceBackend::new("3.0.0")),
            bundled_lib_dir(),
        )
    }

    #[test]
    fn test_root_file_order() {
        let mut session = make_session();
        session.add_root_file("b.ts", "let b = 1;");
        session.add_root_file("a.ts", "let a = 1;");
        session.add_extra_file("c.ts", "let c = 1;");
        assert_eq!(session.root_files(), &["b.ts".to_string(), "a.ts".to_string()]);
        assert_eq!(session.store().files().len(), 3);
    }

    #[test]
    fn test_set_option_case_insensitive() {
        let mut session = make_session();
        session.set_option("STRICTNULLCHECKS", "true").unwrap();
        session.set_option("module", "UMD").unwrap();
        session.set_option("lib", "es5, dom").unwrap();
        assert!(session.options().flag("strictNullChecks"));
        assert_eq!(session.options().choice("module"), Some("umd"));
        assert_eq!(
            session.options().get("lib"),
            Some(&OptionValue::List(vec![
                OptionValue::String("es5".to_string()),
                OptionValue::String("dom".to_string()),
            ]))
        );
    }

    #[test]
    fn test_set_unknown_option_leaves_set_unchanged() {
        let mut session = make_session();
        session.set_option("declaration", "true").unwrap();
        let before = session.options().clone();
        let err = session.set_option("notARealOption", "1").unwrap_err();
        assert_eq!(
            err,
            HarnessError::UnknownOption {
                name: "notARealOption".to_string()
            }
        );
        assert_eq!(session.options(), &before);
    }

    #[test]
    fn test_invalid_enum_value_lists_allowed() {
        let mut session = make_session();
        let err = session.set_option("target", "es1999").unwrap_err();
        match err {
            HarnessError::InvalidOptionValue { expected, .. } => {
                assert!(expected.contains("'es5'"));
                assert!(expected.contains("'esnext'"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(!session.options().contains("target"));
    }

    #[test]
    fn test_regress_is_harness_internal() {
        let mut session = make_session();
        session.set_option("regress", "true").unwrap();
        assert!(session.flags().regress);
        assert!(!session.options().contains("regress"));
    }

    #[test]
    fn test_load_repro() {
        let mut session = make_session();
        session
            .load_repro(
                "// @declaration: true\n// @filename: a.ts\nexport const m = 1;\n",
                "repro.ts",
            )
            .unwrap();
        assert_eq!(session.root_files(), &["a.ts".to_string()]);
        assert!(session.options().flag("declaration"));
        assert_eq!(
            session.store().source_text("a.ts").as_deref(),
            Some("export const m = 1;\r\n")
        );
    }

    #[test]
    fn test_type_mismatch_scenario() {
        let mut session = make_session();
        session.add_root_file("repro.ts", "let x: number = \"s\";");
        let result = session.compile().unwrap();
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, 2322);

        let rendered = session.render_diagnostics(&result.diagnostics);
        let lines: Vec<&str> = rendered[0].split('\n').collect();
        assert_eq!(lines[0], "repro.ts:1 let x: number = \"s\";");
        assert_eq!(lines[1], format!("{}~~~", " ".repeat(27)));
        assert!(lines[2].contains("2322"));
    }

    #[test]
    fn test_compile_category_order() {
        let mut session = make_session();
        for (name, raw) in [
            ("declaration", "true"),
            ("noEmit", "true"),
            ("noLib", "true"),
            ("isolatedDeclarations", "true"),
        ] {
            session.set_option(name, raw).unwrap();
        }
        session.add_root_file("a.ts", "let a = ;");
        session.add_root_file(
            "b.ts",
            "let x: number = \"s\";\nlet base = 1;\nexport let y = base;",
        );
        let result = session.compile().unwrap();
        let codes: Vec<u32> = result.diagnostics.iter().map(|d| d.code).collect();

        let globals = codes.iter().filter(|&&code| code == 2318).count();
        assert!(globals > 0);
        let mut expected = vec![1109, 2322];
        expected.extend(std::iter::repeat(2318).take(globals));
        expected.extend([9010, 5053]);
        assert_eq!(codes, expected);
        assert!(result.emitted_files.is_empty());
    }

    #[test]
    fn test_extra_file_is_not_a_root() {
        let mut session = make_session();
        session.add_root_file("a.ts", "let a = 1;");
        session.add_extra_file("b.ts", "let b: number = \"s\";");
        let result = session.compile().unwrap();
        assert!(result.diagnostics.is_empty());
        let outputs: Vec<&str> = result.emitted_files.keys().map(String::as_str).collect();
        assert_eq!(outputs, vec!["a.js"]);
    }

    #[test]
    fn test_imported_extra_file_is_checked_and_emitted() {
        let mut session = make_session();
        session.add_root_file("src/main.ts", "import { m } from \"./util\";\nm;");
        session.add_extra_file("src/util.ts", "export const m: number = \"s\";");
        let result = session.compile().unwrap();
        let codes: Vec<u32> = result.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![2322]);
        assert!(result.emitted_files.contains_key("src/main.js"));
        assert!(result.emitted_files.contains_key("src/util.js"));
    }

    #[test]
    fn test_compile_emits() {
        let mut session = make_session();
        session.add_root_file("a.ts", "let x: number = 1;");
        let result = session.compile().unwrap();
        assert!(result.diagnostics.is_empty());
        assert_eq!(
            result.emitted_files.get("a.js").map(String::as_str),
            Some("var x = 1;\r\n")
        );
    }

    #[test]
    fn test_compile_once() {
        let mut session = make_session();
        session.add_root_file("a.ts", "let a = 1;");
        assert!(session.compile().is_ok());
        assert_eq!(session.compile().unwrap_err(), HarnessError::SessionConsumed);
    }

    #[test]
    fn test_missing_import_target_is_diagnostic() {
        let mut session = make_session();
        session.add_root_file("b.ts", "import { m } from \"./a\";");
        let result = session.compile().unwrap();
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, 2307);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let mut session = make_session();
        session.root_files.push("ghost.ts".to_string());
        let err = session.compile().unwrap_err();
        assert_eq!(
            err,
            HarnessError::MissingVirtualFile {
                path: "/project/ghost.ts".to_string()
            }
        );
    }

    #[test]
    fn test_fresh_sessions_render_identically() {
        let text = "// @strict\nlet a: string = 1;\nlet b = c;\n";
        let render = || {
            let mut session = make_session();
            session.load_repro(text, "repro.ts").unwrap();
            let result = session.compile().unwrap();
            session.render_diagnostics(&result.diagnostics)
        };
        assert_eq!(render(), render());
    }
}
