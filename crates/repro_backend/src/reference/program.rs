//! Program construction and diagnostic categories.

use super::checker::{self, CheckOutput};
use super::emit;
use super::syntax::{ParsedFile, Stmt};
use super::{Dialect, target_code};
use crate::backend::Program;
use repro_core::{Diagnostic, HarnessResult, OptionSet};
use repro_host::{CompilerHost, LanguageVersion, PROJECT_ROOT, SourceHandle, is_library_path};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Global types a program needs from its default library
const GLOBAL_TYPES: &[&str] = &[
    "Array",
    "Boolean",
    "Function",
    "IArguments",
    "Number",
    "Object",
    "RegExp",
    "String",
];

/// One file in a program
#[derive(Debug, Clone)]
pub(crate) struct SourceUnit {
    /// Parsed file; its name is the one the file was first requested under
    pub parsed: Arc<ParsedFile>,
    /// Canonical path
    pub key: String,
    /// Whether this is the default library
    pub is_lib: bool,
    /// Statement index of each resolved import to the unit it names
    pub imports: HashMap<usize, usize>,
}

/// Checked program over a fixed set of units
pub(crate) struct ReferenceProgram {
    options: OptionSet,
    units: Vec<SourceUnit>,
    checked: CheckOutput,
}

impl ReferenceProgram {
    /// Load roots and everything they import, then check
    ///
    /// # Errors
    ///
    /// Returns error if a root or the default library cannot be read
    pub(crate) fn build(
        dialect: Dialect,
        roots: &[String],
        options: &OptionSet,
        host: &mut dyn CompilerHost,
    ) -> HarnessResult<Self> {
        let version = LanguageVersion(target_code(options));
        let mut units = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut pending = Vec::new();

        if !options.flag("noLib") {
            let lib = host.default_lib_file_name(options);
            let parsed = load(host, &lib, version)?;
            index.insert(lib.clone(), units.len());
            units.push(SourceUnit {
                parsed,
                key: lib,
                is_lib: true,
                imports: HashMap::new(),
            });
        }

        let mut queue: VecDeque<String> = roots.iter().cloned().collect();
        while let Some(path) = queue.pop_front() {
            let key = host.canonical_file_name(&path);
            if index.contains_key(&key) {
                continue;
            }
            let parsed = load(host, &path, version)?;
            for (stmt, statement) in parsed.statements().iter().enumerate() {
                if let Stmt::Import(decl) = statement {
                    if let Some(target) = resolve_module(&*host, &key, &decl.module) {
                        queue.push_back(display_name(&target).to_string());
                        pending.push((units.len(), stmt, target));
                    }
                }
            }
            index.insert(key.clone(), units.len());
            units.push(SourceUnit {
                parsed,
                key,
                is_lib: false,
                imports: HashMap::new(),
            });
        }

        for (unit, stmt, target) in pending {
            if let Some(&resolved) = index.get(&target) {
                units[unit].imports.insert(stmt, resolved);
            }
        }

        debug!(files = units.len(), "program loaded");
        let checked = checker::check(&units, options, dialect);
        Ok(Self {
            options: options.clone(),
            units,
            checked,
        })
    }

    fn sources(&self) -> impl Iterator<Item = &SourceUnit> {
        self.units.iter().filter(|unit| !unit.is_lib)
    }
}

fn load(
    host: &mut dyn CompilerHost,
    path: &str,
    version: LanguageVersion,
) -> HarnessResult<Arc<ParsedFile>> {
    let handle = host.source_handle(path, version)?;
    Ok(match Arc::clone(&handle).into_any().downcast::<ParsedFile>() {
        Ok(parsed) => parsed,
        Err(_) => Arc::new(ParsedFile::parse(handle.file_name(), handle.text(), version)),
    })
}

/// Canonical path a relative specifier resolves to, if the file exists
fn resolve_module(host: &dyn CompilerHost, importer: &str, specifier: &str) -> Option<String> {
    if !(specifier.starts_with("./") || specifier.starts_with("../")) {
        return None;
    }
    let dir = &importer[..importer.rfind('/').map_or(0, |slash| slash + 1)];
    let base = format!("{dir}{specifier}");
    let candidates = if specifier.ends_with(".ts") {
        vec![base]
    } else {
        vec![format!("{base}.ts"), format!("{base}.d.ts")]
    };
    candidates
        .into_iter()
        .map(|candidate| host.canonical_file_name(&candidate))
        .find(|key| !is_library_path(key) && host.file_exists(key))
}

/// Name an imported file is requested under
fn display_name(key: &str) -> &str {
    key.strip_prefix(PROJECT_ROOT).unwrap_or(key)
}

impl Program for ReferenceProgram {
    fn syntactic_diagnostics(&self) -> Vec<Diagnostic> {
        self.sources()
            .flat_map(|unit| unit.parsed.diagnostics().iter().cloned())
            .collect()
    }

    fn semantic_diagnostics(&self) -> Vec<Diagnostic> {
        self.checked.diagnostics.clone()
    }

    fn global_diagnostics(&self) -> Vec<Diagnostic> {
        if !self.options.flag("noLib") {
            return Vec::new();
        }
        GLOBAL_TYPES
            .iter()
            .map(|name| Diagnostic::global(2318, format!("Cannot find global type '{name}'.")))
            .collect()
    }

    fn declaration_diagnostics(&self) -> Vec<Diagnostic> {
        if !(self.options.flag("declaration") && self.options.flag("isolatedDeclarations")) {
            return Vec::new();
        }
        let mut diagnostics = Vec::new();
        for unit in self.sources().filter(|unit| !unit.parsed.is_declaration_file()) {
            for statement in unit.parsed.statements() {
                let Stmt::Var(decl) = statement else { continue };
                let needs_annotation = decl.exported
                    && !decl.ambient
                    && decl.annotation.is_none()
                    && decl.init.as_ref().is_some_and(|init| !init.is_literal());
                if needs_annotation {
                    diagnostics.push(Diagnostic::at(
                        unit.parsed.file_name(),
                        decl.name.span.start,
                        decl.name.span.len(),
                        9010,
                        "Variable must have an explicit type annotation with --isolatedDeclarations.",
                    ));
                }
            }
        }
        diagnostics
    }

    fn options_diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if self.options.flag("declaration") && self.options.flag("noEmit") {
            diagnostics.push(Diagnostic::global(
                5053,
                "Option 'declaration' cannot be specified with option 'noEmit'.",
            ));
        }
        if self.options.flag("isolatedDeclarations") && !self.options.flag("declaration") {
            diagnostics.push(Diagnostic::global(
                5069,
                "Option 'isolatedDeclarations' cannot be specified without specifying option 'declaration' or option 'composite'.",
            ));
        }
        diagnostics
    }

    fn emit(&self, host: &mut dyn CompilerHost) -> Vec<Diagnostic> {
        emit::emit_units(&self.units, &self.checked.decl_types, &self.options, host)
    }
}
