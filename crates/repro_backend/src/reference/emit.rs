//! JavaScript and declaration output.

use super::checker::Prim;
use super::program::SourceUnit;
use super::syntax::{ImportDecl, ParsedFile, Stmt};
use super::{MODULE_ES2015, MODULE_ESNEXT, TARGET_ES2015, choice_code, target_code};
use repro_core::{Diagnostic, OptionSet};
use repro_host::path::basename;
use repro_host::{CompilerHost, SourceHandle};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModuleStyle {
    CommonJs,
    EsModule,
}

/// Per-program output settings
struct Emitter {
    newline: String,
    lower_block_scoped: bool,
    module: ModuleStyle,
    use_strict: bool,
}

impl Emitter {
    fn new(options: &OptionSet, host_newline: &str) -> Self {
        let target = target_code(options);
        let newline = match options.choice("newLine") {
            Some("lf") => "\n",
            Some("crlf") => "\r\n",
            _ => host_newline,
        };
        let module = match choice_code(options, "module") {
            Some(MODULE_ES2015 | MODULE_ESNEXT) => ModuleStyle::EsModule,
            Some(_) => ModuleStyle::CommonJs,
            None if target >= TARGET_ES2015 => ModuleStyle::EsModule,
            None => ModuleStyle::CommonJs,
        };
        Self {
            newline: newline.to_string(),
            lower_block_scoped: target < TARGET_ES2015,
            module,
            use_strict: options.flag("strict") || options.flag("alwaysStrict"),
        }
    }

    fn join(&self, lines: &[String]) -> String {
        lines
            .iter()
            .map(|line| format!("{line}{}", self.newline))
            .collect()
    }

    fn javascript(&self, file: &ParsedFile) -> String {
        let mut lines = Vec::new();
        if self.use_strict {
            lines.push("\"use strict\";".to_string());
        }
        for statement in file.statements() {
            match statement {
                Stmt::Var(decl) if decl.ambient => {}
                Stmt::Var(decl) => {
                    let keyword = if self.lower_block_scoped {
                        "var"
                    } else {
                        decl.kind.keyword()
                    };
                    let mut line = format!("{keyword} {}", decl.name.text);
                    if let Some(init) = &decl.init {
                        line.push_str(" = ");
                        line.push_str(file.slice(init.span()));
                    }
                    line.push(';');
                    match (decl.exported, self.module) {
                        (true, ModuleStyle::EsModule) => lines.push(format!("export {line}")),
                        (true, ModuleStyle::CommonJs) => {
                            lines.push(line);
                            lines.push(format!("exports.{0} = {0};", decl.name.text));
                        }
                        (false, _) => lines.push(line),
                    }
                }
                Stmt::Import(decl) => lines.push(self.import_line(decl)),
                Stmt::Expr(expr, _) => lines.push(format!("{};", file.slice(expr.span()))),
            }
        }
        self.join(&lines)
    }

    fn import_line(&self, decl: &ImportDecl) -> String {
        let names = import_names(decl);
        match (self.module, names.is_empty()) {
            (ModuleStyle::EsModule, true) => format!("import \"{}\";", decl.module),
            (ModuleStyle::EsModule, false) => {
                format!("import {{ {names} }} from \"{}\";", decl.module)
            }
            (ModuleStyle::CommonJs, true) => format!("require(\"{}\");", decl.module),
            (ModuleStyle::CommonJs, false) => {
                let keyword = if self.lower_block_scoped { "var" } else { "const" };
                format!("{keyword} {{ {names} }} = require(\"{}\");", decl.module)
            }
        }
    }

    fn declarations(
        &self,
        unit: usize,
        file: &ParsedFile,
        types: &HashMap<(usize, usize), Prim>,
    ) -> String {
        let module = file.is_module();
        let mut lines = Vec::new();
        let mut exports = false;
        for (index, statement) in file.statements().iter().enumerate() {
            match statement {
                Stmt::Import(decl) if module => {
                    let names = import_names(decl);
                    lines.push(format!("import {{ {names} }} from \"{}\";", decl.module));
                }
                Stmt::Var(decl) if !module || decl.exported => {
                    exports |= decl.exported;
                    let ty = match &decl.annotation {
                        Some(ann) => ann.text.clone(),
                        None => types
                            .get(&(unit, index))
                            .copied()
                            .unwrap_or(Prim::Any)
                            .name()
                            .to_string(),
                    };
                    let export = if decl.exported { "export " } else { "" };
                    lines.push(format!(
                        "{export}declare {} {}: {ty};",
                        decl.kind.keyword(),
                        decl.name.text
                    ));
                }
                _ => {}
            }
        }
        if module && !exports {
            lines.push("export {};".to_string());
        }
        self.join(&lines)
    }
}

fn import_names(decl: &ImportDecl) -> String {
    decl.names
        .iter()
        .map(|name| name.text.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Output path for a source file
fn output_path(source: &str, extension: &str, out_dir: Option<&str>) -> String {
    let stem = source
        .strip_suffix(".tsx")
        .or_else(|| source.strip_suffix(".ts"))
        .unwrap_or(source);
    match out_dir {
        Some(dir) => format!("{}/{}{extension}", dir.trim_end_matches('/'), basename(stem)),
        None => format!("{stem}{extension}"),
    }
}

fn write_output(
    host: &mut dyn CompilerHost,
    path: &str,
    text: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if host.file_exists(path) {
        let canonical = host.canonical_file_name(path);
        diagnostics.push(Diagnostic::global(
            5055,
            format!("Cannot write file '{canonical}' because it would overwrite input file."),
        ));
        return;
    }
    debug!(path, bytes = text.len(), "writing output");
    host.write_file(path, text);
}

/// Write every unit's outputs through the host
pub(crate) fn emit_units(
    units: &[SourceUnit],
    types: &HashMap<(usize, usize), Prim>,
    options: &OptionSet,
    host: &mut dyn CompilerHost,
) -> Vec<Diagnostic> {
    if options.flag("noEmit") {
        return Vec::new();
    }
    let emitter = Emitter::new(options, host.new_line());
    let out_dir = options.string("outDir");
    let declarations = options.flag("declaration");
    let mut diagnostics = Vec::new();

    for (index, unit) in units.iter().enumerate() {
        if unit.is_lib || unit.parsed.is_declaration_file() {
            continue;
        }
        let name = unit.parsed.file_name();
        let js = emitter.javascript(&unit.parsed);
        write_output(host, &output_path(name, ".js", out_dir), &js, &mut diagnostics);
        if declarations {
            let dts = emitter.declarations(index, &unit.parsed, types);
            write_output(host, &output_path(name, ".d.ts", out_dir), &dts, &mut diagnostics);
        }
    }
    diagnostics
}
