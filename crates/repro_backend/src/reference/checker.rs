//! Binding and type checking.
//!
//! Script files share one global scope with the library; module files get
//! their own scope that falls back to the global one. Checking runs in
//! three passes: bind every declaration, resolve imports, then check each
//! statement in order.

use super::Dialect;
use super::program::SourceUnit;
use super::syntax::{Expr, ImportDecl, Span, Stmt, VarDecl, VarKind};
use indexmap::IndexMap;
use repro_core::{Diagnostic, MessageChain, OptionSet, OptionValue};
use repro_host::SourceHandle;
use std::collections::HashMap;

/// Primitive type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prim {
    /// Assignable to and from everything
    Any,
    /// `number`
    Number,
    /// `string`
    String,
    /// `boolean`
    Boolean,
}

impl Prim {
    /// Type name as written in source
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }

    /// Resolve a type annotation
    #[must_use]
    pub fn from_annotation(name: &str) -> Option<Self> {
        match name {
            "any" => Some(Self::Any),
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }
}

/// Expression type, remembering literal text for messages
#[derive(Debug, Clone, PartialEq, Eq)]
struct Ty {
    prim: Prim,
    literal: Option<String>,
}

impl Ty {
    fn of(prim: Prim) -> Self {
        Self { prim, literal: None }
    }

    fn literal(prim: Prim, text: String) -> Self {
        Self {
            prim,
            literal: Some(text),
        }
    }

    fn assignable_to(&self, target: Prim) -> bool {
        target == Prim::Any || self.prim == Prim::Any || self.prim == target
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolKind {
    Var(VarKind),
    Import,
}

#[derive(Debug, Clone)]
struct Symbol {
    kind: SymbolKind,
    prim: Prim,
    exported: bool,
    unit: usize,
    stmt: usize,
    span: Span,
}

type Scope = IndexMap<String, Vec<Symbol>>;

/// Result of checking a program
#[derive(Debug, Clone, Default)]
pub(crate) struct CheckOutput {
    /// Semantic diagnostics, by file then position
    pub diagnostics: Vec<Diagnostic>,
    /// Resolved type of each declaration, by unit and statement index
    pub decl_types: HashMap<(usize, usize), Prim>,
}

/// Check every non-library unit
pub(crate) fn check(units: &[SourceUnit], options: &OptionSet, dialect: Dialect) -> CheckOutput {
    let implicit_any_errors = match options.get("noImplicitAny") {
        Some(OptionValue::Bool(value)) => *value,
        _ => options.flag("strict"),
    };
    let mut checker = Checker {
        units,
        dialect,
        implicit_any_errors,
        global: Scope::new(),
        modules: HashMap::new(),
        diagnostics: vec![Vec::new(); units.len()],
        decl_types: HashMap::new(),
    };
    checker.bind();
    checker.resolve_imports();
    checker.report_redeclarations();
    for (index, unit) in units.iter().enumerate() {
        if !unit.is_lib {
            checker.check_unit(index);
        }
    }
    checker.finish()
}

struct Checker<'a> {
    units: &'a [SourceUnit],
    dialect: Dialect,
    implicit_any_errors: bool,
    global: Scope,
    modules: HashMap<usize, Scope>,
    diagnostics: Vec<Vec<Diagnostic>>,
    decl_types: HashMap<(usize, usize), Prim>,
}

impl Checker<'_> {
    fn error(
        &self,
        unit: usize,
        span: Span,
        code: u32,
        message: impl Into<MessageChain>,
    ) -> Diagnostic {
        Diagnostic::at(
            self.units[unit].parsed.file_name(),
            span.start,
            span.len(),
            code,
            message,
        )
    }

    fn report(&mut self, unit: usize, span: Span, code: u32, message: impl Into<MessageChain>) {
        let diag = self.error(unit, span, code, message);
        self.diagnostics[unit].push(diag);
    }

    fn scope_mut(&mut self, unit: usize) -> &mut Scope {
        if self.units[unit].parsed.is_module() {
            self.modules.entry(unit).or_default()
        } else {
            &mut self.global
        }
    }

    fn bind(&mut self) {
        let units = self.units;
        for (u, unit) in units.iter().enumerate() {
            for (s, stmt) in unit.parsed.statements().iter().enumerate() {
                match stmt {
                    Stmt::Var(decl) => {
                        let symbol = Symbol {
                            kind: SymbolKind::Var(decl.kind),
                            prim: declared_prim(decl),
                            exported: decl.exported,
                            unit: u,
                            stmt: s,
                            span: decl.name.span,
                        };
                        self.scope_mut(u)
                            .entry(decl.name.text.clone())
                            .or_default()
                            .push(symbol);
                    }
                    Stmt::Import(decl) => {
                        for name in &decl.names {
                            let symbol = Symbol {
                                kind: SymbolKind::Import,
                                prim: Prim::Any,
                                exported: false,
                                unit: u,
                                stmt: s,
                                span: name.span,
                            };
                            self.scope_mut(u)
                                .entry(name.text.clone())
                                .or_default()
                                .push(symbol);
                        }
                    }
                    Stmt::Expr(..) => {}
                }
            }
        }
    }

    fn resolve_imports(&mut self) {
        let units = self.units;
        for (u, unit) in units.iter().enumerate() {
            for (s, stmt) in unit.parsed.statements().iter().enumerate() {
                if let Stmt::Import(decl) = stmt {
                    self.resolve_import(u, s, decl);
                }
            }
        }
    }

    fn resolve_import(&mut self, unit: usize, stmt: usize, decl: &ImportDecl) {
        let Some(&target) = self.units[unit].imports.get(&stmt) else {
            self.report(
                unit,
                decl.module_span,
                2307,
                format!(
                    "Cannot find module '{}' or its corresponding type declarations.",
                    decl.module
                ),
            );
            return;
        };
        if !self.units[target].parsed.is_module() {
            let message = format!("File '{}' is not a module.", self.units[target].key);
            self.report(unit, decl.module_span, 2306, message);
            return;
        }

        for name in &decl.names {
            let exported = self
                .modules
                .get(&target)
                .and_then(|scope| scope.get(&name.text))
                .and_then(|symbols| {
                    symbols
                        .iter()
                        .find(|sym| sym.exported && matches!(sym.kind, SymbolKind::Var(_)))
                })
                .map(|sym| sym.prim);
            match exported {
                Some(prim) => self.set_prim(unit, stmt, &name.text, prim),
                None => self.report(
                    unit,
                    name.span,
                    2305,
                    format!(
                        "Module '\"{}\"' has no exported member '{}'.",
                        decl.module, name.text
                    ),
                ),
            }
        }
    }

    fn report_redeclarations(&mut self) {
        let mut found = Vec::new();
        for scope in std::iter::once(&self.global).chain(self.modules.values()) {
            for (name, symbols) in scope {
                if symbols.len() > 1 {
                    found.extend(redeclaration_errors(name, symbols));
                }
            }
        }
        for (symbol, code, message) in found {
            if !self.units[symbol.unit].is_lib {
                self.report(symbol.unit, symbol.span, code, message);
            }
        }
    }

    fn check_unit(&mut self, unit: usize) {
        let units = self.units;
        for (s, stmt) in units[unit].parsed.statements().iter().enumerate() {
            match stmt {
                Stmt::Var(decl) => self.check_var(unit, s, decl),
                Stmt::Expr(expr, _) => {
                    self.check_expr(unit, expr);
                }
                Stmt::Import(_) => {}
            }
        }
    }

    fn check_var(&mut self, unit: usize, stmt: usize, decl: &VarDecl) {
        let annotated = decl.annotation.as_ref().map(|ann| {
            Prim::from_annotation(&ann.text).unwrap_or_else(|| {
                self.report(unit, ann.span, 2304, format!("Cannot find name '{}'.", ann.text));
                Prim::Any
            })
        });

        if decl.kind == VarKind::Const && decl.init.is_none() && !decl.ambient {
            self.report(unit, decl.name.span, 1155, "'const' declarations must be initialized.");
        }
        if decl.ambient && decl.annotation.is_none() && self.implicit_any_errors {
            let message = format!("Variable '{}' implicitly has an 'any' type.", decl.name.text);
            self.report(unit, decl.name.span, 7005, message);
        }

        let init_ty = match &decl.init {
            Some(init) if decl.ambient => {
                self.report(
                    unit,
                    init.span(),
                    1039,
                    "Initializers are not allowed in ambient contexts.",
                );
                None
            }
            Some(init) => Some((self.check_expr(unit, init), init.span())),
            None => None,
        };

        if let (Some(target), Some((source, span))) = (annotated, &init_ty) {
            if !source.assignable_to(target) {
                let message = format!(
                    "Type '{}' is not assignable to type '{}'.",
                    self.describe(source),
                    target.name()
                );
                self.report(unit, *span, 2322, message);
            }
        }

        let prim = annotated
            .or_else(|| init_ty.map(|(ty, _)| ty.prim))
            .unwrap_or(Prim::Any);
        self.set_prim(unit, stmt, &decl.name.text, prim);
        self.decl_types.insert((unit, stmt), prim);
    }

    fn check_expr(&mut self, unit: usize, expr: &Expr) -> Ty {
        match expr {
            Expr::Number(span) => {
                let text = self.units[unit].parsed.slice(*span).to_string();
                Ty::literal(Prim::Number, text)
            }
            Expr::Str { value, .. } => Ty::literal(Prim::String, format!("\"{value}\"")),
            Expr::Bool(value, _) => Ty::literal(Prim::Boolean, value.to_string()),
            Expr::Name(ident) => match self.lookup(unit, &ident.text) {
                Some(prim) => Ty::of(prim),
                None => {
                    self.report(unit, ident.span, 2304, format!("Cannot find name '{}'.", ident.text));
                    Ty::of(Prim::Any)
                }
            },
            Expr::Paren(inner, _) => self.check_expr(unit, inner),
            Expr::Member { object, .. } => {
                self.check_expr(unit, object);
                Ty::of(Prim::Any)
            }
            Expr::Call { callee, args, .. } => {
                let callee_ty = self.check_expr(unit, callee);
                if callee_ty.prim != Prim::Any {
                    let message = MessageChain::new("This expression is not callable.").with_next(
                        MessageChain::new(format!(
                            "Type '{}' has no call signatures.",
                            callee_ty.prim.name()
                        )),
                    );
                    self.report(unit, callee.span(), 2349, message);
                }
                for arg in args {
                    self.check_expr(unit, arg);
                }
                Ty::of(Prim::Any)
            }
        }
    }

    /// Type text used in assignability messages
    fn describe(&self, ty: &Ty) -> String {
        match &ty.literal {
            Some(text) if self.dialect.literal_types_in_messages() => text.clone(),
            _ => ty.prim.name().to_string(),
        }
    }

    fn lookup(&self, unit: usize, name: &str) -> Option<Prim> {
        let local = if self.units[unit].parsed.is_module() {
            self.modules.get(&unit).and_then(|scope| scope.get(name))
        } else {
            None
        };
        local
            .or_else(|| self.global.get(name))
            .and_then(|symbols| symbols.first())
            .map(|sym| sym.prim)
    }

    fn set_prim(&mut self, unit: usize, stmt: usize, name: &str, prim: Prim) {
        if let Some(symbols) = self.scope_mut(unit).get_mut(name) {
            for symbol in symbols
                .iter_mut()
                .filter(|sym| sym.unit == unit && sym.stmt == stmt)
            {
                symbol.prim = prim;
            }
        }
    }

    fn finish(self) -> CheckOutput {
        let mut diagnostics = Vec::new();
        for (unit, mut diags) in self.units.iter().zip(self.diagnostics) {
            if unit.is_lib {
                continue;
            }
            diags.sort_by_key(|d| d.location.as_ref().map_or(0, |loc| loc.start));
            diagnostics.extend(diags);
        }
        CheckOutput {
            diagnostics,
            decl_types: self.decl_types,
        }
    }
}

/// Type a declaration has before its initializer is checked
fn declared_prim(decl: &VarDecl) -> Prim {
    if let Some(ann) = &decl.annotation {
        return Prim::from_annotation(&ann.text).unwrap_or(Prim::Any);
    }
    match &decl.init {
        Some(Expr::Number(_)) => Prim::Number,
        Some(Expr::Str { .. }) => Prim::String,
        Some(Expr::Bool(..)) => Prim::Boolean,
        _ => Prim::Any,
    }
}

fn redeclaration_errors(name: &str, symbols: &[Symbol]) -> Vec<(Symbol, u32, String)> {
    let imports: Vec<&Symbol> = symbols
        .iter()
        .filter(|sym| sym.kind == SymbolKind::Import)
        .collect();
    let vars: Vec<&Symbol> = symbols
        .iter()
        .filter(|sym| matches!(sym.kind, SymbolKind::Var(_)))
        .collect();

    if !imports.is_empty() && !vars.is_empty() {
        let message = format!("Import declaration conflicts with local declaration of '{name}'.");
        return imports
            .into_iter()
            .map(|sym| (sym.clone(), 2440, message.clone()))
            .collect();
    }
    if imports.len() > 1 {
        let message = format!("Duplicate identifier '{name}'.");
        return imports
            .into_iter()
            .map(|sym| (sym.clone(), 2300, message.clone()))
            .collect();
    }
    let block_scoped = vars
        .iter()
        .any(|sym| matches!(sym.kind, SymbolKind::Var(kind) if kind.is_block_scoped()));
    if block_scoped {
        let message = format!("Cannot redeclare block-scoped variable '{name}'.");
        return vars
            .into_iter()
            .map(|sym| (sym.clone(), 2451, message.clone()))
            .collect();
    }
    Vec::new()
}
