//! Reference backend.
//!
//! A small statically typed language with just enough surface to exercise
//! every part of the harness: per-category diagnostics, library lookup,
//! relative imports, JavaScript and declaration output, and message wording
//! that drifts between versions.
//!
//! | major | drift |
//! |-------|-------|
//! | 1     | assignability messages name the widened type |
//! | 2     | assignability messages quote the literal |
//! | 3     | adds the `isolatedDeclarations` option |

mod checker;
mod emit;
mod program;
pub mod syntax;

pub use syntax::ParsedFile;

use crate::backend::{Backend, Program};
use program::ReferenceProgram;
use repro_core::{HarnessResult, OptionCatalog, OptionDecl, OptionSet, OptionValue, PrimitiveKind};
use repro_host::{CompilerHost, HostServices, LanguageVersion, SourceHandle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::trace;

pub(crate) const TARGET_ES5: i64 = 1;
pub(crate) const TARGET_ES2015: i64 = 2;
pub(crate) const MODULE_ES2015: i64 = 5;
pub(crate) const MODULE_ESNEXT: i64 = 99;

/// Version-dependent behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Dialect {
    pub major: u32,
}

impl Dialect {
    fn from_version(version: &str) -> Self {
        let major = version
            .split('.')
            .next()
            .and_then(|part| part.parse().ok())
            .unwrap_or(0);
        Self { major }
    }

    pub(crate) fn literal_types_in_messages(self) -> bool {
        self.major >= 2
    }

    fn has_isolated_declarations(self) -> bool {
        self.major >= 3
    }
}

/// Backend code of an enumerated option
pub(crate) fn choice_code(options: &OptionSet, name: &str) -> Option<i64> {
    match options.get(name) {
        Some(OptionValue::Choice { code, .. }) => Some(*code),
        _ => None,
    }
}

/// Target code, ES5 when unset
pub(crate) fn target_code(options: &OptionSet) -> i64 {
    choice_code(options, "target").unwrap_or(TARGET_ES5)
}

/// Directory holding the library files bundled with this crate
#[must_use]
pub fn bundled_lib_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("lib")
}

#[derive(Debug, Default)]
struct ReferenceServices;

impl HostServices for ReferenceServices {
    fn parse_source(
        &self,
        file_name: &str,
        text: &str,
        version: LanguageVersion,
    ) -> Arc<dyn SourceHandle> {
        trace!(file = file_name, version = version.0, "parsing");
        Arc::new(ParsedFile::parse(file_name, text, version))
    }

    fn default_lib_file_name(&self, options: &OptionSet) -> String {
        if target_code(options) >= TARGET_ES2015 {
            "lib.es2015.d.ts".to_string()
        } else {
            "lib.d.ts".to_string()
        }
    }
}

/// Reference compiler backend
pub struct ReferenceBackend {
    version: String,
    dialect: Dialect,
    catalog: OptionCatalog,
    services: Arc<ReferenceServices>,
}

impl ReferenceBackend {
    /// Create the backend for a semantic version string such as `"2.0.0"`
    #[must_use]
    pub fn new(version: &str) -> Self {
        let dialect = Dialect::from_version(version);
        Self {
            version: version.to_string(),
            dialect,
            catalog: build_catalog(dialect),
            services: Arc::new(ReferenceServices),
        }
    }

    /// Major version number
    #[must_use]
    pub fn major(&self) -> u32 {
        self.dialect.major
    }
}

fn build_catalog(dialect: Dialect) -> OptionCatalog {
    let mut catalog = OptionCatalog::new()
        .with(OptionDecl::choice(
            "target",
            &[
                ("es3", 0),
                ("es5", TARGET_ES5),
                ("es2015", TARGET_ES2015),
                ("es2020", 7),
                ("esnext", 99),
            ],
        ))
        .with(OptionDecl::choice(
            "module",
            &[
                ("none", 0),
                ("commonjs", 1),
                ("amd", 2),
                ("umd", 3),
                ("system", 4),
                ("es2015", MODULE_ES2015),
                ("esnext", MODULE_ESNEXT),
            ],
        ))
        .with(OptionDecl::choice("newLine", &[("crlf", 0), ("lf", 1)]))
        .with(OptionDecl::boolean("strict"))
        .with(OptionDecl::boolean("strictNullChecks"))
        .with(OptionDecl::boolean("noImplicitAny"))
        .with(OptionDecl::boolean("alwaysStrict"))
        .with(OptionDecl::boolean("declaration"))
        .with(OptionDecl::boolean("noEmit"))
        .with(OptionDecl::boolean("noLib"))
        .with(OptionDecl::boolean("removeComments"))
        .with(OptionDecl::string("outDir"))
        .with(OptionDecl::list("lib", PrimitiveKind::String))
        .with(OptionDecl::list("types", PrimitiveKind::String))
        .with(OptionDecl::number("maxNodeModuleJsDepth"));
    if dialect.has_isolated_declarations() {
        catalog.declare(OptionDecl::boolean("isolatedDeclarations"));
    }
    catalog
}

impl Backend for ReferenceBackend {
    fn version(&self) -> &str {
        &self.version
    }

    fn option_catalog(&self) -> &OptionCatalog {
        &self.catalog
    }

    fn services(&self) -> Arc<dyn HostServices> {
        self.services.clone()
    }

    fn create_program(
        &self,
        roots: &[String],
        options: &OptionSet,
        host: &mut dyn CompilerHost,
    ) -> HarnessResult<Box<dyn Program>> {
        let program = ReferenceProgram::build(self.dialect, roots, options, host)?;
        Ok(Box::new(program))
    }
}
