//! Backend contract.

use repro_core::{Diagnostic, HarnessResult, OptionCatalog, OptionSet};
use repro_host::{CompilerHost, HostServices};
use std::sync::Arc;

/// One installed version of a compiler backend
pub trait Backend: Send + Sync {
    /// Version identifier
    fn version(&self) -> &str;

    /// Options this version declares
    fn option_catalog(&self) -> &OptionCatalog;

    /// Options a fresh session starts with
    fn default_options(&self) -> OptionSet {
        OptionSet::new()
    }

    /// Hooks the host calls back into
    fn services(&self) -> Arc<dyn HostServices>;

    /// Build a program from root files
    ///
    /// # Errors
    ///
    /// Returns error if the host cannot supply a requested file
    fn create_program(
        &self,
        roots: &[String],
        options: &OptionSet,
        host: &mut dyn CompilerHost,
    ) -> HarnessResult<Box<dyn Program>>;
}

/// A compiled program with separately retrievable diagnostics
pub trait Program {
    /// Parse errors
    fn syntactic_diagnostics(&self) -> Vec<Diagnostic>;

    /// Binding and type errors
    fn semantic_diagnostics(&self) -> Vec<Diagnostic>;

    /// Errors not tied to a file
    fn global_diagnostics(&self) -> Vec<Diagnostic>;

    /// Errors raised while producing declaration output
    fn declaration_diagnostics(&self) -> Vec<Diagnostic>;

    /// Errors in the option set itself
    fn options_diagnostics(&self) -> Vec<Diagnostic>;

    /// Write outputs through the host and return emit-time diagnostics
    fn emit(&self, host: &mut dyn CompilerHost) -> Vec<Diagnostic>;
}
