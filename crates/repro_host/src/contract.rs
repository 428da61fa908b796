//! Host contract between a backend and the harness.

use repro_core::{HarnessResult, OptionSet};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Language level requested when parsing, as a backend-defined code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguageVersion(pub i64);

/// Backend-specific parse of one source file
pub trait SourceHandle: Any + Send + Sync + fmt::Debug {
    /// File name the handle was parsed under
    fn file_name(&self) -> &str;

    /// Source text
    fn text(&self) -> &str;

    /// Downcast support for the backend that produced the handle
    fn as_any(&self) -> &dyn Any;

    /// Owned downcast support, keeping the shared allocation
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Backend hooks the host calls back into
pub trait HostServices: Send + Sync {
    /// Parse source text into a handle
    fn parse_source(
        &self,
        file_name: &str,
        text: &str,
        version: LanguageVersion,
    ) -> Arc<dyn SourceHandle>;

    /// Bare file name of the default library for these options
    fn default_lib_file_name(&self, options: &OptionSet) -> String;
}

/// File resolution, output sink, and naming rules a backend requires
pub trait CompilerHost {
    /// Parsed handle for a file, memoized per canonical path
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read
    fn source_handle(
        &mut self,
        path: &str,
        version: LanguageVersion,
    ) -> HarnessResult<Arc<dyn SourceHandle>>;

    /// Full path of the default library file
    fn default_lib_file_name(&self, options: &OptionSet) -> String;

    /// Read a file
    ///
    /// # Errors
    ///
    /// Returns error if the file does not exist
    fn read_file(&self, path: &str) -> HarnessResult<String>;

    /// Receive emitted output
    fn write_file(&mut self, path: &str, data: &str);

    /// Check if a file exists
    fn file_exists(&self, path: &str) -> bool;

    /// Directory relative paths resolve against
    fn current_directory(&self) -> &str;

    /// Subdirectories of a directory
    fn directories(&self, path: &str) -> Vec<String>;

    /// Canonical form of a file name
    fn canonical_file_name(&self, path: &str) -> String;

    /// Whether file names compare case-sensitively
    fn use_case_sensitive_file_names(&self) -> bool;

    /// Newline sequence for emitted text
    fn new_line(&self) -> &str;
}
