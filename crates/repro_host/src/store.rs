//! In-memory project store.

use crate::contract::{CompilerHost, HostServices, LanguageVersion, SourceHandle};
use crate::path::{LIB_ROOT, PROJECT_ROOT, basename, canonicalize, is_library_path};
use indexmap::IndexMap;
use repro_core::{HarnessError, HarnessResult, OptionSet};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Fixed newline so emitted text is identical on every host platform
const NEW_LINE: &str = "\r\n";

/// In-memory file system bound to one backend's parser
///
/// Virtual files are keyed by canonical path. Paths under [`LIB_ROOT`] are
/// served from a real directory so the backend reads its own bundled
/// declarations. Emitted output is keyed by the raw path the backend wrote.
pub struct VirtualProjectStore {
    /// Backend hooks for parsing and library naming
    services: Arc<dyn HostServices>,
    /// Real directory backing [`LIB_ROOT`]
    lib_dir: PathBuf,
    /// Source text by canonical path
    files: IndexMap<String, String>,
    /// Parsed handles by canonical path
    handles: HashMap<String, Arc<dyn SourceHandle>>,
    /// Emitted text by output path, in first-write order
    outputs: IndexMap<String, String>,
}

impl VirtualProjectStore {
    /// Create an empty store
    #[must_use]
    pub fn new(services: Arc<dyn HostServices>, lib_dir: impl Into<PathBuf>) -> Self {
        Self {
            services,
            lib_dir: lib_dir.into(),
            files: IndexMap::new(),
            handles: HashMap::new(),
            outputs: IndexMap::new(),
        }
    }

    /// Add or replace a virtual file
    pub fn add_file(&mut self, path: &str, content: impl Into<String>) {
        let key = canonicalize(path);
        self.handles.remove(&key);
        self.files.insert(key, content.into());
    }

    /// Source text for rendering, `None` when unavailable
    #[must_use]
    pub fn source_text(&self, path: &str) -> Option<String> {
        self.read_file(path).ok()
    }

    /// Canonical paths of virtual files, in insertion order
    #[must_use]
    pub fn files(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// Emitted outputs in first-write order
    #[must_use]
    pub fn outputs(&self) -> &IndexMap<String, String> {
        &self.outputs
    }

    fn read_library(&self, path: &str) -> HarnessResult<String> {
        let real = self.lib_dir.join(basename(path));
        debug!(virtual_path = path, real_path = %real.display(), "reading library file");
        std::fs::read_to_string(&real).map_err(|e| HarnessError::LibraryRead {
            path: real.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl CompilerHost for VirtualProjectStore {
    fn source_handle(
        &mut self,
        path: &str,
        version: LanguageVersion,
    ) -> HarnessResult<Arc<dyn SourceHandle>> {
        // The first parse wins even if a later caller asks for another version.
        let key = if is_library_path(path) {
            path.replace('\\', "/")
        } else {
            canonicalize(path)
        };
        if let Some(handle) = self.handles.get(&key) {
            return Ok(Arc::clone(handle));
        }
        let text = self.read_file(path)?;
        let handle = self.services.parse_source(path, &text, version);
        self.handles.insert(key, Arc::clone(&handle));
        Ok(handle)
    }

    fn default_lib_file_name(&self, options: &OptionSet) -> String {
        format!("{}{}", LIB_ROOT, self.services.default_lib_file_name(options))
    }

    fn read_file(&self, path: &str) -> HarnessResult<String> {
        if is_library_path(path) {
            return self.read_library(path);
        }
        let key = canonicalize(path);
        self.files
            .get(&key)
            .cloned()
            .ok_or(HarnessError::MissingVirtualFile { path: key })
    }

    fn write_file(&mut self, path: &str, data: &str) {
        self.outputs.insert(path.to_string(), data.to_string());
    }

    fn file_exists(&self, path: &str) -> bool {
        is_library_path(path) || self.files.contains_key(&canonicalize(path))
    }

    fn current_directory(&self) -> &str {
        PROJECT_ROOT
    }

    fn directories(&self, _path: &str) -> Vec<String> {
        Vec::new()
    }

    fn canonical_file_name(&self, path: &str) -> String {
        canonicalize(path)
    }

    fn use_case_sensitive_file_names(&self) -> bool {
        true
    }

    fn new_line(&self) -> &str {
        NEW_LINE
    }
}
