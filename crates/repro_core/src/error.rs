//! Error taxonomy for the harness.
//!
//! Every variant is fatal to the repro run that produced it. Diagnostics
//! reported by a backend about the input program are not errors and never
//! flow through this type.

/// Harness result type
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Harness error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HarnessError {
    /// Requested backend version is not in the version table
    #[error("Unsupported version \"{requested}\". Supported values: {}", .known.join(", "))]
    UnsupportedVersion {
        /// Key that was requested
        requested: String,
        /// Keys the table knows, in table order
        known: Vec<String>,
    },

    /// Version key registered twice
    #[error("Version already registered: {key}")]
    DuplicateVersion {
        /// Key that was registered again
        key: String,
    },

    /// Option name is neither harness-internal nor declared by the backend
    #[error("Unknown compiler option \"{name}\"")]
    UnknownOption {
        /// Name as written by the caller
        name: String,
    },

    /// Value does not fit the declared option type
    #[error("Invalid value \"{value}\" for option \"{name}\". Expected {expected}")]
    InvalidOptionValue {
        /// Declared option name
        name: String,
        /// Raw value as written
        value: String,
        /// Expected type or the list of allowed values
        expected: String,
    },

    /// Backend requested a virtual file that was never added
    #[error("File \"{path}\" was requested but does not exist")]
    MissingVirtualFile {
        /// Canonical path that was requested
        path: String,
    },

    /// A bundled library file could not be read from disk
    #[error("Failed to read library file {path}: {reason}")]
    LibraryRead {
        /// Real filesystem path
        path: String,
        /// Underlying I/O failure
        reason: String,
    },

    /// Session was already compiled once
    #[error("Session has already been compiled")]
    SessionConsumed,

    /// Input could not be acquired or configuration could not be loaded
    #[error("Input error: {reason}")]
    Input {
        /// What went wrong
        reason: String,
    },
}

impl HarnessError {
    /// Build an `InvalidOptionValue` listing the allowed enumerated values
    #[must_use]
    pub fn invalid_choice<'a>(
        name: &str,
        value: &str,
        allowed: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let allowed: Vec<String> = allowed.into_iter().map(|s| format!("'{}'", s)).collect();
        Self::InvalidOptionValue {
            name: name.to_string(),
            value: value.to_string(),
            expected: format!("one of: {}", allowed.join(", ")),
        }
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(err: serde_json::Error) -> Self {
        Self::Input {
            reason: err.to_string(),
        }
    }
}
