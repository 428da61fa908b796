//! Diagnostics reported by a backend.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    /// Hard error
    Error,
    /// Warning
    Warning,
    /// Suggestion
    Suggestion,
    /// Informational message
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Suggestion => write!(f, "suggestion"),
            Self::Message => write!(f, "message"),
        }
    }
}

/// Message text, possibly with nested elaborations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageChain {
    /// Text of this level
    pub text: String,
    /// Nested elaborations, one level deeper
    pub next: Vec<MessageChain>,
}

impl MessageChain {
    /// Create a chain with no elaborations
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next: Vec::new(),
        }
    }

    /// Append a nested elaboration
    #[must_use]
    pub fn with_next(mut self, next: MessageChain) -> Self {
        self.next.push(next);
        self
    }

    /// Flatten into text, one line per level, indented two spaces per depth
    #[must_use]
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out, 0);
        out
    }

    fn flatten_into(&self, out: &mut String, depth: usize) {
        if depth > 0 {
            out.push('\n');
            out.push_str(&"  ".repeat(depth));
        }
        out.push_str(&self.text);
        for child in &self.next {
            child.flatten_into(out, depth + 1);
        }
    }
}

impl From<&str> for MessageChain {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for MessageChain {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Source location of a diagnostic, in bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticLocation {
    /// File name as reported by the backend
    pub file: String,
    /// Byte offset of the span start
    pub start: usize,
    /// Span length in bytes
    pub length: usize,
}

/// A backend-reported issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity
    pub category: DiagnosticCategory,
    /// Backend-defined numeric code
    pub code: u32,
    /// Message text
    pub message: MessageChain,
    /// Location, absent for global diagnostics
    pub location: Option<DiagnosticLocation>,
}

impl Diagnostic {
    /// Create a global error diagnostic
    #[must_use]
    pub fn global(code: u32, message: impl Into<MessageChain>) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Create an error diagnostic attached to a span
    #[must_use]
    pub fn at(
        file: impl Into<String>,
        start: usize,
        length: usize,
        code: u32,
        message: impl Into<MessageChain>,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            message: message.into(),
            location: Some(DiagnosticLocation {
                file: file.into(),
                start,
                length,
            }),
        }
    }

    /// Set the category
    #[must_use]
    pub fn with_category(mut self, category: DiagnosticCategory) -> Self {
        self.category = category;
        self
    }

    /// Check if this diagnostic is attached to a file
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.location.is_none()
    }

    /// Flattened message text
    #[must_use]
    pub fn message_text(&self) -> String {
        self.message.flatten()
    }
}
