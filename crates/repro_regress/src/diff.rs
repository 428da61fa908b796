//! Line diff between adjacent blocks.

use serde::{Deserialize, Serialize};

/// Change to one line position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineChange {
    /// Present only in the newer block
    Added(String),
    /// Present only in the older block
    Removed(String),
    /// Different text at the same position
    Modified {
        /// Older text
        old: String,
        /// Newer text
        new: String,
    },
    /// Identical at the same position
    Unchanged(String),
}

impl LineChange {
    /// Check if this position differs
    #[must_use]
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged(_))
    }

    /// Marked lines for display: `-` for older text, `+` for newer text
    #[must_use]
    pub fn marked_lines(&self) -> Vec<String> {
        match self {
            Self::Added(line) => vec![format!("+ {line}")],
            Self::Removed(line) => vec![format!("- {line}")],
            Self::Modified { old, new } => vec![format!("- {old}"), format!("+ {new}")],
            Self::Unchanged(_) => Vec::new(),
        }
    }
}

/// Compare two blocks position by position
#[must_use]
pub fn diff_lines(old: &str, new: &str) -> Vec<LineChange> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let max_len = old_lines.len().max(new_lines.len());

    (0..max_len)
        .filter_map(|i| match (old_lines.get(i), new_lines.get(i)) {
            (Some(o), Some(n)) if o == n => Some(LineChange::Unchanged((*o).to_string())),
            (Some(o), Some(n)) => Some(LineChange::Modified {
                old: (*o).to_string(),
                new: (*n).to_string(),
            }),
            (Some(o), None) => Some(LineChange::Removed((*o).to_string())),
            (None, Some(n)) => Some(LineChange::Added((*n).to_string())),
            (None, None) => None,
        })
        .collect()
}
