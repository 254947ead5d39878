//! Core domain types for blocksmith.
//!
//! These types are shared between the scanner, the context assembler
//! and the tool layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default extensions scanned when a tool does not override them.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".css"];

/// A single source file captured by a directory scan.
///
/// `path` is relative to the scan root and always uses `/` separators,
/// so rendered context is identical across platforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub content: String,
}

impl FileRecord {
    #[must_use]
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Set of accepted file extensions.
///
/// Entries are stored without the leading dot; `".js"` and `"js"` are
/// equivalent on input. Matching is case-sensitive against the final
/// extension of a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extensions(Vec<String>);

impl Extensions {
    /// Builds an extension set from user-provided strings.
    ///
    /// Empty entries (and a bare `"."`) are dropped.
    pub fn new<I, S>(exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for ext in exts {
            let trimmed = ext.as_ref().trim().trim_start_matches('.');
            if !trimmed.is_empty() && !out.iter().any(|e| e == trimmed) {
                out.push(trimmed.to_string());
            }
        }
        Self(out)
    }

    /// Returns true if `ext` (without dot) is accepted.
    #[must_use]
    pub fn accepts(&self, ext: &str) -> bool {
        self.0.iter().any(|e| e == ext)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for Extensions {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

impl fmt::Display for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(|e| format!(".{e}")).collect();
        write!(f, "{}", joined.join(", "))
    }
}
