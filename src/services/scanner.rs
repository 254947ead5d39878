//! Recursive source scanner for block directories.
//!
//! Walks a root depth-first, keeps files whose extension is accepted and
//! never descends into tooling directories. Per-directory entries are
//! visited in file-name order so that the same tree always yields the same
//! record order (and therefore the same truncation point in the context).

use crate::error::{ScanError, ScanResult};
use crate::security;
use crate::types::{Extensions, FileRecord};
use ignore::WalkBuilder;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path};

/// Directory names that are skipped entirely (never descended into).
pub const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".next",
    "dist",
    "build",
    ".cache",
    "coverage",
];

/// Returns true if a directory with this name must not be scanned.
#[must_use]
pub fn is_excluded_dir(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| EXCLUDED_DIRS.contains(&n))
}

/// Scans `root` and returns every accepted file with its content.
///
/// Unreadable or non-UTF-8 files are logged and skipped, as are files that
/// look like credentials. Only a missing or non-directory root is fatal.
///
/// # Errors
///
/// Returns `ScanError::DirectoryNotFound` if `root` does not exist and
/// `ScanError::NotADirectory` if it is not a directory.
pub fn scan(root: &Path, extensions: &Extensions) -> ScanResult<Vec<FileRecord>> {
    if !root.exists() {
        return Err(ScanError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir && entry.depth() > 0 && is_excluded_dir(entry.file_name()))
        })
        .build();

    let mut records = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let accepted = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| extensions.accepts(ext));
        if !accepted {
            continue;
        }

        if let Some(reason) = security::is_sensitive_file(path) {
            tracing::warn!("Skipping sensitive file {} ({})", path.display(), reason);
            continue;
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(source) => {
                let err = ScanError::FileUnreadable {
                    path: path.to_path_buf(),
                    source,
                };
                tracing::warn!("{}: {}", err.code(), err);
                continue;
            }
        };

        records.push(FileRecord {
            path: relative_path(root, path),
            content,
        });
    }

    tracing::debug!(
        "Scanned {} ({}): {} files",
        root.display(),
        extensions,
        records.len()
    );

    Ok(records)
}

/// Renders `path` relative to `root` with `/` separators.
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
