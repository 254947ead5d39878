//! Security checks for blocksmith.
//!
//! Provides protection against:
//! - Block names that escape the blocks root (`../`, absolute paths, symlinks)
//! - Sensitive files being shipped to the remote generation service
//!
//! Tooling directories (node_modules, dist, ...) are a scanner concern and
//! live in [`crate::services::scanner`]; only security-relevant rules are here.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Security-related errors.
#[derive(Error, Debug, Clone)]
pub enum SecurityError {
    #[error("Path traversal blocked: '{attempted}' escapes root '{}'", root.display())]
    PathTraversal { attempted: String, root: PathBuf },

    #[error("Absolute path not allowed: '{path}'")]
    AbsolutePath { path: String },

    #[error("Block name must name a directory below the blocks root, got '{name}'")]
    EmptyBlockName { name: String },
}

impl SecurityError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PathTraversal { .. } => "PATH_TRAVERSAL",
            Self::AbsolutePath { .. } => "ABSOLUTE_PATH",
            Self::EmptyBlockName { .. } => "EMPTY_BLOCK_NAME",
        }
    }
}

// ============================================================================
// Block Directory Resolution
// ============================================================================

/// Resolves a caller-supplied block name to a directory under `root`.
///
/// # Security Properties
///
/// 1. Rejects absolute paths
/// 2. Normalizes path components (resolves `.` and `..`) without touching disk
/// 3. Rejects names that normalize to the root itself
/// 4. For existing directories, verifies the canonical path (after symlinks)
///    still starts with the canonical root
///
/// The returned path is not required to exist; the scanner reports a
/// missing directory on its own.
///
/// # Example
///
/// ```
/// use blocksmith::security::resolve_block_dir;
/// use std::path::Path;
///
/// let root = Path::new("/site/blocks");
///
/// assert!(resolve_block_dir(root, "hero").is_ok());
/// assert!(resolve_block_dir(root, "cards/../hero").is_ok());
///
/// assert!(resolve_block_dir(root, "../scripts").is_err());
/// assert!(resolve_block_dir(root, "/etc").is_err());
/// assert!(resolve_block_dir(root, ".").is_err());
/// ```
pub fn resolve_block_dir(root: &Path, block_name: &str) -> Result<PathBuf, SecurityError> {
    let name_path = Path::new(block_name);

    if name_path.is_absolute() || name_path.has_root() {
        return Err(SecurityError::AbsolutePath {
            path: block_name.to_string(),
        });
    }

    let normalized = normalize_path(name_path);

    if normalized
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(SecurityError::PathTraversal {
            attempted: block_name.to_string(),
            root: root.to_path_buf(),
        });
    }

    if normalized.as_os_str().is_empty() {
        return Err(SecurityError::EmptyBlockName {
            name: block_name.to_string(),
        });
    }

    let joined = root.join(&normalized);

    // Symlinked block directories must still land inside the root
    if joined.exists() {
        let canonical_root = dunce::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let resolved = dunce::canonicalize(&joined).map_err(|_| SecurityError::PathTraversal {
            attempted: block_name.to_string(),
            root: root.to_path_buf(),
        })?;
        if !resolved.starts_with(&canonical_root) {
            return Err(SecurityError::PathTraversal {
                attempted: block_name.to_string(),
                root: root.to_path_buf(),
            });
        }
    }

    Ok(joined)
}

/// Normalizes a path by resolving `.` and `..` components without filesystem access.
///
/// This is a pure function that operates on path components only.
fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Pop the last component if possible, otherwise keep ".."
                if components
                    .last()
                    .is_some_and(|c| !matches!(c, Component::ParentDir))
                {
                    components.pop();
                } else {
                    components.push(component);
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

// ============================================================================
// Sensitive File Detection
// ============================================================================

/// Files that must never be embedded into a prompt, whatever extension
/// filter the caller asked for.
///
/// Only names that cannot be block sources are listed, so an accepted
/// `.js`/`.css` file is never dropped by this table.
pub const SENSITIVE_PATTERNS: &[SensitivePattern] = &[
    // === Environment & Secrets ===
    SensitivePattern::exact(".env", "environment variables"),
    SensitivePattern::suffix(".env", "environment variables"),
    SensitivePattern::exact(".envrc", "direnv config"),
    SensitivePattern::exact("credentials.json", "credentials file"),
    SensitivePattern::exact("secrets.json", "secrets file"),

    // === Private Keys & Certificates ===
    SensitivePattern::suffix(".pem", "private key/certificate"),
    SensitivePattern::suffix(".key", "private key"),
    SensitivePattern::suffix(".p12", "PKCS#12 keystore"),
    SensitivePattern::suffix(".pfx", "PKCS#12 keystore"),
    SensitivePattern::exact("id_rsa", "SSH private key"),
    SensitivePattern::exact("id_ed25519", "SSH private key"),

    // === Package Manager Auth ===
    SensitivePattern::exact(".npmrc", "npm config (may contain tokens)"),
    SensitivePattern::exact(".yarnrc.yml", "yarn config"),
    SensitivePattern::exact(".git-credentials", "Git credentials"),
    SensitivePattern::exact(".netrc", "network credentials"),
];

/// A pattern for matching sensitive files.
#[derive(Debug, Clone, Copy)]
pub struct SensitivePattern {
    pub pattern: &'static str,
    pub reason: &'static str,
    pub match_type: PatternMatchType,
}

/// How to match a sensitive pattern against a file name.
#[derive(Debug, Clone, Copy)]
pub enum PatternMatchType {
    Exact,
    Suffix,
}

impl SensitivePattern {
    const fn exact(pattern: &'static str, reason: &'static str) -> Self {
        Self {
            pattern,
            reason,
            match_type: PatternMatchType::Exact,
        }
    }

    const fn suffix(pattern: &'static str, reason: &'static str) -> Self {
        Self {
            pattern,
            reason,
            match_type: PatternMatchType::Suffix,
        }
    }

    /// Checks if the file name of `path` matches this pattern.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        match self.match_type {
            PatternMatchType::Exact => filename == self.pattern,
            PatternMatchType::Suffix => filename.ends_with(self.pattern),
        }
    }
}

/// Checks if a path points to a sensitive file.
///
/// Returns `Some(reason)` if the file is sensitive, `None` otherwise.
///
/// ```
/// use blocksmith::security::is_sensitive_file;
/// use std::path::Path;
///
/// assert!(is_sensitive_file(Path::new(".env")).is_some());
/// assert!(is_sensitive_file(Path::new("blocks/hero/server.key")).is_some());
/// assert!(is_sensitive_file(Path::new("hero.js")).is_none());
/// ```
#[must_use]
pub fn is_sensitive_file(path: &Path) -> Option<&'static str> {
    SENSITIVE_PATTERNS
        .iter()
        .find(|p| p.matches(path))
        .map(|p| p.reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_valid_block_names() {
        let root = Path::new("/site/blocks");

        assert_eq!(
            resolve_block_dir(root, "hero").unwrap(),
            Path::new("/site/blocks/hero")
        );
        assert_eq!(
            resolve_block_dir(root, "./hero").unwrap(),
            Path::new("/site/blocks/hero")
        );
        assert_eq!(
            resolve_block_dir(root, "cards/../hero").unwrap(),
            Path::new("/site/blocks/hero")
        );
        assert!(resolve_block_dir(root, "nested/inner").is_ok());
    }

    #[test]
    fn test_block_traversal_blocked() {
        let root = Path::new("/site/blocks");

        assert!(matches!(
            resolve_block_dir(root, "../scripts"),
            Err(SecurityError::PathTraversal { .. })
        ));
        assert!(matches!(
            resolve_block_dir(root, "hero/../../scripts"),
            Err(SecurityError::PathTraversal { .. })
        ));
        assert!(matches!(
            resolve_block_dir(root, "/etc"),
            Err(SecurityError::AbsolutePath { .. })
        ));
    }

    #[test]
    fn test_block_name_must_not_be_root() {
        let root = Path::new("/site/blocks");

        for name in ["", ".", "./", "hero/.."] {
            assert!(
                matches!(
                    resolve_block_dir(root, name),
                    Err(SecurityError::EmptyBlockName { .. })
                ),
                "expected '{name}' to be rejected"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_blocked() {
        let outside = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.js"), "x").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("evil")).unwrap();

        let err = resolve_block_dir(dir.path(), "evil").unwrap_err();
        assert_eq!(err.code(), "PATH_TRAVERSAL");
    }

    #[test]
    fn test_existing_block_dir_resolves() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("hero")).unwrap();

        let resolved = resolve_block_dir(dir.path(), "hero").unwrap();
        assert_eq!(resolved, dir.path().join("hero"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("./foo")), Path::new("foo"));
        assert_eq!(normalize_path(Path::new("foo/./bar")), Path::new("foo/bar"));
        assert_eq!(normalize_path(Path::new("foo/../bar")), Path::new("bar"));
        assert_eq!(normalize_path(Path::new("../foo")), Path::new("../foo"));
    }

    #[test]
    fn test_sensitive_files() {
        assert!(is_sensitive_file(Path::new(".env")).is_some());
        assert!(is_sensitive_file(Path::new("prod.env")).is_some());
        assert!(is_sensitive_file(Path::new("id_rsa")).is_some());
        assert!(is_sensitive_file(Path::new("cert.pem")).is_some());
        assert!(is_sensitive_file(Path::new("a/b/.npmrc")).is_some());
    }

    #[test]
    fn test_non_sensitive_files() {
        assert!(is_sensitive_file(Path::new("hero.js")).is_none());
        assert!(is_sensitive_file(Path::new("hero.css")).is_none());
        assert!(is_sensitive_file(Path::new("keys.js")).is_none());
        assert!(is_sensitive_file(Path::new("package.json")).is_none());
    }

    #[test]
    fn test_block_sources_never_sensitive() {
        for name in [".env.js", "app.secret.js", "id_rsa_helper.js", "theme.env.css"] {
            assert!(
                is_sensitive_file(Path::new(name)).is_none(),
                "'{name}' is a block source"
            );
        }
    }
}
