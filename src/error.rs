//! Error types for blocksmith.
//!
//! Uses thiserror for ergonomic error handling with proper
//! error chain propagation. Tool-facing failures end up as
//! [`ToolError`], which the dispatcher turns into an in-band
//! error envelope.

use std::path::PathBuf;
use thiserror::Error;

/// Server construction errors.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Generation client error: {0}")]
    Generation(#[from] GenerationError),
}

/// Directory scanning errors.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory does not exist: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// Never propagated out of a scan; logged and the file is skipped.
    #[error("Could not read file {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Text-generation service errors.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("{0}")]
    Config(String),

    #[error("Messages array is required and must not be empty.")]
    EmptyMessages,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed: {status} - {body}")]
    Http { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Failures surfaced to the MCP client as `isError: true` envelopes.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Error: Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Error reading directory {}: {source}", path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: ScanError,
    },

    #[error("Error calling generation service: {0}")]
    Generation(#[from] GenerationError),

    #[error("Error: {0}")]
    Internal(String),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Result type alias for scan operations.
pub type ScanResult<T> = std::result::Result<T, ScanError>;

/// Result type alias for generation calls.
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

// Error code implementations for machine-readable log lines
impl ScanError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DirectoryNotFound { .. } => "DIRECTORY_NOT_FOUND",
            Self::NotADirectory { .. } => "NOT_A_DIRECTORY",
            Self::FileUnreadable { .. } => "FILE_UNREADABLE",
        }
    }
}

impl GenerationError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "GENERATION_CONFIG",
            Self::EmptyMessages => "EMPTY_MESSAGES",
            Self::Request(_) => "GENERATION_REQUEST",
            Self::Http { .. } => "GENERATION_HTTP",
            Self::Parse(_) => "GENERATION_PARSE",
        }
    }
}

impl ToolError {
    /// Returns a machine-readable error code.
    ///
    /// Scan and generation failures report the code of their cause.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "UNKNOWN_TOOL",
            Self::InvalidArguments { .. } => "INVALID_ARGUMENTS",
            Self::DirectoryRead { source, .. } => source.code(),
            Self::Generation(e) => e.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub(crate) fn invalid(tool: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }
}
