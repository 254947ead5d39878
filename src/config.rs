//! Runtime configuration values.
//!
//! Configuration is resolved once in `main` (CLI flags, environment and an
//! optional `.env` file) and passed down explicitly. Nothing below this
//! module reads the process environment.

use crate::services::context::DEFAULT_MAX_CONTEXT_CHARS;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder shipped in sample `.env` files for the API key.
pub const PLACEHOLDER_API_KEY: &str = "your-api-key-here";

/// Placeholder shipped in sample `.env` files for the endpoint.
pub const PLACEHOLDER_ENDPOINT: &str = "https://your-resource-name.openai.azure.com";

/// Default HTTP timeout for a single completion request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Loads `.env` from the working directory or its parents.
///
/// A missing file is fine; a file that fails to parse is returned so the
/// caller can report it.
pub fn load_dotenv() -> Option<dotenvy::Error> {
    dotenv_failure(dotenvy::dotenv().map(|_| ()))
}

fn dotenv_failure(result: dotenvy::Result<()>) -> Option<dotenvy::Error> {
    match result {
        Ok(()) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(e),
    }
}

/// Credentials and addressing for the Azure OpenAI deployment.
///
/// Every field is optional: a server with missing credentials still starts
/// and answers `tools/list`; generation calls fail with a configuration
/// error instead.
#[derive(Clone, Default)]
pub struct GenerationConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub deployment: Option<String>,
    pub api_version: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl GenerationConfig {
    /// Returns the request timeout, falling back to the default.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    /// True when a usable (non-placeholder) API key is present.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty() && k != PLACEHOLDER_API_KEY)
    }

    /// True when a usable (non-placeholder) endpoint is present.
    #[must_use]
    pub fn has_endpoint(&self) -> bool {
        self.endpoint.as_deref().is_some_and(|e| {
            let e = e.trim().trim_end_matches('/');
            !e.is_empty() && e != PLACEHOLDER_ENDPOINT
        })
    }
}

// The API key must never end up in logs.
impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Settings the tool dispatcher needs besides the generation client.
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    /// Directory containing one subdirectory per block.
    pub blocks_root: PathBuf,
    /// Character budget for each assembled context.
    pub max_context_chars: usize,
}

impl DispatcherSettings {
    #[must_use]
    pub fn new(blocks_root: PathBuf) -> Self {
        Self {
            blocks_root,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }

    #[must_use]
    pub fn with_max_context_chars(mut self, max_context_chars: usize) -> Self {
        self.max_context_chars = max_context_chars;
        self
    }
}
