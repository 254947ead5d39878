//! Common test utilities for blocksmith integration tests.
//!
//! Provides `TestEnv` for setting up an isolated blocks directory with a
//! dispatcher wired to a stub generation client.

#![allow(dead_code)] // Test utilities may not all be used in every test file

use async_trait::async_trait;
use blocksmith::config::DispatcherSettings;
use blocksmith::error::{GenerationError, GenerationResult};
use blocksmith::services::{Completion, GenerationClient, GenerationRequest};
use blocksmith::tools::{JsonObject, ToolDispatcher, ToolInvocation};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Generation stub that records every request it receives.
pub struct RecordingGenerator {
    requests: Mutex<Vec<GenerationRequest>>,
    reply: Result<String, u16>,
}

impl RecordingGenerator {
    /// Replies with `text` to every request.
    pub fn replying(text: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reply: Ok(text.to_string()),
        }
    }

    /// Fails every request with an HTTP status error.
    pub fn failing(status: u16) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reply: Err(status),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationClient for RecordingGenerator {
    async fn generate(&self, request: GenerationRequest) -> GenerationResult<Completion> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Ok(text) => Ok(Completion {
                content: text.clone(),
                finish_reason: Some("stop".to_string()),
                usage: None,
            }),
            Err(status) => Err(GenerationError::Http {
                status: *status,
                body: "upstream unavailable".to_string(),
            }),
        }
    }
}

/// Generation stub that panics on every call.
pub struct PanickingGenerator;

#[async_trait]
impl GenerationClient for PanickingGenerator {
    async fn generate(&self, _request: GenerationRequest) -> GenerationResult<Completion> {
        panic!("generator exploded");
    }
}

/// A temporary blocks directory.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    /// Creates a new empty blocks directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        Self { dir }
    }

    /// Writes a file under the blocks directory.
    pub fn write_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write test file");
    }

    /// Gets the full path to a file in the blocks directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn settings(&self) -> DispatcherSettings {
        DispatcherSettings::new(self.dir.path().to_path_buf())
    }

    /// Builds a dispatcher over this directory.
    pub fn dispatcher(&self, generator: Arc<dyn GenerationClient>) -> ToolDispatcher {
        ToolDispatcher::new(self.settings(), generator)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a blocks directory with a few typical blocks.
pub fn blocks_fixture() -> TestEnv {
    let env = TestEnv::new();

    env.write_file(
        "hero/hero.js",
        "export default function decorate(block) {\n  block.classList.add('hero-banner');\n}\n",
    );
    env.write_file("hero/hero.css", ".hero-banner { color: #777; }\n");
    env.write_file(
        "cards/cards.js",
        "export default function decorate(block) {\n  const ul = document.createElement('ul');\n  block.append(ul);\n}\n",
    );
    env.write_file("cards/cards.css", ".cards ul { list-style: none; }\n");
    env.write_file("cards/README.md", "# Cards\n");
    env.write_file("node_modules/dep/index.js", "module.exports = {};\n");

    env
}

/// Builds an invocation from a JSON object literal.
pub fn invocation(name: &str, args: serde_json::Value) -> ToolInvocation {
    let arguments: JsonObject = match args {
        serde_json::Value::Object(map) => map,
        _ => panic!("tool arguments must be a JSON object"),
    };
    ToolInvocation::new(name, arguments)
}
