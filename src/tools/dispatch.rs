//! Tool dispatcher: validate, route, execute, wrap.
//!
//! Every invocation ends in a [`ToolResult`]. Unknown tools, invalid
//! arguments, scan failures, generation failures and panics inside a tool
//! are all reported in-band with `is_error = true`.

use crate::config::DispatcherSettings;
use crate::error::ToolError;
use crate::services::{assemble, scan, DirectoryContext, GenerationClient, GenerationRequest};
use crate::tools::fix_block::execute_fix;
use crate::tools::match_block::execute_match;
use crate::tools::registry::{JsonObject, ToolDefinition, ToolKind, ToolRegistry};
use crate::types::Extensions;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// A request to run one named tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub arguments: JsonObject,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: JsonObject) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// One block of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

/// Uniform success/error envelope returned for every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// Concatenated text of all content blocks.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|ContentBlock::Text { text }| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        Self::error(err.to_string())
    }
}

/// Routes invocations to the registered tool implementations.
///
/// Cheap to clone; all state is shared and read-only.
#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    settings: Arc<DispatcherSettings>,
    generator: Arc<dyn GenerationClient>,
}

impl ToolDispatcher {
    pub fn new(settings: DispatcherSettings, generator: Arc<dyn GenerationClient>) -> Self {
        Self {
            registry: Arc::new(ToolRegistry::new()),
            settings: Arc::new(settings),
            generator,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &DispatcherSettings {
        &self.settings
    }

    /// Tool definitions for protocol discovery.
    #[must_use]
    pub fn list_tools(&self) -> &[ToolDefinition] {
        self.registry.list_tools()
    }

    /// Runs one invocation to completion and wraps the outcome.
    ///
    /// The tool body runs on its own task so a panic anywhere inside it is
    /// reported as an internal error instead of reaching the transport.
    pub async fn invoke(&self, invocation: ToolInvocation) -> ToolResult {
        let name = invocation.name.clone();
        let start = Instant::now();

        let this = self.clone();
        let outcome = match tokio::spawn(async move { this.route(invocation).await }).await {
            Ok(outcome) => outcome,
            Err(e) => Err(ToolError::Internal(e.to_string())),
        };

        match outcome {
            Ok(text) => {
                tracing::info!("[{}] ok in {:?} ({} chars)", name, start.elapsed(), text.len());
                ToolResult::success(text)
            }
            Err(err) => {
                tracing::warn!("[{}] {} in {:?}: {}", name, err.code(), start.elapsed(), err);
                err.into()
            }
        }
    }

    async fn route(&self, invocation: ToolInvocation) -> Result<String, ToolError> {
        let ToolInvocation { name, arguments } = invocation;

        let definition = self
            .registry
            .get(&name)
            .ok_or_else(|| ToolError::UnknownTool(name.clone()))?;

        definition.validate(&arguments)?;

        match definition.kind {
            ToolKind::MatchHtmlToBlock => {
                let input = parse_input(definition, arguments)?;
                execute_match(&self.settings, self.generator.as_ref(), input).await
            }
            ToolKind::FixBlockBasedOnSuggestion => {
                let input = parse_input(definition, arguments)?;
                execute_fix(&self.settings, self.generator.as_ref(), input).await
            }
        }
    }
}

fn parse_input<T: DeserializeOwned>(
    definition: &ToolDefinition,
    arguments: JsonObject,
) -> Result<T, ToolError> {
    serde_json::from_value(serde_json::Value::Object(arguments))
        .map_err(|e| ToolError::invalid(definition.name, e.to_string()))
}

/// Scans `dir` and assembles its context off the async runtime.
pub(crate) async fn load_context(
    dir: PathBuf,
    extensions: Extensions,
    max_chars: usize,
) -> Result<DirectoryContext, ToolError> {
    let scan_dir = dir.clone();
    let result = tokio::task::spawn_blocking(move || {
        scan(&scan_dir, &extensions).map(|records| assemble(&records, max_chars))
    })
    .await;

    match result {
        Ok(Ok(context)) => Ok(context),
        Ok(Err(source)) => Err(ToolError::DirectoryRead { path: dir, source }),
        Err(e) => Err(ToolError::Internal(e.to_string())),
    }
}

/// Calls the generation service and returns the completion text.
pub(crate) async fn generate_text(
    generator: &dyn GenerationClient,
    request: GenerationRequest,
) -> Result<String, ToolError> {
    let completion = generator.generate(request).await?;
    if let Some(reason) = completion.finish_reason.as_deref() {
        if reason == "length" {
            tracing::warn!("Completion stopped at max_tokens; response may be incomplete");
        }
    }
    Ok(completion.content)
}
