//! `match_html_to_block`: identify which block renders a piece of markup.

use crate::config::DispatcherSettings;
use crate::error::ToolError;
use crate::services::{GenerationClient, GenerationOptions, GenerationRequest};
use crate::tools::dispatch::{generate_text, load_context};
use crate::types::Extensions;
use schemars::JsonSchema;
use serde::Deserialize;

/// Default persona when the caller does not supply a system prompt.
pub const MATCH_SYSTEM_PROMPT: &str = "You are a Web Engineering Specialist. You are given Javascript code and can determine the HTML code that will be rendered and then match it to the HTML code that is provided.";

/// Appended to every system prompt once the blocks context is attached.
pub const MATCH_CONTEXT_NOTE: &str = "\n\nYou have been provided with the complete code context from the blocks directory. Use this code context to provide a response. Do not make up any information. Be sure to also check for class names and other attributes that may be used in the code. Tell me the name of the block that generates the html code that is provided.";

/// Input for the match_html_to_block tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchHtmlInput {
    /// The message/question, usually the rendered HTML to identify
    pub message: String,
    /// Optional system prompt to set context
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Temperature for response randomness (0-2, default: 0.2)
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate (default: 10000)
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Builds the generation request for a match against an assembled context.
#[must_use]
pub fn build_request(input: &MatchHtmlInput, context: &str) -> GenerationRequest {
    let base = input
        .system_prompt
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(MATCH_SYSTEM_PROMPT);

    GenerationRequest {
        system: format!("{base}{MATCH_CONTEXT_NOTE}"),
        user: format!("{}\n{}", input.message, context),
        options: GenerationOptions::with_overrides(input.temperature, input.max_tokens),
    }
}

/// Executes the match tool: scan the whole blocks root, then ask the model.
///
/// # Errors
///
/// Returns `ToolError::DirectoryRead` if the blocks root cannot be scanned
/// (no generation call is made) and `ToolError::Generation` if the model
/// call fails.
pub async fn execute_match(
    settings: &DispatcherSettings,
    generator: &dyn GenerationClient,
    input: MatchHtmlInput,
) -> Result<String, ToolError> {
    let context = load_context(
        settings.blocks_root.clone(),
        Extensions::default(),
        settings.max_context_chars,
    )
    .await?;

    tracing::debug!(
        "match_html_to_block: {} files in context{}",
        context.files_included,
        if context.truncated { " (truncated)" } else { "" }
    );

    let request = build_request(&input, context.as_str());
    generate_text(generator, request).await
}
