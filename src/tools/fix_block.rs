//! `fix_block_based_on_suggestion`: draft code changes for one block.

use crate::config::DispatcherSettings;
use crate::error::ToolError;
use crate::security;
use crate::services::{GenerationClient, GenerationOptions, GenerationRequest};
use crate::tools::dispatch::{generate_text, load_context};
use crate::types::Extensions;
use schemars::JsonSchema;
use serde::Deserialize;

/// Default persona when the caller does not supply a system prompt.
pub const FIX_SYSTEM_PROMPT: &str = "You are a Web Accessibility Expert and Frontend Developer. Your task is to analyze accessibility problems in HTML and provide specific code changes to fix them.

Given:
1. Block code content with accessibility problems (JavaScript and CSS)
2. A suggestion for fixing the accessibility problem

You should:
1. Analyze the block code and identify the specific accessibility issue
2. Understand how the block code generates or styles the HTML
3. Provide exact code changes needed in the JavaScript and CSS files to implement the accessibility fix
4. Focus on practical, implementable solutions. Do not make up any information. Be sure to also check for class names and other attributes that may be used in the code.
5. Ensure the fix follows WCAG guidelines and best practices

Format your response with:
- Clear explanation of the accessibility issue
- Specific changes for JavaScript files (if needed)
- Specific changes for CSS files (if needed)
- Implementation notes or considerations";

/// Appended to every system prompt once the block context is attached.
pub const FIX_CONTEXT_NOTE: &str = "\n\nYou have been provided with the complete code context from the blocks directory. Use this code context to understand the existing patterns and structure. Provide changes that are consistent with the existing codebase style and patterns. Be sure to also check if there are needed any changes in the CSS styles as a result of the fix.";

/// Input for the fix_block_based_on_suggestion tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FixBlockInput {
    /// The name of the block where the accessibility problem lies
    pub block_name: String,
    /// The suggestion on how to fix the accessibility problem
    pub suggestion: String,
    /// Optional system prompt to set context
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Temperature for response randomness (0-2, default: 0.2)
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate (default: 10000)
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Optional array of file extensions to include (default: [.js, .css])
    #[serde(default)]
    pub file_extensions: Option<Vec<String>>,
}

impl FixBlockInput {
    /// Extensions to scan. An absent list means the defaults; an explicit
    /// empty list accepts nothing, so the context carries no files.
    #[must_use]
    pub fn extensions(&self) -> Extensions {
        match &self.file_extensions {
            Some(exts) => Extensions::new(exts),
            None => Extensions::default(),
        }
    }
}

/// Task prompt embedding the block name and the remediation suggestion.
#[must_use]
pub fn task_prompt(block_name: &str, suggestion: &str) -> String {
    format!(
        "\nBlock with accessibility problem:\n```\n{block_name}\n```\n\n\
         Accessibility fix suggestion:\n{suggestion}\n\n\
         Please analyze this accessibility issue and provide the specific code changes needed \
         and then do these changes in the JavaScript and CSS files to implement the suggested fix."
    )
}

/// Builds the generation request for a fix against an assembled context.
#[must_use]
pub fn build_request(input: &FixBlockInput, context: &str) -> GenerationRequest {
    let base = input
        .system_prompt
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(FIX_SYSTEM_PROMPT);

    GenerationRequest {
        system: format!("{base}{FIX_CONTEXT_NOTE}"),
        user: format!(
            "{}\n{}",
            task_prompt(&input.block_name, &input.suggestion),
            context
        ),
        options: GenerationOptions::with_overrides(input.temperature, input.max_tokens),
    }
}

/// Executes the fix tool: scan the named block directory, then ask the model.
///
/// # Errors
///
/// Returns `ToolError::InvalidArguments` if the block name escapes the
/// blocks root, `ToolError::DirectoryRead` if the block directory cannot be
/// scanned, and `ToolError::Generation` if the model call fails.
pub async fn execute_fix(
    settings: &DispatcherSettings,
    generator: &dyn GenerationClient,
    input: FixBlockInput,
) -> Result<String, ToolError> {
    let block_dir = security::resolve_block_dir(&settings.blocks_root, &input.block_name)
        .map_err(|e| {
            tracing::debug!("Rejected blockName ({}): {}", e.code(), input.block_name);
            ToolError::invalid("fix_block_based_on_suggestion", e.to_string())
        })?;

    let context = load_context(block_dir, input.extensions(), settings.max_context_chars).await?;

    tracing::debug!(
        "fix_block_based_on_suggestion: block '{}', {} files in context",
        input.block_name,
        context.files_included
    );

    let request = build_request(&input, context.as_str());
    generate_text(generator, request).await
}
