//! MCP server implementation using rmcp.
//!
//! A thin protocol adapter: `tools/list` is answered from the registry and
//! `tools/call` is forwarded to the [`ToolDispatcher`]. Tool failures are
//! returned in-band as `isError` results, never as JSON-RPC errors.

use crate::config::{DispatcherSettings, GenerationConfig};
use crate::error::Result;
use crate::services::{AzureOpenAiClient, GenerationClient};
use crate::tools::{ContentBlock, ToolDefinition, ToolDispatcher, ToolInvocation, ToolResult};
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The blocksmith MCP server.
#[derive(Clone)]
pub struct BlocksmithServer {
    dispatcher: ToolDispatcher,
    /// Tool calls run one at a time.
    gate: Arc<Mutex<()>>,
}

impl BlocksmithServer {
    /// Creates a server around an existing generation client.
    pub fn new(settings: DispatcherSettings, generator: Arc<dyn GenerationClient>) -> Self {
        Self {
            dispatcher: ToolDispatcher::new(settings, generator),
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Creates a server backed by the Azure OpenAI client.
    ///
    /// Missing credentials do not fail here; they surface on the first tool
    /// call as a generation error.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(settings: DispatcherSettings, config: GenerationConfig) -> Result<Self> {
        if !config.has_api_key() {
            tracing::warn!("AZURE_OPENAI_API_KEY is not set; generation calls will fail");
        }
        if !config.has_endpoint() {
            tracing::warn!("AZURE_OPENAI_ENDPOINT is not set; generation calls will fail");
        }

        let client = AzureOpenAiClient::new(config)?;
        Ok(Self::new(settings, Arc::new(client)))
    }

    #[must_use]
    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Runs one tool call under the server-wide gate.
    pub async fn call(&self, invocation: ToolInvocation) -> ToolResult {
        let _guard = self.gate.lock().await;
        self.dispatcher.invoke(invocation).await
    }
}

fn to_mcp_tool(def: &ToolDefinition) -> Tool {
    Tool::new(def.name, def.description, Arc::clone(&def.input_schema))
}

fn to_call_result(result: ToolResult) -> CallToolResult {
    let content = result
        .content
        .into_iter()
        .map(|ContentBlock::Text { text }| Content::text(text))
        .collect();

    if result.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

impl ServerHandler for BlocksmithServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = format!(
            "blocksmith: block-aware accessibility assistant.\n\n\
             TOOLS:\n\
             - match_html_to_block: pass rendered HTML as 'message' to learn which block produces it\n\
             - fix_block_based_on_suggestion: pass 'blockName' and a 'suggestion' to get concrete JS/CSS changes\n\n\
             Blocks root: {}\n\n\
             Responses are model-generated text grounded in the block sources; \
             review suggested changes before applying them.",
            self.dispatcher.settings().blocks_root.display()
        );

        ServerInfo {
            instructions: Some(instructions),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        let tools = self.dispatcher.list_tools().iter().map(to_mcp_tool).collect();
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let invocation = ToolInvocation::new(request.name, request.arguments.unwrap_or_default());
        Ok(to_call_result(self.call(invocation).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolRegistry;

    #[test]
    fn test_to_mcp_tool_keeps_schema() {
        let registry = ToolRegistry::new();
        let def = registry.get("match_html_to_block").unwrap();
        let tool = to_mcp_tool(def);

        assert_eq!(tool.name, "match_html_to_block");
        assert_eq!(tool.input_schema["type"], "object");
    }

    #[test]
    fn test_to_call_result_error_flag() {
        let ok = to_call_result(ToolResult::success("fine"));
        assert_eq!(ok.is_error, Some(false));

        let err = to_call_result(ToolResult::error("Error: Unknown tool: x"));
        assert_eq!(err.is_error, Some(true));
        assert_eq!(err.content.len(), 1);
    }
}
