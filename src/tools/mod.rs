//! MCP tool implementations.

mod dispatch;
mod fix_block;
mod match_block;
mod registry;

// dispatch
pub use dispatch::{ContentBlock, ToolDispatcher, ToolInvocation, ToolResult};

// fix_block
pub use fix_block::{execute_fix, FixBlockInput, FIX_CONTEXT_NOTE, FIX_SYSTEM_PROMPT};

// match_block
pub use match_block::{execute_match, MatchHtmlInput, MATCH_CONTEXT_NOTE, MATCH_SYSTEM_PROMPT};

// registry
pub use registry::{JsonObject, ToolDefinition, ToolKind, ToolRegistry};
