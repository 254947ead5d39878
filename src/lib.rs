//! blocksmith: MCP server for block-aware accessibility work.
//!
//! This library exposes two tools to MCP clients:
//! - `match_html_to_block`: identify which block renders a piece of HTML
//! - `fix_block_based_on_suggestion`: draft JS/CSS changes for one block
//!
//! Both tools gather source files from a blocks directory, pack them into a
//! bounded text context, and ask a chat-completion model for the answer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              MCP Server (rmcp)              │
//! │         JSON-RPC over stdin/stdout          │
//! └─────────────────┬───────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────┐
//! │              Tool Dispatcher                 │
//! │   registry lookup, validation, panic guard  │
//! └───────┬───────────────────────────┬─────────┘
//!         │                           │
//! ┌───────▼─────────┐       ┌─────────▼─────────┐
//! │ Scanner+Context │       │ Generation client │
//! │ (spawn_blocking)│       │ (Azure OpenAI)    │
//! └───────┬─────────┘       └───────────────────┘
//!         │
//!    ┌────▼──────────────┐
//!    │  blocks directory  │
//!    └───────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod fmt;
pub mod security;
pub mod server;
pub mod services;
pub mod tools;
pub mod types;

pub use config::{DispatcherSettings, GenerationConfig};
pub use error::{Result, ServerError};
pub use types::{Extensions, FileRecord};
