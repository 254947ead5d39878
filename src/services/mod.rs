//! Core services for context building and generation.

pub mod context;
pub mod generation;
pub mod scanner;

pub use context::{
    assemble, DirectoryContext, CONTEXT_FOOTER, CONTEXT_HEADER, DEFAULT_MAX_CONTEXT_CHARS,
    TRUNCATION_NOTICE,
};
pub use generation::{
    AzureOpenAiClient, ChatMessage, Completion, GenerationClient, GenerationOptions,
    GenerationRequest, Usage,
};
pub use scanner::{scan, EXCLUDED_DIRS};
