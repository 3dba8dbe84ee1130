//! Completion provider integrations for aria
//!
//! This crate provides the provider abstraction and an OpenAI-compatible
//! chat-completions client.

pub mod base;
pub mod openai;

pub use base::{
    GenerationParams, LLMProvider, LLMResponse, Message, ProviderError, ProviderResult, Usage,
};
pub use openai::OpenAIClient;
