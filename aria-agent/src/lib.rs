//! Agent logic for aria
//!
//! This crate provides the travel knowledge base, system prompt
//! construction and the completion gateway that ties conversation memory
//! to the provider.

pub mod context;
pub mod gateway;
pub mod knowledge;

pub use context::ContextBuilder;
pub use gateway::{
    validate_message, ChatReply, CompletionGateway, GatewayError, GatewaySettings, ReplyOutcome,
    FALLBACK_REPLY,
};
pub use knowledge::{Persona, ARIA};
