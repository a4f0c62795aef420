//! Claude API integration for product recommendations.
//!
//! The recommendation service only needs "prompt in, text out", expressed by
//! [`TextCompletion`]; [`ClaudeClient`] is the production implementation.

mod client;
mod error;
mod types;

use async_trait::async_trait;

pub use client::ClaudeClient;
pub use error::ClaudeError;
pub use types::{ChatResponse, ContentBlock, Message, StopReason, Usage};

/// A text completion backend.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Complete `prompt`, returning the model's text reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or replies with no text.
    async fn complete(&self, prompt: &str) -> Result<String, ClaudeError>;
}
