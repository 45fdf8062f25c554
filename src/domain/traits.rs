//! # Domain Traits
//!
//! Abstract interfaces for the two outward-facing seams (editor events,
//! text generation). Allows for pluggable implementations in the
//! Infrastructure layer and plain fakes in tests.

use async_trait::async_trait;

use crate::domain::types::UiEvent;

/// Abstract interface for the editor-facing event channel.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one protocol event to the editor.
    async fn emit(&self, event: UiEvent) -> Result<(), String>;
}

/// Abstract interface for the remote text generation endpoint.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for the fully assembled prompt.
    async fn generate(&self, prompt: &str) -> Result<String, String>;
}
