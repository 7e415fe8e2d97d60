//! TextGenerator trait definition.

use agentmint_types::error::GenerationError;
use agentmint_types::llm::{CompletionRequest, CompletionResponse};

/// Trait for text generation backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). A backend
/// returns the first choice untouched; schema decoding and refusal handling
/// happen in [`crate::llm::structured`], so every backend gets the same
/// two-step decode.
///
/// Implementations live in agentmint-infra (e.g., `OpenAiTextGenerator`).
pub trait TextGenerator: Send + Sync {
    /// Human-readable backend name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and receive the first choice.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, GenerationError>> + Send;
}
