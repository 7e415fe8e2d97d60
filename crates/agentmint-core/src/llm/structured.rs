//! Schema-constrained generation and plain chat turns on top of a
//! [`BoxTextGenerator`].
//!
//! Decode contract for structured output:
//! 1. a refusal ends the call with [`GenerationError::Refusal`]
//! 2. a pre-parsed payload is decoded under the output shape
//! 3. otherwise (or if that fails) the raw text is parsed under the same shape
//! 4. if nothing decodes, one [`GenerationError::SchemaParse`] carries both causes

use tracing::debug;

use agentmint_types::error::GenerationError;
use agentmint_types::llm::{ChatMessage, CompletionRequest, CompletionResponse, OutputConfig};
use agentmint_types::persona::OutputShape;

use super::box_provider::BoxTextGenerator;

impl BoxTextGenerator {
    /// Generate a value of shape `T` from a system and a user prompt.
    pub async fn generate<T: OutputShape>(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<T, GenerationError> {
        let request = CompletionRequest {
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_prompt),
            ],
            output_config: Some(OutputConfig::json_schema(T::SCHEMA_NAME, T::schema())),
        };

        debug!(
            generator = self.name(),
            schema = T::SCHEMA_NAME,
            "requesting structured output"
        );
        let response = self.complete(&request).await?;
        decode_structured(response)
    }

    /// Send the whole conversation and return the next assistant message verbatim.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        let request = CompletionRequest {
            messages: messages.to_vec(),
            output_config: None,
        };

        debug!(
            generator = self.name(),
            messages = messages.len(),
            "requesting chat reply"
        );
        let response = self.complete(&request).await?;
        chat_reply(response)
    }
}

/// Decode a structured response into `T`.
pub fn decode_structured<T: OutputShape>(response: CompletionResponse) -> Result<T, GenerationError> {
    if let Some(reason) = refusal(&response) {
        return Err(GenerationError::Refusal(reason));
    }

    let mut failures = Vec::new();

    if let Some(parsed) = response.parsed {
        match serde_json::from_value::<T>(parsed) {
            Ok(value) => return Ok(value),
            Err(e) => failures.push(format!("parsed payload: {e}")),
        }
    }

    match response.content.as_deref().map(str::trim) {
        Some(content) if !content.is_empty() => match serde_json::from_str::<T>(content) {
            Ok(value) => return Ok(value),
            Err(e) => failures.push(format!("content: {e}; raw content: {content}")),
        },
        _ => failures.push("no content".to_string()),
    }

    Err(GenerationError::SchemaParse(format!(
        "{}: {}",
        T::SCHEMA_NAME,
        failures.join("; ")
    )))
}

fn chat_reply(response: CompletionResponse) -> Result<String, GenerationError> {
    if let Some(reason) = refusal(&response) {
        return Err(GenerationError::Refusal(reason));
    }
    match response.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(GenerationError::EmptyReply),
    }
}

fn refusal(response: &CompletionResponse) -> Option<String> {
    response
        .refusal
        .as_ref()
        .filter(|r| !r.trim().is_empty())
        .cloned()
}
