//! Infrastructure layer for agentmint.
//!
//! Implements the `agentmint-core` ports: OpenAI text generation, Civitai
//! image jobs, and the EVM agent registry. Also loads configuration and
//! environment credentials.

pub mod chain;
pub mod config;
pub mod credentials;
pub mod image;
pub mod llm;
