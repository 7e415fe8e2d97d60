//! Orchestration core for agentmint.
//!
//! Defines the ports (`TextGenerator`, `ImageGenerator`, `AgentChain`) that
//! the infrastructure layer implements, and the logic built on them: the
//! persona wizard, image job resolution, the registrar, and chat sessions.
//! Depends only on `agentmint-types` -- never on HTTP or chain crates.

pub mod chain;
pub mod chat;
pub mod image;
pub mod llm;
pub mod wizard;

#[cfg(test)]
pub(crate) mod testing;
