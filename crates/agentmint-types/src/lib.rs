//! Shared domain types for agentmint.
//!
//! Drafts and stages, on-chain agent records, generation request/response
//! shapes, configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, schemars, thiserror.

pub mod agent;
pub mod config;
pub mod draft;
pub mod error;
pub mod image;
pub mod llm;
pub mod persona;
pub mod schema;
