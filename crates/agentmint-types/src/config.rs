//! Configuration types for agentmint.
//!
//! `AppConfig` mirrors `config.toml`. Every field has a default, so an empty
//! or partial file is valid. Credentials never live here; they come from the
//! environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::image::SamplingParams;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Start the wizard in assisted (auto-fill) mode.
    #[serde(default)]
    pub assisted: bool,

    #[serde(default)]
    pub text: TextConfig,

    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub chain: ChainConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assisted: false,
            text: TextConfig::default(),
            image: ImageConfig::default(),
            chain: ChainConfig::default(),
        }
    }
}

/// Fixed-interval, bounded polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Text generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-2024-08-06".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            max_tokens: 1024,
            request_timeout_secs: 120,
        }
    }
}

/// Image generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub base_url: String,
    /// Checkpoint URN.
    pub model: String,
    /// Prepended to every generated image prompt.
    pub prompt_prefix: String,
    pub negative_prompt: String,
    pub sampling: SamplingParams,
    pub poll: PollPolicy,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://orchestration.civitai.com".to_string(),
            model: "urn:air:sdxl:checkpoint:civitai:827184@1410435".to_string(),
            prompt_prefix: "masterpiece,best quality,amazing quality, cowboy shot, ".to_string(),
            negative_prompt: "bad quality,worst quality,worst detail,sketch,censor,".to_string(),
            sampling: SamplingParams::default(),
            poll: PollPolicy {
                interval_ms: 5_000,
                max_attempts: 36,
            },
        }
    }
}

/// Chain settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Base Sepolia by default.
    pub chain_id: u64,
    pub receipt_poll: PollPolicy,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 84_532,
            receipt_poll: PollPolicy {
                interval_ms: 2_000,
                max_attempts: 60,
            },
        }
    }
}
