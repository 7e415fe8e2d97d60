//! Text-to-image job request and response shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sampler used by the diffusion backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scheduler {
    EulerA,
    Euler,
    Heun,
    #[serde(rename = "DPMPP2MKarras")]
    DpmPp2MKarras,
    #[serde(rename = "DDIM")]
    Ddim,
    #[serde(rename = "LCM")]
    Lcm,
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scheduler::EulerA => "EulerA",
            Scheduler::Euler => "Euler",
            Scheduler::Heun => "Heun",
            Scheduler::DpmPp2MKarras => "DPMPP2MKarras",
            Scheduler::Ddim => "DDIM",
            Scheduler::Lcm => "LCM",
        };
        f.write_str(name)
    }
}

/// Sampling parameters for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SamplingParams {
    pub scheduler: Scheduler,
    pub steps: u32,
    pub cfg_scale: f32,
    pub width: u32,
    pub height: u32,
    pub clip_skip: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            scheduler: Scheduler::EulerA,
            steps: 20,
            cfg_scale: 7.0,
            width: 832,
            height: 1216,
            clip_skip: 2,
        }
    }
}

/// Body of the job submission call.
#[derive(Debug, Clone, Serialize)]
pub struct ImageJobRequest {
    #[serde(rename = "$type")]
    pub job_type: &'static str,
    pub model: String,
    pub params: ImageJobParams,
    pub quantity: u32,
}

impl ImageJobRequest {
    pub fn text_to_image(
        model: impl Into<String>,
        prompt: impl Into<String>,
        negative_prompt: impl Into<String>,
        sampling: SamplingParams,
    ) -> Self {
        Self {
            job_type: "textToImage",
            model: model.into(),
            params: ImageJobParams {
                prompt: prompt.into(),
                negative_prompt: negative_prompt.into(),
                sampling,
            },
            quantity: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageJobParams {
    pub prompt: String,
    pub negative_prompt: String,
    #[serde(flatten)]
    pub sampling: SamplingParams,
}

/// Response of both the submission and the status call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageJobResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub jobs: Option<Vec<ImageJob>>,
}

impl ImageJobResponse {
    /// Whether the top-level job is still queued or running.
    pub fn is_scheduled(&self) -> bool {
        self.jobs
            .as_deref()
            .and_then(|jobs| jobs.first())
            .is_some_and(|job| job.scheduled)
    }
}

/// A top-level job. Its result nests the per-image sub-jobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageJob {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub scheduled: bool,
    #[serde(default)]
    pub result: Option<ImageJobResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageJobResult {
    #[serde(default)]
    pub jobs: Option<Vec<NestedImageJob>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NestedImageJob {
    #[serde(default)]
    pub result: Option<NestedJobResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedJobResult {
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub blob_url: Option<String>,
}
