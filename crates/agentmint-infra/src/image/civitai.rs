//! CivitaiImageGenerator -- [`ImageGenerator`] for the Civitai orchestration
//! job API.
//!
//! `POST /v1/consumer/jobs` submits a job; `GET /v1/consumer/jobs?token=..`
//! reports its state. The API token is wrapped in [`SecretString`] and only
//! exposed when building the authorization header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use agentmint_core::image::provider::ImageGenerator;
use agentmint_types::error::ImageError;
use agentmint_types::image::{ImageJobRequest, ImageJobResponse};

const JOBS_PATH: &str = "/v1/consumer/jobs";

/// Civitai orchestration backend.
///
/// Does NOT derive Debug: it holds the API token.
pub struct CivitaiImageGenerator {
    client: reqwest::Client,
    api_token: SecretString,
    base_url: String,
}

impl CivitaiImageGenerator {
    pub fn new(api_token: SecretString, base_url: String) -> Result<Self, ImageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ImageError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn jobs_url(&self) -> String {
        format!("{}{}", self.base_url, JOBS_PATH)
    }

    async fn read_response(response: reqwest::Response) -> Result<ImageJobResponse, ImageError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Transport(match status.as_u16() {
                401 | 403 => format!("authentication failed (HTTP {status})"),
                429 => format!("rate limited (HTTP {status})"),
                _ => format!("HTTP {status}: {body}"),
            }));
        }

        response
            .json::<ImageJobResponse>()
            .await
            .map_err(|e| ImageError::Transport(format!("failed to parse job response: {e}")))
    }
}

impl ImageGenerator for CivitaiImageGenerator {
    fn name(&self) -> &str {
        "civitai"
    }

    async fn submit(&self, request: &ImageJobRequest) -> Result<ImageJobResponse, ImageError> {
        let response = self
            .client
            .post(self.jobs_url())
            .bearer_auth(self.api_token.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| ImageError::Transport(format!("HTTP request failed: {e}")))?;

        let job = Self::read_response(response).await?;
        debug!(scheduled = job.is_scheduled(), "image job submitted");
        Ok(job)
    }

    async fn status(&self, token: &str) -> Result<ImageJobResponse, ImageError> {
        let response = self
            .client
            .get(self.jobs_url())
            .bearer_auth(self.api_token.expose_secret())
            .query(&[("token", token)])
            .send()
            .await
            .map_err(|e| ImageError::Transport(format!("HTTP request failed: {e}")))?;

        Self::read_response(response).await
    }
}
