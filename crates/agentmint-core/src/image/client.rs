//! Image generation: submit, bounded wait, nested-job resolution.

use tracing::{debug, info};

use agentmint_types::config::PollPolicy;
use agentmint_types::error::ImageError;
use agentmint_types::image::{ImageJobRequest, ImageJobResponse, SamplingParams};

use super::provider::BoxImageGenerator;

/// Renders one image per call and resolves it to an asset URL.
pub struct ImageClient {
    generator: BoxImageGenerator,
    model: String,
    poll: PollPolicy,
}

impl ImageClient {
    /// * `model` - checkpoint URN sent with every job
    /// * `poll` - wait bound while the job reports `scheduled`
    pub fn new(generator: BoxImageGenerator, model: String, poll: PollPolicy) -> Self {
        Self {
            generator,
            model,
            poll,
        }
    }

    /// Submit a job and wait for it, returning the first available asset URL.
    pub async fn generate_image(
        &self,
        prompt: &str,
        negative_prompt: &str,
        sampling: &SamplingParams,
    ) -> Result<String, ImageError> {
        let request = ImageJobRequest::text_to_image(
            self.model.clone(),
            prompt,
            negative_prompt,
            sampling.clone(),
        );

        info!(generator = self.generator.name(), model = %self.model, "submitting image job");
        let mut response = self.generator.submit(&request).await?;
        let mut token = response.token.clone();
        let mut attempts = 0;

        while response.is_scheduled() {
            if attempts >= self.poll.max_attempts {
                return Err(ImageError::Timeout { attempts });
            }
            let Some(current) = token.as_deref() else {
                return Err(ImageError::MissingToken);
            };
            tokio::time::sleep(self.poll.interval()).await;
            attempts += 1;
            debug!(attempt = attempts, "polling image job");
            response = self.generator.status(current).await?;
            if response.token.is_some() {
                token = response.token.clone();
            }
        }

        let url = resolve_asset(&response)?;
        info!(attempts, "image job resolved");
        Ok(url)
    }
}

/// Pick the asset URL out of a finished job response.
///
/// The first top-level job must carry a nested-job collection; the first
/// nested job marked available with a non-empty URL wins.
pub fn resolve_asset(response: &ImageJobResponse) -> Result<String, ImageError> {
    let nested = response
        .jobs
        .as_deref()
        .and_then(|jobs| jobs.first())
        .and_then(|job| job.result.as_ref())
        .and_then(|result| result.jobs.as_deref())
        .ok_or(ImageError::NoNestedJobs)?;

    nested
        .iter()
        .filter_map(|job| job.result.as_ref())
        .filter(|result| result.available)
        .find_map(|result| result.blob_url.as_deref().filter(|url| !url.is_empty()))
        .map(str::to_string)
        .ok_or(ImageError::AssetUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedImageGenerator;
    use agentmint_types::image::{ImageJob, ImageJobResult, NestedImageJob, NestedJobResult};
    use std::time::Duration;

    fn nested(result: Option<NestedJobResult>) -> NestedImageJob {
        NestedImageJob { result }
    }

    fn available(url: &str) -> Option<NestedJobResult> {
        Some(NestedJobResult {
            available: true,
            blob_url: Some(url.to_string()),
        })
    }

    fn finished(nested_jobs: Vec<NestedImageJob>) -> ImageJobResponse {
        ImageJobResponse {
            token: Some("tok".to_string()),
            jobs: Some(vec![ImageJob {
                job_id: Some("job-1".to_string()),
                scheduled: false,
                result: Some(ImageJobResult {
                    jobs: Some(nested_jobs),
                }),
            }]),
        }
    }

    fn scheduled() -> ImageJobResponse {
        ImageJobResponse {
            token: Some("tok".to_string()),
            jobs: Some(vec![ImageJob {
                job_id: Some("job-1".to_string()),
                scheduled: true,
                result: None,
            }]),
        }
    }

    fn client(generator: ScriptedImageGenerator, max_attempts: u32) -> ImageClient {
        ImageClient::new(
            BoxImageGenerator::new(generator),
            "urn:test".to_string(),
            PollPolicy {
                interval_ms: 5_000,
                max_attempts,
            },
        )
    }

    #[test]
    fn unavailable_nested_job_is_asset_unavailable() {
        let response: ImageJobResponse = serde_json::from_str(
            r#"{"jobs":[{"result":{"jobs":[{"result":{"available":false}}]}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            resolve_asset(&response),
            Err(ImageError::AssetUnavailable)
        ));
    }

    #[test]
    fn missing_nested_collection_is_no_nested_jobs() {
        let response: ImageJobResponse =
            serde_json::from_str(r#"{"jobs":[{"result":{}}]}"#).unwrap();
        assert!(matches!(resolve_asset(&response), Err(ImageError::NoNestedJobs)));
        assert!(matches!(
            resolve_asset(&ImageJobResponse::default()),
            Err(ImageError::NoNestedJobs)
        ));
    }

    #[test]
    fn first_available_with_url_wins() {
        let response = finished(vec![
            nested(None),
            nested(Some(NestedJobResult {
                available: true,
                blob_url: Some(String::new()),
            })),
            nested(Some(NestedJobResult {
                available: false,
                blob_url: Some("https://img/pending.png".to_string()),
            })),
            nested(available("https://img/a.png")),
            nested(available("https://img/b.png")),
        ]);
        assert_eq!(resolve_asset(&response).unwrap(), "https://img/a.png");
    }

    #[test]
    fn available_without_url_is_unavailable() {
        let response = finished(vec![nested(Some(NestedJobResult {
            available: true,
            blob_url: None,
        }))]);
        assert!(matches!(
            resolve_asset(&response),
            Err(ImageError::AssetUnavailable)
        ));
    }

    #[tokio::test]
    async fn finished_submission_needs_no_polling() {
        let generator =
            ScriptedImageGenerator::new(finished(vec![nested(available("https://img/a.png"))]), vec![]);
        let polls = generator.polls();
        let submitted = generator.submitted();
        let url = client(generator, 3)
            .generate_image("1girl, bard", "worst quality", &SamplingParams::default())
            .await
            .unwrap();
        assert_eq!(url, "https://img/a.png");
        assert_eq!(*polls.lock().unwrap(), 0);
        let submitted = submitted.lock().unwrap();
        assert_eq!(submitted[0].model, "urn:test");
        assert_eq!(submitted[0].params.negative_prompt, "worst quality");
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_job_leaves_schedule() {
        let generator = ScriptedImageGenerator::new(
            scheduled(),
            vec![
                Ok(scheduled()),
                Ok(finished(vec![nested(available("https://img/done.png"))])),
            ],
        );
        let polls = generator.polls();
        let start = tokio::time::Instant::now();
        let url = client(generator, 5)
            .generate_image("p", "n", &SamplingParams::default())
            .await
            .unwrap();
        assert_eq!(url, "https://img/done.png");
        assert_eq!(*polls.lock().unwrap(), 2);
        assert!(start.elapsed() >= Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let generator = ScriptedImageGenerator::new(
            scheduled(),
            (0..10).map(|_| Ok(scheduled())).collect(),
        );
        let polls = generator.polls();
        let err = client(generator, 3)
            .generate_image("p", "n", &SamplingParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::Timeout { attempts: 3 }));
        assert_eq!(*polls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn scheduled_without_token_fails() {
        let mut response = scheduled();
        response.token = None;
        let err = client(ScriptedImageGenerator::new(response, vec![]), 3)
            .generate_image("p", "n", &SamplingParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::MissingToken));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_transport_error_propagates() {
        let generator = ScriptedImageGenerator::new(
            scheduled(),
            vec![Err(ImageError::Transport("502".to_string()))],
        );
        let err = client(generator, 3)
            .generate_image("p", "n", &SamplingParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::Transport(_)));
    }
}
