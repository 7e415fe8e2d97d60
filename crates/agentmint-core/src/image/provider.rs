//! ImageGenerator trait and its object-safe wrapper.

use std::future::Future;
use std::pin::Pin;

use agentmint_types::error::ImageError;
use agentmint_types::image::{ImageJobRequest, ImageJobResponse};

/// Trait for text-to-image job backends.
///
/// Backends only move job payloads. Polling and asset resolution live in
/// [`super::client::ImageClient`].
pub trait ImageGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Submit one job.
    fn submit(
        &self,
        request: &ImageJobRequest,
    ) -> impl Future<Output = Result<ImageJobResponse, ImageError>> + Send;

    /// Fetch the current state of a submitted job by its token.
    fn status(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<ImageJobResponse, ImageError>> + Send;
}

/// Object-safe version of [`ImageGenerator`] with boxed futures.
pub trait ImageGeneratorDyn: Send + Sync {
    fn name(&self) -> &str;

    fn submit_boxed<'a>(
        &'a self,
        request: &'a ImageJobRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ImageJobResponse, ImageError>> + Send + 'a>>;

    fn status_boxed<'a>(
        &'a self,
        token: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ImageJobResponse, ImageError>> + Send + 'a>>;
}

impl<T: ImageGenerator> ImageGeneratorDyn for T {
    fn name(&self) -> &str {
        ImageGenerator::name(self)
    }

    fn submit_boxed<'a>(
        &'a self,
        request: &'a ImageJobRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ImageJobResponse, ImageError>> + Send + 'a>> {
        Box::pin(self.submit(request))
    }

    fn status_boxed<'a>(
        &'a self,
        token: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ImageJobResponse, ImageError>> + Send + 'a>> {
        Box::pin(self.status(token))
    }
}

/// Type-erased image generator.
pub struct BoxImageGenerator {
    inner: Box<dyn ImageGeneratorDyn + Send + Sync>,
}

impl BoxImageGenerator {
    pub fn new<T: ImageGenerator + 'static>(generator: T) -> Self {
        Self {
            inner: Box::new(generator),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn submit(&self, request: &ImageJobRequest) -> Result<ImageJobResponse, ImageError> {
        self.inner.submit_boxed(request).await
    }

    pub async fn status(&self, token: &str) -> Result<ImageJobResponse, ImageError> {
        self.inner.status_boxed(token).await
    }
}
