//! The logical image-edit call, with retries.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{EditTransport, HttpTransport};
use crate::config::FalConfig;
use crate::error::EditError;
use crate::payload::{EditRequest, ImagePayload};
use crate::response;
use crate::retry::RetryPolicy;

/// Successful edit result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedImage {
    pub url: String,
}

/// Submit an image and a prompt, get back a result URL or a failure.
///
/// Any retrying happens inside the implementation; every error returned
/// is final for the caller.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    async fn edit(&self, image: &ImagePayload, prompt: &str) -> Result<EditedImage, EditError>;
}

#[async_trait]
impl<T: ImageEditor + ?Sized> ImageEditor for Arc<T> {
    async fn edit(&self, image: &ImagePayload, prompt: &str) -> Result<EditedImage, EditError> {
        (**self).edit(image, prompt).await
    }
}

/// fal.ai edit client: builds the request, sends it through a transport,
/// classifies the response and retries per [`RetryPolicy`].
pub struct FalEditClient<T = HttpTransport> {
    transport: T,
    policy: RetryPolicy,
}

impl FalEditClient<HttpTransport> {
    /// Client over HTTP with the default retry policy.
    pub fn from_config(config: &FalConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(HttpTransport::new(config)?, RetryPolicy::default()))
    }
}

impl<T: EditTransport> FalEditClient<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// One independent attempt. The request body is rebuilt every time.
    async fn attempt(&self, image: &ImagePayload, prompt: &str) -> Result<EditedImage, EditError> {
        let body = EditRequest::build(image, prompt)?.to_json()?;
        let raw = self.transport.post(&body).await?;
        response::classify(&raw)
    }
}

#[async_trait]
impl<T: EditTransport> ImageEditor for FalEditClient<T> {
    async fn edit(&self, image: &ImagePayload, prompt: &str) -> Result<EditedImage, EditError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let err = match self.attempt(image, prompt).await {
                Ok(result) => {
                    tracing::debug!(attempt, url = %result.url, "Edit call succeeded");
                    return Ok(result);
                }
                Err(err) => err,
            };

            if !err.is_retryable() {
                tracing::warn!(attempt, error = %err, "Edit call failed with a terminal error");
                return Err(err);
            }

            match self.policy.next_delay(attempt, &err) {
                Some(delay) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.policy.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Edit attempt failed, retrying",
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::warn!(attempt, error = %err, "Edit attempts exhausted");
                    return Err(EditError::ExhaustedRetries {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use assert_matches::assert_matches;

    use super::*;

    const OK_BODY: &str = r#"{"images": [{"url": "https://cdn.example/out.png"}]}"#;

    #[derive(Clone, Copy)]
    enum Step {
        Body(&'static str),
        Timeout,
        Unavailable,
    }

    /// Transport that replays a script and then repeats its last entry.
    struct Scripted {
        script: Mutex<VecDeque<Step>>,
        calls: AtomicU32,
        last_body: Mutex<Option<serde_json::Value>>,
    }

    impl Scripted {
        fn new(script: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
                last_body: Mutex::new(None),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EditTransport for Scripted {
        async fn post(&self, body: &serde_json::Value) -> Result<Vec<u8>, EditError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_body.lock().unwrap() = Some(body.clone());

            let mut script = self.script.lock().unwrap();
            let step = if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                *script.front().unwrap()
            };
            match step {
                Step::Body(body) => Ok(body.as_bytes().to_vec()),
                Step::Timeout => Err(EditError::Timeout),
                Step::Unavailable => Err(EditError::Transport("HTTP 503: down".into())),
            }
        }
    }

    fn client(transport: Arc<Scripted>) -> FalEditClient<Arc<Scripted>> {
        FalEditClient::new(transport, RetryPolicy::immediate(3))
    }

    fn image() -> ImagePayload {
        ImagePayload::new(b"fake-png".to_vec(), Some("image/png".into()))
    }

    #[tokio::test]
    async fn success_on_first_attempt() {
        let transport = Scripted::new(vec![Step::Body(OK_BODY)]);
        let result = client(transport.clone()).edit(&image(), "make it blue").await.unwrap();

        assert_eq!(result.url, "https://cdn.example/out.png");
        assert_eq!(transport.calls(), 1);

        let sent = transport.last_body.lock().unwrap().clone().unwrap();
        assert_eq!(sent["prompt"], "make it blue");
    }

    #[tokio::test]
    async fn fails_twice_then_succeeds() {
        let transport = Scripted::new(vec![
            Step::Timeout,
            Step::Body("not json"),
            Step::Body(OK_BODY),
        ]);
        let result = client(transport.clone()).edit(&image(), "p").await.unwrap();

        assert_eq!(result.url, "https://cdn.example/out.png");
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn structured_error_exhausts_attempts() {
        let transport = Scripted::new(vec![Step::Body(r#"{"error": "busy"}"#)]);
        let err = client(transport.clone()).edit(&image(), "p").await.unwrap_err();

        assert_eq!(transport.calls(), 3);
        assert_matches!(
            err,
            EditError::ExhaustedRetries { attempts: 3, last } if matches!(*last, EditError::Remote(_))
        );
    }

    #[tokio::test]
    async fn safety_rejection_is_not_retried() {
        let transport = Scripted::new(vec![Step::Body(
            r#"{"images": [{"url": "u"}], "has_nsfw_concepts": [true]}"#,
        )]);
        let err = client(transport.clone()).edit(&image(), "p").await.unwrap_err();

        assert_matches!(err, EditError::SafetyRejected);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn payload_error_never_reaches_transport() {
        let transport = Scripted::new(vec![Step::Body(OK_BODY)]);
        let bad = ImagePayload::new(b"x".to_vec(), Some("nonsense".into()));
        let err = client(transport.clone()).edit(&bad, "p").await.unwrap_err();

        assert_matches!(err, EditError::Payload(_));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn transport_errors_surface_as_last_error() {
        let transport = Scripted::new(vec![Step::Unavailable]);
        let err = FalEditClient::new(transport.clone(), RetryPolicy::immediate(2))
            .edit(&image(), "p")
            .await
            .unwrap_err();

        assert_eq!(transport.calls(), 2);
        assert_matches!(
            err,
            EditError::ExhaustedRetries { attempts: 2, last } if matches!(*last, EditError::Transport(_))
        );
    }
}
