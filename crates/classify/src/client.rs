//! HTTP client for the sign classifier backend.

use async_trait::async_trait;
use reqwest::multipart;
use signwave_protocol::defaults::{DETECT_PATH, FRAME_FILENAME, IMAGE_FIELD, TICK_PERIOD_MS};
use signwave_protocol::{Detection, ErrorBody};
use std::time::Duration;

use crate::{ClassifyError, Result, SignClassifier};

/// Posts frames to `POST {base}/api/detect-sign` as a multipart form
/// with a single `image` field.
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ClassifierClient {
    /// Client with the default per-request timeout (one tick period).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_millis(TICK_PERIOD_MS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn detect_url(&self) -> String {
        format!("{}{}", self.base_url, DETECT_PATH)
    }
}

#[async_trait]
impl SignClassifier for ClassifierClient {
    async fn classify(&self, frame: Vec<u8>) -> Result<Detection> {
        let part = multipart::Part::bytes(frame)
            .file_name(FRAME_FILENAME)
            .mime_str("image/jpeg")
            .map_err(|e| ClassifyError::Protocol(e.to_string()))?;
        let form = multipart::Form::new().part(IMAGE_FIELD, part);

        let response = self
            .http
            .post(self.detect_url())
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifyError::Timeout
                } else {
                    ClassifyError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let detection = response
                .json::<Detection>()
                .await
                .map_err(|e| ClassifyError::Protocol(e.to_string()))?;
            tracing::trace!(
                sign = detection.sign.as_deref().unwrap_or("<none>"),
                confidence = detection.confidence,
                "classifier response"
            );
            Ok(detection)
        } else {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            Err(ClassifyError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }
}
