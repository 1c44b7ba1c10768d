//! Classifier access: the HTTP client submitting frames for
//! recognition and the periodic reachability probe.

mod client;
mod probe;

pub use client::ClassifierClient;
pub use probe::{HealthProbe, ProbeHandle};

use async_trait::async_trait;
use signwave_protocol::Detection;

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("classification request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed classifier response: {0}")]
    Protocol(String),
    #[error("classifier returned status {status}: {message}")]
    Server { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, ClassifyError>;

/// Submits one encoded frame and returns the classifier's verdict.
///
/// Strictly request/response; implementations must give up within the
/// capture cadence so the loop never stalls on a single call.
#[async_trait]
pub trait SignClassifier: Send + Sync {
    async fn classify(&self, frame: Vec<u8>) -> Result<Detection>;
}
