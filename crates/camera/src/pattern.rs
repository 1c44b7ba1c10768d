//! Synthetic frame source producing a moving test pattern.

use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::{encode_jpeg, CaptureConfig, FrameError, FrameSource, Result};

/// Simulated open failures, for exercising the acquisition error paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenFailure {
    Denied,
    Absent,
}

/// A camera stand-in that renders a moving gradient.
///
/// Mirrors the lifecycle of a real device: `open` starts a "stream"
/// that needs a warm-up window before the first frame is available,
/// `capture` encodes the current pattern as JPEG, `close` drops the
/// stream.
pub struct TestPatternSource {
    config: CaptureConfig,
    warmup: Duration,
    failure: Option<OpenFailure>,
    opened_at: Option<Instant>,
    frame_counter: u64,
}

impl TestPatternSource {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            warmup: Duration::ZERO,
            failure: None,
            opened_at: None,
            frame_counter: 0,
        }
    }

    /// Delay after `open` during which `capture` reports `NotReady`.
    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    /// A source whose `open` always fails with `PermissionDenied`.
    pub fn denied() -> Self {
        let mut source = Self::new(CaptureConfig::default());
        source.failure = Some(OpenFailure::Denied);
        source
    }

    /// A source whose `open` always fails with `NoDevice`.
    pub fn absent() -> Self {
        let mut source = Self::new(CaptureConfig::default());
        source.failure = Some(OpenFailure::Absent);
        source
    }

    fn render_rgb(&self) -> Vec<u8> {
        let (w, h) = (self.config.width as usize, self.config.height as usize);
        let phase = (self.frame_counter % 256) as u8;
        let mut rgb = Vec::with_capacity(w * h * 3);
        for y in 0..h {
            for x in 0..w {
                rgb.push(((x * 255) / w.max(1)) as u8 ^ phase);
                rgb.push(((y * 255) / h.max(1)) as u8);
                rgb.push(phase);
            }
        }
        rgb
    }
}

#[async_trait]
impl FrameSource for TestPatternSource {
    async fn open(&mut self) -> Result<()> {
        match self.failure {
            Some(OpenFailure::Denied) => return Err(FrameError::PermissionDenied),
            Some(OpenFailure::Absent) => return Err(FrameError::NoDevice),
            None => {}
        }
        self.opened_at = Some(Instant::now());
        self.frame_counter = 0;
        tracing::debug!(
            width = self.config.width,
            height = self.config.height,
            "test pattern source opened"
        );
        Ok(())
    }

    async fn capture(&mut self) -> Result<Vec<u8>> {
        let opened_at = self.opened_at.ok_or(FrameError::NotLive)?;
        if opened_at.elapsed() < self.warmup {
            return Err(FrameError::NotReady);
        }
        self.frame_counter += 1;
        let rgb = self.render_rgb();
        encode_jpeg(
            &rgb,
            self.config.width,
            self.config.height,
            self.config.jpeg_quality,
        )
    }

    async fn close(&mut self) {
        if self.opened_at.take().is_some() {
            tracing::debug!(frames = self.frame_counter, "test pattern source closed");
        }
    }

    fn is_live(&self) -> bool {
        self.opened_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn capture_before_open_is_not_live() {
        let mut source = TestPatternSource::new(CaptureConfig::default());
        assert!(matches!(source.capture().await, Err(FrameError::NotLive)));
    }

    #[tokio::test]
    async fn capture_during_warmup_is_not_ready() {
        let mut source =
            TestPatternSource::new(CaptureConfig::default()).with_warmup(Duration::from_secs(60));
        source.open().await.unwrap();
        assert!(matches!(source.capture().await, Err(FrameError::NotReady)));
    }

    #[tokio::test]
    async fn open_capture_close_lifecycle() {
        let mut source = TestPatternSource::new(CaptureConfig {
            width: 32,
            height: 24,
            jpeg_quality: 80,
        });
        source.open().await.unwrap();
        assert!(source.is_live());

        let frame = source.capture().await.unwrap();
        assert!(!frame.is_empty());

        source.close().await;
        source.close().await; // idempotent
        assert!(!source.is_live());
        assert!(matches!(source.capture().await, Err(FrameError::NotLive)));
    }

    #[tokio::test]
    async fn open_failure_modes() {
        assert!(matches!(
            TestPatternSource::denied().open().await,
            Err(FrameError::PermissionDenied)
        ));
        assert!(matches!(
            TestPatternSource::absent().open().await,
            Err(FrameError::NoDevice)
        ));
    }
}
