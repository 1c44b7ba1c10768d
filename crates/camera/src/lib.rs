//! Frame acquisition for the translation loop.
//!
//! The loop depends on the [`FrameSource`] trait, not on any concrete
//! capture device: it asks for one encoded still frame per tick and
//! releases the device on stop. A synthetic [`TestPatternSource`] keeps
//! the pipeline demonstrable (and testable) without camera hardware.

mod pattern;

pub use pattern::TestPatternSource;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use signwave_protocol::defaults;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no capture device available")]
    NoDevice,
    #[error("source is not live")]
    NotLive,
    #[error("stream is still negotiating, no frame available yet")]
    NotReady,
    #[error("frame encoding failed: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, FrameError>;

/// Requested capture geometry and encoding quality.
#[derive(Debug, Clone, Copy)]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
    /// JPEG quality, 0-100.
    pub jpeg_quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: defaults::CAPTURE_WIDTH,
            height: defaults::CAPTURE_HEIGHT,
            jpeg_quality: defaults::JPEG_QUALITY,
        }
    }
}

/// A live frame producer.
///
/// `open` acquires the device; `capture` returns the most recent frame
/// as encoded JPEG bytes and must stay cheap enough to call once per
/// second; `close` releases the device on every exit path and is
/// idempotent.
#[async_trait]
pub trait FrameSource: Send {
    /// Acquire the device. Fails with `PermissionDenied` or `NoDevice`.
    async fn open(&mut self) -> Result<()>;

    /// Encode and return the current frame.
    ///
    /// Fails with `NotLive` before `open` / after `close`, and with
    /// `NotReady` while the stream is still warming up. Never returns
    /// an empty buffer.
    async fn capture(&mut self) -> Result<Vec<u8>>;

    /// Release the device. Idempotent; after this, `capture` fails.
    async fn close(&mut self);

    /// Whether the source currently holds a live stream.
    fn is_live(&self) -> bool;
}

/// Encode a packed RGB8 buffer as JPEG.
pub fn encode_jpeg(rgb: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode(rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| FrameError::Encode(e.to_string()))?;
    Ok(out)
}
