//! Fixed pipeline defaults.

/// Cadence of the translation loop's capture ticks.
pub const TICK_PERIOD_MS: u64 = 1000;

/// Cadence of the backend reachability probe.
pub const PROBE_PERIOD_MS: u64 = 5000;

/// Detections at or below this confidence are discarded (strict `>`).
pub const CONFIDENCE_THRESHOLD: f32 = 0.70;

/// Maximum number of retained history entries.
pub const HISTORY_LIMIT: usize = 10;

/// Requested capture resolution.
pub const CAPTURE_WIDTH: u32 = 640;
pub const CAPTURE_HEIGHT: u32 = 480;

/// JPEG quality for encoded frames (0-100).
pub const JPEG_QUALITY: u8 = 80;

/// Speech rate relative to the platform default.
pub const SPEECH_RATE: f32 = 0.8;

/// Speech volume relative to the platform default.
pub const SPEECH_VOLUME: f32 = 0.7;

/// Classification endpoint path on the backend.
pub const DETECT_PATH: &str = "/api/detect-sign";

/// Multipart field carrying the frame.
pub const IMAGE_FIELD: &str = "image";

/// Filename reported for the frame part.
pub const FRAME_FILENAME: &str = "frame.jpg";
