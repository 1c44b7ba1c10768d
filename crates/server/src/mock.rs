//! Random detection fabrication for the stub backend.

use signwave_protocol::Detection;
use std::time::Duration;

/// Demo vocabulary, mirroring the signs a first model checkpoint is
/// trained on.
pub const DEMO_SIGNS: &[&str] = &[
    "Hello", "Thank you", "Please", "Sorry", "Yes", "No", "Good", "Bad", "Help", "Water", "Food",
    "More",
];

/// Fabricates detections: with `miss_probability` it reports no sign,
/// otherwise a random vocabulary entry with confidence uniform in
/// `[0.7, 1.0]`. A small artificial latency stands in for inference
/// time.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    miss_probability: f32,
    latency: Duration,
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self {
            miss_probability: 0.3,
            latency: Duration::from_millis(100),
        }
    }
}

impl MockClassifier {
    pub fn with_miss_probability(mut self, p: f32) -> Self {
        self.miss_probability = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// A deterministic-hit variant for tests.
    pub fn always_hit() -> Self {
        Self::default()
            .with_miss_probability(0.0)
            .with_latency(Duration::ZERO)
    }

    /// A deterministic-miss variant for tests.
    pub fn always_miss() -> Self {
        Self::default()
            .with_miss_probability(1.0)
            .with_latency(Duration::ZERO)
    }

    pub async fn detect(&self) -> Detection {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if fastrand::f32() < self.miss_probability {
            return Detection::none();
        }
        let sign = DEMO_SIGNS[fastrand::usize(..DEMO_SIGNS.len())];
        Detection::of(sign, 0.7 + fastrand::f32() * 0.3)
    }
}
