//! Observable state of the translation loop.

use serde::Serialize;
use signwave_protocol::HistoryEntry;

/// Passive snapshot consumed by a presentation layer.
///
/// Republished after every applied event; a renderer only ever reads
/// it, all mutation goes through the machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    /// Whether the loop is actively capturing.
    pub streaming: bool,
    /// Whether a classification is in flight.
    pub processing: bool,
    /// Currently displayed sign, if any.
    pub current_sign: Option<String>,
    /// Confidence of the current sign, rounded to whole percent.
    pub confidence_pct: u8,
    /// Recent distinct signs, newest first, bounded.
    pub history: Vec<HistoryEntry>,
    /// Backend reachability, owned by the health probe.
    pub connected: bool,
    /// Human-readable reason while disconnected.
    pub last_error: Option<String>,
    /// Whether detections are vocalized.
    pub speech_enabled: bool,
    /// Last camera acquisition failure, surfaced to the user.
    pub camera_error: Option<String>,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self {
            streaming: false,
            processing: false,
            current_sign: None,
            confidence_pct: 0,
            history: Vec::new(),
            connected: false,
            last_error: None,
            speech_enabled: true,
            camera_error: None,
        }
    }
}
