//! Shared wire and domain contracts for the signwave pipeline.
//!
//! This crate defines the formal contracts (DTOs) that cross component
//! boundaries: the classifier's wire types, the bounded translation
//! history, and the backend connection state. Using shared types keeps
//! the client, the stub server, and the translation loop from drifting
//! apart on field names.

pub mod defaults;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single classifier output: a recognized sign (or none) and a
/// confidence score in `[0, 1]`.
///
/// Invariant: `sign == None` implies `confidence == 0.0`. Use the
/// constructors to preserve it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Recognized sign label, `null` on the wire when nothing was found.
    pub sign: Option<String>,
    /// Confidence in `[0, 1]`; `0.0` when `sign` is absent.
    pub confidence: f32,
}

impl Detection {
    /// A "no sign found" detection.
    pub fn none() -> Self {
        Self {
            sign: None,
            confidence: 0.0,
        }
    }

    /// A detection of `sign` with the given confidence, clamped to `[0, 1]`.
    pub fn of(sign: impl Into<String>, confidence: f32) -> Self {
        Self {
            sign: Some(sign.into()),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Whether this detection carries a sign above the threshold.
    ///
    /// The comparison is strict: a confidence exactly at the threshold
    /// is not confident.
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.sign.is_some() && self.confidence > threshold
    }
}

/// JSON body of 4xx/5xx classifier responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// One entry of the translation history.
///
/// Created only when a newly detected sign differs from the currently
/// displayed one; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub sign: String,
    /// Wall-clock time the sign was first observed.
    pub detected_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(sign: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sign: sign.into(),
            detected_at: Utc::now(),
        }
    }
}

/// Reachability of the classifier backend, owned by the health probe.
///
/// Invariant: `connected == true` implies `last_error == None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub connected: bool,
    /// Human-readable reason when disconnected.
    pub last_error: Option<String>,
}

impl ConnectionState {
    pub fn up() -> Self {
        Self {
            connected: true,
            last_error: None,
        }
    }

    pub fn down(message: impl Into<String>) -> Self {
        Self {
            connected: false,
            last_error: Some(message.into()),
        }
    }
}

impl Default for ConnectionState {
    /// Disconnected until the first probe completes.
    fn default() -> Self {
        Self::down("backend not probed yet")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_none_has_zero_confidence() {
        let d = Detection::none();
        assert_eq!(d.sign, None);
        assert_eq!(d.confidence, 0.0);
    }

    #[test]
    fn detection_of_clamps_confidence() {
        assert_eq!(Detection::of("Hello", 1.5).confidence, 1.0);
        assert_eq!(Detection::of("Hello", -0.2).confidence, 0.0);
    }

    #[test]
    fn confidence_threshold_is_strict() {
        assert!(!Detection::of("Hello", 0.70).is_confident(0.70));
        assert!(Detection::of("Hello", 0.71).is_confident(0.70));
        assert!(!Detection::none().is_confident(0.70));
    }

    #[test]
    fn detection_null_sign_deserializes() {
        let d: Detection = serde_json::from_str(r#"{"sign": null, "confidence": 0}"#).unwrap();
        assert_eq!(d, Detection::none());
    }

    #[test]
    fn detection_serializes_null_sign() {
        let json = serde_json::to_value(Detection::none()).unwrap();
        assert!(json["sign"].is_null());
    }

    #[test]
    fn connection_state_invariant() {
        assert_eq!(ConnectionState::up().last_error, None);
        let down = ConnectionState::down("no route to host");
        assert!(!down.connected);
        assert_eq!(down.last_error.as_deref(), Some("no route to host"));
    }
}
