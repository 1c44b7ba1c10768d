//! Speech output for detected signs.
//!
//! The synthesizer is the only process-wide shared resource in the
//! pipeline, so it sits behind the [`SpeechSink`] trait: the loop emits
//! speak intents, and the sink decides whether anything is audible.
//! [`NullSpeech`] discards everything; [`MemorySpeech`] records
//! utterances for tests; [`SystemSpeech`] drives the platform
//! synthesizer binary.

mod system;

pub use system::{SpeechConfig, SystemSpeech};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Vocalizes short strings, fire-and-forget.
///
/// `speak` is a no-op while disabled or when no synthesizer exists;
/// disabling cancels anything queued or in progress immediately.
pub trait SpeechSink: Send + Sync {
    fn speak(&self, text: &str);

    fn set_enabled(&self, enabled: bool);

    fn is_enabled(&self) -> bool;

    /// Cancel any queued or in-progress utterance.
    fn cancel_all(&self);
}

/// Discards all utterances.
pub struct NullSpeech;

impl SpeechSink for NullSpeech {
    fn speak(&self, _text: &str) {}

    fn set_enabled(&self, _enabled: bool) {}

    fn is_enabled(&self) -> bool {
        false
    }

    fn cancel_all(&self) {}
}

/// Records utterances and cancellations for inspection in tests.
#[derive(Default)]
pub struct MemorySpeech {
    enabled: AtomicBool,
    utterances: Mutex<Vec<String>>,
    cancellations: AtomicUsize,
}

impl MemorySpeech {
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            utterances: Mutex::new(Vec::new()),
            cancellations: AtomicUsize::new(0),
        }
    }

    /// All utterances spoken while enabled.
    pub fn utterances(&self) -> Vec<String> {
        self.utterances.lock().unwrap().clone()
    }

    /// Number of `cancel_all` calls observed.
    pub fn cancellations(&self) -> usize {
        self.cancellations.load(Ordering::Acquire)
    }
}

impl SpeechSink for MemorySpeech {
    fn speak(&self, text: &str) {
        if !self.is_enabled() {
            return;
        }
        self.utterances.lock().unwrap().push(text.to_string());
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
        if !enabled {
            self.cancel_all();
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    fn cancel_all(&self) {
        self.cancellations.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_speech_records_while_enabled() {
        let sink = MemorySpeech::new();
        sink.speak("Hello");
        sink.speak("Yes");
        assert_eq!(sink.utterances(), vec!["Hello", "Yes"]);
    }

    #[test]
    fn disabling_cancels_and_silences() {
        let sink = MemorySpeech::new();
        sink.speak("Hello");
        sink.set_enabled(false);
        assert_eq!(sink.cancellations(), 1);

        sink.speak("Yes");
        assert_eq!(sink.utterances(), vec!["Hello"]);
    }
}
