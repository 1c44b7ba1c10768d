//! The translation loop as a pure state machine.

use signwave_protocol::defaults::{CONFIDENCE_THRESHOLD, HISTORY_LIMIT};
use signwave_protocol::{ConnectionState, Detection, HistoryEntry};

use crate::view::ViewModel;

/// Lifecycle of the capture loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Streaming,
    ShuttingDown,
}

/// Discrete inputs to the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    /// User command: begin capturing. Refused while disconnected.
    Start,
    /// User command: stop capturing.
    Stop,
    /// One scheduled iteration of the capture cadence.
    Tick,
    /// The frame source came up after `OpenCamera`.
    CameraOpened,
    /// The frame source could not be acquired.
    CameraDenied(String),
    /// The frame source was released after `CloseCamera`.
    CameraClosed,
    /// A classification finished. `epoch` identifies the streaming run
    /// that issued it; stale epochs are dropped.
    Result { epoch: u64, detection: Detection },
    /// A capture or classification failed.
    ResultError { epoch: u64, error: String },
    /// The health probe published a new connection state.
    ProbeChanged(ConnectionState),
    /// User command: toggle speech output.
    SetSpeechEnabled(bool),
}

/// Side effects the runner must execute.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    OpenCamera,
    CloseCamera,
    Classify { epoch: u64 },
    Speak(String),
    CancelSpeech,
}

/// Event-in, effects-out core of the pipeline.
///
/// Owns the loop state exclusively; the runner and the probe feed it
/// events but never mutate it directly.
pub struct TranslatorMachine {
    state: LoopState,
    opening: bool,
    in_flight: bool,
    /// Bumped on every stop; results from earlier epochs are ignored.
    epoch: u64,
    threshold: f32,
    history_limit: usize,
    view: ViewModel,
}

impl TranslatorMachine {
    pub fn new(threshold: f32, history_limit: usize) -> Self {
        Self {
            state: LoopState::Idle,
            opening: false,
            in_flight: false,
            epoch: 0,
            threshold,
            history_limit,
            view: ViewModel::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    pub fn apply(&mut self, event: LoopEvent) -> Vec<Effect> {
        match event {
            LoopEvent::Start => self.on_start(),
            LoopEvent::Stop => self.on_stop(),
            LoopEvent::Tick => self.on_tick(),
            LoopEvent::CameraOpened => self.on_camera_opened(),
            LoopEvent::CameraDenied(reason) => self.on_camera_denied(reason),
            LoopEvent::CameraClosed => self.on_camera_closed(),
            LoopEvent::Result { epoch, detection } => self.on_result(epoch, detection),
            LoopEvent::ResultError { epoch, error } => self.on_result_error(epoch, error),
            LoopEvent::ProbeChanged(state) => self.on_probe_changed(state),
            LoopEvent::SetSpeechEnabled(enabled) => self.on_set_speech_enabled(enabled),
        }
    }

    fn on_start(&mut self) -> Vec<Effect> {
        if self.state != LoopState::Idle || self.opening {
            tracing::debug!(state = ?self.state, "start ignored");
            return Vec::new();
        }
        // Connectivity is consulted only here, never per tick.
        if !self.view.connected {
            tracing::warn!("start refused: backend disconnected");
            return Vec::new();
        }
        self.opening = true;
        self.view.camera_error = None;
        vec![Effect::OpenCamera]
    }

    fn on_camera_opened(&mut self) -> Vec<Effect> {
        if !self.opening {
            return Vec::new();
        }
        self.opening = false;
        self.state = LoopState::Streaming;
        self.view.streaming = true;
        tracing::info!("streaming started");
        Vec::new()
    }

    fn on_camera_denied(&mut self, reason: String) -> Vec<Effect> {
        self.opening = false;
        tracing::error!(%reason, "camera acquisition failed");
        self.view.camera_error = Some(reason);
        Vec::new()
    }

    fn on_stop(&mut self) -> Vec<Effect> {
        if self.state != LoopState::Streaming {
            return Vec::new();
        }
        self.state = LoopState::ShuttingDown;
        // Abandon any in-flight classification: a late result must not
        // touch state.
        self.epoch += 1;
        self.in_flight = false;
        self.view.streaming = false;
        self.view.processing = false;
        self.view.current_sign = None;
        self.view.confidence_pct = 0;
        tracing::info!("streaming stopping");
        vec![Effect::CloseCamera]
    }

    fn on_camera_closed(&mut self) -> Vec<Effect> {
        if self.state == LoopState::ShuttingDown {
            self.state = LoopState::Idle;
            tracing::info!("streaming stopped");
        }
        Vec::new()
    }

    fn on_tick(&mut self) -> Vec<Effect> {
        if self.state != LoopState::Streaming || self.in_flight {
            return Vec::new();
        }
        self.in_flight = true;
        self.view.processing = true;
        vec![Effect::Classify { epoch: self.epoch }]
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.state == LoopState::Streaming && epoch == self.epoch
    }

    fn on_result(&mut self, epoch: u64, detection: Detection) -> Vec<Effect> {
        if !self.is_current(epoch) {
            tracing::debug!(epoch, "stale classification result dropped");
            return Vec::new();
        }
        self.in_flight = false;
        self.view.processing = false;

        if !detection.is_confident(self.threshold) {
            tracing::trace!(
                sign = detection.sign.as_deref().unwrap_or("<none>"),
                confidence = detection.confidence,
                "detection below threshold, discarded"
            );
            return Vec::new();
        }
        let Some(sign) = detection.sign else {
            return Vec::new();
        };

        let changed = self.view.current_sign.as_deref() != Some(sign.as_str());
        self.view.confidence_pct = (detection.confidence * 100.0).round() as u8;
        self.view.current_sign = Some(sign.clone());

        if !changed {
            return Vec::new();
        }
        tracing::info!(%sign, confidence_pct = self.view.confidence_pct, "new sign detected");
        self.view.history.insert(0, HistoryEntry::new(sign.clone()));
        self.view.history.truncate(self.history_limit);
        vec![Effect::Speak(sign)]
    }

    fn on_result_error(&mut self, epoch: u64, error: String) -> Vec<Effect> {
        if !self.is_current(epoch) {
            tracing::debug!(epoch, "stale classification error dropped");
            return Vec::new();
        }
        self.in_flight = false;
        self.view.processing = false;
        tracing::warn!(%error, "tick dropped");
        Vec::new()
    }

    fn on_probe_changed(&mut self, state: ConnectionState) -> Vec<Effect> {
        self.view.connected = state.connected;
        self.view.last_error = state.last_error;
        Vec::new()
    }

    fn on_set_speech_enabled(&mut self, enabled: bool) -> Vec<Effect> {
        self.view.speech_enabled = enabled;
        if enabled {
            Vec::new()
        } else {
            vec![Effect::CancelSpeech]
        }
    }
}

impl Default for TranslatorMachine {
    fn default() -> Self {
        Self::new(CONFIDENCE_THRESHOLD, HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streaming() -> TranslatorMachine {
        let mut m = TranslatorMachine::default();
        assert_eq!(
            m.apply(LoopEvent::ProbeChanged(ConnectionState::up())),
            vec![]
        );
        assert_eq!(m.apply(LoopEvent::Start), vec![Effect::OpenCamera]);
        m.apply(LoopEvent::CameraOpened);
        assert_eq!(m.state(), LoopState::Streaming);
        m
    }

    /// Issue a tick and return the epoch of the classify effect.
    fn tick(m: &mut TranslatorMachine) -> u64 {
        match m.apply(LoopEvent::Tick).as_slice() {
            [Effect::Classify { epoch }] => *epoch,
            other => panic!("expected classify effect, got {other:?}"),
        }
    }

    #[test]
    fn start_refused_while_disconnected() {
        let mut m = TranslatorMachine::default();
        assert_eq!(m.apply(LoopEvent::Start), vec![]);
        assert_eq!(m.state(), LoopState::Idle);
    }

    #[test]
    fn start_ignored_while_streaming() {
        let mut m = streaming();
        assert_eq!(m.apply(LoopEvent::Start), vec![]);
    }

    #[test]
    fn camera_denial_stays_idle_and_surfaces_reason() {
        let mut m = TranslatorMachine::default();
        m.apply(LoopEvent::ProbeChanged(ConnectionState::up()));
        m.apply(LoopEvent::Start);
        m.apply(LoopEvent::CameraDenied("camera permission denied".into()));
        assert_eq!(m.state(), LoopState::Idle);
        assert_eq!(
            m.view().camera_error.as_deref(),
            Some("camera permission denied")
        );
        // A later start may retry.
        assert_eq!(m.apply(LoopEvent::Start), vec![Effect::OpenCamera]);
    }

    #[test]
    fn at_most_one_classification_in_flight() {
        let mut m = streaming();
        let epoch = tick(&mut m);
        // Further ticks are no-ops until the result lands.
        assert_eq!(m.apply(LoopEvent::Tick), vec![]);
        assert_eq!(m.apply(LoopEvent::Tick), vec![]);
        m.apply(LoopEvent::Result {
            epoch,
            detection: Detection::none(),
        });
        assert_eq!(m.apply(LoopEvent::Tick).len(), 1);
    }

    #[test]
    fn tick_error_clears_in_flight() {
        let mut m = streaming();
        let epoch = tick(&mut m);
        m.apply(LoopEvent::ResultError {
            epoch,
            error: "classification request timed out".into(),
        });
        assert!(!m.view().processing);
        assert_eq!(m.apply(LoopEvent::Tick).len(), 1);
    }

    #[test]
    fn stop_then_closed_drains_to_idle() {
        let mut m = streaming();
        assert_eq!(m.apply(LoopEvent::Stop), vec![Effect::CloseCamera]);
        assert_eq!(m.state(), LoopState::ShuttingDown);
        // Ticks do nothing while shutting down.
        assert_eq!(m.apply(LoopEvent::Tick), vec![]);
        m.apply(LoopEvent::CameraClosed);
        assert_eq!(m.state(), LoopState::Idle);
    }

    #[test]
    fn history_survives_stop_start() {
        let mut m = streaming();
        let epoch = tick(&mut m);
        m.apply(LoopEvent::Result {
            epoch,
            detection: Detection::of("Hello", 0.9),
        });
        m.apply(LoopEvent::Stop);
        m.apply(LoopEvent::CameraClosed);
        assert_eq!(m.view().history.len(), 1);

        m.apply(LoopEvent::Start);
        m.apply(LoopEvent::CameraOpened);
        assert_eq!(m.view().history.len(), 1);
        assert_eq!(m.view().current_sign, None);
    }

    #[test]
    fn disabling_speech_cancels_pending_utterances() {
        let mut m = streaming();
        assert_eq!(
            m.apply(LoopEvent::SetSpeechEnabled(false)),
            vec![Effect::CancelSpeech]
        );
        assert!(!m.view().speech_enabled);
        assert_eq!(m.apply(LoopEvent::SetSpeechEnabled(true)), vec![]);
        assert!(m.view().speech_enabled);
    }

    #[test]
    fn mute_does_not_affect_classification() {
        let mut m = streaming();
        m.apply(LoopEvent::SetSpeechEnabled(false));
        let epoch = tick(&mut m);
        m.apply(LoopEvent::Result {
            epoch,
            detection: Detection::of("Hello", 0.9),
        });
        assert_eq!(m.view().current_sign.as_deref(), Some("Hello"));
        assert_eq!(m.view().history.len(), 1);
    }
}
