//! Async runner pacing the translation loop.
//!
//! Owns the frame source, the tick interval, and the command channel;
//! applies events to the machine and executes the resulting effects.
//! Classifications run on their own task so a slow backend never blocks
//! command handling; the epoch carried by each result lets the machine
//! drop anything that finished after a stop.

use signwave_camera::FrameSource;
use signwave_classify::SignClassifier;
use signwave_protocol::defaults::{CONFIDENCE_THRESHOLD, HISTORY_LIMIT, TICK_PERIOD_MS};
use signwave_protocol::ConnectionState;
use signwave_speech::SpeechSink;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::machine::{Effect, LoopEvent, TranslatorMachine};
use crate::view::ViewModel;

#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    pub tick_period: Duration,
    pub confidence_threshold: f32,
    pub history_limit: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(TICK_PERIOD_MS),
            confidence_threshold: CONFIDENCE_THRESHOLD,
            history_limit: HISTORY_LIMIT,
        }
    }
}

#[derive(Debug)]
enum Command {
    Start,
    Stop,
    SetSpeechEnabled(bool),
}

/// Controls a spawned translator task.
///
/// Dropping the handle cancels the task; the frame source is closed on
/// every exit path.
pub struct TranslatorHandle {
    cmd_tx: mpsc::Sender<Command>,
    view_rx: watch::Receiver<ViewModel>,
    cancel: CancellationToken,
}

impl TranslatorHandle {
    pub async fn start(&self) {
        let _ = self.cmd_tx.send(Command::Start).await;
    }

    pub async fn stop(&self) {
        let _ = self.cmd_tx.send(Command::Stop).await;
    }

    pub async fn set_speech_enabled(&self, enabled: bool) {
        let _ = self.cmd_tx.send(Command::SetSpeechEnabled(enabled)).await;
    }

    /// Subscribe to view model snapshots, republished after every
    /// applied event.
    pub fn view(&self) -> watch::Receiver<ViewModel> {
        self.view_rx.clone()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for TranslatorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

pub struct Translator {
    source: Box<dyn FrameSource>,
    classifier: Arc<dyn SignClassifier>,
    speech: Arc<dyn SpeechSink>,
    probe_rx: watch::Receiver<ConnectionState>,
    config: LoopConfig,
}

impl Translator {
    pub fn new(
        source: Box<dyn FrameSource>,
        classifier: Arc<dyn SignClassifier>,
        speech: Arc<dyn SpeechSink>,
        probe_rx: watch::Receiver<ConnectionState>,
        config: LoopConfig,
    ) -> Self {
        Self {
            source,
            classifier,
            speech,
            probe_rx,
            config,
        }
    }

    /// Spawn the loop task and return its handle.
    pub fn spawn(self) -> TranslatorHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (view_tx, view_rx) = watch::channel(ViewModel::default());
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        tokio::spawn(self.run(cmd_rx, view_tx, task_cancel));

        TranslatorHandle {
            cmd_tx,
            view_rx,
            cancel,
        }
    }

    async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<Command>,
        view_tx: watch::Sender<ViewModel>,
        cancel: CancellationToken,
    ) {
        let mut machine = TranslatorMachine::new(
            self.config.confidence_threshold,
            self.config.history_limit,
        );
        let mut interval = tokio::time::interval(self.config.tick_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Results from spawned classification tasks flow back here.
        let (result_tx, mut result_rx) = mpsc::channel::<LoopEvent>(8);

        // Seed the machine with the probe's current verdict.
        let mut probe_rx = self.probe_rx.clone();
        let mut pending = VecDeque::new();
        pending.push_back(LoopEvent::ProbeChanged(probe_rx.borrow().clone()));

        tracing::info!("translation loop started");
        loop {
            if pending.is_empty() {
                let event = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    cmd = cmd_rx.recv() => {
                        let Some(cmd) = cmd else { break };
                        self.on_command(cmd)
                    }
                    changed = probe_rx.changed() => {
                        if changed.is_err() {
                            tracing::debug!("probe channel closed");
                            break;
                        }
                        LoopEvent::ProbeChanged(probe_rx.borrow_and_update().clone())
                    }
                    Some(event) = result_rx.recv() => event,
                    _ = interval.tick() => LoopEvent::Tick,
                };
                pending.push_back(event);
            }

            while let Some(event) = pending.pop_front() {
                for effect in machine.apply(event) {
                    if let Some(follow_up) =
                        self.run_effect(effect, &result_tx, &mut interval).await
                    {
                        pending.push_back(follow_up);
                    }
                }
            }
            let _ = view_tx.send(machine.view().clone());
        }

        // Mandatory on every exit path.
        self.source.close().await;
        tracing::info!("translation loop stopped");
    }

    fn on_command(&self, cmd: Command) -> LoopEvent {
        match cmd {
            Command::Start => LoopEvent::Start,
            Command::Stop => LoopEvent::Stop,
            Command::SetSpeechEnabled(enabled) => {
                self.speech.set_enabled(enabled);
                LoopEvent::SetSpeechEnabled(enabled)
            }
        }
    }

    async fn run_effect(
        &mut self,
        effect: Effect,
        result_tx: &mpsc::Sender<LoopEvent>,
        interval: &mut Interval,
    ) -> Option<LoopEvent> {
        match effect {
            Effect::OpenCamera => match self.source.open().await {
                Ok(()) => {
                    // Align the cadence with the stream start.
                    interval.reset();
                    Some(LoopEvent::CameraOpened)
                }
                Err(e) => Some(LoopEvent::CameraDenied(e.to_string())),
            },
            Effect::CloseCamera => {
                self.source.close().await;
                Some(LoopEvent::CameraClosed)
            }
            Effect::Classify { epoch } => match self.source.capture().await {
                Ok(frame) => {
                    let classifier = Arc::clone(&self.classifier);
                    let result_tx = result_tx.clone();
                    tokio::spawn(async move {
                        let event = match classifier.classify(frame).await {
                            Ok(detection) => LoopEvent::Result { epoch, detection },
                            Err(e) => LoopEvent::ResultError {
                                epoch,
                                error: e.to_string(),
                            },
                        };
                        let _ = result_tx.send(event).await;
                    });
                    None
                }
                Err(e) => Some(LoopEvent::ResultError {
                    epoch,
                    error: e.to_string(),
                }),
            },
            Effect::Speak(text) => {
                self.speech.speak(&text);
                None
            }
            Effect::CancelSpeech => {
                self.speech.cancel_all();
                None
            }
        }
    }
}
