//! Speech output through the platform synthesizer binary.

use signwave_protocol::defaults::{SPEECH_RATE, SPEECH_VOLUME};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::process::{Child, Command};

use crate::SpeechSink;

/// Baseline words-per-minute the rate factor scales against.
const BASE_WPM: f32 = 175.0;

/// Relative rate and volume, 1.0 being the platform default.
#[derive(Debug, Clone, Copy)]
pub struct SpeechConfig {
    pub rate: f32,
    pub volume: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: SPEECH_RATE,
            volume: SPEECH_VOLUME,
        }
    }
}

/// Drives `say` (macOS) or `espeak-ng`/`espeak` (elsewhere).
///
/// Utterances are fire-and-forget child processes; the most recent
/// child is tracked so `cancel_all` can kill it. When no synthesizer
/// binary is on the PATH every call is a silent no-op.
pub struct SystemSpeech {
    binary: Option<&'static str>,
    config: SpeechConfig,
    enabled: AtomicBool,
    current: Mutex<Option<Child>>,
}

const CANDIDATES: &[&str] = &["say", "espeak-ng", "espeak"];

fn find_synthesizer() -> Option<&'static str> {
    let paths = std::env::var_os("PATH")?;
    CANDIDATES.iter().copied().find(|name| {
        std::env::split_paths(&paths).any(|dir| dir.join(name).is_file())
    })
}

impl SystemSpeech {
    pub fn new(config: SpeechConfig) -> Self {
        let binary = find_synthesizer();
        match binary {
            Some(bin) => tracing::debug!(synthesizer = bin, "speech synthesizer found"),
            None => tracing::warn!("no speech synthesizer on PATH, speech output disabled"),
        }
        Self {
            binary,
            config,
            enabled: AtomicBool::new(true),
            current: Mutex::new(None),
        }
    }

    /// Whether a synthesizer binary was found.
    pub fn is_available(&self) -> bool {
        self.binary.is_some()
    }

    fn build_command(&self, binary: &str, text: &str) -> Command {
        let mut cmd = Command::new(binary);
        match binary {
            "say" => {
                // `say` takes rate as words per minute; volume is an
                // embedded volm directive.
                cmd.arg("-r")
                    .arg(((BASE_WPM * self.config.rate) as u32).to_string())
                    .arg(format!("[[volm {:.2}]] {}", self.config.volume, text));
            }
            _ => {
                // espeak amplitude is 0-200 with 100 the default.
                cmd.arg("-s")
                    .arg(((BASE_WPM * self.config.rate) as u32).to_string())
                    .arg("-a")
                    .arg(((self.config.volume * 200.0) as u32).to_string())
                    .arg(text);
            }
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

impl SpeechSink for SystemSpeech {
    fn speak(&self, text: &str) {
        if !self.is_enabled() {
            return;
        }
        let Some(binary) = self.binary else {
            return;
        };
        match self.build_command(binary, text).spawn() {
            Ok(child) => {
                tracing::debug!(%text, "speaking");
                // Replacing the handle lets a finished child be reaped
                // and keeps the newest one killable.
                *self.current.lock().unwrap() = Some(child);
            }
            Err(e) => tracing::warn!(error = %e, "failed to spawn synthesizer"),
        }
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
        if let Some(mut child) = self.current.lock().unwrap().take() {
            if let Err(e) = child.start_kill() {
                tracing::debug!(error = %e, "utterance already finished");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn speak_when_disabled_spawns_nothing() {
        let sink = SystemSpeech::new(SpeechConfig::default());
        sink.set_enabled(false);
        sink.speak("Hello");
        assert!(sink.current.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn cancel_all_is_idempotent() {
        let sink = SystemSpeech::new(SpeechConfig::default());
        sink.cancel_all();
        sink.cancel_all();
    }
}
