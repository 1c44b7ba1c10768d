//! Periodic reachability probe for the classifier backend.
//!
//! Runs on its own task and publishes [`ConnectionState`] through a
//! watch channel; the translation loop reads it, never the other way
//! around, so neither side can block the other.

use signwave_protocol::defaults::PROBE_PERIOD_MS;
use signwave_protocol::ConnectionState;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Probes `GET {base}/` on a fixed cadence. Any 2xx is "connected";
/// anything else, or a transport failure, is "disconnected" with a
/// human-readable reason.
pub struct HealthProbe {
    http: reqwest::Client,
    base_url: String,
    period: Duration,
}

/// Controls a spawned probe task and exposes its state channel.
pub struct ProbeHandle {
    state: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
}

impl ProbeHandle {
    /// Subscribe to connection state updates. The channel starts
    /// disconnected until the first check completes.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for ProbeHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl HealthProbe {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_period(base_url, Duration::from_millis(PROBE_PERIOD_MS))
    }

    pub fn with_period(base_url: impl Into<String>, period: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            period,
        }
    }

    /// Spawn the probe task. The first check fires immediately, then
    /// every period.
    pub fn spawn(self) -> ProbeHandle {
        let (tx, rx) = watch::channel(ConnectionState::default());
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = task_cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let next = self.check().await;
                tx.send_if_modified(|current| {
                    if *current == next {
                        return false;
                    }
                    match (&next.connected, &next.last_error) {
                        (true, _) => tracing::info!("backend reachable"),
                        (false, Some(reason)) => {
                            tracing::warn!(%reason, "backend unreachable")
                        }
                        (false, None) => tracing::warn!("backend unreachable"),
                    }
                    *current = next;
                    true
                });
            }
            tracing::debug!("health probe stopped");
        });

        ProbeHandle { state: rx, cancel }
    }

    async fn check(&self) -> ConnectionState {
        let url = format!("{}/", self.base_url);
        match self.http.get(&url).timeout(self.period).send().await {
            Ok(response) if response.status().is_success() => ConnectionState::up(),
            Ok(response) => ConnectionState::down(format!(
                "backend responded with status {}",
                response.status()
            )),
            Err(e) => {
                ConnectionState::down(format!("cannot reach backend at {}: {}", self.base_url, e))
            }
        }
    }
}
