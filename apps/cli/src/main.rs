//! Headless front-end for the signwave pipeline.
//!
//! `signwave serve` runs the stub classifier backend; `signwave run`
//! drives the translation loop against it with a synthetic camera,
//! logging every view model change until Ctrl-C.

use anyhow::Context;
use clap::{Parser, Subcommand};
use signwave_application::{LoopConfig, Translator, ViewModel};
use signwave_camera::{CaptureConfig, FrameSource, TestPatternSource};
use signwave_classify::{ClassifierClient, HealthProbe, SignClassifier};
use signwave_speech::{NullSpeech, SpeechConfig, SpeechSink, SystemSpeech};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "signwave", version, about = "Real-time sign language translation pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the stub classifier backend.
    Serve {
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Run the translation loop against a backend.
    Run {
        /// Base URL of the classifier backend.
        #[arg(long, default_value = "http://localhost:8000")]
        backend: String,
        /// Disable speech output.
        #[arg(long)]
        mute: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,signwave=debug")),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve { port } => serve(port).await,
        Commands::Run { backend, mute } => run(backend, mute).await,
    }
}

async fn serve(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    signwave_server::Server::new(addr)
        .start()
        .await
        .context("stub backend failed")
}

async fn run(backend: String, mute: bool) -> anyhow::Result<()> {
    let probe = HealthProbe::new(&backend).spawn();
    let mut probe_state = probe.state();

    tracing::info!(%backend, "waiting for backend");
    while !probe_state.borrow().connected {
        probe_state
            .changed()
            .await
            .context("health probe stopped")?;
    }

    let source = TestPatternSource::new(CaptureConfig::default())
        .with_warmup(Duration::from_millis(500));
    let classifier: Arc<dyn SignClassifier> = Arc::new(ClassifierClient::new(&backend));
    let speech: Arc<dyn SpeechSink> = if mute {
        Arc::new(NullSpeech)
    } else {
        Arc::new(SystemSpeech::new(SpeechConfig::default()))
    };

    let handle = Translator::new(
        Box::new(source) as Box<dyn FrameSource>,
        classifier,
        speech,
        probe.state(),
        LoopConfig::default(),
    )
    .spawn();

    handle.start().await;
    let mut view_rx = handle.view();
    let mut last = ViewModel::default();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = view_rx.changed() => {
                changed.context("translation loop stopped")?;
                let view = view_rx.borrow().clone();
                render(&last, &view);
                last = view;
            }
        }
    }

    tracing::info!("shutting down");
    handle.stop().await;
    handle.shutdown();
    probe.shutdown();
    Ok(())
}

/// Log only the deltas a user would care about.
fn render(previous: &ViewModel, view: &ViewModel) {
    if view.connected != previous.connected {
        match &view.last_error {
            None => tracing::info!("backend connected"),
            Some(reason) => tracing::warn!(%reason, "backend disconnected"),
        }
    }
    if view.camera_error != previous.camera_error {
        if let Some(reason) = &view.camera_error {
            tracing::error!(%reason, "camera unavailable");
        }
    }
    if view.streaming != previous.streaming {
        tracing::info!(streaming = view.streaming, "capture state changed");
    }
    if view.current_sign != previous.current_sign {
        if let Some(sign) = &view.current_sign {
            tracing::info!(
                %sign,
                confidence_pct = view.confidence_pct,
                history = view.history.len(),
                "detected"
            );
        }
    }
}
