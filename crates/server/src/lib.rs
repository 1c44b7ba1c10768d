//! Stub classifier backend.
//!
//! Serves the same HTTP surface a real model backend would, with a
//! [`MockClassifier`] fabricating random detections so the whole
//! pipeline can be demonstrated while the model is offline.

mod mock;

pub use mock::MockClassifier;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use signwave_protocol::defaults::{DETECT_PATH, IMAGE_FIELD};
use signwave_protocol::{Detection, ErrorBody};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

struct AppState {
    mock: MockClassifier,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

/// Probe target: any 2xx means "connected".
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn detect_sign(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Detection>, ApiError> {
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("unreadable image field: {e}")))?;
            image = Some(bytes);
        }
    }

    let Some(image) = image else {
        return Err(bad_request("No image provided"));
    };

    let detection = state.mock.detect().await;
    tracing::debug!(
        frame_bytes = image.len(),
        sign = detection.sign.as_deref().unwrap_or("<none>"),
        confidence = detection.confidence,
        "fabricated detection"
    );
    Ok(Json(detection))
}

/// Build the stub backend router.
pub fn router(mock: MockClassifier) -> Router {
    let state = Arc::new(AppState { mock });
    Router::new()
        .route("/", get(health))
        .route(DETECT_PATH, post(detect_sign))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Stub backend bound to a fixed address.
pub struct Server {
    addr: SocketAddr,
    mock: MockClassifier,
}

impl Server {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            mock: MockClassifier::default(),
        }
    }

    pub fn with_mock(mut self, mock: MockClassifier) -> Self {
        self.mock = mock;
        self
    }

    pub async fn start(self) -> std::io::Result<()> {
        let app = router(self.mock);
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!(addr = %self.addr, "stub classifier backend listening");
        axum::serve(listener, app.into_make_service()).await
    }
}
