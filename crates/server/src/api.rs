use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine as _;
use shelfscan_ocr::{Envelope, OcrBackend, RecognizeData, RecognizeRequest};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

pub type SharedBackend = Arc<dyn OcrBackend>;

pub fn router(backend: SharedBackend) -> Router {
    Router::new()
        .route("/api/v1/ocr/recognize", post(recognize))
        .layer(TraceLayer::new_for_http())
        .with_state(backend)
}

/// Recognize text in a base64-encoded image. Always answers 200 with the
/// standard envelope; failures are carried in `code`/`msg`.
async fn recognize(
    State(backend): State<SharedBackend>,
    Json(request): Json<RecognizeRequest>,
) -> Json<Envelope> {
    let bytes = match base64::engine::general_purpose::STANDARD.decode(&request.image_base64) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("rejecting request with bad base64: {e}");
            return Json(Envelope::error(format!("invalid base64 image data: {e}")));
        }
    };

    let started = Instant::now();
    // Recognition is CPU-bound; keep it off the runtime threads.
    let result = tokio::task::spawn_blocking(move || backend.recognize(&bytes)).await;
    let processing_time = started.elapsed().as_secs_f64();

    match result {
        Ok(Ok(rec)) => {
            tracing::info!(words = rec.words, processing_time, "recognition complete");
            Json(Envelope::ok(RecognizeData {
                lines: rec.text.lines().count().max(1),
                paragraphs: 1,
                words: rec.words,
                confidence: rec.confidence,
                text: rec.text,
                processing_time,
            }))
        }
        Ok(Err(e)) => {
            tracing::warn!("recognition failed: {e}");
            Json(Envelope::error(e.to_string()))
        }
        Err(e) => {
            tracing::error!("recognition task panicked: {e}");
            Json(Envelope::error("internal recognition failure"))
        }
    }
}
