use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use ingest::DocumentFormat;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::session::{self, AppContext, UPLOAD_PROMPT, UiMessage};

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    model: String,
}

#[derive(Serialize)]
struct ErrorEvent {
    message: String,
}

type ApiError = (StatusCode, String);
type EventSender = mpsc::UnboundedSender<Result<Event, Infallible>>;

pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(analyze_upload))
        .route("/reports/:name", get(download_report))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check(State(ctx): State<Arc<AppContext>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: ctx.workflow.model_id().to_string(),
    })
}

fn sse_event<T: Serialize>(event_type: &str, data: &T) -> Event {
    Event::default()
        .event(event_type)
        .data(serde_json::to_string(data).unwrap_or_default())
}

fn send_message(tx: &EventSender, message: &UiMessage) {
    // A closed channel means the client went away; the run still completes
    let _ = tx.send(Ok(sse_event("message", message)));
}

/// One inbound message with an attached document.
///
/// Messages are streamed as server-sent `message` events while the run
/// progresses. A failed run ends the stream with an `error` event, after the
/// progress already sent.
async fn analyze_upload(
    State(ctx): State<Arc<AppContext>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (tx, rx) = mpsc::unbounded_channel();
    let stream = Sse::new(UnboundedReceiverStream::new(rx)).keep_alive(KeepAlive::default());

    let Some((file_name, bytes)) = read_upload(&mut multipart).await? else {
        send_message(&tx, &UiMessage::text(UPLOAD_PROMPT));
        return Ok(stream);
    };

    DocumentFormat::from_path(&file_name)
        .map_err(|e| (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string()))?;

    info!(file = %file_name, size = bytes.len(), "Received document");

    tokio::spawn(async move {
        let progress = tx.clone();
        let outcome = session::analyze_document(&ctx, &file_name, bytes, move |message| {
            send_message(&progress, &message)
        })
        .await;

        if let Err(e) = outcome {
            let message = format!("{e:#}");
            error!(file = %file_name, error = %message, "Analysis failed");
            let _ = tx.send(Ok(sse_event("error", &ErrorEvent { message })));
        }
    });

    Ok(stream)
}

/// First multipart field that carries a file name.
async fn read_upload(multipart: &mut Multipart) -> Result<Option<(String, Vec<u8>)>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let Some(file_name) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string)
        else {
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        return Ok(Some((file_name, bytes.to_vec())));
    }

    Ok(None)
}

fn is_report_name(name: &str) -> bool {
    name.starts_with("analysis_")
        && name.ends_with(".json")
        && !name.contains('/')
        && !name.contains('\\')
}

async fn download_report(
    State(ctx): State<Arc<AppContext>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    if !is_report_name(&name) {
        return Err(StatusCode::NOT_FOUND);
    }

    let body = tokio::fs::read(ctx.output_dir.join(&name))
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", name),
            ),
        ],
        body,
    ))
}
