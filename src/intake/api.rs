//! Defines the Axum route and handler for receiving uploads.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

use super::IntakeError;
use super::models::UploadResponse;
use crate::document::ScratchStore;
use crate::kiosk::KioskEvent;

/// Shared state for the intake handlers: the control loop's inbox and the
/// scratch store. Handlers never touch session state directly.
#[derive(Clone)]
pub struct AppState {
    pub events: Sender<KioskEvent>,
    pub store: Arc<ScratchStore>,
}

/// Creates the Axum router for the intake service.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/receive_file", post(receive_file))
        .with_state(state)
}

/// Handler for `POST /receive_file`: persist the upload and hand it to the
/// control loop. Nothing is stored and no event is published on rejection.
async fn receive_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<UploadResponse>) {
    let (filename, data) = match read_file_part(&mut multipart).await {
        Ok(part) => part,
        Err(error) => {
            tracing::warn!("Rejected upload: {error}");
            return (error.status(), Json(UploadResponse::failure(&error.to_string())));
        }
    };

    let document = match state.store.store(&filename, &data).await {
        Ok(document) => document,
        Err(e) => {
            let error = IntakeError::Storage(e);
            tracing::error!("Failed to store upload '{filename}': {error}");
            return (error.status(), Json(UploadResponse::failure(&error.to_string())));
        }
    };

    tracing::info!(
        "Received '{}' ({} bytes) -> {}",
        document.original_name,
        document.size,
        document.path().display()
    );

    if state
        .events
        .send(KioskEvent::DocumentReady(document.clone()))
        .await
        .is_err()
    {
        tracing::error!("Control loop is gone, dropping upload");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(UploadResponse::failure("kiosk unavailable")),
        );
    }

    (StatusCode::OK, Json(UploadResponse::received(&document.original_name)))
}

/// Pull exactly one non-empty-named `file` part out of the request.
async fn read_file_part(multipart: &mut Multipart) -> Result<(String, Bytes), IntakeError> {
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| IntakeError::InvalidUpload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if file.is_some() {
            return Err(IntakeError::InvalidUpload("More than one file provided".to_string()));
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(IntakeError::InvalidUpload("Empty filename".to_string()));
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| IntakeError::InvalidUpload(e.to_string()))?;
        file = Some((filename, data));
    }

    file.ok_or_else(|| IntakeError::InvalidUpload("No file provided".to_string()))
}
