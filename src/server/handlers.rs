//! HTTP request handlers for the upload form

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderName, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use super::form::UploadForm;
use super::page::render_upload_page;
use super::AppState;
use crate::archive::scratch_dir;
use crate::error::AppendError;
use crate::pipeline::{process, OUTPUT_ARCHIVE_NAME};

/// File name offered to the browser for the processed archive
pub const DOWNLOAD_NAME: &str = "processed_documents.zip";

/// Response header carrying the number of targets processed in the final pass
pub const PROCESSED_HEADER: &str = "x-processed-documents";

const GENERIC_FAILURE: &str = "Processing failed. Check that every uploaded file is a valid ZIP archive, PDF or Word document.";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Serve the upload form
pub async fn upload_form() -> Html<String> {
    Html(render_upload_page())
}

/// Map a processing error to a response, hiding internals from the user
fn error_response(err: AppendError) -> (StatusCode, String) {
    if err.is_validation() {
        warn!("Rejected request: {}", err);
        (StatusCode::BAD_REQUEST, err.to_string())
    } else {
        error!("Request failed: {}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string())
    }
}

/// Accept the uploads, run the pipeline and return the processed archive
pub async fn process_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, (StatusCode, String)> {
    let mut form = UploadForm::new().map_err(error_response)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| (e.status(), e.body_text()))?;

        form.add_field(&name, file_name.as_deref(), &data)
            .map_err(error_response)?;
    }

    // Rendering and zipping are blocking work
    let (bytes, processed) = tokio::task::spawn_blocking(move || run_upload(form, &state))
        .await
        .map_err(|e| {
            error!("Processing task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_FAILURE.to_string(),
            )
        })?
        .map_err(error_response)?;

    info!(
        "Returning {} ({} bytes, {} documents)",
        DOWNLOAD_NAME,
        bytes.len(),
        processed
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_NAME}\""),
            ),
            (
                HeaderName::from_static(PROCESSED_HEADER),
                processed.to_string(),
            ),
        ],
        bytes,
    )
        .into_response())
}

fn run_upload(form: UploadForm, state: &AppState) -> Result<(Vec<u8>, usize), AppendError> {
    let (request, _uploads) = form.into_request()?;

    let output_dir = scratch_dir()?;
    let output = output_dir.path().join(OUTPUT_ARCHIVE_NAME);
    let rasterizer = (state.rasterizer)(&state.config);

    let summary = process(
        request,
        rasterizer.as_ref(),
        &state.config.append_settings(),
        &output,
    )?;
    let bytes = std::fs::read(&output)?;

    Ok((bytes, summary.processed_documents()))
}
