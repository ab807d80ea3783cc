use crate::errors::ApiError;
use crate::form::read_form;
use crate::pipeline;
use crate::AppState;
use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use slidegen_pptx::PPTX_MIME;

const OUTPUT_FILENAME: &str = "generated_presentation.pptx";
/// Room for the text fields and multipart framing on top of the file limit.
const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// `POST /api/generate`
pub async fn generate(
    req: HttpRequest,
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let limit = state.config.max_upload_bytes;
    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > limit + FORM_OVERHEAD_BYTES) {
        return Err(ApiError::PayloadTooLarge { limit });
    }

    let form = read_form(payload, &state.config).await?;
    log::info!(
        "Generating deck with {} from '{}' ({} bytes)",
        form.provider,
        form.template.filename,
        form.template.size
    );

    let deck = pipeline::generate(form, state.outlines.as_ref(), &state.config).await?;

    Ok(HttpResponse::Ok()
        .content_type(PPTX_MIME)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", OUTPUT_FILENAME),
        ))
        .insert_header(("X-Slide-Count", deck.report.slide_count.to_string()))
        .body(deck.bytes))
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "message": "PowerPoint Generator API is running"
    }))
}

/// `GET /`
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("../static/index.html"))
}
