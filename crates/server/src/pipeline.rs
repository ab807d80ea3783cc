//! Request pipeline: analyze the template, fetch the outline, assemble the deck.

use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::form::GenerateForm;
use actix_web::web;
use slidegen_core::Error;
use slidegen_llm::{OutlineRequest, OutlineSource};
use slidegen_pptx::{AssembledDeck, PresentationAssembler, TemplateAnalyzer};
use std::time::Duration;

/// Run one generation request end to end.
///
/// The template is analyzed first so a broken upload fails before any
/// provider call is made.
pub async fn generate(
    form: GenerateForm,
    outlines: &dyn OutlineSource,
    config: &AppConfig,
) -> Result<AssembledDeck, ApiError> {
    let GenerateForm {
        text,
        guidance,
        provider,
        api_key,
        template: upload,
    } = form;

    let filename = upload.filename.clone();
    let path = upload.file.path().to_path_buf();
    let template = web::block(move || {
        let bytes = std::fs::read(&path)?;
        TemplateAnalyzer::new().analyze(&filename, &bytes)
    })
    .await??;
    // Removes the staged file.
    drop(upload);

    let request = OutlineRequest {
        provider,
        api_key,
        text,
        guidance,
    };
    let outline = bounded(
        config.llm.timeout,
        "outline generation",
        outlines.generate_outline(&request),
    )
    .await??;
    log::info!(
        "Outline from {} has {} slide(s)",
        provider,
        outline.len()
    );

    let deck = bounded(
        config.assembly_timeout,
        "presentation assembly",
        web::block(move || PresentationAssembler::new().assemble(&template, &outline)),
    )
    .await???;

    log::info!(
        "Generated deck: {} slide(s), {} truncation(s), {} image(s) reused, {} bytes",
        deck.report.slide_count,
        deck.report.truncations,
        deck.report.images_placed.len(),
        deck.bytes.len()
    );
    Ok(deck)
}

async fn bounded<F: std::future::Future>(
    limit: Duration,
    step: &str,
    future: F,
) -> Result<F::Output, ApiError> {
    tokio::time::timeout(limit, future).await.map_err(|_| {
        ApiError::from(Error::Timeout(format!(
            "{} exceeded {}s",
            step,
            limit.as_secs()
        )))
    })
}
