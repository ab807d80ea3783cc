//! Multipart form parsing and validation for `POST /api/generate`.

use crate::config::{AppConfig, MAX_TEXT_CHARS};
use crate::errors::ApiError;
use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;
use secrecy::SecretString;
use slidegen_core::Error;
use slidegen_llm::Provider;
use std::io::Write;
use tempfile::NamedTempFile;

/// Cap on any text field, in bytes. Generous enough for 10,000 characters.
const MAX_FIELD_BYTES: usize = 64 * 1024;

/// An uploaded template staged on disk for the lifetime of the request.
#[derive(Debug)]
pub struct StagedUpload {
    pub filename: String,
    pub file: NamedTempFile,
    pub size: u64,
}

/// A validated generation request.
#[derive(Debug)]
pub struct GenerateForm {
    pub text: String,
    pub guidance: Option<String>,
    pub provider: Provider,
    pub api_key: SecretString,
    pub template: StagedUpload,
}

/// Fields as received, before validation.
#[derive(Debug, Default)]
pub(crate) struct RawFields {
    pub text: Option<String>,
    pub guidance: Option<String>,
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub template: Option<StagedUpload>,
}

impl RawFields {
    /// Check required fields and limits. No network call happens before this.
    pub fn validate(self) -> Result<GenerateForm, Error> {
        let text = self.text.as_deref().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(Error::Validation("text_input is required".to_string()));
        }
        let chars = text.chars().count();
        if chars > MAX_TEXT_CHARS {
            return Err(Error::Validation(format!(
                "text_input must be at most {} characters (got {})",
                MAX_TEXT_CHARS, chars
            )));
        }

        let provider = match non_blank(self.provider) {
            Some(p) => p.parse::<Provider>()?,
            None => return Err(Error::Validation("llm_provider is required".to_string())),
        };
        let api_key = non_blank(self.api_key)
            .map(SecretString::from)
            .ok_or_else(|| Error::Validation("api_key is required".to_string()))?;
        let template = self
            .template
            .ok_or_else(|| Error::Validation("template_file is required".to_string()))?;

        Ok(GenerateForm {
            text: text.to_string(),
            guidance: non_blank(self.guidance),
            provider,
            api_key,
            template,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and validate the whole multipart body.
pub async fn read_form(mut payload: Multipart, config: &AppConfig) -> Result<GenerateForm, ApiError> {
    let mut fields = RawFields::default();

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "template_file" => fields.template = stage_upload(&mut field, config).await?,
            "text_input" => fields.text = Some(read_text(&mut field, &name).await?),
            "guidance" => fields.guidance = Some(read_text(&mut field, &name).await?),
            "llm_provider" => fields.provider = Some(read_text(&mut field, &name).await?),
            "api_key" => fields.api_key = Some(read_text(&mut field, &name).await?),
            _ => {
                log::debug!("Ignoring unknown form field '{}'", name);
                while field.try_next().await?.is_some() {}
            }
        }
    }

    Ok(fields.validate()?)
}

async fn read_text(field: &mut Field, name: &str) -> Result<String, ApiError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        if buf.len() + chunk.len() > MAX_FIELD_BYTES {
            let message = if name == "text_input" {
                format!("text_input must be at most {} characters", MAX_TEXT_CHARS)
            } else {
                format!("{} is too long", name)
            };
            return Err(Error::Validation(message).into());
        }
        buf.extend_from_slice(&chunk);
    }
    String::from_utf8(buf)
        .map_err(|_| Error::Validation(format!("{} must be valid UTF-8 text", name)).into())
}

/// Stream the template into a temp file, enforcing the size limit.
///
/// Returns `None` for the empty part browsers send when no file is chosen.
async fn stage_upload(
    field: &mut Field,
    config: &AppConfig,
) -> Result<Option<StagedUpload>, ApiError> {
    let filename = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(base_name)
        .unwrap_or_default();

    let mut file = tempfile::Builder::new()
        .prefix("upload-")
        .tempfile_in(&config.upload_dir)?;
    let mut size = 0u64;
    while let Some(chunk) = field.try_next().await? {
        size += chunk.len() as u64;
        if size > config.max_upload_bytes {
            return Err(ApiError::PayloadTooLarge {
                limit: config.max_upload_bytes,
            });
        }
        file.write_all(&chunk)?;
    }
    file.flush()?;

    if filename.is_empty() && size == 0 {
        return Ok(None);
    }
    log::debug!("Staged upload '{}' ({} bytes)", filename, size);
    Ok(Some(StagedUpload {
        filename,
        file,
        size,
    }))
}

/// Drop any client-side directory from an uploaded file name.
fn base_name(name: &str) -> String {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim().to_string()
}
