#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use slidegen_core::{Error, Outline, OutlineEntry, Result, SlideKind};
use slidegen_llm::{OutlineRequest, OutlineSource};
use slidegen_server::{AppConfig, AppState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const BOUNDARY: &str = "----slidegen-test-boundary";

/// Outline source that never touches the network.
pub struct StubOutlines {
    reply: Box<dyn Fn() -> Result<Outline> + Send + Sync>,
    calls: AtomicUsize,
    last_guidance: Mutex<Option<String>>,
}

impl StubOutlines {
    pub fn returning(outline: Outline) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(move || Ok(outline.clone())),
            calls: AtomicUsize::new(0),
            last_guidance: Mutex::new(None),
        })
    }

    pub fn failing(make_error: fn() -> Error) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(move || Err(make_error())),
            calls: AtomicUsize::new(0),
            last_guidance: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_guidance(&self) -> Option<String> {
        self.last_guidance.lock().unwrap().clone()
    }
}

#[async_trait]
impl OutlineSource for StubOutlines {
    async fn generate_outline(&self, request: &OutlineRequest) -> Result<Outline> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_guidance.lock().unwrap() = request.guidance.clone();
        (self.reply)()
    }
}

/// The fixed three-slide business update outline.
pub fn business_outline() -> Outline {
    Outline::new(
        Some("Business update".to_string()),
        vec![
            OutlineEntry::new("Business Update")
                .with_kind(SlideKind::Title)
                .with_bullet("Q1 to Q3 review"),
            OutlineEntry::new("Sales by quarter")
                .with_bullet("Q1 sales grew 20%")
                .with_bullet("Q2 was flat")
                .with_notes("Stress the Q1 jump."),
            OutlineEntry::new("Q3 product launch")
                .with_kind(SlideKind::Conclusion)
                .with_bullet("New product launched in Q3"),
        ],
    )
    .unwrap()
}

/// App state backed by `outlines`, staging uploads in a fresh temp dir.
pub fn test_state(
    outlines: Arc<StubOutlines>,
    configure: impl FnOnce(&mut AppConfig),
) -> (web::Data<AppState>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.upload_dir = dir.path().to_path_buf();
    configure(&mut config);
    (web::Data::new(AppState::new(config, outlines)), dir)
}

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// A complete, valid form for the business update scenario.
pub fn valid_form(template: &[u8]) -> MultipartBody {
    MultipartBody::new()
        .text(
            "text_input",
            "Q1 sales grew 20%. Q2 flat. Q3 new product launch.",
        )
        .text("guidance", "business update")
        .text("llm_provider", "openai")
        .text("api_key", "sk-test-key")
        .file("template_file", "template.pptx", template)
}
