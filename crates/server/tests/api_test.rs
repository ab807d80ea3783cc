use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use slidegen_core::Error;
use slidegen_pptx::fixture::minimal_template;
use slidegen_pptx::{DeckReader, PPTX_MIME};
use slidegen_server::configure;

mod common;
use common::{business_outline, test_state, valid_form, MultipartBody, StubOutlines};

fn generate_request(body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/generate")
        .insert_header((header::CONTENT_TYPE, MultipartBody::content_type()))
        .set_payload(body)
}

async fn error_json(response: actix_web::dev::ServiceResponse) -> serde_json::Value {
    let body = test::read_body(response).await;
    serde_json::from_slice(&body).unwrap()
}

#[actix_web::test]
async fn test_generate_business_update() {
    let stub = StubOutlines::returning(business_outline());
    let (state, upload_dir) = test_state(stub.clone(), |_| {});
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;

    let body = valid_form(&minimal_template()).finish();
    let response = test::call_service(&app, generate_request(body).to_request()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), PPTX_MIME);
    assert_eq!(
        headers.get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"generated_presentation.pptx\""
    );
    assert_eq!(headers.get("X-Slide-Count").unwrap(), "3");

    let bytes = test::read_body(response).await;
    let slides = DeckReader::new().read_bytes(&bytes).unwrap();
    let titles: Vec<_> = slides.iter().map(|s| s.title.as_deref()).collect();
    assert_eq!(
        titles,
        vec![
            Some("Business Update"),
            Some("Sales by quarter"),
            Some("Q3 product launch")
        ]
    );

    assert_eq!(stub.calls(), 1);
    assert_eq!(stub.last_guidance().as_deref(), Some("business update"));
    // the staged upload is gone once the request is done
    assert_eq!(std::fs::read_dir(upload_dir.path()).unwrap().count(), 0);
}

#[actix_web::test]
async fn test_missing_fields_fail_before_provider_call() {
    let stub = StubOutlines::returning(business_outline());
    let (state, _dir) = test_state(stub.clone(), |_| {});
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;
    let template = minimal_template();

    let without_key = MultipartBody::new()
        .text("text_input", "Some text")
        .text("llm_provider", "anthropic")
        .file("template_file", "template.pptx", &template);
    let without_provider = MultipartBody::new()
        .text("text_input", "Some text")
        .text("api_key", "sk-test")
        .file("template_file", "template.pptx", &template);
    let without_template = MultipartBody::new()
        .text("text_input", "Some text")
        .text("llm_provider", "gemini")
        .text("api_key", "sk-test");
    let blank_text = MultipartBody::new()
        .text("text_input", "   ")
        .text("llm_provider", "openai")
        .text("api_key", "sk-test")
        .file("template_file", "template.pptx", &template);

    for (form, field) in [
        (without_key, "api_key"),
        (without_provider, "llm_provider"),
        (without_template, "template_file"),
        (blank_text, "text_input"),
    ] {
        let response = test::call_service(&app, generate_request(form.finish()).to_request()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{field}");
        let json = error_json(response).await;
        assert_eq!(json["kind"], "validation_error");
        assert!(json["error"].as_str().unwrap().contains(field), "{json}");
    }
    assert_eq!(stub.calls(), 0);
}

#[actix_web::test]
async fn test_text_over_limit() {
    let stub = StubOutlines::returning(business_outline());
    let (state, _dir) = test_state(stub.clone(), |_| {});
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;

    let form = MultipartBody::new()
        .text("text_input", &"word ".repeat(2_001))
        .text("llm_provider", "openai")
        .text("api_key", "sk-test")
        .file("template_file", "template.pptx", &minimal_template());
    let response = test::call_service(&app, generate_request(form.finish()).to_request()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stub.calls(), 0);
}

#[actix_web::test]
async fn test_non_presentation_upload() {
    let stub = StubOutlines::returning(business_outline());
    let (state, _dir) = test_state(stub.clone(), |_| {});
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;

    for (filename, bytes) in [
        ("notes.txt", b"just some notes".to_vec()),
        ("fake.pptx", b"not really a zip archive".to_vec()),
        ("template.docx", minimal_template()),
    ] {
        let form = MultipartBody::new()
            .text("text_input", "Some text")
            .text("llm_provider", "openai")
            .text("api_key", "sk-test")
            .file("template_file", filename, &bytes);
        let response = test::call_service(&app, generate_request(form.finish()).to_request()).await;

        assert_eq!(
            response.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "{filename}"
        );
        let json = error_json(response).await;
        assert_eq!(json["kind"], "unsupported_format");
    }
    assert_eq!(stub.calls(), 0);
}

#[actix_web::test]
async fn test_upload_over_limit() {
    let stub = StubOutlines::returning(business_outline());
    let (state, _dir) = test_state(stub.clone(), |config| config.max_upload_bytes = 1024);
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;

    let form = valid_form(&vec![0u8; 4096]);
    let response = test::call_service(&app, generate_request(form.finish()).to_request()).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = error_json(response).await;
    assert_eq!(json["kind"], "payload_too_large");
    assert_eq!(stub.calls(), 0);
}

#[actix_web::test]
async fn test_provider_errors_map_to_status() {
    let cases: [(fn() -> Error, StatusCode, &str); 4] = [
        (
            || Error::Auth("openai rejected the API key".into()),
            StatusCode::UNAUTHORIZED,
            "auth_error",
        ),
        (
            || Error::RateLimit("slow down".into()),
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limit",
        ),
        (
            || Error::MalformedResponse("no JSON object".into()),
            StatusCode::BAD_GATEWAY,
            "malformed_response",
        ),
        (
            || Error::ProviderUnavailable("HTTP 503".into()),
            StatusCode::SERVICE_UNAVAILABLE,
            "provider_unavailable",
        ),
    ];

    for (make_error, status, kind) in cases {
        let stub = StubOutlines::failing(make_error);
        let (state, _dir) = test_state(stub.clone(), |_| {});
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let request = generate_request(valid_form(&minimal_template()).finish()).to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), status);
        assert_eq!(error_json(response).await["kind"], kind);
        assert_eq!(stub.calls(), 1);
    }
}

#[actix_web::test]
async fn test_health() {
    let (state, _dir) = test_state(StubOutlines::returning(business_outline()), |_| {});
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;

    let request = test::TestRequest::get().uri("/api/health").to_request();
    let json: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["message"], "PowerPoint Generator API is running");
}

#[actix_web::test]
async fn test_index_serves_form() {
    let (state, _dir) = test_state(StubOutlines::returning(business_outline()), |_| {});
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;

    let request = test::TestRequest::get().uri("/").to_request();
    let body = test::call_and_read_body(&app, request).await;
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("action=\"/api/generate\""));
    assert!(html.contains("name=\"template_file\""));
}
