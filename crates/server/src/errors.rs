use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use slidegen_core::Error;
use std::fmt;

/// Error returned by the HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    Core(Error),
    PayloadTooLarge { limit: u64 },
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    kind: &'a str,
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Core(e) => e.kind(),
            ApiError::PayloadTooLarge { .. } => "payload_too_large",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Core(e) => write!(f, "{e}"),
            ApiError::PayloadTooLarge { limit } => write!(
                f,
                "Upload exceeds the limit of {} MB",
                limit / (1024 * 1024)
            ),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Core(e) => match e {
                Error::Validation(_) => StatusCode::BAD_REQUEST,
                Error::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                Error::InvalidTemplate(_) => StatusCode::UNPROCESSABLE_ENTITY,
                Error::Auth(_) => StatusCode::UNAUTHORIZED,
                Error::RateLimit(_) => StatusCode::TOO_MANY_REQUESTS,
                Error::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
                Error::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                Error::Assembly(_) | Error::Io(_) | Error::Zip(_) | Error::Xml(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let caller_fault = match self {
            ApiError::Core(e) => e.is_client_error(),
            ApiError::PayloadTooLarge { .. } => true,
        };
        if caller_fault {
            log::warn!("Rejected request: {self}");
        } else {
            log::error!("{self}");
        }
        HttpResponse::build(status).json(ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        })
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Core(e)
    }
}

impl From<actix_multipart::MultipartError> for ApiError {
    fn from(e: actix_multipart::MultipartError) -> Self {
        ApiError::Core(Error::Validation(format!("Malformed multipart body: {e}")))
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(_: actix_web::error::BlockingError) -> Self {
        ApiError::Core(Error::Assembly(
            "Background worker pool is unavailable".to_string(),
        ))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::Core(Error::Io(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_per_kind() {
        let cases = [
            (Error::Validation("x".into()), 400),
            (Error::UnsupportedFormat("x".into()), 415),
            (Error::InvalidTemplate("x".into()), 422),
            (Error::Auth("x".into()), 401),
            (Error::RateLimit("x".into()), 429),
            (Error::MalformedResponse("x".into()), 502),
            (Error::ProviderUnavailable("x".into()), 503),
            (Error::Timeout("x".into()), 504),
            (Error::Assembly("x".into()), 500),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status_code().as_u16(), status);
        }
        assert_eq!(
            ApiError::PayloadTooLarge { limit: 1 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[actix_web::test]
    async fn test_json_body() {
        let response = ApiError::from(Error::Auth("openai rejected the API key".into()))
            .error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["kind"], "auth_error");
        assert!(json["error"].as_str().unwrap().contains("rejected the API key"));
    }
}
