//! Error taxonomy for presentation generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning text and a template into a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// A request field is missing or out of range.
    #[error("{0}")]
    Validation(String),

    /// The uploaded template is not a recognized presentation format.
    #[error("Unsupported template format: {0}")]
    UnsupportedFormat(String),

    /// The template is a presentation package but is not well formed.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// The provider rejected the API key.
    #[error("Authentication with the LLM provider failed: {0}")]
    Auth(String),

    /// The provider is throttling requests for this key.
    #[error("The LLM provider rate limit was exceeded: {0}")]
    RateLimit(String),

    /// The provider could not be reached or answered with a server error.
    #[error("The LLM provider is unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider answered, but its output is not a usable outline.
    #[error("The LLM response could not be used as a slide outline: {0}")]
    MalformedResponse(String),

    /// Layout or content could not be placed in the output deck.
    #[error("Failed to assemble presentation: {0}")]
    Assembly(String),

    /// An outbound call or blocking step exceeded its time budget.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP container error.
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    Xml(String),
}

impl Error {
    /// Stable machine-readable code for this error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::UnsupportedFormat(_) => "unsupported_format",
            Error::InvalidTemplate(_) => "invalid_template",
            Error::Auth(_) => "auth_error",
            Error::RateLimit(_) => "rate_limit",
            Error::ProviderUnavailable(_) => "provider_unavailable",
            Error::MalformedResponse(_) => "malformed_response",
            Error::Assembly(_) => "assembly_error",
            Error::Timeout(_) => "timeout",
            Error::Io(_) => "io_error",
            Error::Zip(_) => "zip_error",
            Error::Xml(_) => "xml_error",
        }
    }

    /// Whether the caller can fix this by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::UnsupportedFormat(_)
                | Error::InvalidTemplate(_)
                | Error::Auth(_)
                | Error::RateLimit(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_are_distinct() {
        let errors = [
            Error::Validation(String::new()),
            Error::UnsupportedFormat(String::new()),
            Error::InvalidTemplate(String::new()),
            Error::Auth(String::new()),
            Error::RateLimit(String::new()),
            Error::ProviderUnavailable(String::new()),
            Error::MalformedResponse(String::new()),
            Error::Assembly(String::new()),
            Error::Timeout(String::new()),
            Error::Zip(String::new()),
            Error::Xml(String::new()),
        ];
        let mut kinds: Vec<_> = errors.iter().map(Error::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_client_errors() {
        assert!(Error::Validation("x".into()).is_client_error());
        assert!(Error::Auth("x".into()).is_client_error());
        assert!(!Error::ProviderUnavailable("x".into()).is_client_error());
        assert!(!Error::Assembly("x".into()).is_client_error());
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = Error::Validation("API key is required".into());
        assert_eq!(err.to_string(), "API key is required");
    }
}
