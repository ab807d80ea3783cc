//! Supported LLM providers and their per-provider settings.

use slidegen_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// An LLM provider the caller may choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
    /// OpenAI-compatible proxy at aipipe.org.
    AiPipe,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Gemini,
        Provider::AiPipe,
    ];

    /// Lowercase identifier used in forms and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
            Provider::AiPipe => "aipipe",
        }
    }

    /// Prefix of the provider's environment variables (`OPENAI_MODEL`, ...).
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI",
            Provider::Anthropic => "ANTHROPIC",
            Provider::Gemini => "GEMINI",
            Provider::AiPipe => "AIPIPE",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi | Provider::AiPipe => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-haiku-latest",
            Provider::Gemini => "gemini-1.5-flash",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::AiPipe => "https://aipipe.org/openai/v1",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Unsupported LLM provider '{}'. Choose one of: openai, anthropic, gemini, aipipe",
                    s.trim()
                ))
            })
    }
}

/// Model and endpoint for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub model: String,
    /// Base URL without a trailing slash.
    pub base_url: String,
}

impl ProviderSettings {
    pub fn new(model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// The built-in defaults for `provider`.
    pub fn defaults(provider: Provider) -> Self {
        Self::new(provider.default_model(), provider.default_base_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider() {
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!(" Anthropic ".parse::<Provider>().unwrap(), Provider::Anthropic);
        assert_eq!("GEMINI".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!("aipipe".parse::<Provider>().unwrap(), Provider::AiPipe);

        let err = "cohere".parse::<Provider>().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("cohere"));
    }

    #[test]
    fn test_display_round_trips() {
        for provider in Provider::ALL {
            assert_eq!(provider.to_string().parse::<Provider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_settings_trim_slash() {
        let settings = ProviderSettings::new("m", "http://localhost:9000/v1/");
        assert_eq!(settings.base_url, "http://localhost:9000/v1");
    }
}
