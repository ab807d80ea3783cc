//! Provider configuration from the environment.

use crate::provider::{Provider, ProviderSettings};
use secrecy::SecretString;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default limit for one outline request, retry included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings shared by every outline request.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    providers: BTreeMap<Provider, ProviderSettings>,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            providers: Provider::ALL
                .into_iter()
                .map(|p| (p, ProviderSettings::defaults(p)))
                .collect(),
            timeout: DEFAULT_TIMEOUT,
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

impl LlmConfig {
    /// Read `<PROVIDER>_MODEL` and `<PROVIDER>_BASE_URL` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`LlmConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        for provider in Provider::ALL {
            let prefix = provider.env_prefix();
            let non_empty = |key: String| lookup(&key).filter(|v| !v.trim().is_empty());
            let model = non_empty(format!("{}_MODEL", prefix))
                .unwrap_or_else(|| provider.default_model().to_string());
            let base_url = non_empty(format!("{}_BASE_URL", prefix))
                .unwrap_or_else(|| provider.default_base_url().to_string());
            config
                .providers
                .insert(provider, ProviderSettings::new(model, base_url));
        }
        config
    }

    /// Override one provider's settings.
    pub fn with_provider(mut self, provider: Provider, settings: ProviderSettings) -> Self {
        self.providers.insert(provider, settings);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Settings for `provider`.
    pub fn settings(&self, provider: Provider) -> ProviderSettings {
        self.providers
            .get(&provider)
            .cloned()
            .unwrap_or_else(|| ProviderSettings::defaults(provider))
    }
}

/// `<PROVIDER>_API_KEY` from the environment, for offline use.
pub fn api_key_from_env(provider: Provider) -> Option<SecretString> {
    std::env::var(format!("{}_API_KEY", provider.env_prefix()))
        .ok()
        .filter(|k| !k.trim().is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = LlmConfig::from_lookup(|_| None);
        let openai = config.settings(Provider::OpenAi);
        assert_eq!(openai.model, "gpt-4o-mini");
        assert_eq!(openai.base_url, "https://api.openai.com/v1");
        assert_eq!(
            config.settings(Provider::Anthropic).base_url,
            "https://api.anthropic.com"
        );
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("AIPIPE_BASE_URL", "http://localhost:8000/v1/"),
            ("OPENAI_MODEL", "   "),
        ]
        .into_iter()
        .collect();
        let config = LlmConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.settings(Provider::Gemini).model, "gemini-2.0-flash");
        assert_eq!(
            config.settings(Provider::AiPipe).base_url,
            "http://localhost:8000/v1"
        );
        // blank values keep the default
        assert_eq!(config.settings(Provider::OpenAi).model, "gpt-4o-mini");
    }
}
