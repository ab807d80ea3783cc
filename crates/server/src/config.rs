//! Server configuration, read once at start-up.

use anyhow::{Context, Result};
use slidegen_llm::LlmConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;
/// Hard cap on the `text_input` field, in characters.
pub const MAX_TEXT_CHARS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    /// Where uploads are staged while a request runs.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub assembly_timeout: Duration,
    pub llm: LlmConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            upload_dir: std::env::temp_dir().join("slidegen-uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            assembly_timeout: Duration::from_secs(30),
            llm: LlmConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read `SLIDEGEN_*` and provider variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let llm_timeout = match var("SLIDEGEN_LLM_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_number(&v, "SLIDEGEN_LLM_TIMEOUT_SECS")?),
            None => defaults.llm.timeout,
        };
        let assembly_timeout = match var("SLIDEGEN_ASSEMBLY_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_number(&v, "SLIDEGEN_ASSEMBLY_TIMEOUT_SECS")?),
            None => defaults.assembly_timeout,
        };
        let max_upload_bytes = match var("SLIDEGEN_MAX_UPLOAD_BYTES") {
            Some(v) => parse_number(&v, "SLIDEGEN_MAX_UPLOAD_BYTES")?,
            None => defaults.max_upload_bytes,
        };

        Ok(Self {
            bind: var("SLIDEGEN_BIND").unwrap_or(defaults.bind),
            upload_dir: var("SLIDEGEN_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes,
            assembly_timeout,
            llm: LlmConfig::from_lookup(&lookup).with_timeout(llm_timeout),
        })
    }

    /// Create the staging directory if needed.
    pub fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.upload_dir).with_context(|| {
            format!(
                "Failed to create upload directory {}",
                self.upload_dir.display()
            )
        })
    }
}

fn parse_number<T>(value: &str, key: &str) -> Result<T>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let parsed: T = value
        .parse()
        .with_context(|| format!("{} must be a positive integer, got '{}'", key, value))?;
    if parsed <= T::default() {
        anyhow::bail!("{} must be greater than zero, got '{}'", key, value);
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidegen_llm::Provider;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.max_upload_bytes, 52_428_800);
        assert_eq!(config.llm.timeout, Duration::from_secs(60));
        assert_eq!(config.assembly_timeout, Duration::from_secs(30));
        assert!(config.upload_dir.ends_with("slidegen-uploads"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SLIDEGEN_BIND", "0.0.0.0:9000"),
            ("SLIDEGEN_UPLOAD_DIR", "/srv/uploads"),
            ("SLIDEGEN_MAX_UPLOAD_BYTES", "1048576"),
            ("SLIDEGEN_LLM_TIMEOUT_SECS", " 15 "),
            ("ANTHROPIC_MODEL", "claude-3-5-sonnet-latest"),
        ])
        .unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.upload_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(config.max_upload_bytes, 1_048_576);
        assert_eq!(config.llm.timeout, Duration::from_secs(15));
        assert_eq!(
            config.llm.settings(Provider::Anthropic).model,
            "claude-3-5-sonnet-latest"
        );
    }

    #[test]
    fn test_invalid_numbers_fail() {
        for (key, value) in [
            ("SLIDEGEN_MAX_UPLOAD_BYTES", "lots"),
            ("SLIDEGEN_LLM_TIMEOUT_SECS", "-5"),
            ("SLIDEGEN_ASSEMBLY_TIMEOUT_SECS", "0"),
        ] {
            let err = config_from(&[(key, value)]).unwrap_err();
            assert!(err.to_string().contains(key), "{err}");
        }
    }
}
