use std::collections::HashMap;
use std::fmt;

use owo_colors::OwoColorize;
use serde::Serialize;

/// Environment accessor used by [`resolve`].
///
/// Passed in rather than read from process globals, so resolution stays a
/// pure function and tests can supply a plain map instead of mutating the
/// real environment.
pub trait EnvReader {
    /// Returns the raw value of `key`, or `None` when unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// [`EnvReader`] backed by the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvReader for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvReader for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Supported model backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Provider {
    /// OpenAI hosted API.
    #[serde(rename = "openai")]
    OpenAi,
    /// Self-hosted OpenAI-compatible server (LM Studio, llama.cpp, vLLM...).
    #[serde(rename = "local-inference")]
    LocalInference,
    /// Alternate hosted vendor with an OpenAI-compatible API.
    #[serde(rename = "alternate-hosted")]
    AlternateHosted,
}

impl Provider {
    /// All recognized provider names, for error messages and help text.
    pub const NAMES: [&'static str; 3] = ["openai", "local-inference", "alternate-hosted"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::LocalInference => "local-inference",
            Self::AlternateHosted => "alternate-hosted",
        }
    }

    /// Whether the provider needs a real credential to authenticate.
    pub fn is_hosted(self) -> bool {
        !matches!(self, Self::LocalInference)
    }
}

/// Per-1k-token rates. Used only for cost display, never for control flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pricing {
    pub prompt_per_1k: f64,
    pub completion_per_1k: f64,
}

impl Pricing {
    /// Zero rates, forced for local providers.
    pub const FREE: Pricing = Pricing {
        prompt_per_1k: 0.0,
        completion_per_1k: 0.0,
    };
}

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

const LOCAL_DEFAULT_BASE_URL: &str = "http://localhost:1234/v1";
const LOCAL_DEFAULT_MODEL: &str = "default_model";
/// Sentinel credential for servers that accept any bearer token.
const LOCAL_KEY_SENTINEL: &str = "not-needed";

const ALT_DEFAULT_BASE_URL: &str = "https://api.fireworks.ai/inference/v1";
const ALT_DEFAULT_MODEL: &str = "accounts/fireworks/models/kimi-k2-instruct-0905";
/// Vendor's published per-1k rates for the default alternate model.
const ALT_PRICING: Pricing = Pricing {
    prompt_per_1k: 0.0006,
    completion_per_1k: 0.0025,
};

pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Resolved backend configuration a caller passes to a chat client.
///
/// Immutable value type; two resolutions against the same environment
/// compare equal. The credential is skipped during serialization so dry-run
/// output never carries it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
}

/// Fatal configuration problems raised by [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Requested provider name is not in the supported set.
    UnsupportedProvider(String),
    /// A hosted provider's credential variable is unset or empty.
    MissingCredential {
        provider: Provider,
        key_env: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedProvider(name) => write!(
                f,
                "Unsupported provider '{name}'. Supported values: {}.",
                Provider::NAMES.join(", ")
            ),
            Self::MissingCredential { key_env, .. } => {
                write!(f, "{key_env} is not set in the environment")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Credential variable for hosted providers.
pub fn api_key_env(provider: Provider) -> Option<&'static str> {
    match provider {
        Provider::OpenAi => Some("OPENAI_API_KEY"),
        Provider::AlternateHosted => Some("ALT_API_KEY"),
        Provider::LocalInference => None,
    }
}

/// Parses a provider name. Empty or all-whitespace input falls back to
/// `openai`, the default every calling script agrees on.
pub fn parse_provider(name: &str) -> Result<Provider, ConfigError> {
    match name.trim() {
        "" | "openai" => Ok(Provider::OpenAi),
        "local-inference" => Ok(Provider::LocalInference),
        "alternate-hosted" => Ok(Provider::AlternateHosted),
        other => Err(ConfigError::UnsupportedProvider(other.to_string())),
    }
}

/// Resolves a provider name plus environment state into a ready-to-use
/// [`ProviderConfig`].
///
/// Reads only through `env`, performs no network I/O, and fails immediately
/// when a hosted provider's credential is unset or empty. The model and base
/// URL of the returned config are always non-empty after defaulting.
pub fn resolve(name: &str, env: &impl EnvReader) -> Result<ProviderConfig, ConfigError> {
    let provider = parse_provider(name)?;

    let config = match provider {
        Provider::OpenAi => ProviderConfig {
            provider,
            model: OPENAI_DEFAULT_MODEL.to_string(),
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: required_key(provider, env)?,
            temperature: DEFAULT_TEMPERATURE,
            pricing: None,
        },
        Provider::LocalInference => {
            let base_url = var_or(env, "LOCAL_BASE_URL", LOCAL_DEFAULT_BASE_URL);
            eprintln!(
                "{}",
                format!("local inference endpoint: {base_url}").dimmed()
            );
            ProviderConfig {
                provider,
                model: var_or(env, "LOCAL_MODEL", LOCAL_DEFAULT_MODEL),
                base_url,
                api_key: LOCAL_KEY_SENTINEL.to_string(),
                temperature: DEFAULT_TEMPERATURE,
                pricing: Some(Pricing::FREE),
            }
        }
        Provider::AlternateHosted => ProviderConfig {
            provider,
            model: var_or(env, "ALT_MODEL", ALT_DEFAULT_MODEL),
            base_url: var_or(env, "ALT_BASE_URL", ALT_DEFAULT_BASE_URL),
            api_key: required_key(provider, env)?,
            temperature: DEFAULT_TEMPERATURE,
            pricing: Some(ALT_PRICING),
        },
    };

    Ok(config)
}

fn required_key(provider: Provider, env: &impl EnvReader) -> Result<String, ConfigError> {
    let key_env = api_key_env(provider).unwrap_or_default();
    env.var(key_env)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingCredential { provider, key_env })
}

fn var_or(env: &impl EnvReader, key: &str, default: &str) -> String {
    env.var(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;

    use super::{ConfigError, Pricing, Provider, parse_provider, resolve};

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn every_provider_resolves_to_nonempty_endpoint_and_model() {
        let full = env(&[("OPENAI_API_KEY", "sk-test"), ("ALT_API_KEY", "fw-test")]);

        for name in Provider::NAMES {
            let config = resolve(name, &full).expect("resolution should succeed");
            assert!(!config.base_url.is_empty(), "{name} base_url");
            assert!(!config.model.is_empty(), "{name} model");
            assert_eq!(config.temperature, 0.7);
        }
    }

    #[test]
    fn openai_without_key_is_a_missing_credential() {
        let err = resolve("openai", &env(&[])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingCredential {
                provider: Provider::OpenAi,
                key_env: "OPENAI_API_KEY",
            }
        );
        assert_eq!(
            err.to_string(),
            "OPENAI_API_KEY is not set in the environment"
        );
    }

    #[test]
    fn whitespace_only_key_counts_as_missing() {
        let err = resolve("openai", &env(&[("OPENAI_API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }

    #[test]
    fn unknown_provider_is_rejected_by_name() {
        let err = resolve("unknown-provider", &env(&[("OPENAI_API_KEY", "sk")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnsupportedProvider("unknown-provider".to_string())
        );
        assert!(err.to_string().contains("'unknown-provider'"));
        assert!(err.to_string().contains("local-inference"));
    }

    #[test]
    fn local_inference_defaults_without_overrides() {
        let config = resolve("local-inference", &env(&[])).unwrap();
        assert_eq!(config.base_url, "http://localhost:1234/v1");
        assert_eq!(config.model, "default_model");
        assert_eq!(config.api_key, "not-needed");
        assert_eq!(config.pricing, Some(Pricing::FREE));
    }

    #[test]
    fn local_inference_respects_env_overrides() {
        let config = resolve(
            "local-inference",
            &env(&[
                ("LOCAL_BASE_URL", "http://10.0.0.5:8080/v1"),
                ("LOCAL_MODEL", "phi-3.5-mini"),
            ]),
        )
        .unwrap();
        assert_eq!(config.base_url, "http://10.0.0.5:8080/v1");
        assert_eq!(config.model, "phi-3.5-mini");
    }

    #[test]
    fn alternate_hosted_carries_vendor_pricing() {
        let config = resolve("alternate-hosted", &env(&[("ALT_API_KEY", "fw")])).unwrap();
        assert_eq!(config.base_url, "https://api.fireworks.ai/inference/v1");
        let pricing = config.pricing.expect("pricing should be set");
        assert!(pricing.prompt_per_1k > 0.0);
        assert!(pricing.completion_per_1k > pricing.prompt_per_1k);
    }

    #[test]
    fn alternate_hosted_without_key_names_the_variable() {
        let err = resolve("alternate-hosted", &env(&[])).unwrap_err();
        assert_eq!(err.to_string(), "ALT_API_KEY is not set in the environment");
    }

    #[test]
    fn resolution_is_idempotent() {
        let environment = env(&[("OPENAI_API_KEY", "sk-test")]);
        let first = resolve("openai", &environment).unwrap();
        let second = resolve("openai", &environment).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_name_falls_back_to_openai() {
        assert_eq!(parse_provider("").unwrap(), Provider::OpenAi);
        assert_eq!(parse_provider("  ").unwrap(), Provider::OpenAi);
    }

    #[test]
    fn concurrent_resolutions_do_not_interfere() {
        let environment = Arc::new(env(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("ALT_API_KEY", "fw-test"),
        ]));

        let handles: Vec<_> = Provider::NAMES
            .into_iter()
            .map(|name| {
                let environment = Arc::clone(&environment);
                thread::spawn(move || resolve(name, environment.as_ref()).unwrap())
            })
            .collect();

        let configs: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(configs[0].provider, Provider::OpenAi);
        assert_eq!(configs[1].provider, Provider::LocalInference);
        assert_eq!(configs[2].provider, Provider::AlternateHosted);
    }
}
