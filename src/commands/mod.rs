//! CLI subcommand implementations.

/// Single-question ask flow (also the `pask` binary).
pub mod ask;
/// Config file validation.
pub mod config;
/// Scenario conversation runner.
pub mod run;
/// Scenario catalog listing.
pub mod scenarios;

use crate::llm::provider::{self, ConfigError, EnvReader, ProcessEnv, ProviderConfig};

/// Picks the provider name: flag, then profile, then `LLM_PROVIDER`, then
/// the openai default. The resolver itself never reads `LLM_PROVIDER`.
pub(crate) fn provider_name(flag: Option<&str>, profile: Option<&str>) -> String {
    flag.map(str::to_string)
        .or_else(|| profile.map(str::to_string))
        .or_else(|| {
            std::env::var("LLM_PROVIDER")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
        .unwrap_or_else(|| "openai".to_string())
}

/// Process env with a placeholder layered over one missing credential
/// variable, so `--dry-run` can display a request without real keys.
struct PlaceholderKey {
    key_env: &'static str,
}

impl EnvReader for PlaceholderKey {
    fn var(&self, key: &str) -> Option<String> {
        ProcessEnv
            .var(key)
            .or_else(|| (key == self.key_env).then(|| "dry-run".to_string()))
    }
}

/// Resolves the provider config for a command. In dry-run mode a missing
/// credential is replaced with a placeholder instead of failing, since the
/// credential never appears in dry-run output anyway.
pub(crate) fn resolve_provider(name: &str, dry_run: bool) -> Result<ProviderConfig, String> {
    match provider::resolve(name, &ProcessEnv) {
        Ok(config) => Ok(config),
        Err(ConfigError::MissingCredential { key_env, .. }) if dry_run => {
            provider::resolve(name, &PlaceholderKey { key_env }).map_err(|err| err.to_string())
        }
        Err(err) => Err(err.to_string()),
    }
}
