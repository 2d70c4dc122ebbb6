//! LLM Provider implementations for Rangaayan.
//!
//! All providers implement the `rangaayan_core::Provider` trait.
//! `build_from_config` wires the configured OpenAI-compatible endpoint.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use rangaayan_config::AppConfig;
use rangaayan_core::error::ProviderError;
use rangaayan_core::provider::Provider;
use std::sync::Arc;
use std::time::Duration;

/// Build the model provider described by `config`.
///
/// Fails with `NotConfigured` when no API key is available.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| ProviderError::NotConfigured("set OPENROUTER_API_KEY or api_key in config.toml".into()))?;

    let name = if config.provider.base_url.contains("openrouter.ai") {
        "openrouter"
    } else {
        "openai-compatible"
    };

    tracing::info!(provider = name, model = %config.provider.model, "Configured model provider");

    let provider = OpenAiCompatProvider::with_timeout(
        name,
        config.provider.base_url.clone(),
        api_key,
        Duration::from_secs(config.provider.timeout_secs),
    )?;
    Ok(Arc::new(provider))
}
