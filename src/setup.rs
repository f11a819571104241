use std::collections::BTreeMap;

use anyhow::{Context, Result};
use log::debug;

use crate::cli_args::Cli;
use crate::config::{self, BackendConfig};
use crate::error::PipelineError;
use crate::llm::openai::OpenAiClient;

/// Config file values with CLI flags layered on top as explicit overrides.
pub fn build_store(cli: &Cli) -> Result<BTreeMap<String, String>> {
    let mut store = config::load_store(cli.config.as_deref())?;

    let overrides = [
        (config::API_KEY, &cli.api_key),
        (config::BASE_URL, &cli.base_url),
        (config::MODEL, &cli.model),
    ];
    for (key, value) in overrides {
        if let Some(v) = value {
            store.insert(key.to_string(), v.clone());
        }
    }

    Ok(store)
}

/// Build the completion client from resolved settings.
pub fn build_llm_client(cfg: &BackendConfig) -> Result<OpenAiClient> {
    let model = cfg.model();
    // Reported like any other resolution failure.
    let timeout = cfg.timeout().map_err(PipelineError::Resolve)?;

    debug!("Using OpenAiClient with model: {model}, timeout: {timeout:?}");

    OpenAiClient::new(model, config::DEFAULT_BASE_URL.to_string(), timeout)
        .context("failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_flags_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("send-pr.toml");
        std::fs::write(&path, "[openai]\napi_key = \"from-file\"\nmodel = \"file-model\"\n").unwrap();

        let cli = Cli::parse_from([
            "send-pr",
            "main",
            "--config",
            path.to_str().unwrap(),
            "--api-key",
            "from-flag",
        ]);
        let store = build_store(&cli).unwrap();

        assert_eq!(store[config::API_KEY], "from-flag");
        assert_eq!(store[config::MODEL], "file-model");
    }

    #[test]
    fn invalid_timeout_is_tagged_as_resolution() {
        let mut store = BTreeMap::new();
        store.insert(config::TIMEOUT_SECS.to_string(), "0".to_string());
        let env: BTreeMap<String, String> = BTreeMap::new();

        let err = build_llm_client(&BackendConfig::new(&store, &env)).err().unwrap();

        assert_eq!(err.to_string(), "configuration resolution failed");
        assert!(format!("{err:#}").contains(config::TIMEOUT_SECS));
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let cli = Cli::parse_from(["send-pr", "main", "--config", "/nonexistent/send-pr.toml"]);
        assert!(build_store(&cli).is_err());
    }
}
