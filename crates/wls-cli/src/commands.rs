//! Command implementations for the CLI.

use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use wls_client::{ClientConfig, RequestOptions, SearchClient, decode};
use wls_signer::{Timestamp, TokenForm, UrlSigner};

use crate::Args;

/// Parses a `key=value` search parameter. A missing `=` means an empty value.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw.split_once('=').unwrap_or((raw, ""));
    if key.is_empty() {
        return Err(format!("parameter '{raw}' has an empty key"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Merges the configuration file (if any) with command-line overrides.
pub fn build_config(args: &Args) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            ClientConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => ClientConfig::default(),
    };

    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(public_key) = &args.public_key {
        config = config.with_public_key(public_key);
    }
    if let Some(private_key) = &args.private_key {
        config = config.with_private_key(private_key);
    }
    if args.without_scheme {
        config = config.with_token_form(TokenForm::WithoutScheme);
    }

    Ok(config)
}

/// Signs `url` without touching the network.
pub fn sign(config: &ClientConfig, url: &str, timestamp: Option<i64>) -> Result<String> {
    let credential = config
        .resolve_credential()
        .context("credentials are required to sign")?;
    let signer = UrlSigner::new(credential).with_token_form(config.token_form);

    let now = timestamp.map_or_else(Timestamp::now, Timestamp::from_secs);
    Ok(signer.sign(url, now))
}

/// Runs a search and renders the body.
pub async fn search(
    config: ClientConfig,
    params: Vec<(String, String)>,
    raw: bool,
    timeout: Option<u64>,
) -> Result<String> {
    let client = SearchClient::new(config).context("failed to create search client")?;
    let options = RequestOptions::builder()
        .timeout(timeout.map(Duration::from_secs))
        .build();

    let body = client
        .search_with(params, &options)
        .await
        .context("search request failed")?;

    if raw {
        return Ok(String::from_utf8_lossy(&body).into_owned());
    }

    let value = decode(&body).context("response is not valid JSON")?;
    Ok(serde_json::to_string_pretty(&value)?)
}
