//! CLI command implementations.

pub mod orders;
pub mod validate;
pub mod wikifolios;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;
use wikifolio_client::{PaperWikifolio, WikifolioClient};
use wikifolio_config::AppConfig;
use wikifolio_core::traits::WikifolioApi;
use wikifolio_core::types::{ClientConfig, Credentials};

/// Build the backend the commands run against.
pub fn backend(paper: bool, config: &AppConfig) -> Result<Box<dyn WikifolioApi>> {
    if paper {
        info!("Using the paper backend, nothing is sent upstream");
        return Ok(Box::new(PaperWikifolio::demo()));
    }

    let credentials =
        Credentials::from_env_vars(&config.api.client_api_key_env, &config.api.user_api_key_env)
            .context("Failed to load API credentials")?;
    let mut client_config = ClientConfig::new(credentials).with_base_url(&config.api.base_url);
    if let Some(timeout) = config.api.timeout() {
        client_config = client_config.with_timeout(timeout);
    }

    let client = WikifolioClient::new(client_config).context("Failed to create API client")?;
    Ok(Box::new(client))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
