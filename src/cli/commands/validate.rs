//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use wikifolio_config::load_config;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("API base URL: {}", config.api.base_url);
            match config.api.timeout_secs {
                Some(secs) => println!("Request timeout: {}s", secs),
                None => println!("Request timeout: none"),
            }
            for var in [&config.api.client_api_key_env, &config.api.user_api_key_env] {
                let state = if std::env::var_os(var).is_some() { "set" } else { "NOT SET" };
                println!("{}: {}", var, state);
            }
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
