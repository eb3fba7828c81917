//! Wikifolio read commands.

use anyhow::{Context, Result};
use wikifolio_core::traits::{WikifolioApi, WikifolioReader};

use super::print_json;
use crate::cli::OutputFormat;

pub async fn list(api: &dyn WikifolioApi, output: OutputFormat) -> Result<()> {
    let wikifolios = api
        .list_wikifolios()
        .await
        .context("Failed to list wikifolios")?;

    if output == OutputFormat::Json {
        return print_json(&wikifolios);
    }

    println!("Wikifolios ({})", wikifolios.len());
    for wikifolio in &wikifolios {
        println!(
            "  {:<16} {}",
            wikifolio.wikifolio_symbol.as_deref().unwrap_or("-"),
            wikifolio.resource_link.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

pub async fn show(api: &dyn WikifolioApi, symbol: &str, output: OutputFormat) -> Result<()> {
    let wikifolio = api
        .get_wikifolio(symbol)
        .await
        .with_context(|| format!("Failed to get wikifolio {}", symbol))?;

    if output == OutputFormat::Json {
        return print_json(&wikifolio);
    }

    let currency = wikifolio.base_currency.as_deref().unwrap_or("");
    println!("Wikifolio: {}", wikifolio.wikifolio_symbol.as_deref().unwrap_or(symbol));
    if let Some(status) = &wikifolio.wikifolio_status {
        println!("Status: {}", status);
    }
    println!("Total value: {} {}", wikifolio.total_value, currency);
    println!("Cash: {} {}", wikifolio.cash_account_current_balance, currency);
    if let (Some(bid), Some(ask)) = (wikifolio.bid_price, wikifolio.ask_price) {
        println!("Bid/Ask: {} / {}", bid, ask);
    }
    println!();
    println!("Positions ({})", wikifolio.positions.len());
    for position in &wikifolio.positions {
        let avg = position
            .average_purchase_price
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<14} qty {:>10}  avg {}",
            position.underlying.as_deref().unwrap_or("-"),
            position.quantity,
            avg
        );
    }
    Ok(())
}

pub async fn underlyings(api: &dyn WikifolioApi, symbol: &str, output: OutputFormat) -> Result<()> {
    let underlyings = api
        .list_wikifolio_underlyings(symbol)
        .await
        .with_context(|| format!("Failed to list underlyings for {}", symbol))?;

    if output == OutputFormat::Json {
        return print_json(&underlyings);
    }

    println!("Tradable underlyings for {} ({})", symbol, underlyings.len());
    println!("Note: this can be the whole tradable universe, not the current holdings.");
    for underlying in &underlyings {
        println!(
            "  {}  {}",
            underlying.isin,
            underlying.name.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
