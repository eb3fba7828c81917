//! Order commands.

use anyhow::{Context, Result};
use serde_json::json;
use wikifolio_core::traits::{WikifolioApi, WikifolioReader, WikifolioTrader};
use wikifolio_core::types::{LimitOrderRequest, OrderId, OrderStatus, QuoteOrderRequest};

use super::print_json;
use crate::cli::{LimitOrderArgs, OutputFormat, QuoteOrderArgs};

pub async fn list(
    api: &dyn WikifolioApi,
    symbol: &str,
    status: Option<OrderStatus>,
    output: OutputFormat,
) -> Result<()> {
    let orders = api
        .list_wikifolio_orders_with_status(symbol, status)
        .await
        .with_context(|| format!("Failed to list orders for {}", symbol))?;

    if output == OutputFormat::Json {
        return print_json(&orders);
    }

    println!("Orders for {} ({})", symbol, orders.len());
    for order in &orders {
        let price = order
            .execution_price
            .or(order.limit)
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}  {:<10} {:<26} qty {:>8}  price {:>10}  {}",
            order.order_id,
            order.order_type,
            order.order_status,
            order.amount,
            price,
            order.creation_date
        );
    }
    Ok(())
}

pub async fn place_limit(api: &dyn WikifolioApi, args: LimitOrderArgs, output: OutputFormat) -> Result<()> {
    let request = LimitOrderRequest::new(
        args.wikifolio,
        args.isin,
        args.quantity,
        args.price,
        args.valid_until,
        args.side,
    );
    let order_id = api
        .place_limit_order(request)
        .await
        .context("Failed to place limit order")?;
    print_order_id(&order_id, output)
}

pub async fn show_limit(api: &dyn WikifolioApi, order_id: &str, output: OutputFormat) -> Result<()> {
    let order = api
        .get_limit_order(&OrderId::from(order_id))
        .await
        .with_context(|| format!("Failed to get limit order {}", order_id))?;

    if output == OutputFormat::Json {
        return print_json(&order);
    }

    println!("Limit order: {}", order.order_id);
    println!("Wikifolio: {}", order.wikifolio_symbol);
    println!("Underlying: {}", order.underlying_isin);
    println!("Side: {}", order.buy_sell);
    println!("Quantity: {}", order.amount);
    println!("Limit: {}", order.limit_price);
    println!("Valid until: {}", order.valid_until);
    println!("Status: {}", order.order_status);
    Ok(())
}

pub async fn delete_limit(api: &dyn WikifolioApi, order_id: &str, output: OutputFormat) -> Result<()> {
    let order_id = OrderId::from(order_id);
    let outcome = api
        .delete_limit_order(&order_id)
        .await
        .with_context(|| format!("Failed to delete limit order {}", order_id))?;

    if output == OutputFormat::Json {
        return print_json(&json!({"orderId": order_id, "outcome": outcome}));
    }
    println!("Limit order {}: {}", order_id, outcome);
    Ok(())
}

pub async fn place_quote(api: &dyn WikifolioApi, args: QuoteOrderArgs, output: OutputFormat) -> Result<()> {
    let request = QuoteOrderRequest::new(args.wikifolio, args.isin, args.quantity, args.side);
    let order_id = api
        .place_quote_order(request)
        .await
        .context("Failed to place quote order")?;
    print_order_id(&order_id, output)
}

fn print_order_id(order_id: &OrderId, output: OutputFormat) -> Result<()> {
    if output == OutputFormat::Json {
        return print_json(&json!({"orderId": order_id}));
    }
    println!("Order placed: {}", order_id);
    Ok(())
}
