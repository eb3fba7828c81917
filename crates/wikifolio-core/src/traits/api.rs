//! Read and write capability traits.

use crate::error::WikifolioError;
use crate::types::{
    DeleteOutcome, LimitOrder, LimitOrderRequest, OrderId, OrderRecord, OrderStatus,
    QuoteOrderRequest, Underlying, Wikifolio, WikifolioListItem,
};
use async_trait::async_trait;

/// Read operations against the trading API.
///
/// Every call is a point-in-time snapshot; nothing is cached and repeating a
/// read has no side effect.
#[async_trait]
pub trait WikifolioReader: Send + Sync {
    /// List the wikifolios the user key can trade, in upstream order.
    async fn list_wikifolios(&self) -> Result<Vec<WikifolioListItem>, WikifolioError>;

    /// Get the detail record of a wikifolio.
    ///
    /// # Arguments
    /// * `symbol` - Wikifolio symbol, e.g. `wf0spc2022`
    async fn get_wikifolio(&self, symbol: &str) -> Result<Wikifolio, WikifolioError>;

    /// List the securities tradable in a wikifolio.
    ///
    /// The upstream may answer with the whole tradable universe instead of
    /// the wikifolio's holdings. The result is returned as received and must
    /// not be read as the current positions.
    async fn list_wikifolio_underlyings(
        &self,
        symbol: &str,
    ) -> Result<Vec<Underlying>, WikifolioError>;

    /// List a wikifolio's orders, optionally restricted to one status.
    async fn list_wikifolio_orders_with_status(
        &self,
        symbol: &str,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, WikifolioError>;

    /// List all of a wikifolio's orders, open and historical.
    async fn list_wikifolio_orders(&self, symbol: &str) -> Result<Vec<OrderRecord>, WikifolioError> {
        self.list_wikifolio_orders_with_status(symbol, None).await
    }

    /// Get a limit order by id.
    ///
    /// Fails with `NotFound` if the id is unknown or not a limit order.
    async fn get_limit_order(&self, order_id: &OrderId) -> Result<LimitOrder, WikifolioError>;
}

/// Write operations against the trading API.
///
/// Each call is sent exactly once. Requests are validated locally first, so
/// a `Validation` error means nothing reached the network.
#[async_trait]
pub trait WikifolioTrader: Send + Sync {
    /// Place a limit order.
    ///
    /// # Returns
    /// The id assigned by the upstream system
    async fn place_limit_order(&self, request: LimitOrderRequest) -> Result<OrderId, WikifolioError>;

    /// Delete an open limit order.
    ///
    /// An order that was already executed, expired or deleted yields
    /// `DeleteOutcome::AlreadyResolved` or `NotFound`, depending on what the
    /// backend still knows about it.
    async fn delete_limit_order(&self, order_id: &OrderId) -> Result<DeleteOutcome, WikifolioError>;

    /// Place a quote order, executed at the current market quote.
    async fn place_quote_order(&self, request: QuoteOrderRequest) -> Result<OrderId, WikifolioError>;
}

/// Full read and write capability.
pub trait WikifolioApi: WikifolioReader + WikifolioTrader {}

impl<T: WikifolioReader + WikifolioTrader> WikifolioApi for T {}
