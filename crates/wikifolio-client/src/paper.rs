//! Paper backend for offline use and tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;
use uuid::Uuid;
use wikifolio_core::error::WikifolioError;
use wikifolio_core::traits::{WikifolioReader, WikifolioTrader};
use wikifolio_core::types::{
    check_symbol, DeleteOutcome, LimitOrder, LimitOrderRequest, OrderId, OrderKind, OrderRecord,
    OrderStatus, QuoteOrderRequest, Side, Underlying, Wikifolio, WikifolioListItem,
};

#[derive(Debug, Clone)]
struct PaperOrder {
    kind: OrderKind,
    wikifolio: String,
    isin: String,
    quantity: u32,
    limit_price: Option<Decimal>,
    valid_until: Option<NaiveDate>,
    side: Side,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    status_at: DateTime<Utc>,
}

impl PaperOrder {
    fn record(&self, id: &OrderId) -> OrderRecord {
        OrderRecord {
            order_id: id.clone(),
            order_status: self.status,
            order_type: match self.kind {
                OrderKind::Limit => "Limit".to_string(),
                OrderKind::Quote => "Quote".to_string(),
            },
            amount: Decimal::from(self.quantity),
            creation_date: self.created_at.to_rfc3339(),
            wikifolio_symbol: Some(self.wikifolio.clone()),
            execution_price: None,
            status_date: Some(self.status_at.to_rfc3339()),
            reason: None,
            stop: None,
            limit: self.limit_price,
        }
    }
}

/// In-memory wikifolio backend.
///
/// Applies the same local validation as the HTTP client and keeps orders in
/// memory only. Like the live service, the underlyings listing answers with
/// the whole tradable universe.
#[derive(Clone, Default)]
pub struct PaperWikifolio {
    wikifolios: Arc<Mutex<Vec<Wikifolio>>>,
    universe: Arc<Mutex<Vec<Underlying>>>,
    orders: Arc<Mutex<HashMap<OrderId, PaperOrder>>>,
    order_sequence: Arc<Mutex<Vec<OrderId>>>,
}

impl PaperWikifolio {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend seeded with the `wf0spc2022` test wikifolio and a few stocks.
    pub fn demo() -> Self {
        let paper = Self::new();
        paper.add_wikifolio(Wikifolio {
            wikifolio_symbol: Some("wf0spc2022".to_string()),
            wikifolio_status: Some("Test".to_string()),
            cash_account_current_balance: Decimal::from(100_000),
            total_value: Decimal::from(100_000),
            bid_price: None,
            ask_price: None,
            price_date: None,
            base_currency: Some("EUR".to_string()),
            positions: Vec::new(),
        });
        for (isin, name) in [
            ("US0378331005", "Apple Inc."),
            ("US5949181045", "Microsoft Corp."),
            ("DE0007164600", "SAP SE"),
        ] {
            paper.add_underlying(Underlying {
                isin: isin.to_string(),
                name: Some(name.to_string()),
                security_type: Some("Stock".to_string()),
            });
        }
        paper
    }

    pub fn add_wikifolio(&self, wikifolio: Wikifolio) {
        lock(&self.wikifolios).push(wikifolio);
    }

    pub fn add_underlying(&self, underlying: Underlying) {
        lock(&self.universe).push(underlying);
    }

    /// Mark an open limit order as executed.
    pub fn execute_order(&self, order_id: &OrderId) -> Result<OrderStatus, WikifolioError> {
        let mut orders = lock(&self.orders);
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| WikifolioError::NotFound(order_id.to_string()))?;

        if !order.status.is_terminal() {
            order.status = OrderStatus::Executed;
            order.status_at = Utc::now();
        }
        Ok(order.status)
    }

    /// Mark every open limit order whose expiry is before `today` as obsolete.
    pub fn expire_orders(&self, today: NaiveDate) -> usize {
        let mut orders = lock(&self.orders);
        let now = Utc::now();
        let mut expired = 0;
        for order in orders.values_mut() {
            let lapsed = order.valid_until.map_or(false, |until| until < today);
            if lapsed && !order.status.is_terminal() {
                order.status = OrderStatus::Obsolete;
                order.status_at = now;
                expired += 1;
            }
        }
        expired
    }

    fn require_wikifolio(&self, symbol: &str) -> Result<Wikifolio, WikifolioError> {
        check_symbol(symbol)?;
        lock(&self.wikifolios)
            .iter()
            .find(|w| w.wikifolio_symbol.as_deref() == Some(symbol))
            .cloned()
            .ok_or_else(|| WikifolioError::NotFound(format!("wikifolio {}", symbol)))
    }

    fn require_tradable(&self, isin: &str) -> Result<(), WikifolioError> {
        if lock(&self.universe).iter().any(|u| u.isin == isin) {
            Ok(())
        } else {
            Err(WikifolioError::Upstream {
                status: 400,
                body: format!("underlying {} is not tradable", isin),
            })
        }
    }

    fn insert(&self, order: PaperOrder) -> OrderId {
        let id = OrderId::new(Uuid::new_v4().to_string());
        lock(&self.orders).insert(id.clone(), order);
        lock(&self.order_sequence).push(id.clone());
        id
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl WikifolioReader for PaperWikifolio {
    async fn list_wikifolios(&self) -> Result<Vec<WikifolioListItem>, WikifolioError> {
        Ok(lock(&self.wikifolios)
            .iter()
            .map(|w| WikifolioListItem {
                resource_link: w
                    .wikifolio_symbol
                    .as_ref()
                    .map(|symbol| format!("/wikifolios/{}", symbol)),
                wikifolio_symbol: w.wikifolio_symbol.clone(),
            })
            .collect())
    }

    async fn get_wikifolio(&self, symbol: &str) -> Result<Wikifolio, WikifolioError> {
        self.require_wikifolio(symbol)
    }

    async fn list_wikifolio_underlyings(
        &self,
        symbol: &str,
    ) -> Result<Vec<Underlying>, WikifolioError> {
        self.require_wikifolio(symbol)?;
        Ok(lock(&self.universe).clone())
    }

    async fn list_wikifolio_orders_with_status(
        &self,
        symbol: &str,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, WikifolioError> {
        self.require_wikifolio(symbol)?;
        let sequence = lock(&self.order_sequence).clone();
        let orders = lock(&self.orders);

        Ok(sequence
            .iter()
            .filter_map(|id| orders.get(id).map(|order| (id, order)))
            .filter(|(_, order)| order.wikifolio == symbol)
            .filter(|(_, order)| status.map_or(true, |s| order.status == s))
            .map(|(id, order)| order.record(id))
            .collect())
    }

    async fn get_limit_order(&self, order_id: &OrderId) -> Result<LimitOrder, WikifolioError> {
        order_id.validate()?;
        let orders = lock(&self.orders);
        let order = orders
            .get(order_id)
            .filter(|o| o.kind == OrderKind::Limit)
            .ok_or_else(|| WikifolioError::NotFound(format!("limit order {}", order_id)))?;

        match (order.limit_price, order.valid_until) {
            (Some(limit_price), Some(valid_until)) => Ok(LimitOrder {
                order_id: order_id.clone(),
                wikifolio_symbol: order.wikifolio.clone(),
                underlying_isin: order.isin.clone(),
                amount: order.quantity,
                limit_price,
                valid_until,
                buy_sell: order.side,
                order_status: order.status,
            }),
            _ => Err(WikifolioError::NotFound(format!("limit order {}", order_id))),
        }
    }
}

#[async_trait]
impl WikifolioTrader for PaperWikifolio {
    async fn place_limit_order(&self, request: LimitOrderRequest) -> Result<OrderId, WikifolioError> {
        request.validate()?;
        self.require_wikifolio(&request.wikifolio)?;
        self.require_tradable(&request.isin)?;

        let now = Utc::now();
        let id = self.insert(PaperOrder {
            kind: OrderKind::Limit,
            wikifolio: request.wikifolio.clone(),
            isin: request.isin.clone(),
            quantity: request.quantity,
            limit_price: Some(request.limit_price),
            valid_until: Some(request.valid_until),
            side: request.side,
            status: OrderStatus::Active,
            created_at: now,
            status_at: now,
        });
        info!(
            "Paper limit order placed: {} {} {} @ {} ({})",
            request.side, request.quantity, request.isin, request.limit_price, id
        );
        Ok(id)
    }

    async fn delete_limit_order(&self, order_id: &OrderId) -> Result<DeleteOutcome, WikifolioError> {
        order_id.validate()?;
        let mut orders = lock(&self.orders);
        let order = orders
            .get_mut(order_id)
            .filter(|o| o.kind == OrderKind::Limit)
            .ok_or_else(|| WikifolioError::NotFound(format!("limit order {}", order_id)))?;

        if order.status.is_terminal() {
            return Ok(DeleteOutcome::AlreadyResolved);
        }
        order.status = OrderStatus::Deleted;
        order.status_at = Utc::now();
        info!("Paper limit order deleted: {}", order_id);
        Ok(DeleteOutcome::Deleted)
    }

    async fn place_quote_order(&self, request: QuoteOrderRequest) -> Result<OrderId, WikifolioError> {
        request.validate()?;
        self.require_wikifolio(&request.wikifolio)?;
        self.require_tradable(&request.isin)?;

        let now = Utc::now();
        let id = self.insert(PaperOrder {
            kind: OrderKind::Quote,
            wikifolio: request.wikifolio.clone(),
            isin: request.isin.clone(),
            quantity: request.quantity,
            limit_price: None,
            valid_until: None,
            side: request.side,
            status: OrderStatus::Executed,
            created_at: now,
            status_at: now,
        });
        info!(
            "Paper quote order executed: {} {} {} ({})",
            request.side, request.quantity, request.isin, id
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const WF: &str = "wf0spc2022";
    const APPLE: &str = "US0378331005";

    fn tomorrow() -> NaiveDate {
        Utc::now().date_naive().succ_opt().unwrap()
    }

    #[tokio::test]
    async fn test_demo_lists_test_wikifolio() {
        let paper = PaperWikifolio::demo();
        let wikifolios = paper.list_wikifolios().await.unwrap();
        assert!(wikifolios
            .iter()
            .any(|w| w.wikifolio_symbol.as_deref() == Some(WF)));
    }

    #[tokio::test]
    async fn test_limit_order_round_trip() {
        let paper = PaperWikifolio::demo();
        let request = LimitOrderRequest::new(WF, APPLE, 1, dec!(150.0), tomorrow(), Side::Buy);
        let order_id = paper.place_limit_order(request).await.unwrap();
        assert!(!order_id.as_str().is_empty());

        let order = paper.get_limit_order(&order_id).await.unwrap();
        assert_eq!(order.wikifolio_symbol, WF);
        assert_eq!(order.underlying_isin, APPLE);
        assert_eq!(order.amount, 1);
        assert_eq!(order.limit_price, dec!(150.0));
        assert_eq!(order.buy_sell, Side::Buy);
        assert_eq!(order.order_status, OrderStatus::Active);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let paper = PaperWikifolio::demo();
        let request = LimitOrderRequest::new(WF, APPLE, 2, dec!(140), tomorrow(), Side::Sell);
        let order_id = paper.place_limit_order(request).await.unwrap();

        assert_eq!(
            paper.delete_limit_order(&order_id).await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert_eq!(
            paper.delete_limit_order(&order_id).await.unwrap(),
            DeleteOutcome::AlreadyResolved
        );
        assert!(matches!(
            paper.delete_limit_order(&OrderId::new("missing")).await,
            Err(WikifolioError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_executed_order_cannot_be_deleted() {
        let paper = PaperWikifolio::demo();
        let request = LimitOrderRequest::new(WF, APPLE, 1, dec!(150), tomorrow(), Side::Buy);
        let order_id = paper.place_limit_order(request).await.unwrap();

        assert_eq!(paper.execute_order(&order_id).unwrap(), OrderStatus::Executed);
        assert_eq!(
            paper.delete_limit_order(&order_id).await.unwrap(),
            DeleteOutcome::AlreadyResolved
        );
    }

    #[tokio::test]
    async fn test_quote_order_is_not_a_limit_order() {
        let paper = PaperWikifolio::demo();
        let order_id = paper
            .place_quote_order(QuoteOrderRequest::new(WF, APPLE, 1, Side::Buy))
            .await
            .unwrap();

        assert!(matches!(
            paper.get_limit_order(&order_id).await,
            Err(WikifolioError::NotFound(_))
        ));
        let orders = paper.list_wikifolio_orders(WF).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_type, "Quote");
        assert_eq!(orders[0].order_status, OrderStatus::Executed);
    }

    #[tokio::test]
    async fn test_orders_listed_in_placement_order_and_filtered() {
        let paper = PaperWikifolio::demo();
        let first = paper
            .place_limit_order(LimitOrderRequest::new(WF, APPLE, 1, dec!(150), tomorrow(), Side::Buy))
            .await
            .unwrap();
        let second = paper
            .place_quote_order(QuoteOrderRequest::new(WF, "DE0007164600", 3, Side::Buy))
            .await
            .unwrap();

        let all = paper.list_wikifolio_orders(WF).await.unwrap();
        let ids: Vec<_> = all.iter().map(|o| o.order_id.clone()).collect();
        assert_eq!(ids, vec![first.clone(), second]);

        let active = paper
            .list_wikifolio_orders_with_status(WF, Some(OrderStatus::Active))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].order_id, first);
    }

    #[tokio::test]
    async fn test_expired_orders_become_obsolete() {
        let paper = PaperWikifolio::demo();
        let today = Utc::now().date_naive();
        let order_id = paper
            .place_limit_order(LimitOrderRequest::new(WF, APPLE, 1, dec!(150), today, Side::Buy))
            .await
            .unwrap();

        assert_eq!(paper.expire_orders(today), 0);
        assert_eq!(paper.expire_orders(today.succ_opt().unwrap()), 1);
        let order = paper.get_limit_order(&order_id).await.unwrap();
        assert_eq!(order.order_status, OrderStatus::Obsolete);
    }

    #[tokio::test]
    async fn test_blank_identifiers_rejected_like_the_live_client() {
        let paper = PaperWikifolio::demo();
        assert!(matches!(
            paper.get_wikifolio("").await,
            Err(WikifolioError::Validation(_))
        ));
        assert!(matches!(
            paper.list_wikifolio_orders(" ").await,
            Err(WikifolioError::Validation(_))
        ));
        assert!(matches!(
            paper.delete_limit_order(&OrderId::new("")).await,
            Err(WikifolioError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_rejections() {
        let paper = PaperWikifolio::demo();
        assert!(matches!(
            paper.get_wikifolio("wfunknown").await,
            Err(WikifolioError::NotFound(_))
        ));
        assert!(matches!(
            paper
                .place_quote_order(QuoteOrderRequest::new(WF, "XS0000000000", 1, Side::Buy))
                .await,
            Err(WikifolioError::Upstream { status: 400, .. })
        ));
        assert!(matches!(
            paper
                .place_quote_order(QuoteOrderRequest::new(WF, APPLE, 0, Side::Buy))
                .await,
            Err(WikifolioError::Validation(_))
        ));
    }
}
