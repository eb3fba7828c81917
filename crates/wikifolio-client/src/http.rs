//! HTTP client for the wikifolio trading API.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode, Url};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use wikifolio_core::error::WikifolioError;
use wikifolio_core::traits::{WikifolioReader, WikifolioTrader};
use wikifolio_core::types::{
    check_symbol, ClientConfig, Credentials, DeleteOutcome, LimitOrder, LimitOrderRequest, OrderId,
    OrderRecord, OrderStatus, QuoteOrderRequest, Side, Underlying, Wikifolio, WikifolioListItem,
};

const SESSION_HEADER: &str = "sessionToken";
const CLIENT_KEY_HEADER: &str = "clientApiKey";
const USER_KEY_HEADER: &str = "userApiKey";

/// wikifolio API response types
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    session_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacedOrder {
    order_id: OrderId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaceLimitOrderBody<'a> {
    underlying_isin: &'a str,
    amount: u32,
    #[serde(with = "rust_decimal::serde::float")]
    limit_price: Decimal,
    valid_until: NaiveDate,
    buy_sell: Side,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaceQuoteOrderBody<'a> {
    underlying_isin: &'a str,
    amount: u32,
    buy_sell: Side,
}

/// wikifolio trading API client.
///
/// Holds the immutable config and the session token obtained with the two
/// API keys. The token is fetched on first use and dropped when the upstream
/// rejects it; the rejected call is reported, never repeated.
pub struct WikifolioClient {
    config: ClientConfig,
    base: Url,
    client: Client,
    session: RwLock<Option<String>>,
}

impl WikifolioClient {
    /// Create a client. No request is made until the first operation.
    pub fn new(config: ClientConfig) -> Result<Self, WikifolioError> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            WikifolioError::Configuration(format!("invalid base URL {:?}: {}", config.base_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(WikifolioError::Configuration(format!(
                "base URL cannot carry a path: {}",
                config.base_url
            )));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| WikifolioError::Configuration(e.to_string()))?;

        Ok(Self {
            config,
            base,
            client,
            session: RwLock::new(None),
        })
    }

    /// Create a production client from the two keys.
    pub fn with_keys(
        client_api_key: impl Into<String>,
        user_api_key: impl Into<String>,
    ) -> Result<Self, WikifolioError> {
        let credentials = Credentials::new(client_api_key, user_api_key)?;
        Self::new(ClientConfig::new(credentials))
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self, WikifolioError> {
        Self::new(ClientConfig::new(Credentials::from_env()?))
    }

    /// Create a client and open its session right away.
    pub async fn connect(config: ClientConfig) -> Result<Self, WikifolioError> {
        let client = Self::new(config)?;
        client.session_token().await?;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// `{base}/{segments..}` with every segment percent-encoded, so an
    /// identifier containing `/`, `?` or `#` stays a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, WikifolioError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                WikifolioError::Configuration(format!("base URL cannot carry a path: {}", self.base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn open_session(&self) -> Result<String, WikifolioError> {
        let credentials = &self.config.credentials;
        info!("Getting session token");

        let resp = self
            .client
            .post(self.endpoint(&["sessions"])?)
            .header(CLIENT_KEY_HEADER, credentials.client_api_key())
            .header(USER_KEY_HEADER, credentials.user_api_key())
            .send()
            .await
            .map_err(network)?;

        let resp = check_status(resp).await?;
        let session: SessionResponse = decode(resp).await?;
        if session.session_token.is_empty() {
            return Err(WikifolioError::Decode("empty session token".into()));
        }
        Ok(session.session_token)
    }

    async fn session_token(&self) -> Result<String, WikifolioError> {
        {
            let cached = self.session.read().await;
            if let Some(token) = cached.as_ref() {
                return Ok(token.clone());
            }
        }

        let mut guard = self.session.write().await;
        // Another caller may have logged in while we waited for the lock.
        if let Some(token) = guard.as_ref() {
            return Ok(token.clone());
        }
        let token = self.open_session().await?;
        *guard = Some(token.clone());
        Ok(token)
    }

    async fn invalidate_session(&self, stale: &str) {
        let mut guard = self.session.write().await;
        if guard.as_deref() == Some(stale) {
            *guard = None;
        }
    }

    /// Send with the session token attached.
    async fn send(&self, request: RequestBuilder) -> Result<Response, WikifolioError> {
        let token = self.session_token().await?;
        let resp = request
            .header(SESSION_HEADER, &token)
            .send()
            .await
            .map_err(network)?;

        if matches!(resp.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            warn!("Session rejected with {}, next call opens a new one", resp.status());
            self.invalidate_session(&token).await;
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, WikifolioError> {
        let resp = self.send(self.client.get(url).query(query)).await?;
        let resp = check_status(resp).await?;
        decode(resp).await
    }

    /// Fetch page 1 and every following page, keeping upstream order.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: Url,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, WikifolioError> {
        let mut items = Vec::new();
        let mut page_number: u32 = 1;

        loop {
            let mut query = vec![("pageNumber", page_number.to_string())];
            query.extend(filters.iter().cloned());

            let page: Page<T> = self.get_json(url.clone(), &query).await?;
            debug!(
                "{}: page {} of {}, {} results",
                url.path(),
                page_number,
                page.total_pages,
                page.results.len()
            );
            items.extend(page.results);

            if page_number >= page.total_pages {
                break;
            }
            page_number += 1;
        }

        Ok(items)
    }

    async fn place<B: Serialize>(&self, url: Url, body: &B) -> Result<OrderId, WikifolioError> {
        let resp = self.send(self.client.post(url).json(body)).await?;
        let resp = check_status(resp).await?;
        let placed: PlacedOrder = decode(resp).await?;
        if placed.order_id.as_str().is_empty() {
            return Err(WikifolioError::Decode("empty order id".into()));
        }
        Ok(placed.order_id)
    }
}

fn network(e: reqwest::Error) -> WikifolioError {
    WikifolioError::Network(e.to_string())
}

async fn check_status(resp: Response) -> Result<Response, WikifolioError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let path = resp.url().path().to_string();
    let body = error_body(status, &path, resp.text().await);
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => WikifolioError::Authentication {
            status: status.as_u16(),
            body,
        },
        StatusCode::NOT_FOUND if body.is_empty() => WikifolioError::NotFound(path),
        StatusCode::NOT_FOUND => WikifolioError::NotFound(format!("{}: {}", path, body)),
        _ => WikifolioError::Upstream {
            status: status.as_u16(),
            body,
        },
    })
}

/// Body of an error response. A failed read is logged and described in
/// place of the body so the status still reaches the caller.
fn error_body(status: StatusCode, path: &str, body: Result<String, reqwest::Error>) -> String {
    match body {
        Ok(body) => body,
        Err(e) => {
            warn!("Could not read {} response body from {}: {}", status, path, e);
            format!("<unreadable response body: {}>", e)
        }
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, WikifolioError> {
    let text = resp.text().await.map_err(network)?;
    serde_json::from_str(&text).map_err(|e| WikifolioError::Decode(format!("{}: {}", e, text)))
}

#[async_trait]
impl WikifolioReader for WikifolioClient {
    async fn list_wikifolios(&self) -> Result<Vec<WikifolioListItem>, WikifolioError> {
        info!("Getting wikifolios");
        let url = self.endpoint(&["wikifolios"])?;
        let wikifolios: Vec<WikifolioListItem> = self.get_all_pages(url, &[]).await?;
        info!("Found {} wikifolios", wikifolios.len());
        Ok(wikifolios)
    }

    async fn get_wikifolio(&self, symbol: &str) -> Result<Wikifolio, WikifolioError> {
        check_symbol(symbol)?;
        info!("Getting wikifolio {}", symbol);
        self.get_json(self.endpoint(&["wikifolios", symbol])?, &[]).await
    }

    async fn list_wikifolio_underlyings(
        &self,
        symbol: &str,
    ) -> Result<Vec<Underlying>, WikifolioError> {
        check_symbol(symbol)?;
        info!("Getting underlyings for {}", symbol);
        let url = self.endpoint(&["wikifolios", symbol, "underlyings"])?;
        let underlyings: Vec<Underlying> = self.get_all_pages(url, &[]).await?;
        info!("Found {} underlyings for {}", underlyings.len(), symbol);
        Ok(underlyings)
    }

    async fn list_wikifolio_orders_with_status(
        &self,
        symbol: &str,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, WikifolioError> {
        check_symbol(symbol)?;
        let filters = match status {
            Some(OrderStatus::Unknown) => {
                return Err(WikifolioError::Validation(
                    "cannot filter orders by an unknown status".into(),
                ))
            }
            Some(status) => {
                debug!("Filtering orders by status: {}", status);
                vec![("status", status.as_str().to_string())]
            }
            None => Vec::new(),
        };

        info!("Getting orders for {}", symbol);
        let url = self.endpoint(&["wikifolios", symbol, "orders"])?;
        let orders: Vec<OrderRecord> = self.get_all_pages(url, &filters).await?;
        info!("Found {} orders for {}", orders.len(), symbol);
        Ok(orders)
    }

    async fn get_limit_order(&self, order_id: &OrderId) -> Result<LimitOrder, WikifolioError> {
        order_id.validate()?;
        info!("Getting limit order {}", order_id);
        let url = self.endpoint(&["orders", "limit", order_id.as_str()])?;
        self.get_json(url, &[]).await
    }
}

#[async_trait]
impl WikifolioTrader for WikifolioClient {
    async fn place_limit_order(&self, request: LimitOrderRequest) -> Result<OrderId, WikifolioError> {
        request.validate()?;

        let body = PlaceLimitOrderBody {
            underlying_isin: &request.isin,
            amount: request.quantity,
            limit_price: request.limit_price,
            valid_until: request.valid_until,
            buy_sell: request.side,
        };
        debug!("Submitting limit order: {:?}", body);

        let url = self.endpoint(&["wikifolios", request.wikifolio.as_str(), "orders", "limit"])?;
        let order_id = self.place(url, &body).await?;
        info!(
            "Limit order placed: {} {} {} @ {} until {} in {} ({})",
            request.side,
            request.quantity,
            request.isin,
            request.limit_price,
            request.valid_until,
            request.wikifolio,
            order_id
        );
        Ok(order_id)
    }

    async fn delete_limit_order(&self, order_id: &OrderId) -> Result<DeleteOutcome, WikifolioError> {
        order_id.validate()?;
        let url = self.endpoint(&["orders", "limit", order_id.as_str()])?;
        let resp = self.send(self.client.delete(url)).await?;

        match resp.status() {
            StatusCode::CONFLICT | StatusCode::GONE => {
                info!("Limit order {} already resolved", order_id);
                Ok(DeleteOutcome::AlreadyResolved)
            }
            _ => {
                check_status(resp).await?;
                info!("Limit order deleted: {}", order_id);
                Ok(DeleteOutcome::Deleted)
            }
        }
    }

    async fn place_quote_order(&self, request: QuoteOrderRequest) -> Result<OrderId, WikifolioError> {
        request.validate()?;

        let body = PlaceQuoteOrderBody {
            underlying_isin: &request.isin,
            amount: request.quantity,
            buy_sell: request.side,
        };
        debug!("Submitting quote order: {:?}", body);

        let url = self.endpoint(&["wikifolios", request.wikifolio.as_str(), "orders", "quote"])?;
        let order_id = self.place(url, &body).await?;
        info!(
            "Quote order placed: {} {} {} in {} ({})",
            request.side, request.quantity, request.isin, request.wikifolio, order_id
        );
        Ok(order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{any, body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const WF: &str = "wf0spc2022";
    const APPLE: &str = "US0378331005";

    async fn mock_session(server: &MockServer, expected_logins: u64) {
        Mock::given(method("POST"))
            .and(path("/sessions"))
            .and(header("clientApiKey", "client-key"))
            .and(header("userApiKey", "user-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sessionToken": "token-1"})))
            .expect(expected_logins)
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> WikifolioClient {
        let credentials = Credentials::new("client-key", "user-key").unwrap();
        WikifolioClient::new(ClientConfig::new(credentials).with_base_url(server.uri())).unwrap()
    }

    fn tomorrow() -> NaiveDate {
        Utc::now().date_naive().succ_opt().unwrap()
    }

    fn detail_json() -> serde_json::Value {
        json!({
            "wikifolioSymbol": WF,
            "cashAccountCurrentBalance": 1000.0,
            "totalValue": 2500.0,
            "positions": [{"quantity": 10, "underlying": APPLE}]
        })
    }

    #[test]
    fn test_construct_with_empty_key_fails() {
        assert!(matches!(
            WikifolioClient::with_keys("", "user-key"),
            Err(WikifolioError::Configuration(_))
        ));
        assert!(matches!(
            WikifolioClient::with_keys("client-key", ""),
            Err(WikifolioError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_list_wikifolios_follows_pages() {
        let server = MockServer::start().await;
        mock_session(&server, 1).await;

        Mock::given(method("GET"))
            .and(path("/wikifolios"))
            .and(query_param("pageNumber", "1"))
            .and(header("sessionToken", "token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pageNumber": 1,
                "totalPages": 2,
                "results": [{"wikifolioSymbol": "wfalpha001", "resourceLink": "/wikifolios/wfalpha001"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wikifolios"))
            .and(query_param("pageNumber", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pageNumber": 2,
                "totalPages": 2,
                "results": [{"wikifolioSymbol": WF}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let wikifolios = client.list_wikifolios().await.unwrap();

        let symbols: Vec<_> = wikifolios
            .iter()
            .filter_map(|w| w.wikifolio_symbol.as_deref())
            .collect();
        assert_eq!(symbols, vec!["wfalpha001", WF]);
        assert_eq!(wikifolios[1].resource_link, None);
    }

    #[tokio::test]
    async fn test_session_is_reused_between_calls() {
        let server = MockServer::start().await;
        mock_session(&server, 1).await;

        Mock::given(method("GET"))
            .and(path(format!("/wikifolios/{}", WF)))
            .and(header("sessionToken", "token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_json()))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let first = client.get_wikifolio(WF).await.unwrap();
        let second = client.get_wikifolio(WF).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total_value, dec!(2500));
    }

    #[tokio::test]
    async fn test_rejected_session_is_reopened_on_next_call() {
        let server = MockServer::start().await;
        mock_session(&server, 2).await;

        Mock::given(method("GET"))
            .and(path(format!("/wikifolios/{}", WF)))
            .respond_with(ResponseTemplate::new(401).set_body_string("session expired"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/wikifolios/{}", WF)))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_json()))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_wikifolio(WF).await.unwrap_err();
        assert_eq!(
            err,
            WikifolioError::Authentication {
                status: 401,
                body: "session expired".into()
            }
        );

        let wikifolio = client.get_wikifolio(WF).await.unwrap();
        assert_eq!(wikifolio.wikifolio_symbol.as_deref(), Some(WF));
    }

    #[tokio::test]
    async fn test_invalid_keys_fail_with_authentication() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions"))
            .respond_with(ResponseTemplate::new(403).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.list_wikifolios().await.unwrap_err();
        assert!(matches!(err, WikifolioError::Authentication { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_unknown_wikifolio_is_not_found() {
        let server = MockServer::start().await;
        mock_session(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/wikifolios/wfnothere"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_wikifolio("wfnothere").await.unwrap_err();
        assert!(matches!(err, WikifolioError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_upstream_error_body_is_verbatim() {
        let server = MockServer::start().await;
        mock_session(&server, 1).await;
        let body = r#"{"code":"MarketClosed","message":"Exchange closed"}"#;
        Mock::given(method("POST"))
            .and(path(format!("/wikifolios/{}/orders/quote", WF)))
            .respond_with(ResponseTemplate::new(422).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .place_quote_order(QuoteOrderRequest::new(WF, APPLE, 1, Side::Buy))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            WikifolioError::Upstream {
                status: 422,
                body: body.to_string()
            }
        );
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_invalid_orders_never_reach_the_network() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let yesterday = Utc::now().date_naive().pred_opt().unwrap();

        let invalid = [
            LimitOrderRequest::new(WF, APPLE, 0, dec!(150.0), tomorrow(), Side::Buy),
            LimitOrderRequest::new(WF, APPLE, 1, dec!(0), tomorrow(), Side::Buy),
            LimitOrderRequest::new(WF, APPLE, 1, dec!(150.0), yesterday, Side::Sell),
        ];
        for request in invalid {
            let err = client.place_limit_order(request).await.unwrap_err();
            assert!(matches!(err, WikifolioError::Validation(_)));
        }

        let err = client
            .place_quote_order(QuoteOrderRequest::new(WF, APPLE, 0, Side::Buy))
            .await
            .unwrap_err();
        assert!(matches!(err, WikifolioError::Validation(_)));
    }

    #[tokio::test]
    async fn test_place_then_get_limit_order() {
        let server = MockServer::start().await;
        mock_session(&server, 1).await;
        let valid_until = tomorrow().format("%Y-%m-%d").to_string();

        Mock::given(method("POST"))
            .and(path(format!("/wikifolios/{}/orders/limit", WF)))
            .and(header("sessionToken", "token-1"))
            .and(body_partial_json(json!({
                "underlyingIsin": APPLE,
                "amount": 1,
                "limitPrice": 150.0,
                "validUntil": valid_until,
                "buySell": "buy"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"orderId": "lo-1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/orders/limit/lo-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "orderId": "lo-1",
                "wikifolioSymbol": WF,
                "underlyingIsin": APPLE,
                "amount": 1,
                "limitPrice": 150.0,
                "validUntil": valid_until,
                "buySell": "buy",
                "orderStatus": "Active"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = LimitOrderRequest::new(WF, APPLE, 1, dec!(150.0), tomorrow(), Side::Buy);
        let order_id = client.place_limit_order(request).await.unwrap();
        assert_eq!(order_id.as_str(), "lo-1");

        let order = client.get_limit_order(&order_id).await.unwrap();
        assert_eq!(order.wikifolio_symbol, WF);
        assert_eq!(order.underlying_isin, APPLE);
        assert_eq!(order.amount, 1);
        assert_eq!(order.limit_price, dec!(150.0));
        assert_eq!(order.valid_until, tomorrow());
        assert_eq!(order.buy_sell, Side::Buy);
        assert_eq!(order.order_status, OrderStatus::Active);
    }

    #[tokio::test]
    async fn test_delete_twice_reports_already_resolved() {
        let server = MockServer::start().await;
        mock_session(&server, 1).await;

        Mock::given(method("DELETE"))
            .and(path("/orders/limit/lo-1"))
            .respond_with(ResponseTemplate::new(204))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/orders/limit/lo-1"))
            .respond_with(ResponseTemplate::new(409).set_body_string("order already deleted"))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/orders/limit/lo-unknown"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let order_id = OrderId::new("lo-1");
        assert_eq!(
            client.delete_limit_order(&order_id).await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert_eq!(
            client.delete_limit_order(&order_id).await.unwrap(),
            DeleteOutcome::AlreadyResolved
        );

        let err = client
            .delete_limit_order(&OrderId::new("lo-unknown"))
            .await
            .unwrap_err();
        assert!(matches!(err, WikifolioError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_quote_order_sends_no_price_or_expiry() {
        let server = MockServer::start().await;
        mock_session(&server, 1).await;
        Mock::given(method("POST"))
            .and(path(format!("/wikifolios/{}/orders/quote", WF)))
            .and(body_partial_json(json!({"underlyingIsin": APPLE, "amount": 1, "buySell": "buy"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"orderId": "qo-7"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let order_id = client
            .place_quote_order(QuoteOrderRequest::new(WF, APPLE, 1, Side::Buy))
            .await
            .unwrap();
        assert_eq!(order_id.as_str(), "qo-7");

        let requests = server.received_requests().await.unwrap();
        let placed = requests
            .iter()
            .find(|r| r.url.path().ends_with("/orders/quote"))
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&placed.body).unwrap();
        assert!(body.get("limitPrice").is_none());
        assert!(body.get("validUntil").is_none());
    }

    #[tokio::test]
    async fn test_underlyings_are_returned_unfiltered() {
        let server = MockServer::start().await;
        mock_session(&server, 1).await;
        Mock::given(method("GET"))
            .and(path(format!("/wikifolios/{}/underlyings", WF)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pageNumber": 1,
                "totalPages": 1,
                "results": [
                    {"isin": APPLE, "name": "Apple Inc."},
                    {"isin": "US5949181045", "name": "Microsoft Corp."},
                    {"isin": "DE0007164600", "name": "SAP SE"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/wikifolios/{}", WF)))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_json()))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let underlyings = client.list_wikifolio_underlyings(WF).await.unwrap();
        let wikifolio = client.get_wikifolio(WF).await.unwrap();

        // More underlyings than holdings: the universe, not the positions.
        assert_eq!(underlyings.len(), 3);
        assert_eq!(wikifolio.positions.len(), 1);
    }

    #[tokio::test]
    async fn test_orders_status_filter_is_sent() {
        let server = MockServer::start().await;
        mock_session(&server, 1).await;
        Mock::given(method("GET"))
            .and(path(format!("/wikifolios/{}/orders", WF)))
            .and(query_param("pageNumber", "1"))
            .and(query_param("status", "Active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pageNumber": 1,
                "totalPages": 1,
                "results": [{
                    "orderId": "lo-1",
                    "orderStatus": "Active",
                    "orderType": "Limit",
                    "amount": 1,
                    "creationDate": "2026-10-14T08:00:00Z",
                    "limit": 150.0
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let orders = client
            .list_wikifolio_orders_with_status(WF, Some(OrderStatus::Active))
            .await
            .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_status, OrderStatus::Active);
        assert_eq!(orders[0].limit, Some(dec!(150)));

        let err = client
            .list_wikifolio_orders_with_status(WF, Some(OrderStatus::Unknown))
            .await
            .unwrap_err();
        assert!(matches!(err, WikifolioError::Validation(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.list_wikifolios().await.unwrap_err();
        assert!(matches!(err, WikifolioError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let credentials = Credentials::new("client-key", "user-key").unwrap();
        let client =
            WikifolioClient::new(ClientConfig::new(credentials).with_base_url("http://127.0.0.1:1"))
                .unwrap();
        let err = client.list_wikifolios().await.unwrap_err();
        assert!(matches!(err, WikifolioError::Network(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_order_id_is_one_encoded_path_segment() {
        let server = MockServer::start().await;
        mock_session(&server, 1).await;
        Mock::given(method("DELETE"))
            .and(path("/orders/limit/lo-1%23frag%3Fq%2Fx"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/orders/limit/lo-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let outcome = client
            .delete_limit_order(&OrderId::new("lo-1#frag?q/x"))
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);

        let requests = server.received_requests().await.unwrap();
        let deletes: Vec<_> = requests.iter().filter(|r| r.method.as_str() == "DELETE").collect();
        assert_eq!(deletes.len(), 1);
        assert_eq!(deletes[0].url.query(), None);
        assert_eq!(deletes[0].url.fragment(), None);
    }

    #[tokio::test]
    async fn test_symbol_is_encoded_under_base_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sessionToken": "token-1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/wikifolios/wf%2Fother"))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_json()))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = Credentials::new("client-key", "user-key").unwrap();
        let config = ClientConfig::new(credentials).with_base_url(format!("{}/v1/", server.uri()));
        let client = WikifolioClient::new(config).unwrap();
        let detail = client.get_wikifolio("wf/other").await.unwrap();
        assert_eq!(detail.wikifolio_symbol.as_deref(), Some(WF));
    }

    #[tokio::test]
    async fn test_blank_identifiers_never_reach_the_network() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        for symbol in ["", "  ", ".."] {
            assert!(matches!(
                client.get_wikifolio(symbol).await,
                Err(WikifolioError::Validation(_))
            ));
            assert!(matches!(
                client.list_wikifolio_underlyings(symbol).await,
                Err(WikifolioError::Validation(_))
            ));
            assert!(matches!(
                client.list_wikifolio_orders(symbol).await,
                Err(WikifolioError::Validation(_))
            ));
        }
        for id in ["", "."] {
            let id = OrderId::new(id);
            assert!(matches!(
                client.get_limit_order(&id).await,
                Err(WikifolioError::Validation(_))
            ));
            assert!(matches!(
                client.delete_limit_order(&id).await,
                Err(WikifolioError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        for base_url in ["not a url", "mailto:ops@example.com"] {
            let credentials = Credentials::new("client-key", "user-key").unwrap();
            let config = ClientConfig::new(credentials).with_base_url(base_url);
            assert!(matches!(
                WikifolioClient::new(config),
                Err(WikifolioError::Configuration(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_unreadable_error_body_is_described() {
        let read_error = Client::new()
            .get("http://127.0.0.1:1/orders")
            .send()
            .await
            .unwrap_err();
        let body = error_body(StatusCode::BAD_GATEWAY, "/orders", Err(read_error));
        assert!(body.starts_with("<unreadable response body: "));
        assert_eq!(
            error_body(StatusCode::BAD_GATEWAY, "/orders", Ok("gateway down".to_string())),
            "gateway down"
        );
    }
}
