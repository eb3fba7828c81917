//! Order types and structures.

use chrono::{NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WikifolioError;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Side {
    type Err = WikifolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(WikifolioError::Validation(format!("unknown side: {}", s))),
        }
    }
}

/// Order kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    /// Buy or sell at the limit price or better until the expiry date
    Limit,
    /// Execute immediately at the current market quote
    Quote,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Limit => write!(f, "LIMIT"),
            OrderKind::Quote => write!(f, "QUOTE"),
        }
    }
}

/// Order status as reported by the upstream system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Inactive,
    Waiting,
    Active,
    Evaluating,
    Executing,
    RequestingExecutionInformation,
    PartiallyExecutedActive,
    Executed,
    PartiallyExecutedExecuted,
    Deleted,
    DeleteRequested,
    Updated,
    Obsolete,
    Error,
    Rejected,
    Undone,
    Abandoned,
    /// A status this client does not know yet
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Statuses the upstream accepts as a listing filter.
    pub const FILTERABLE: [OrderStatus; 17] = [
        OrderStatus::Inactive,
        OrderStatus::Waiting,
        OrderStatus::Active,
        OrderStatus::Evaluating,
        OrderStatus::Executing,
        OrderStatus::RequestingExecutionInformation,
        OrderStatus::PartiallyExecutedActive,
        OrderStatus::Executed,
        OrderStatus::PartiallyExecutedExecuted,
        OrderStatus::Deleted,
        OrderStatus::DeleteRequested,
        OrderStatus::Updated,
        OrderStatus::Obsolete,
        OrderStatus::Error,
        OrderStatus::Rejected,
        OrderStatus::Undone,
        OrderStatus::Abandoned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Inactive => "Inactive",
            OrderStatus::Waiting => "Waiting",
            OrderStatus::Active => "Active",
            OrderStatus::Evaluating => "Evaluating",
            OrderStatus::Executing => "Executing",
            OrderStatus::RequestingExecutionInformation => "RequestingExecutionInformation",
            OrderStatus::PartiallyExecutedActive => "PartiallyExecutedActive",
            OrderStatus::Executed => "Executed",
            OrderStatus::PartiallyExecutedExecuted => "PartiallyExecutedExecuted",
            OrderStatus::Deleted => "Deleted",
            OrderStatus::DeleteRequested => "DeleteRequested",
            OrderStatus::Updated => "Updated",
            OrderStatus::Obsolete => "Obsolete",
            OrderStatus::Error => "Error",
            OrderStatus::Rejected => "Rejected",
            OrderStatus::Undone => "Undone",
            OrderStatus::Abandoned => "Abandoned",
            OrderStatus::Unknown => "Unknown",
        }
    }

    /// Check if the order can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Executed
                | OrderStatus::PartiallyExecutedExecuted
                | OrderStatus::Deleted
                | OrderStatus::Obsolete
                | OrderStatus::Error
                | OrderStatus::Rejected
                | OrderStatus::Undone
                | OrderStatus::Abandoned
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = WikifolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::FILTERABLE
            .iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| WikifolioError::Validation(format!("invalid order status: {}", s)))
    }
}

/// Opaque order handle assigned by the upstream system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Reject ids that cannot name a single order resource.
    pub fn validate(&self) -> Result<(), WikifolioError> {
        check_identifier("order id", &self.0)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Limit order to be placed in a wikifolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitOrderRequest {
    pub wikifolio: String,
    pub isin: String,
    pub quantity: u32,
    pub limit_price: Decimal,
    /// Last calendar day the order stays valid
    pub valid_until: NaiveDate,
    pub side: Side,
}

impl LimitOrderRequest {
    pub fn new(
        wikifolio: impl Into<String>,
        isin: impl Into<String>,
        quantity: u32,
        limit_price: Decimal,
        valid_until: NaiveDate,
        side: Side,
    ) -> Self {
        Self {
            wikifolio: wikifolio.into(),
            isin: isin.into(),
            quantity,
            limit_price,
            valid_until,
            side,
        }
    }

    /// Validate against today's UTC date.
    pub fn validate(&self) -> Result<(), WikifolioError> {
        self.validate_at(Utc::now().date_naive())
    }

    /// Validate against the given calendar date.
    pub fn validate_at(&self, today: NaiveDate) -> Result<(), WikifolioError> {
        check_target(&self.wikifolio, &self.isin)?;
        check_quantity(self.quantity)?;
        if self.limit_price <= Decimal::ZERO {
            return Err(WikifolioError::Validation(format!(
                "limit price must be positive, got {}",
                self.limit_price
            )));
        }
        if self.valid_until < today {
            return Err(WikifolioError::Validation(format!(
                "expiry date {} is before {}",
                self.valid_until, today
            )));
        }
        Ok(())
    }
}

/// Quote order to be placed in a wikifolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteOrderRequest {
    pub wikifolio: String,
    pub isin: String,
    pub quantity: u32,
    pub side: Side,
}

impl QuoteOrderRequest {
    pub fn new(wikifolio: impl Into<String>, isin: impl Into<String>, quantity: u32, side: Side) -> Self {
        Self {
            wikifolio: wikifolio.into(),
            isin: isin.into(),
            quantity,
            side,
        }
    }

    pub fn validate(&self) -> Result<(), WikifolioError> {
        check_target(&self.wikifolio, &self.isin)?;
        check_quantity(self.quantity)
    }
}

fn check_quantity(quantity: u32) -> Result<(), WikifolioError> {
    if quantity == 0 {
        return Err(WikifolioError::Validation("quantity must be positive".into()));
    }
    Ok(())
}

fn check_target(wikifolio: &str, isin: &str) -> Result<(), WikifolioError> {
    check_symbol(wikifolio)?;
    if !is_isin_shaped(isin) {
        return Err(WikifolioError::Validation(format!("not an ISIN: {:?}", isin)));
    }
    Ok(())
}

/// Reject a wikifolio symbol that is blank or a bare `.`/`..` path segment.
pub fn check_symbol(symbol: &str) -> Result<(), WikifolioError> {
    check_identifier("wikifolio symbol", symbol)
}

fn check_identifier(what: &str, value: &str) -> Result<(), WikifolioError> {
    if value.trim().is_empty() {
        return Err(WikifolioError::Validation(format!("{} is empty", what)));
    }
    // URL builders drop these segments, so the request would reach the parent resource
    if value == "." || value == ".." {
        return Err(WikifolioError::Validation(format!("invalid {}: {:?}", what, value)));
    }
    Ok(())
}

/// Shape check only: 12 ASCII alphanumerics, no checksum verification.
pub fn is_isin_shaped(isin: &str) -> bool {
    isin.len() == 12 && isin.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Entry of a wikifolio's order listing (open and historical).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub order_status: OrderStatus,
    pub order_type: String,
    pub amount: Decimal,
    pub creation_date: String,
    #[serde(default)]
    pub wikifolio_symbol: Option<String>,
    #[serde(default)]
    pub execution_price: Option<Decimal>,
    #[serde(default)]
    pub status_date: Option<String>,
    #[serde(default)]
    pub reason: Option<i32>,
    #[serde(default)]
    pub stop: Option<Decimal>,
    #[serde(default)]
    pub limit: Option<Decimal>,
}

/// Detail record of a limit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitOrder {
    pub order_id: OrderId,
    pub wikifolio_symbol: String,
    pub underlying_isin: String,
    /// Whole shares, given as an integer or an integral number such as `3.0`
    #[serde(deserialize_with = "whole_amount")]
    pub amount: u32,
    pub limit_price: Decimal,
    pub valid_until: NaiveDate,
    pub buy_sell: Side,
    pub order_status: OrderStatus,
}

fn whole_amount<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
    if !amount.fract().is_zero() {
        return Err(de::Error::custom(format!("amount is not a whole number: {}", amount)));
    }
    amount
        .to_u32()
        .ok_or_else(|| de::Error::custom(format!("amount out of range: {}", amount)))
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The order was open and is now removed
    Deleted,
    /// The order had already been executed, expired or deleted; nothing changed
    AlreadyResolved,
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteOutcome::Deleted => write!(f, "deleted"),
            DeleteOutcome::AlreadyResolved => write!(f, "already resolved"),
        }
    }
}
