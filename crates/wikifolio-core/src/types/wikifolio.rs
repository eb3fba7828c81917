//! Wikifolio, position and underlying types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Entry of the wikifolio listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WikifolioListItem {
    #[serde(default)]
    pub wikifolio_symbol: Option<String>,
    #[serde(default)]
    pub resource_link: Option<String>,
}

/// Detail record of a single wikifolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wikifolio {
    #[serde(default)]
    pub wikifolio_symbol: Option<String>,
    #[serde(default)]
    pub wikifolio_status: Option<String>,
    pub cash_account_current_balance: Decimal,
    pub total_value: Decimal,
    #[serde(default)]
    pub bid_price: Option<Decimal>,
    #[serde(default)]
    pub ask_price: Option<Decimal>,
    #[serde(default)]
    pub price_date: Option<String>,
    #[serde(default)]
    pub base_currency: Option<String>,
    #[serde(default)]
    pub positions: Vec<Position>,
}

impl Wikifolio {
    /// Value currently held in securities rather than cash.
    pub fn invested_value(&self) -> Decimal {
        self.total_value - self.cash_account_current_balance
    }

    /// Position held in the given ISIN, if any.
    pub fn position(&self, isin: &str) -> Option<&Position> {
        self.positions
            .iter()
            .find(|p| p.underlying.as_deref() == Some(isin))
    }
}

/// A holding inside a wikifolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub quantity: Decimal,
    /// ISIN of the held security
    #[serde(default)]
    pub underlying: Option<String>,
    #[serde(default)]
    pub average_purchase_price: Option<Decimal>,
}

/// A security eligible for trading inside a wikifolio.
///
/// The underlyings endpoint can return the entire tradable universe rather
/// than what the wikifolio currently holds; use [`Wikifolio::positions`] for
/// holdings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Underlying {
    pub isin: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub security_type: Option<String>,
}
