//! Core data types for the wikifolio API.

mod credentials;
mod order;
mod wikifolio;

pub use credentials::{
    ClientConfig, Credentials, CLIENT_API_KEY_ENV, DEFAULT_BASE_URL, USER_API_KEY_ENV,
};
pub use order::{
    check_symbol, is_isin_shaped, DeleteOutcome, LimitOrder, LimitOrderRequest, OrderId,
    OrderKind, OrderRecord, OrderStatus, QuoteOrderRequest, Side,
};
pub use wikifolio::{Position, Underlying, Wikifolio, WikifolioListItem};
