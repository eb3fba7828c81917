//! Core traits for the wikifolio API.

mod api;

pub use api::{WikifolioApi, WikifolioReader, WikifolioTrader};
