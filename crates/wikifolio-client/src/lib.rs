//! Backends for the wikifolio trading API.

mod http;
mod paper;

pub use http::WikifolioClient;
pub use paper::PaperWikifolio;
