//! Core types and traits for the wikifolio trading API.
//!
//! This crate provides:
//! - Credentials and client configuration
//! - Wikifolio, underlying and order types with local validation
//! - The read and write capability traits implemented by every backend
//! - The error taxonomy shared by all backends

pub mod error;
pub mod traits;
pub mod types;

pub use error::{WikifolioError, WikifolioResult};
pub use traits::*;
pub use types::*;
