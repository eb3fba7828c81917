//! CLI definitions.

pub mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;
use wikifolio_core::types::{OrderStatus, Side};

#[derive(Parser)]
#[command(name = "wikifolio")]
#[command(author, version, about = "Command line client for the wikifolio trading API")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/wikifolio.toml")]
    pub config: PathBuf,

    /// Log level (overrides the configuration file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,

    /// Use the in-memory paper backend instead of the live API
    #[arg(long)]
    pub paper: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tradable wikifolios
    List,
    /// Show a wikifolio's detail and positions
    Show {
        /// Wikifolio symbol
        symbol: String,
    },
    /// List securities tradable in a wikifolio
    Underlyings {
        /// Wikifolio symbol
        symbol: String,
    },
    /// List a wikifolio's orders
    Orders {
        /// Wikifolio symbol
        symbol: String,

        /// Only orders with this status (e.g. Active, Executed)
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Limit orders
    #[command(subcommand)]
    Limit(LimitCommands),
    /// Quote orders
    #[command(subcommand)]
    Quote(QuoteCommands),
    /// Validate configuration
    ValidateConfig,
}

#[derive(Subcommand)]
pub enum LimitCommands {
    /// Place a limit order
    Place(LimitOrderArgs),
    /// Show a limit order
    Show {
        order_id: String,
    },
    /// Delete an open limit order
    Delete {
        order_id: String,
    },
}

#[derive(Subcommand)]
pub enum QuoteCommands {
    /// Place a quote order at the current market quote
    Place(QuoteOrderArgs),
}

#[derive(clap::Args)]
pub struct LimitOrderArgs {
    /// Wikifolio symbol
    #[arg(short, long)]
    pub wikifolio: String,

    /// ISIN of the security
    #[arg(short, long)]
    pub isin: String,

    /// Number of shares
    #[arg(short, long)]
    pub quantity: u32,

    /// Limit price
    #[arg(short, long)]
    pub price: Decimal,

    /// Last day the order is valid (YYYY-MM-DD)
    #[arg(long)]
    pub valid_until: NaiveDate,

    /// buy or sell
    #[arg(short, long)]
    pub side: Side,
}

#[derive(clap::Args)]
pub struct QuoteOrderArgs {
    /// Wikifolio symbol
    #[arg(short, long)]
    pub wikifolio: String,

    /// ISIN of the security
    #[arg(short, long)]
    pub isin: String,

    /// Number of shares
    #[arg(short, long)]
    pub quantity: u32,

    /// buy or sell
    #[arg(short, long)]
    pub side: Side,
}
