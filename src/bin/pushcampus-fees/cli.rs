//! CLI definition for pushcampus-fees.

use clap::{Parser, Subcommand, ValueEnum};
use pushcampus_fees::config::{parse_positive_int, parse_rpc_urls};
use pushcampus_fees::FeeConfig;
use std::path::PathBuf;

/// Quote the PushCampus platform fee and preflight payer balances.
#[derive(Parser, Debug)]
#[command(name = "pushcampus-fees")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(long, short, env = "PUSHCAMPUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Treasury address that receives the fee.
    #[arg(long, env = "PUSHCAMPUS_TREASURY_ADDRESS")]
    pub treasury: Option<String>,

    /// Subscription fee in USD.
    #[arg(long, env = "PUSHCAMPUS_PLATFORM_FEE_USD")]
    pub usd_amount: Option<String>,

    /// Base URL of the price feed API.
    #[arg(long, env = "PUSHCAMPUS_PRICE_FEED_URL")]
    pub price_feed_url: Option<String>,

    /// Comma-separated Push Chain RPC endpoints.
    #[arg(long, env = "PUSHCAMPUS_PUSH_RPC_URLS")]
    pub push_rpc_urls: Option<String>,

    /// Seconds a fee quote stays cached.
    #[arg(long, env = "PUSHCAMPUS_QUOTE_TTL_SECS")]
    pub quote_ttl_secs: Option<String>,

    /// Log level; overrides `log_level` from the config file.
    #[arg(long, value_enum, env = "RUST_LOG_LEVEL")]
    pub log_level: Option<CliLogLevel>,

    /// Command to run.
    #[command(subcommand)]
    pub command: FeeCommand,
}

/// Fee commands.
#[derive(Subcommand, Debug)]
pub enum FeeCommand {
    /// Print the USD price of a price-feed id.
    Price {
        /// Price-feed id, e.g. `push-protocol`.
        id: String,
    },
    /// Build a platform fee quote.
    Quote {
        /// CAIP-2 id of the payer's origin chain (Push Chain if omitted).
        #[arg(long)]
        origin_chain: Option<String>,
    },
    /// Quote the fee and check that the payer can cover it.
    Check {
        /// Payer's Push Chain account.
        #[arg(long)]
        push_account: String,
        /// CAIP-2 id of the payer's origin chain.
        #[arg(long)]
        origin_chain: Option<String>,
        /// Payer's address on the origin chain.
        #[arg(long)]
        origin_address: Option<String>,
    },
}

/// Log level.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliLogLevel {
    /// Error messages only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Informational messages.
    Info,
    /// Debug messages.
    Debug,
    /// Trace messages (verbose).
    Trace,
}

impl Cli {
    /// Convert CLI arguments into a `FeeConfig`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded.
    pub fn to_config(&self) -> color_eyre::Result<FeeConfig> {
        let mut config = if let Some(ref path) = self.config {
            FeeConfig::from_file(path)?
        } else {
            FeeConfig::default()
        };

        if let Some(ref treasury) = self.treasury {
            config.fee.treasury_address = Some(treasury.clone());
        }
        if let Some(ref usd_amount) = self.usd_amount {
            config.fee.usd_amount.clone_from(usd_amount);
        }
        if let Some(ref url) = self.price_feed_url {
            config.price_feed.base_url.clone_from(url);
        }
        if let Some(ref urls) = self.push_rpc_urls {
            config.push_chain.rpc_urls = parse_rpc_urls(Some(urls));
        }
        config.quote.ttl_secs =
            parse_positive_int(self.quote_ttl_secs.as_deref(), config.quote.ttl_secs);
        if let Some(level) = self.log_level {
            config.log_level = level.into();
        }

        Ok(config)
    }
}

impl From<CliLogLevel> for String {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => "error".to_string(),
            CliLogLevel::Warn => "warn".to_string(),
            CliLogLevel::Info => "info".to_string(),
            CliLogLevel::Debug => "debug".to_string(),
            CliLogLevel::Trace => "trace".to_string(),
        }
    }
}
