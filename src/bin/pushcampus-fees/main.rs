//! pushcampus-fees CLI entry point.

mod cli;

use clap::Parser;
use cli::{Cli, FeeCommand};
use color_eyre::eyre::eyre;
use pushcampus_fees::address::parse_evm_address;
use pushcampus_fees::{BalanceRequest, FeeEngine, QuoteRequest, StaticTokenRegistry};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = cli.to_config()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("pushcampus-fees v{}", env!("CARGO_PKG_VERSION"));

    let engine = FeeEngine::from_config(&config)?;
    let registry = StaticTokenRegistry::native_defaults();

    match cli.command {
        FeeCommand::Price { id } => {
            let price = engine
                .display_oracle()
                .usd_price(&id)
                .await
                .ok_or_else(|| eyre!("No USD price available for {id}"))?;
            println!("{}", json!({ "id": id, "usd": price }));
        }
        FeeCommand::Quote { origin_chain } => {
            let quote = engine
                .quoter()
                .resolve(QuoteRequest {
                    registry: Some(&registry),
                    origin_chain: origin_chain.as_deref(),
                    treasury_address: None,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        FeeCommand::Check {
            push_account,
            origin_chain,
            origin_address,
        } => {
            let push_account = parse_evm_address(&push_account)?;
            let quote = engine
                .quoter()
                .resolve(QuoteRequest {
                    registry: Some(&registry),
                    origin_chain: origin_chain.as_deref(),
                    treasury_address: None,
                })
                .await?;
            let verdict = engine
                .validator()
                .validate(&BalanceRequest {
                    quote: &quote,
                    push_account,
                    origin_chain: origin_chain.as_deref(),
                    origin_address: origin_address.as_deref(),
                })
                .await;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "quote": quote, "verdict": verdict }))?
            );
            if !verdict.is_ok() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
