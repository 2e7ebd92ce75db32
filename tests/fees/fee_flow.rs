use super::harness::{TestEvmChain, TestHarness, TestOrigins, TestSolanaCluster, PAYER, TREASURY};
use alloy::primitives::U256;
use pushcampus_fees::address::parse_evm_address;
use pushcampus_fees::config::FailMode;
use pushcampus_fees::pricing::{subscription_label, TransferMechanism, DISPLAY_PRICE_TTL};
use pushcampus_fees::units::ten_pow;
use pushcampus_fees::{
    BalanceRequest, BalanceVerdict, Chain, QuoteRequest, StaticTokenRegistry, Transfer,
};
use std::sync::Arc;
use std::time::Duration;

const SEPOLIA: &str = "eip155:11155111";
const SOLANA_DEVNET: &str = "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1";
const SOL_PAYER: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

fn pc(amount: u64) -> U256 {
    U256::from(amount) * ten_pow(18)
}

#[tokio::test]
async fn test_push_payer_short_of_fee_is_blocked() {
    let harness = TestHarness::new(TestEvmChain::default(), TestOrigins::default(), FailMode::Open);
    harness.feed.set("push-protocol", 0.05);
    let payer = parse_evm_address(PAYER).expect("payer");
    harness.push_chain.fund(payer, pc(1000));

    let quote = harness
        .engine
        .quoter()
        .resolve(QuoteRequest::default())
        .await
        .expect("quote");
    assert_eq!(quote.display_amount, "1980 PC");
    assert_eq!(subscription_label(Some(&quote), "99"), "1980 PC/month");

    let verdict = harness
        .engine
        .validator()
        .validate(&BalanceRequest {
            quote: &quote,
            push_account: payer,
            origin_chain: None,
            origin_address: None,
        })
        .await;

    let reason = verdict.reason().expect("insufficient");
    assert!(reason.contains("need 1980 PC"), "{reason}");
    assert!(reason.contains("have 1000 PC"), "{reason}");
    assert!(reason.contains("short by 980 PC"), "{reason}");
}

#[tokio::test]
async fn test_funded_push_payer_passes_including_gas() {
    let harness = TestHarness::new(
        TestEvmChain::with_gas_price(1_000_000_000),
        TestOrigins::default(),
        FailMode::Open,
    );
    harness.feed.set("push-protocol", 0.05);
    let payer = parse_evm_address(PAYER).expect("payer");
    harness.push_chain.fund(payer, pc(1981));

    let quote = harness
        .engine
        .quoter()
        .resolve(QuoteRequest::default())
        .await
        .expect("quote");
    let request = BalanceRequest {
        quote: &quote,
        push_account: payer,
        origin_chain: None,
        origin_address: None,
    };
    assert_eq!(
        harness.engine.validator().validate(&request).await,
        BalanceVerdict::Sufficient
    );

    // Exactly the fee leaves nothing for gas.
    harness.push_chain.fund(payer, pc(1980));
    assert!(!harness.engine.validator().validate(&request).await.is_ok());
}

#[tokio::test]
async fn test_solana_payer_checked_on_origin_cluster() {
    let cluster = Arc::new(TestSolanaCluster::default());
    let mut origins = TestOrigins::default();
    origins.solana.insert(Chain::SolanaDevnet, cluster.clone());
    let harness = TestHarness::new(TestEvmChain::default(), origins, FailMode::Open);
    harness.feed.set("solana", 150.0);
    let registry = StaticTokenRegistry::native_defaults();

    let quote = harness
        .engine
        .quoter()
        .resolve(QuoteRequest {
            registry: Some(&registry),
            origin_chain: Some(SOLANA_DEVNET),
            treasury_address: None,
        })
        .await
        .expect("quote");
    assert_eq!(quote.display_amount, "0.66 SOL");
    match &quote.params.transfer {
        Transfer::Funds { amount, token } => {
            assert_eq!(*amount, U256::from(660_000_000_u64));
            assert_eq!(token.mechanism, TransferMechanism::Native);
        }
        Transfer::Native { .. } => panic!("expected funds transfer"),
    }

    let request = BalanceRequest {
        quote: &quote,
        push_account: parse_evm_address(PAYER).expect("payer"),
        origin_chain: Some(SOLANA_DEVNET),
        origin_address: Some(SOL_PAYER),
    };

    cluster.fund(SOL_PAYER, 500_000_000);
    let verdict = harness.engine.validator().validate(&request).await;
    let reason = verdict.reason().expect("insufficient");
    assert!(reason.contains("Solana Devnet"), "{reason}");
    assert!(reason.contains("short by 0.161 SOL"), "{reason}");

    cluster.fund(SOL_PAYER, 1_000_000_000);
    assert!(harness.engine.validator().validate(&request).await.is_ok());
}

#[tokio::test]
async fn test_evm_origin_payer_needs_fee_plus_gas_buffer() {
    let sepolia = Arc::new(TestEvmChain::with_gas_price(10));
    let mut origins = TestOrigins::default();
    origins.evm.insert(Chain::EthereumSepolia, sepolia.clone());
    let harness = TestHarness::new(TestEvmChain::default(), origins, FailMode::Open);
    harness.feed.set("ethereum", 3000.0);
    let registry = StaticTokenRegistry::native_defaults();

    let quote = harness
        .engine
        .quoter()
        .resolve(QuoteRequest {
            registry: Some(&registry),
            origin_chain: Some(SEPOLIA),
            treasury_address: None,
        })
        .await
        .expect("quote");
    assert_eq!(quote.display_amount, "0.033 ETH");

    let payer = parse_evm_address(PAYER).expect("payer");
    let request = BalanceRequest {
        quote: &quote,
        push_account: payer,
        origin_chain: Some(SEPOLIA),
        origin_address: Some(PAYER),
    };

    sepolia.fund(payer, quote.amount);
    assert!(!harness.engine.validator().validate(&request).await.is_ok());

    // 100k gas units at 10 wei.
    sepolia.fund(payer, quote.amount + U256::from(1_000_000_u64));
    assert!(harness.engine.validator().validate(&request).await.is_ok());
}

#[tokio::test]
async fn test_price_outage_yields_approximate_quote() {
    let harness = TestHarness::new(TestEvmChain::default(), TestOrigins::default(), FailMode::Open);

    let quote = harness
        .engine
        .quoter()
        .resolve(QuoteRequest::default())
        .await
        .expect("quote");

    assert!(quote.is_approximate());
    assert_eq!(quote.display_amount, "99 PC");
    assert_eq!(quote.params.to, parse_evm_address(TREASURY).expect("treasury"));
}

#[tokio::test]
async fn test_offline_settlement_follows_fail_mode() {
    for (mode, allowed) in [(FailMode::Open, true), (FailMode::Closed, false)] {
        let harness = TestHarness::new(TestEvmChain::offline(), TestOrigins::default(), mode);
        harness.feed.set("push-protocol", 0.05);
        let quote = harness
            .engine
            .quoter()
            .resolve(QuoteRequest::default())
            .await
            .expect("quote");

        let verdict = harness
            .engine
            .validator()
            .validate(&BalanceRequest {
                quote: &quote,
                push_account: parse_evm_address(PAYER).expect("payer"),
                origin_chain: None,
                origin_address: None,
            })
            .await;
        assert_eq!(verdict.is_ok(), allowed, "{mode:?}: {verdict:?}");
    }
}

#[tokio::test]
async fn test_quote_reprices_after_expiry() {
    let harness = TestHarness::new(TestEvmChain::default(), TestOrigins::default(), FailMode::Open);
    harness.feed.set("push-protocol", 0.05);
    let quoter = harness.engine.quoter();

    let first = quoter.resolve(QuoteRequest::default()).await.expect("quote");
    harness.feed.set("push-protocol", 0.10);
    let cached = quoter.resolve(QuoteRequest::default()).await.expect("quote");
    assert_eq!(first, cached);
    assert_eq!(harness.feed.requests(), 1);

    harness.clock.advance(Duration::from_secs(301));
    let repriced = quoter.resolve(QuoteRequest::default()).await.expect("quote");
    assert_eq!(repriced.display_amount, "990 PC");
    assert_eq!(harness.feed.requests(), 2);
}

#[tokio::test]
async fn test_display_oracle_keeps_price_through_outage() {
    let harness = TestHarness::new(TestEvmChain::default(), TestOrigins::default(), FailMode::Open);
    harness.feed.set("push-protocol", 0.05);
    let oracle = harness.engine.display_oracle();

    assert_eq!(oracle.usd_price("push-protocol").await, Some(0.05));
    harness.feed.remove("push-protocol");
    harness.clock.advance(Duration::from_secs(5 * 60));
    assert_eq!(oracle.usd_price("push-protocol").await, Some(0.05));

    harness.clock.advance(Duration::from_secs(6 * 60));
    assert_eq!(oracle.usd_price("push-protocol").await, None);
    assert_eq!(oracle.usd_rate_or("push-protocol", Some(0.04)).await, Some(0.04));
}

#[test]
fn test_engine_uses_default_price_ttls() {
    let harness = TestHarness::new(TestEvmChain::default(), TestOrigins::default(), FailMode::Open);
    assert_eq!(harness.engine.display_oracle().ttl(), DISPLAY_PRICE_TTL);
    assert!((harness.engine.quoter().usd_amount() - 99.0).abs() < f64::EPSILON);
}
