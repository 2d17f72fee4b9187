//! End-to-end flows against the simulated tag reader and wallet.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tappay_flow::sim::{
    DemoTagSource, FallbackTagSource, MemoryTagSource, MemoryWallet, DEMO_CUSTOMER_WALLET,
};
use tappay_flow::{
    default_catalog, Address, FlowConfig, FlowState, FlowStep, PaymentFlow, TerminalProfile,
    TxStatus,
};
use url::Url;

const SEPOLIA: u64 = 11_155_111;

fn merchant() -> Address {
    format!("0x{}", "dD".repeat(20)).parse().unwrap()
}

fn config() -> FlowConfig {
    FlowConfig::new(
        "Night Market",
        merchant(),
        Url::parse("https://tappay.local/terminal").unwrap(),
    )
}

/// A customer writes their tag at one terminal and pays at another.
#[tokio::test]
async fn test_written_tag_pays_at_another_terminal() {
    let customer: Address = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e".parse().unwrap();

    let writer_tags = Arc::new(MemoryTagSource::new());
    let mut writer = PaymentFlow::new(
        config(),
        Arc::new(MemoryWallet::new(SEPOLIA)),
        writer_tags.clone(),
    )
    .unwrap();
    writer.write_tag(customer.as_str()).await.unwrap();

    let reader_tags = Arc::new(MemoryTagSource::new());
    for records in writer_tags.written() {
        reader_tags.tap(records);
    }

    let wallet = Arc::new(MemoryWallet::connected(customer.clone(), SEPOLIA));
    let mut reader = PaymentFlow::new(config(), wallet.clone(), reader_tags).unwrap();

    assert!(reader.scan_once().await.unwrap());
    reader.set_amount("0.25").unwrap();
    let outcome = reader.submit().await.unwrap();

    assert_eq!(outcome.status, TxStatus::Confirmed);
    assert!(outcome
        .explorer_url
        .starts_with("https://sepolia.etherscan.io/tx/0x"));
    let transfers = wallet.transfers();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].to, merchant());
    assert_eq!(transfers[0].value, 250_000_000_000_000_000);
}

/// Without a reader the terminal falls back to the demo tag.
#[tokio::test(start_paused = true)]
async fn test_demo_fallback_completes_payment() {
    let profile = TerminalProfile::new(
        Url::parse("https://tappay.local/terminal").unwrap(),
        merchant(),
        "sepolia",
    );
    let demo = DemoTagSource::new(&profile, Duration::from_millis(1500)).unwrap();
    let tags = Arc::new(FallbackTagSource::new(MemoryTagSource::unavailable(), demo));

    let customer: Address = DEMO_CUSTOMER_WALLET.parse().unwrap();
    let wallet = Arc::new(MemoryWallet::connected(customer.clone(), SEPOLIA));
    let mut flow = PaymentFlow::new(config(), wallet.clone(), tags).unwrap();

    let mut reads = flow.start_scan().await.unwrap();
    let event = reads.next().await.unwrap();
    assert!(flow.handle_tag_read(event).unwrap());

    let FlowState::Payment(ref checkout) = *flow.state() else {
        panic!("expected payment state");
    };
    assert_eq!(checkout.intent.customer_wallet, customer);
    assert_eq!(checkout.order.address, merchant());

    flow.set_amount("0.01").unwrap();
    flow.submit().await.unwrap();
    assert_eq!(flow.step(), FlowStep::Success);

    flow.reset();
    assert_eq!(flow.step(), FlowStep::Scan);
}

#[tokio::test]
async fn test_agent_payment_from_page_url() {
    let customer: Address = DEMO_CUSTOMER_WALLET.parse().unwrap();
    let wallet = Arc::new(MemoryWallet::connected(customer.clone(), SEPOLIA));
    let mut flow = PaymentFlow::new(
        config().agent_mode(default_catalog()),
        wallet.clone(),
        Arc::new(MemoryTagSource::new()),
    )
    .unwrap();

    let page = format!(
        "https://tappay.local/terminal?wallet={}&agentId=image-agent&orderId=job-7",
        customer
    );
    assert!(flow.load_page_url(&page).unwrap());
    assert_eq!(flow.step(), FlowStep::Payment);

    let outcome = flow.submit().await.unwrap();
    let FlowState::Success(ref receipt) = *flow.state() else {
        panic!("expected success state");
    };
    assert_eq!(receipt.outcome, outcome);
    assert_eq!(receipt.order.amount, "0.002");
    assert_eq!(receipt.order.order_id.as_deref(), Some("job-7"));
    assert_eq!(wallet.transfers()[0].value, 2_000_000_000_000_000);

    flow.reset();
    assert_eq!(flow.step(), FlowStep::AgentSelect);
    assert_eq!(flow.page_url().as_str(), "https://tappay.local/terminal");
}
