//! Subcommand implementations.
//!
//! Each command returns the lines it wants printed so the output can be
//! checked without a terminal.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tappay_codec::{decode, encode, PaymentIntent};
use tappay_flow::sim::{
    DemoTagSource, FallbackTagSource, MemoryTagSource, MemoryWallet, DEMO_CUSTOMER_WALLET,
};
use tappay_flow::{
    default_catalog, find_offering, Address, FlowState, FlowStep, PaymentFlow, WalletError,
    NETWORKS,
};
use tracing::info;

use crate::config::TerminalConfig;

/// Encode a customer's tag records.
pub fn encode_tag(
    config: &TerminalConfig,
    wallet: &str,
    agent: Option<&str>,
    order: Option<&str>,
) -> Result<Vec<String>> {
    let customer: Address = wallet
        .trim()
        .parse()
        .with_context(|| format!("invalid customer wallet {}", wallet))?;

    let mut builder = PaymentIntent::builder(customer);
    if let Some(id) = agent {
        if find_offering(&default_catalog(), id).is_none() {
            bail!("unknown agent {}", id);
        }
        builder = builder.agent_id(id);
    }
    if let Some(id) = order {
        builder = builder.order_id(id);
    }

    let profile = config.profile();
    let tag = encode(&builder.build(&profile), &profile);

    Ok(vec![
        format!("url:  {}", tag.url),
        format!("text: {}", tag.json),
    ])
}

/// Decode a URL or JSON payload into a payment intent.
pub fn decode_intent(config: &TerminalConfig, input: &str) -> Result<Vec<String>> {
    let intent = decode(input.trim(), &config.profile()).context("could not decode payment intent")?;
    let pretty = serde_json::to_string_pretty(&intent)?;
    Ok(pretty.lines().map(str::to_string).collect())
}

/// List supported networks, marking `selected`.
pub fn list_networks(selected: &str) -> Vec<String> {
    NETWORKS
        .iter()
        .map(|n| {
            format!(
                "{} {:<14} chain {:<10} {:<4} {}{}",
                if n.key == selected { '*' } else { ' ' },
                n.key,
                n.chain_id,
                n.currency_symbol,
                n.name,
                if n.is_testnet { " (testnet)" } else { "" },
            )
        })
        .collect()
}

/// Options for the simulated checkout.
#[derive(Debug, Default, Clone)]
pub struct DemoOptions {
    pub amount: Option<String>,
    pub agent: Option<String>,
    pub fail: bool,
    pub page_url: Option<String>,
}

/// Run one checkout against the demo tag and an in-memory wallet.
pub async fn run_demo(config: &TerminalConfig, options: &DemoOptions) -> Result<Vec<String>> {
    let network = config.network()?;
    let demo = DemoTagSource::new(&config.profile(), config.demo_delay)
        .context("could not build demo tag")?;
    let tags = Arc::new(FallbackTagSource::new(MemoryTagSource::unavailable(), demo));

    let customer: Address = DEMO_CUSTOMER_WALLET.parse()?;
    let wallet = Arc::new(MemoryWallet::connected(customer, network.chain_id));
    if options.fail {
        wallet.fail_next_transfer(WalletError::Rejected("declined by demo customer".into()));
    }

    let mut flow = PaymentFlow::new(config.flow_config(), wallet.clone(), tags)?;
    let mut log = Vec::new();

    let from_page = match options.page_url {
        Some(ref url) => flow.load_page_url(url)?,
        None => false,
    };

    if !from_page {
        if flow.step() == FlowStep::AgentSelect {
            if let Some(ref id) = options.agent {
                flow.select_agent(id)?;
                log.push(format!("Selected agent {}", id));
            }
            flow.proceed_to_scan()?;
        }
        log.push(format!("Waiting for tag on {}", flow.selected_network()));
        if !flow.scan_once().await? {
            bail!("no tag was presented");
        }
    }

    let intent = flow.state().intent().context("no payment intent")?;
    log.push(format!(
        "Customer {} paying {}",
        intent.customer_wallet.display_short(),
        intent.merchant_address.display_short()
    ));

    if let Some(ref amount) = options.amount {
        flow.set_amount(amount)?;
    }

    match flow.submit().await {
        Ok(outcome) => {
            if let FlowState::Success(ref receipt) = *flow.state() {
                log.push(format!(
                    "Paid {} {} to {}",
                    receipt.order.amount, receipt.order.currency, receipt.order.name
                ));
            }
            log.push(format!("Transaction {}", outcome.transaction_hash));
            log.push(format!("Explorer {}", outcome.explorer_url));
            flow.reset();
        }
        Err(e) => {
            log.push(format!("Payment failed: {}", e));
            log.push(format!("Terminal back at {}", flow.step()));
        }
    }

    info!("Demo finished after {} transfer(s)", wallet.transfers().len());
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use url::Url;

    fn config() -> TerminalConfig {
        TerminalConfig {
            merchant_address: format!("0x{}", "d".repeat(40)).parse().unwrap(),
            merchant_name: "Corner Cafe".to_string(),
            origin: Url::parse("https://tappay.local/terminal").unwrap(),
            network_key: "sepolia".to_string(),
            agent_mode: false,
            demo_delay: Duration::ZERO,
        }
    }

    fn wallet() -> String {
        format!("0x{}", "a".repeat(40))
    }

    #[test]
    fn test_encode_then_decode() {
        let lines = encode_tag(&config(), &wallet(), Some("research-agent"), Some("A-1")).unwrap();
        assert_eq!(lines.len(), 2);

        let url = lines[0].trim_start_matches("url:").trim();
        assert!(url.starts_with("https://tappay.local/terminal?"));
        assert!(url.contains("agentId=research-agent"));

        for record in [url, lines[1].trim_start_matches("text:").trim()] {
            let decoded = decode(record, &config().profile()).unwrap();
            assert_eq!(decoded.customer_wallet, wallet().parse::<Address>().unwrap());
            assert_eq!(decoded.order_id.as_deref(), Some("A-1"));
        }
    }

    #[test]
    fn test_encode_rejects_bad_input() {
        assert!(encode_tag(&config(), "0x12", None, None).is_err());
        assert!(encode_tag(&config(), &wallet(), Some("nobody"), None).is_err());
    }

    #[test]
    fn test_decode_prints_intent() {
        let lines = decode_intent(&config(), &format!("https://x/?wallet={}", wallet())).unwrap();
        let joined = lines.join("\n");
        assert!(joined.contains("\"customerWallet\""));
        assert!(joined.contains("\"networkKey\": \"sepolia\""));

        assert!(decode_intent(&config(), "https://x/?merchant=0x1").is_err());
    }

    #[test]
    fn test_network_listing() {
        let lines = list_networks("polygon-amoy");
        assert_eq!(lines.len(), NETWORKS.len());
        let marked: Vec<_> = lines.iter().filter(|l| l.starts_with('*')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("polygon-amoy"));
    }

    #[tokio::test]
    async fn test_demo_pays() {
        let options = DemoOptions {
            amount: Some("0.01".to_string()),
            ..Default::default()
        };
        let log = run_demo(&config(), &options).await.unwrap();
        assert!(log.iter().any(|l| l == "Paid 0.01 ETH to Corner Cafe"));
        assert!(log.iter().any(|l| l.starts_with("Explorer https://sepolia.etherscan.io/tx/")));
    }

    #[tokio::test]
    async fn test_demo_failure_keeps_payment() {
        let options = DemoOptions {
            amount: Some("0.01".to_string()),
            fail: true,
            ..Default::default()
        };
        let log = run_demo(&config(), &options).await.unwrap();
        assert!(log.iter().any(|l| l.starts_with("Payment failed")));
        assert_eq!(log.last().map(String::as_str), Some("Terminal back at payment"));
    }

    #[tokio::test]
    async fn test_demo_without_amount_fails_validation() {
        let log = run_demo(&config(), &DemoOptions::default()).await.unwrap();
        assert!(log.iter().any(|l| l.starts_with("Payment failed")));
    }

    #[tokio::test]
    async fn test_demo_agent_from_page_url() {
        let mut config = config();
        config.agent_mode = true;
        let options = DemoOptions {
            page_url: Some(format!(
                "https://tappay.local/terminal?wallet={}&agentId=image-agent",
                DEMO_CUSTOMER_WALLET
            )),
            ..Default::default()
        };
        let log = run_demo(&config, &options).await.unwrap();
        assert!(log.iter().any(|l| l == "Paid 0.002 ETH to Corner Cafe"));
        assert!(!log.iter().any(|l| l.starts_with("Waiting for tag")));
    }
}
