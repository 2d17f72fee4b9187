//! Query-parameter encoding of payment intents
//!
//! ```text
//! https://shop.example/pay?wallet=0x...&merchant=0x...&protocol=x402&network=sepolia&agentId=...
//! ```
//!
//! The same parameters are read from the terminal's page URL on load.

use url::Url;

use crate::intent::RawIntent;
use crate::{DecodeResult, PaymentIntent, TerminalProfile};

/// Customer wallet parameter (required)
pub const PARAM_WALLET: &str = "wallet";
/// Merchant address parameter
pub const PARAM_MERCHANT: &str = "merchant";
/// Protocol label parameter
pub const PARAM_PROTOCOL: &str = "protocol";
/// Network key parameter
pub const PARAM_NETWORK: &str = "network";
/// Agent offering parameter
pub const PARAM_AGENT_ID: &str = "agentId";
/// Order reference parameter
pub const PARAM_ORDER_ID: &str = "orderId";

/// Every parameter that belongs to an intent.
pub const INTENT_PARAMS: [&str; 6] = [
    PARAM_WALLET,
    PARAM_MERCHANT,
    PARAM_PROTOCOL,
    PARAM_NETWORK,
    PARAM_AGENT_ID,
    PARAM_ORDER_ID,
];

/// Append the intent to `origin` as query parameters.
///
/// Any query or fragment already on `origin` is dropped.
pub fn encode_url(intent: &PaymentIntent, origin: &Url) -> Url {
    let mut url = origin.clone();
    url.set_fragment(None);
    url.set_query(None);

    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair(PARAM_WALLET, intent.customer_wallet.as_str())
            .append_pair(PARAM_MERCHANT, intent.merchant_address.as_str())
            .append_pair(PARAM_PROTOCOL, &intent.protocol)
            .append_pair(PARAM_NETWORK, &intent.network_key);
        if let Some(ref agent_id) = intent.agent_id {
            pairs.append_pair(PARAM_AGENT_ID, agent_id);
        }
        if let Some(ref order_id) = intent.order_id {
            pairs.append_pair(PARAM_ORDER_ID, order_id);
        }
    }

    url
}

/// Parse `input` as a URL and decode the intent from its query.
pub fn decode_url(input: &str, profile: &TerminalProfile) -> DecodeResult<PaymentIntent> {
    let url = Url::parse(input.trim())?;
    intent_from_url(&url, profile)
}

/// Decode the intent carried by an already-parsed URL.
pub fn intent_from_url(url: &Url, profile: &TerminalProfile) -> DecodeResult<PaymentIntent> {
    let mut raw = RawIntent::default();

    for (name, value) in url.query_pairs() {
        // Empty values count as absent
        if value.is_empty() {
            continue;
        }
        let slot = match name.as_ref() {
            PARAM_WALLET => &mut raw.wallet,
            PARAM_MERCHANT => &mut raw.merchant,
            PARAM_PROTOCOL => &mut raw.protocol,
            PARAM_NETWORK => &mut raw.network,
            PARAM_AGENT_ID => &mut raw.agent_id,
            PARAM_ORDER_ID => &mut raw.order_id,
            _ => continue,
        };
        // First occurrence wins
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    raw.resolve(profile)
}

/// Whether `url` carries a customer wallet parameter.
pub fn has_intent_params(url: &Url) -> bool {
    url.query_pairs()
        .any(|(name, value)| name == PARAM_WALLET && !value.is_empty())
}

/// Remove all intent parameters from `url`, keeping anything unrelated.
pub fn strip_intent_params(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| !INTENT_PARAMS.contains(&name.as_ref()))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    let mut stripped = url.clone();
    if kept.is_empty() {
        stripped.set_query(None);
    } else {
        let mut pairs = stripped.query_pairs_mut();
        pairs.clear();
        for (name, value) in &kept {
            pairs.append_pair(name, value);
        }
    }
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, DecodeError, DEFAULT_PROTOCOL};

    fn wallet() -> String {
        format!("0x{}", "A".repeat(40))
    }

    fn merchant() -> String {
        format!("0x{}", "B".repeat(40))
    }

    fn profile() -> TerminalProfile {
        TerminalProfile::new(
            Url::parse("https://shop.example/pay").unwrap(),
            format!("0x{}", "d".repeat(40)).parse().unwrap(),
            "sepolia",
        )
    }

    #[test]
    fn test_encode_url() {
        let intent = PaymentIntent::builder(wallet().parse().unwrap())
            .agent_id("research-agent")
            .build(&profile());
        let url = encode_url(&intent, &Url::parse("https://shop.example/pay?stale=1#frag").unwrap());

        assert_eq!(url.fragment(), None);
        assert_eq!(
            url.as_str(),
            format!(
                "https://shop.example/pay?wallet={}&merchant={}&protocol={}&network=sepolia&agentId=research-agent",
                wallet(),
                profile().merchant_address,
                DEFAULT_PROTOCOL
            )
        );
    }

    #[test]
    fn test_decode_url_with_all_params() {
        let input = format!(
            "https://x/?wallet={}&merchant={}&protocol=nfc&network=base-sepolia&agentId=a1&orderId=Order%2042",
            wallet(),
            merchant()
        );
        let intent = decode_url(&input, &profile()).unwrap();

        assert_eq!(intent.customer_wallet.as_str(), wallet());
        assert_eq!(intent.merchant_address.as_str(), merchant());
        assert_eq!(intent.protocol, "nfc");
        assert_eq!(intent.network_key, "base-sepolia");
        assert_eq!(intent.agent_id.as_deref(), Some("a1"));
        assert_eq!(intent.order_id.as_deref(), Some("Order 42"));
    }

    #[test]
    fn test_decode_url_applies_defaults() {
        let input = format!("https://x/?wallet={}", wallet());
        let intent = decode_url(&input, &profile()).unwrap();

        assert_eq!(intent.merchant_address, profile().merchant_address);
        assert_eq!(intent.protocol, DEFAULT_PROTOCOL);
        assert_eq!(intent.network_key, "sepolia");
    }

    #[test]
    fn test_missing_wallet() {
        let input = format!("https://x/?merchant={}&network=sepolia", merchant());
        assert!(matches!(decode_url(&input, &profile()), Err(DecodeError::MissingWallet)));

        let empty = "https://x/?wallet=&network=sepolia";
        assert!(matches!(decode_url(empty, &profile()), Err(DecodeError::MissingWallet)));
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(
            decode_url("not a url", &profile()),
            Err(DecodeError::MalformedUrl(_))
        ));
    }

    #[test]
    fn test_invalid_wallet() {
        let input = "https://x/?wallet=0x1234";
        assert!(matches!(
            decode_url(input, &profile()),
            Err(DecodeError::InvalidAddress(ref a)) if a == "0x1234"
        ));
    }

    #[test]
    fn test_padded_wallet_is_rejected() {
        let input = format!("https://x/?wallet=%20%20{}%20", wallet());
        assert!(matches!(
            decode_url(&input, &profile()),
            Err(DecodeError::InvalidAddress(ref a)) if *a == format!("  {} ", wallet())
        ));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let other = format!("0x{}", "c".repeat(40));
        let input = format!("https://x/?wallet={}&wallet={}", wallet(), other);
        let intent = decode_url(&input, &profile()).unwrap();
        assert_eq!(intent.customer_wallet.as_str(), wallet());
    }

    #[test]
    fn test_strip_intent_params() {
        let url = Url::parse(&format!(
            "https://shop.example/pay?lang=en&wallet={}&network=sepolia&agentId=a1",
            wallet()
        ))
        .unwrap();
        assert!(has_intent_params(&url));

        let stripped = strip_intent_params(&url);
        assert_eq!(stripped.as_str(), "https://shop.example/pay?lang=en");
        assert!(!has_intent_params(&stripped));

        let only_intent = Url::parse(&format!("https://shop.example/pay?wallet={}", wallet())).unwrap();
        assert_eq!(strip_intent_params(&only_intent).as_str(), "https://shop.example/pay");
    }

    #[test]
    fn test_address_roundtrip_is_exact() {
        let mixed: Address = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e".parse().unwrap();
        let intent = PaymentIntent::builder(mixed.clone()).build(&profile());
        let url = encode_url(&intent, &profile().origin);
        let decoded = decode_url(url.as_str(), &profile()).unwrap();
        assert_eq!(decoded.customer_wallet, mixed);
    }
}
