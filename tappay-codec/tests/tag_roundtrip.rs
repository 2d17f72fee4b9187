//! Property tests for tag encoding.

use proptest::prelude::*;
use tappay_codec::{
    decode_json, decode_records, decode_url, encode, Address, DecodeError, PaymentIntent,
    TagRecord, TerminalProfile,
};

fn profile() -> TerminalProfile {
    TerminalProfile::new(
        "https://terminal.example/checkout".parse().unwrap(),
        format!("0x{}", "b".repeat(40)).parse().unwrap(),
        "sepolia",
    )
}

proptest! {
    #[test]
    fn wallet_survives_both_encodings(wallet in "0x[0-9a-fA-F]{40}") {
        let address: Address = wallet.parse().unwrap();
        let intent = PaymentIntent::builder(address).build(&profile());
        let tag = encode(&intent, &profile());

        let from_url = decode_url(tag.url.as_str(), &profile()).unwrap();
        let from_json = decode_json(&tag.json, &profile()).unwrap();
        prop_assert_eq!(from_url.customer_wallet.as_str(), wallet.as_str());
        prop_assert_eq!(from_json.customer_wallet.as_str(), wallet.as_str());
    }

    #[test]
    fn optional_fields_survive(
        wallet in "0x[0-9a-fA-F]{40}",
        agent in "[a-z0-9 &=?#-]{1,24}",
        order in "[A-Za-z0-9 /%+-]{1,24}",
    ) {
        let intent = PaymentIntent::builder(wallet.parse().unwrap())
            .agent_id(agent)
            .order_id(order)
            .network("base-sepolia")
            .build(&profile());

        let records = encode(&intent, &profile()).records();
        prop_assert_eq!(decode_records(&records[..1], &profile()).unwrap(), intent.clone());
        prop_assert_eq!(decode_records(&records[1..], &profile()).unwrap(), intent);
    }

    #[test]
    fn url_without_wallet_is_rejected(merchant in "0x[0-9a-f]{40}", network in "[a-z-]{1,12}") {
        let url = format!("https://x/?merchant={}&network={}", merchant, network);
        prop_assert!(matches!(decode_url(&url, &profile()), Err(DecodeError::MissingWallet)));
    }

    #[test]
    fn arbitrary_text_never_panics(text in ".*") {
        let _ = decode_json(&text, &profile());
        let _ = decode_records(&[TagRecord::text(text.clone()), TagRecord::url(text)], &profile());
    }
}

#[test]
fn page_url_scenario() {
    let wallet = format!("0x{}", "A".repeat(40));
    let merchant = format!("0x{}", "B".repeat(40));
    let url = format!("https://x/?wallet={}&merchant={}", wallet, merchant);

    let intent = decode_url(&url, &profile()).unwrap();
    assert_eq!(intent.customer_wallet.as_str(), wallet);
    assert_eq!(intent.merchant_address.as_str(), merchant);
}
