//! # Tap-to-pay tag codec
//!
//! Encodes and decodes payment intents for NFC tap-to-pay terminals.
//!
//! A customer's tag carries two records describing the same intent:
//!
//! 1. a URL record pointing at the terminal with the intent as query
//!    parameters (`wallet`, `merchant`, `protocol`, `network`, `agentId`)
//! 2. a text record holding the same fields as JSON plus metadata
//!
//! Readers accept either record. The same query parameters are also read
//! straight from the terminal's page URL.
//!
//! ```rust
//! use tappay_codec::{decode_records, encode, PaymentIntent, TerminalProfile};
//!
//! let profile = TerminalProfile::new(
//!     "https://shop.example/pay".parse().unwrap(),
//!     "0xdddddddddddddddddddddddddddddddddddddddd".parse().unwrap(),
//!     "sepolia",
//! );
//! let wallet = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e".parse().unwrap();
//! let intent = PaymentIntent::builder(wallet).build(&profile);
//!
//! let tag = encode(&intent, &profile);
//! let decoded = decode_records(&tag.records(), &profile).unwrap();
//! assert_eq!(decoded, intent);
//! ```

mod address;
mod error;
mod intent;
mod payload;
mod record;
mod uri;

use chrono::{DateTime, Utc};

pub use address::{Address, ADDRESS_HEX_LEN};
pub use error::{DecodeError, DecodeResult};
pub use intent::{PaymentIntent, PaymentIntentBuilder, TerminalProfile};
pub use payload::{decode_json, encode_json, PAYLOAD_TYPE};
pub use record::{decode_record, decode_records, EncodedTag, RecordKind, TagRecord};
pub use uri::{
    decode_url, encode_url, has_intent_params, intent_from_url, strip_intent_params,
    INTENT_PARAMS, PARAM_AGENT_ID, PARAM_MERCHANT, PARAM_NETWORK, PARAM_ORDER_ID,
    PARAM_PROTOCOL, PARAM_WALLET,
};

/// Protocol label used when a tag names none
pub const DEFAULT_PROTOCOL: &str = "x402";

/// Version tag written into JSON payloads
pub const PAYLOAD_VERSION: &str = "1.0";

/// Feature list advertised in JSON payloads
pub const PAYLOAD_FEATURES: &[&str] = &["nfc-payment", "wallet-connect", "multi-network"];

/// Encode `intent` into its URL and JSON forms, stamped with the current time.
pub fn encode(intent: &PaymentIntent, profile: &TerminalProfile) -> EncodedTag {
    encode_at(intent, profile, Utc::now())
}

/// Encode `intent` with an explicit creation timestamp.
pub fn encode_at(
    intent: &PaymentIntent,
    profile: &TerminalProfile,
    created_at: DateTime<Utc>,
) -> EncodedTag {
    EncodedTag {
        url: encode_url(intent, &profile.origin),
        json: encode_json(intent, created_at),
    }
}

/// Decode free-form text: a JSON object when it starts with `{`, a URL otherwise.
pub fn decode(input: &str, profile: &TerminalProfile) -> DecodeResult<PaymentIntent> {
    if input.trim_start().starts_with('{') {
        decode_json(input, profile)
    } else {
        decode_url(input, profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> TerminalProfile {
        TerminalProfile::new(
            "https://shop.example/pay".parse().unwrap(),
            format!("0x{}", "d".repeat(40)).parse().unwrap(),
            "sepolia",
        )
    }

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_PROTOCOL, "x402");
        assert_eq!(PAYLOAD_VERSION, "1.0");
    }

    #[test]
    fn test_encode_produces_two_records() {
        let intent = PaymentIntent::builder(format!("0x{}", "a".repeat(40)).parse().unwrap())
            .build(&profile());
        let records = encode(&intent, &profile()).records();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, RecordKind::Url);
        assert_eq!(records[1].kind, RecordKind::Text);
        assert_eq!(decode_record(&records[0], &profile()).unwrap(), intent);
        assert_eq!(decode_record(&records[1], &profile()).unwrap(), intent);
    }

    #[test]
    fn test_decode_detects_shape() {
        let wallet = format!("0x{}", "a".repeat(40));
        let from_json = decode(&format!(r#"  {{"wallet":"{}"}}"#, wallet), &profile()).unwrap();
        let from_url = decode(&format!("https://x/?wallet={}", wallet), &profile()).unwrap();
        assert_eq!(from_json, from_url);
    }
}
