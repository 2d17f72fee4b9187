//! JSON text-record encoding of payment intents
//!
//! The text record repeats the URL fields and adds descriptive metadata
//! for richer readers:
//!
//! ```json
//! {"version":"1.0","type":"payment-intent","wallet":"0x...","merchant":"0x...",
//!  "protocol":"x402","network":"sepolia","createdAt":"...","features":[...]}
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::intent::RawIntent;
use crate::{DecodeError, DecodeResult, PaymentIntent, TerminalProfile, PAYLOAD_FEATURES, PAYLOAD_VERSION};

/// Payload type tag
pub const PAYLOAD_TYPE: &str = "payment-intent";

const KEY_WALLET: &str = "wallet";
/// Wallet key written by older tags
const KEY_CUSTOMER_WALLET: &str = "customerWallet";
const KEY_MERCHANT: &str = "merchant";
const KEY_PROTOCOL: &str = "protocol";
const KEY_NETWORK: &str = "network";
const KEY_AGENT_ID: &str = "agentId";
const KEY_ORDER_ID: &str = "orderId";

/// Serialize the intent as a JSON text payload stamped with `created_at`.
pub fn encode_json(intent: &PaymentIntent, created_at: DateTime<Utc>) -> String {
    let mut payload = json!({
        "version": PAYLOAD_VERSION,
        "type": PAYLOAD_TYPE,
        KEY_WALLET: intent.customer_wallet.as_str(),
        KEY_MERCHANT: intent.merchant_address.as_str(),
        KEY_PROTOCOL: intent.protocol,
        KEY_NETWORK: intent.network_key,
        "createdAt": created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        "features": PAYLOAD_FEATURES,
    });

    if let Some(ref agent_id) = intent.agent_id {
        payload[KEY_AGENT_ID] = json!(agent_id);
    }
    if let Some(ref order_id) = intent.order_id {
        payload[KEY_ORDER_ID] = json!(order_id);
    }

    payload.to_string()
}

/// Decode an intent from a JSON text payload.
///
/// Both `wallet` and the older `customerWallet` spelling are accepted,
/// `wallet` taking precedence when both are present.
pub fn decode_json(input: &str, profile: &TerminalProfile) -> DecodeResult<PaymentIntent> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| DecodeError::NotJson(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| DecodeError::NotJson("expected a JSON object".to_string()))?;

    let raw = RawIntent {
        wallet: string_field(object, KEY_WALLET)
            .or_else(|| string_field(object, KEY_CUSTOMER_WALLET)),
        merchant: string_field(object, KEY_MERCHANT),
        protocol: string_field(object, KEY_PROTOCOL),
        network: string_field(object, KEY_NETWORK),
        agent_id: string_field(object, KEY_AGENT_ID),
        order_id: string_field(object, KEY_ORDER_ID),
    };

    raw.resolve(profile)
}

/// Non-empty string value under `key`; anything else counts as absent.
fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
