//! NFC record sets

use serde::{Deserialize, Serialize};
use url::Url;

use crate::payload::decode_json;
use crate::uri::decode_url;
use crate::{DecodeError, DecodeResult, PaymentIntent, TerminalProfile};

/// Type of a single tag record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordKind {
    /// A URL record
    Url,
    /// A text record; payment tags carry JSON here
    Text,
    /// Any other record type, kept verbatim
    Unknown(String),
}

impl RecordKind {
    /// Get string representation
    pub fn as_str(&self) -> &str {
        match self {
            RecordKind::Url => "url",
            RecordKind::Text => "text",
            RecordKind::Unknown(kind) => kind,
        }
    }
}

impl From<String> for RecordKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "url" => RecordKind::Url,
            "text" => RecordKind::Text,
            _ => RecordKind::Unknown(s),
        }
    }
}

impl From<RecordKind> for String {
    fn from(kind: RecordKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed record on a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    /// Record type
    #[serde(rename = "recordType")]
    pub kind: RecordKind,
    /// Record payload as text
    pub data: String,
}

impl TagRecord {
    /// A URL record
    pub fn url(data: impl Into<String>) -> Self {
        Self {
            kind: RecordKind::Url,
            data: data.into(),
        }
    }

    /// A text record
    pub fn text(data: impl Into<String>) -> Self {
        Self {
            kind: RecordKind::Text,
            data: data.into(),
        }
    }
}

/// The two redundant serializations of one intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTag {
    /// Terminal URL with the intent as query parameters
    pub url: Url,
    /// JSON text payload
    pub json: String,
}

impl EncodedTag {
    /// The record set written to a tag: the URL record, then the text record.
    pub fn records(&self) -> Vec<TagRecord> {
        vec![TagRecord::url(self.url.as_str()), TagRecord::text(self.json.clone())]
    }
}

/// Decode a single record according to its type.
pub fn decode_record(record: &TagRecord, profile: &TerminalProfile) -> DecodeResult<PaymentIntent> {
    match record.kind {
        RecordKind::Url => decode_url(&record.data, profile),
        RecordKind::Text => decode_json(&record.data, profile),
        RecordKind::Unknown(ref kind) => Err(DecodeError::UnsupportedRecord(kind.clone())),
    }
}

/// Decode a tag's record set.
///
/// Records are tried in order and the first one that decodes wins. A
/// record that fails does not stop later records from being tried; when
/// none succeeds the error from the last record is returned.
pub fn decode_records(records: &[TagRecord], profile: &TerminalProfile) -> DecodeResult<PaymentIntent> {
    let mut last_error = DecodeError::NoPaymentRecord;

    for record in records {
        match decode_record(record, profile) {
            Ok(intent) => return Ok(intent),
            Err(e) => last_error = e,
        }
    }

    Err(last_error)
}
