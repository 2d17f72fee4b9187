//! Tag reader/writer capability

use async_trait::async_trait;
use futures::stream::BoxStream;
use tappay_codec::TagRecord;

use crate::HardwareError;

/// One tag read: the tag's record set, or the failure that replaced it
pub type TagReadEvent = Result<Vec<TagRecord>, HardwareError>;

/// Stream of tag reads produced by one acquisition
pub type TagReadStream = BoxStream<'static, TagReadEvent>;

/// Access to NFC hardware.
///
/// Each call to [`TagSource::scan`] starts a new acquisition; the stream
/// yields one event per tag presented and may yield any number of them.
#[async_trait]
pub trait TagSource: Send + Sync {
    /// Start reading tags
    async fn scan(&self) -> Result<TagReadStream, HardwareError>;

    /// Write a record set to the tag currently presented
    async fn write(&self, records: &[TagRecord]) -> Result<(), HardwareError>;
}
