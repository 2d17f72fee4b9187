//! Simulated hardware and wallet
//!
//! Everything here fabricates data. It is compiled only for tests and
//! with the `simulation` feature, and nothing outside this module picks
//! these types on its own: a host has to wire them in explicitly.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tappay_codec::{encode, Address, PaymentIntent, TagRecord, TerminalProfile};
use tracing::{debug, warn};

use crate::network::ChainParameters;
use crate::tag::{TagReadEvent, TagReadStream, TagSource};
use crate::wallet::{TransferRequest, Wallet};
use crate::{HardwareError, WalletError};

/// Customer wallet written to the demo tag
pub const DEMO_CUSTOMER_WALLET: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

/// Delay before the demo tag "arrives"
pub const DEFAULT_DEMO_DELAY: Duration = Duration::from_millis(1500);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct MemoryTags {
    available: bool,
    taps: VecDeque<TagReadEvent>,
    written: Vec<Vec<TagRecord>>,
    write_failure: Option<String>,
}

/// In-memory tag reader: queued taps are delivered on the next scan.
#[derive(Debug)]
pub struct MemoryTagSource {
    inner: Mutex<MemoryTags>,
}

impl Default for MemoryTagSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTagSource {
    /// A reader with hardware present and no tags queued
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryTags {
                available: true,
                taps: VecDeque::new(),
                written: Vec::new(),
                write_failure: None,
            }),
        }
    }

    /// A reader that reports missing hardware
    pub fn unavailable() -> Self {
        let source = Self::new();
        lock(&source.inner).available = false;
        source
    }

    /// Queue a tag for the next scan
    pub fn tap(&self, records: Vec<TagRecord>) {
        lock(&self.inner).taps.push_back(Ok(records));
    }

    /// Queue a failed read for the next scan
    pub fn tap_error(&self, error: HardwareError) {
        lock(&self.inner).taps.push_back(Err(error));
    }

    /// Make the next write fail with `message`
    pub fn fail_next_write(&self, message: impl Into<String>) {
        lock(&self.inner).write_failure = Some(message.into());
    }

    /// Record sets written so far
    pub fn written(&self) -> Vec<Vec<TagRecord>> {
        lock(&self.inner).written.clone()
    }
}

#[async_trait]
impl TagSource for MemoryTagSource {
    async fn scan(&self) -> Result<TagReadStream, HardwareError> {
        let mut inner = lock(&self.inner);
        if !inner.available {
            return Err(HardwareError::Unavailable);
        }
        let taps: Vec<TagReadEvent> = inner.taps.drain(..).collect();
        Ok(stream::iter(taps).boxed())
    }

    async fn write(&self, records: &[TagRecord]) -> Result<(), HardwareError> {
        let mut inner = lock(&self.inner);
        if !inner.available {
            return Err(HardwareError::Unavailable);
        }
        if let Some(message) = inner.write_failure.take() {
            return Err(HardwareError::Write(message));
        }
        inner.written.push(records.to_vec());
        Ok(())
    }
}

/// Produces one fixed demo tag after a delay. Never writes.
#[derive(Debug, Clone)]
pub struct DemoTagSource {
    records: Vec<TagRecord>,
    delay: Duration,
}

impl DemoTagSource {
    /// Demo tag for [`DEMO_CUSTOMER_WALLET`] paying the profile's merchant
    pub fn new(profile: &TerminalProfile, delay: Duration) -> Result<Self, tappay_codec::DecodeError> {
        let wallet: Address = DEMO_CUSTOMER_WALLET.parse()?;
        let intent = PaymentIntent::builder(wallet).build(profile);
        Ok(Self::with_records(encode(&intent, profile).records(), delay))
    }

    /// Demo tag with explicit records
    pub fn with_records(records: Vec<TagRecord>, delay: Duration) -> Self {
        Self { records, delay }
    }
}

#[async_trait]
impl TagSource for DemoTagSource {
    async fn scan(&self) -> Result<TagReadStream, HardwareError> {
        let records = self.records.clone();
        let delay = self.delay;
        Ok(stream::once(async move {
            tokio::time::sleep(delay).await;
            debug!("Demo tag delivered after {:?}", delay);
            Ok::<_, HardwareError>(records)
        })
        .boxed())
    }

    async fn write(&self, _records: &[TagRecord]) -> Result<(), HardwareError> {
        Err(HardwareError::Unavailable)
    }
}

/// Real reader first; the demo tag only when the hardware is missing.
///
/// Read failures from present hardware are passed through untouched, and
/// writes always go to the real reader.
#[derive(Debug)]
pub struct FallbackTagSource<P> {
    primary: P,
    demo: DemoTagSource,
}

impl<P: TagSource> FallbackTagSource<P> {
    /// Wrap `primary` with a demo fallback
    pub fn new(primary: P, demo: DemoTagSource) -> Self {
        Self { primary, demo }
    }
}

#[async_trait]
impl<P: TagSource> TagSource for FallbackTagSource<P> {
    async fn scan(&self) -> Result<TagReadStream, HardwareError> {
        match self.primary.scan().await {
            Err(HardwareError::Unavailable) => {
                warn!("NFC hardware unavailable, simulating a demo tag");
                self.demo.scan().await
            }
            other => other,
        }
    }

    async fn write(&self, records: &[TagRecord]) -> Result<(), HardwareError> {
        self.primary.write(records).await
    }
}

#[derive(Debug)]
struct WalletInner {
    account: Option<Address>,
    chain_id: u64,
    known_chains: HashSet<u64>,
    added_chains: Vec<ChainParameters>,
    transfers: Vec<TransferRequest>,
    transfer_failure: Option<WalletError>,
    switch_failure: Option<WalletError>,
    tx_counter: u64,
}

/// In-memory wallet for demos and tests
///
/// Transfers are recorded and answered with sequential fake hashes.
#[derive(Debug)]
pub struct MemoryWallet {
    inner: Mutex<WalletInner>,
}

impl MemoryWallet {
    /// A disconnected wallet sitting on `chain_id`
    pub fn new(chain_id: u64) -> Self {
        Self {
            inner: Mutex::new(WalletInner {
                account: None,
                chain_id,
                known_chains: HashSet::from([chain_id]),
                added_chains: Vec::new(),
                transfers: Vec::new(),
                transfer_failure: None,
                switch_failure: None,
                tx_counter: 0,
            }),
        }
    }

    /// A wallet with `account` connected on `chain_id`
    pub fn connected(account: Address, chain_id: u64) -> Self {
        let wallet = Self::new(chain_id);
        wallet.connect(account);
        wallet
    }

    /// Connect an account
    pub fn connect(&self, account: Address) {
        lock(&self.inner).account = Some(account);
    }

    /// Disconnect the account
    pub fn disconnect(&self) {
        lock(&self.inner).account = None;
    }

    /// Mark a chain as already known to the wallet
    pub fn know_chain(&self, chain_id: u64) {
        lock(&self.inner).known_chains.insert(chain_id);
    }

    /// Make the next transfer fail
    pub fn fail_next_transfer(&self, error: WalletError) {
        lock(&self.inner).transfer_failure = Some(error);
    }

    /// Make the next switch or add request fail
    pub fn fail_next_switch(&self, error: WalletError) {
        lock(&self.inner).switch_failure = Some(error);
    }

    /// Transfers submitted so far
    pub fn transfers(&self) -> Vec<TransferRequest> {
        lock(&self.inner).transfers.clone()
    }

    /// Add-chain requests received so far
    pub fn added_chains(&self) -> Vec<ChainParameters> {
        lock(&self.inner).added_chains.clone()
    }

    /// Current chain
    pub fn chain_id(&self) -> u64 {
        lock(&self.inner).chain_id
    }
}

#[async_trait]
impl Wallet for MemoryWallet {
    async fn active_account(&self) -> Option<Address> {
        lock(&self.inner).account.clone()
    }

    async fn active_chain(&self) -> Option<u64> {
        Some(lock(&self.inner).chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let mut inner = lock(&self.inner);
        if let Some(error) = inner.switch_failure.take() {
            return Err(error);
        }
        if !inner.known_chains.contains(&chain_id) {
            return Err(WalletError::UnrecognizedChain(chain_id));
        }
        inner.chain_id = chain_id;
        Ok(())
    }

    async fn add_chain(&self, params: &ChainParameters) -> Result<(), WalletError> {
        let mut inner = lock(&self.inner);
        if let Some(error) = inner.switch_failure.take() {
            return Err(error);
        }
        let chain_id = u64::from_str_radix(params.chain_id.trim_start_matches("0x"), 16)
            .map_err(|e| WalletError::Provider(format!("bad chain id {}: {}", params.chain_id, e)))?;
        inner.known_chains.insert(chain_id);
        inner.added_chains.push(params.clone());
        inner.chain_id = chain_id;
        Ok(())
    }

    async fn send_transfer(&self, request: &TransferRequest) -> Result<String, WalletError> {
        let mut inner = lock(&self.inner);
        if inner.account.is_none() {
            return Err(WalletError::NotConnected);
        }
        // Failed attempts are recorded too
        inner.transfers.push(request.clone());
        if let Some(error) = inner.transfer_failure.take() {
            return Err(error);
        }
        inner.tx_counter += 1;
        Ok(format!("0x{:064x}", inner.tx_counter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn profile() -> TerminalProfile {
        TerminalProfile::new(
            Url::parse("https://shop.example/pay").unwrap(),
            format!("0x{}", "d".repeat(40)).parse().unwrap(),
            "sepolia",
        )
    }

    #[tokio::test]
    async fn test_memory_source_is_restartable() {
        let source = MemoryTagSource::new();
        source.tap(vec![TagRecord::text("{}")]);
        source.tap_error(HardwareError::Read("moved too fast".into()));

        let events: Vec<_> = source.scan().await.unwrap().collect().await;
        assert_eq!(events.len(), 2);
        assert!(events[1].is_err());

        // A second acquisition starts empty
        let events: Vec<_> = source.scan().await.unwrap().collect().await;
        assert!(events.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_only_on_missing_hardware() {
        let demo = DemoTagSource::new(&profile(), DEFAULT_DEMO_DELAY).unwrap();

        let missing = FallbackTagSource::new(MemoryTagSource::unavailable(), demo.clone());
        let events: Vec<_> = missing.scan().await.unwrap().collect().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().len(), 2);
        assert_eq!(missing.write(&[]).await, Err(HardwareError::Unavailable));

        let present = FallbackTagSource::new(MemoryTagSource::new(), demo);
        let events: Vec<_> = present.scan().await.unwrap().collect().await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_memory_wallet_hashes() {
        let account: Address = DEMO_CUSTOMER_WALLET.parse().unwrap();
        let wallet = MemoryWallet::connected(account.clone(), 1);
        let request = TransferRequest {
            from: account.clone(),
            to: account,
            value: 1,
            chain_id: 1,
        };

        let first = wallet.send_transfer(&request).await.unwrap();
        let second = wallet.send_transfer(&request).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(first.len(), 66);
        assert_eq!(wallet.transfers().len(), 2);
    }
}
