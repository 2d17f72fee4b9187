//! Payment flow controller
//!
//! Sequences tag acquisition, payment entry, wallet confirmation and the
//! final receipt:
//!
//! ```text
//! AgentSelect -> Scan -> Payment -> Confirm -> Success
//!       |                 ^  |         |          |
//!       +-----------------+  +-> Scan  |          +-> reset
//!                         ^------------+ failed
//! ```
//!
//! Every error is recorded as a dismissible operator notice and leaves the
//! controller in a state it can resume from. Nothing is retried
//! automatically.

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tappay_codec::{
    decode_records, encode, has_intent_params, intent_from_url, strip_intent_params, Address,
    DecodeError, EncodedTag, PaymentIntent, TerminalProfile,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::agent::{find_offering, AgentOffering};
use crate::amount::{format_amount, to_smallest_unit};
use crate::network::{network, NetworkConfig, DEFAULT_NETWORK};
use crate::state::{
    Checkout, ConnectionStatus, FlowState, FlowStep, Receipt, TransactionOutcome, TxStatus,
};
use crate::tag::{TagReadEvent, TagReadStream, TagSource};
use crate::wallet::{TransferRequest, Wallet};
use crate::{
    FlowError, FlowResult, MerchantOrder, NetworkSwitchError, TransferError, ValidationError,
    WalletError, WriteError,
};

/// Which flow variant the terminal runs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowMode {
    /// Scan a tag, take a payment
    #[default]
    Simple,
    /// Pick a priced offering first
    Agent(Vec<AgentOffering>),
}

/// Static terminal settings
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Merchant display name
    pub merchant_name: String,
    /// Default transfer destination
    pub merchant_address: Address,
    /// The terminal's own origin and path
    pub origin: Url,
    /// Initially selected network
    pub network_key: String,
    /// Flow variant
    pub mode: FlowMode,
}

impl FlowConfig {
    /// Simple-mode config on the default network
    pub fn new(merchant_name: impl Into<String>, merchant_address: Address, origin: Url) -> Self {
        Self {
            merchant_name: merchant_name.into(),
            merchant_address,
            origin,
            network_key: DEFAULT_NETWORK.to_string(),
            mode: FlowMode::Simple,
        }
    }

    /// Set the initial network
    pub fn network(mut self, key: impl Into<String>) -> Self {
        self.network_key = key.into();
        self
    }

    /// Run the agent-payment variant with `catalog`
    pub fn agent_mode(mut self, catalog: Vec<AgentOffering>) -> Self {
        self.mode = FlowMode::Agent(catalog);
        self
    }
}

fn wrong_step(expected: FlowStep, actual: FlowStep) -> ValidationError {
    ValidationError::WrongStep { expected, actual }
}

/// The payment flow state machine
pub struct PaymentFlow {
    config: FlowConfig,
    wallet: Arc<dyn Wallet>,
    tags: Arc<dyn TagSource>,
    state: FlowState,
    network: &'static NetworkConfig,
    selected_agent: Option<AgentOffering>,
    page_url: Url,
    notice: Option<String>,
}

impl std::fmt::Debug for PaymentFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentFlow")
            .field("state", &self.state)
            .field("network", &self.network.key)
            .field("selected_agent", &self.selected_agent)
            .field("page_url", &self.page_url.as_str())
            .field("notice", &self.notice)
            .finish_non_exhaustive()
    }
}

impl PaymentFlow {
    /// Create a controller in its initial state
    pub fn new(
        config: FlowConfig,
        wallet: Arc<dyn Wallet>,
        tags: Arc<dyn TagSource>,
    ) -> FlowResult<Self> {
        let selected = network(&config.network_key)
            .ok_or_else(|| FlowError::UnknownNetwork(config.network_key.clone()))?;
        let state = match config.mode {
            FlowMode::Simple => FlowState::Scan,
            FlowMode::Agent(_) => FlowState::AgentSelect,
        };

        info!(
            "Payment flow ready for {} ({}) on {}",
            config.merchant_name,
            config.merchant_address.display_short(),
            selected
        );

        Ok(Self {
            page_url: config.origin.clone(),
            config,
            wallet,
            tags,
            state,
            network: selected,
            selected_agent: None,
            notice: None,
        })
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    /// Current state
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Current step
    pub fn step(&self) -> FlowStep {
        self.state.step()
    }

    /// Pending operator message
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Clear the operator message
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// The page address as currently shown
    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    /// Selected network
    pub fn selected_network(&self) -> &'static NetworkConfig {
        self.network
    }

    /// Selected agent offering
    pub fn selected_agent(&self) -> Option<&AgentOffering> {
        self.selected_agent.as_ref()
    }

    /// Offerings available in agent mode; empty in simple mode
    pub fn offerings(&self) -> &[AgentOffering] {
        match self.config.mode {
            FlowMode::Agent(ref catalog) => catalog,
            FlowMode::Simple => &[],
        }
    }

    /// Defaults applied to intents read at this terminal
    pub fn profile(&self) -> TerminalProfile {
        TerminalProfile::new(
            self.config.origin.clone(),
            self.config.merchant_address.clone(),
            self.network.key,
        )
    }

    fn initial_state(&self) -> FlowState {
        match self.config.mode {
            FlowMode::Simple => FlowState::Scan,
            FlowMode::Agent(_) => FlowState::AgentSelect,
        }
    }

    fn is_idle(&self) -> bool {
        matches!(self.state, FlowState::Scan | FlowState::AgentSelect)
    }

    fn expect_step(&self, expected: FlowStep) -> Result<(), ValidationError> {
        if self.step() == expected {
            Ok(())
        } else {
            Err(wrong_step(expected, self.step()))
        }
    }

    fn take_state(&mut self) -> FlowState {
        std::mem::replace(&mut self.state, FlowState::Scan)
    }

    fn surface<E: std::fmt::Display>(&mut self, error: &E) {
        let message = error.to_string();
        warn!("{}", message);
        self.notice = Some(message);
    }

    /// Registry entry paid on for `intent`; unknown keys fall back to the
    /// selected network.
    fn target_network(&self, intent: &PaymentIntent) -> &'static NetworkConfig {
        network(&intent.network_key).unwrap_or(self.network)
    }

    fn enter_payment(&mut self, mut intent: PaymentIntent) {
        if network(&intent.network_key).is_none() {
            warn!(
                "Intent names unknown network {}, paying on {}",
                intent.network_key, self.network.key
            );
        }
        let target = self.target_network(&intent);

        // The intent's offering decides the price; without one the
        // operator's selection is stamped onto the intent.
        match intent.agent_id.as_deref() {
            Some(id) => {
                self.selected_agent = find_offering(self.offerings(), id).cloned();
                if self.selected_agent.is_none() && !self.offerings().is_empty() {
                    warn!("Intent names unknown agent {}, amount left for the operator", id);
                }
            }
            None => {
                if let Some(ref agent) = self.selected_agent {
                    intent.agent_id = Some(agent.id.clone());
                }
            }
        }

        let mut order = MerchantOrder::new(
            self.config.merchant_name.clone(),
            intent.merchant_address.clone(),
            target.currency_symbol,
        );
        order.order_id = intent.order_id.clone();
        if let Some(ref agent) = self.selected_agent {
            order.amount = agent.price.clone();
        }

        info!(
            "Payment started for customer {} on {}",
            intent.customer_wallet.display_short(),
            target.key
        );
        self.state = FlowState::Payment(Checkout {
            intent,
            order,
            last_error: None,
        });
    }

    // ---------------------------------------------------------------
    // Intent acquisition
    // ---------------------------------------------------------------

    /// Read an intent from the page address on load.
    ///
    /// Returns `Ok(true)` when an intent was found and the flow moved to
    /// payment, `Ok(false)` when the address carries no wallet.
    pub fn load_page_url(&mut self, input: &str) -> FlowResult<bool> {
        self.expect_idle()?;

        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(e) => {
                let e = DecodeError::from(e);
                self.surface(&e);
                return Err(e.into());
            }
        };
        self.page_url = url;

        if !has_intent_params(&self.page_url) {
            debug!("Page URL carries no payment intent");
            return Ok(false);
        }

        match intent_from_url(&self.page_url, &self.profile()) {
            Ok(intent) => {
                info!("Payment intent loaded from page URL");
                self.enter_payment(intent);
                Ok(true)
            }
            Err(e) => {
                self.surface(&e);
                Err(e.into())
            }
        }
    }

    fn expect_idle(&self) -> Result<(), ValidationError> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(wrong_step(self.initial_state().step(), self.step()))
        }
    }

    /// Choose an agent offering
    pub fn select_agent(&mut self, id: &str) -> Result<(), ValidationError> {
        self.expect_step(FlowStep::AgentSelect)?;
        let offering = find_offering(self.offerings(), id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownAgent(id.to_string()))?;
        info!("Selected agent {} at {}", offering.id, offering.price);
        self.selected_agent = Some(offering);
        Ok(())
    }

    /// Leave agent selection for tag scanning
    pub fn proceed_to_scan(&mut self) -> Result<(), ValidationError> {
        self.expect_step(FlowStep::AgentSelect)?;
        self.state = FlowState::Scan;
        Ok(())
    }

    /// Skip scanning and charge the connected wallet directly
    pub async fn skip_to_payment(&mut self) -> Result<(), ValidationError> {
        self.expect_step(FlowStep::AgentSelect)?;
        let account = match self.wallet.active_account().await {
            Some(account) => account,
            None => {
                let e = ValidationError::WalletNotConnected;
                self.surface(&e);
                return Err(e);
            }
        };
        let intent = self.intent_for(account);
        self.enter_payment(intent);
        Ok(())
    }

    /// Use an operator-typed customer address instead of a tag
    pub fn enter_customer(&mut self, customer: &str) -> Result<(), ValidationError> {
        self.expect_step(FlowStep::Scan)?;
        let account: Address = customer
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidAddress(customer.to_string()))?;
        let intent = self.intent_for(account);
        self.enter_payment(intent);
        Ok(())
    }

    fn intent_for(&self, customer: Address) -> PaymentIntent {
        let mut builder = PaymentIntent::builder(customer);
        if let Some(ref agent) = self.selected_agent {
            builder = builder.agent_id(agent.id.clone());
        }
        builder.build(&self.profile())
    }

    /// Start tag acquisition.
    ///
    /// Events from the returned stream go to [`PaymentFlow::handle_tag_read`].
    pub async fn start_scan(&mut self) -> FlowResult<TagReadStream> {
        self.expect_step(FlowStep::Scan)?;
        match self.tags.scan().await {
            Ok(stream) => {
                info!("Waiting for tag");
                Ok(stream)
            }
            Err(e) => {
                self.surface(&e);
                Err(e.into())
            }
        }
    }

    /// Process one tag read. Reads arriving outside `Scan` are ignored.
    pub fn handle_tag_read(&mut self, event: TagReadEvent) -> FlowResult<bool> {
        if self.step() != FlowStep::Scan {
            debug!("Ignoring tag read while {}", self.step());
            return Ok(false);
        }

        let records = match event {
            Ok(records) => records,
            Err(e) => {
                self.surface(&e);
                return Err(e.into());
            }
        };

        match decode_records(&records, &self.profile()) {
            Ok(intent) => {
                info!("Read payment tag with {} record(s)", records.len());
                self.enter_payment(intent);
                Ok(true)
            }
            Err(e) => {
                self.surface(&e);
                Err(e.into())
            }
        }
    }

    /// Scan and handle the first tag presented
    pub async fn scan_once(&mut self) -> FlowResult<bool> {
        let mut stream = self.start_scan().await?;
        match stream.next().await {
            Some(event) => self.handle_tag_read(event),
            None => Ok(false),
        }
    }

    /// Encode an intent for `customer` and write it to the presented tag.
    ///
    /// The flow state is left as it is.
    pub async fn write_tag(&mut self, customer: &str) -> Result<EncodedTag, WriteError> {
        let account: Address = match customer.trim().parse() {
            Ok(account) => account,
            Err(_) => {
                let e = WriteError::InvalidAddress(customer.to_string());
                self.surface(&e);
                return Err(e);
            }
        };

        let profile = self.profile();
        let tag = encode(&self.intent_for(account), &profile);

        if let Err(e) = self.tags.write(&tag.records()).await {
            let e = WriteError::from(e);
            self.surface(&e);
            return Err(e);
        }

        info!("Wrote payment tag: {}", tag.url);
        Ok(tag)
    }

    // ---------------------------------------------------------------
    // Payment entry
    // ---------------------------------------------------------------

    /// Drop the current intent and wait for another tag
    pub fn back_to_scan(&mut self) -> Result<(), ValidationError> {
        self.expect_step(FlowStep::Payment)?;
        self.state = FlowState::Scan;
        Ok(())
    }

    /// Set the order amount as typed
    pub fn set_amount(&mut self, amount: &str) -> Result<(), ValidationError> {
        match self.state {
            FlowState::Payment(ref mut checkout) => {
                checkout.order.amount = amount.trim().to_string();
                Ok(())
            }
            ref other => Err(wrong_step(FlowStep::Payment, other.step())),
        }
    }

    /// Set or clear the order reference
    pub fn set_order_id(&mut self, order_id: &str) -> Result<(), ValidationError> {
        match self.state {
            FlowState::Payment(ref mut checkout) => {
                let order_id = order_id.trim();
                checkout.order.order_id = (!order_id.is_empty()).then(|| order_id.to_string());
                Ok(())
            }
            ref other => Err(wrong_step(FlowStep::Payment, other.step())),
        }
    }

    /// Compare the connected wallet with the customer's. Display only.
    pub async fn connection_status(&self) -> ConnectionStatus {
        let Some(active) = self.wallet.active_account().await else {
            return ConnectionStatus::Disconnected;
        };
        match self.state.intent() {
            Some(intent) if intent.customer_wallet.same_account(&active) => ConnectionStatus::Matches,
            Some(_) => ConnectionStatus::Different(active),
            None => ConnectionStatus::Connected(active),
        }
    }

    // ---------------------------------------------------------------
    // Submission
    // ---------------------------------------------------------------

    async fn prepare_transfer(&self) -> Result<TransferRequest, ValidationError> {
        let checkout = match self.state {
            FlowState::Payment(ref checkout) => checkout,
            ref other => return Err(wrong_step(FlowStep::Payment, other.step())),
        };

        if !checkout.order.has_amount() {
            return Err(ValidationError::MissingAmount);
        }
        let value = to_smallest_unit(&checkout.order.amount)?;
        let from = self
            .wallet
            .active_account()
            .await
            .ok_or(ValidationError::WalletNotConnected)?;

        Ok(TransferRequest {
            from,
            to: checkout.order.address.clone(),
            value,
            chain_id: self.target_network(&checkout.intent).chain_id,
        })
    }

    /// Validate the order and move to `Confirm`.
    ///
    /// Returns the transfer the wallet must now execute; its result goes
    /// to [`PaymentFlow::finish_transfer`]. On error nothing changes.
    pub async fn begin_submit(&mut self) -> Result<TransferRequest, ValidationError> {
        let request = match self.prepare_transfer().await {
            Ok(request) => request,
            Err(e) => {
                self.surface(&e);
                return Err(e);
            }
        };

        self.state = match self.take_state() {
            FlowState::Payment(checkout) => FlowState::Confirm(Checkout {
                last_error: None,
                ..checkout
            }),
            other => other,
        };
        self.notice = None;

        info!(
            "Awaiting wallet confirmation for {} to {} on chain {}",
            format_amount(request.value, self.network.decimals()),
            request.to.display_short(),
            request.chain_id
        );
        Ok(request)
    }

    /// Record the wallet's answer to the outstanding transfer.
    ///
    /// Success moves to `Success`; failure returns to `Payment` with the
    /// entered details intact.
    pub fn finish_transfer(
        &mut self,
        result: Result<String, WalletError>,
    ) -> Result<TransactionOutcome, TransferError> {
        let checkout = match self.take_state() {
            FlowState::Confirm(checkout) => checkout,
            other => {
                self.state = other;
                warn!("Transfer result arrived while {}", self.step());
                return Err(TransferError::NoPendingTransfer);
            }
        };

        match result {
            Ok(hash) => {
                let target = self.target_network(&checkout.intent);
                let outcome = TransactionOutcome {
                    explorer_url: target.tx_url(&hash),
                    transaction_hash: hash,
                    status: TxStatus::Confirmed,
                    timestamp: Utc::now(),
                };
                info!("Transfer confirmed: {}", outcome.transaction_hash);
                self.state = FlowState::Success(Receipt {
                    intent: checkout.intent,
                    order: checkout.order,
                    outcome: outcome.clone(),
                });
                Ok(outcome)
            }
            Err(e) => {
                let error = TransferError::from(e);
                self.surface(&error);
                self.state = FlowState::Payment(Checkout {
                    last_error: Some(error.to_string()),
                    ..checkout
                });
                Err(error)
            }
        }
    }

    /// Validate, hand the transfer to the wallet once, and record the result
    pub async fn submit(&mut self) -> FlowResult<TransactionOutcome> {
        let request = self.begin_submit().await?;
        let result = self.wallet.send_transfer(&request).await;
        Ok(self.finish_transfer(result)?)
    }

    /// Clear everything and return to the initial state
    pub fn reset(&mut self) {
        self.state = self.initial_state();
        self.selected_agent = None;
        self.notice = None;
        self.page_url = strip_intent_params(&self.page_url);
        info!("Flow reset to {}", self.step());
    }

    // ---------------------------------------------------------------
    // Networks
    // ---------------------------------------------------------------

    /// Switch the wallet to `key`, adding the chain if the wallet lacks it.
    ///
    /// While paying, the checkout is retargeted to the new network.
    pub async fn select_network(&mut self, key: &str) -> Result<(), NetworkSwitchError> {
        let Some(target) = network(key) else {
            let e = NetworkSwitchError::UnknownNetwork(key.to_string());
            self.surface(&e);
            return Err(e);
        };

        if let Err(e) = self.request_switch(target).await {
            self.surface(&e);
            return Err(e);
        }

        self.network = target;
        if let FlowState::Payment(ref mut checkout) = self.state {
            checkout.intent.network_key = target.key.to_string();
            checkout.order.currency = target.currency_symbol.to_string();
        }
        info!("Switched to {}", target);
        Ok(())
    }

    async fn request_switch(&self, target: &NetworkConfig) -> Result<(), NetworkSwitchError> {
        if self.wallet.active_chain().await == Some(target.chain_id) {
            debug!("Wallet already on {}", target);
            return Ok(());
        }
        match self.wallet.switch_chain(target.chain_id).await {
            Ok(()) => Ok(()),
            Err(WalletError::UnrecognizedChain(_)) => {
                info!("Wallet lacks {}, requesting add", target);
                self.wallet.add_chain(&target.chain_parameters()).await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
