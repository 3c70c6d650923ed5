//! In-memory implementations of the platform and channel traits.
//!
//! **FOR TESTING ONLY.** None of these talk to a browser or a wallet; they record what the
//! adapter asks of them and answer from a script. Both the unit tests and the integration tests
//! under `tests/` build adapters on top of them.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use tokio::sync::oneshot;

use crate::channel::{
    AccountChangedListener, ChannelFactory, HandshakeCallback, HandshakeMethods,
    HandshakeResult, InitOptions, ListenerId, SessionChannel, WalletCapabilities, WalletPage,
};
use crate::config::AdapterConfig;
use crate::error::{ChannelError, RpcError};
use crate::platform::{HostPage, PersistentStore};
use crate::session::Session;
use crate::sign_in::{SignInOutput, SignInPayload, SignedMessage};
use crate::transaction::{
    Commitment, RpcConnection, SendOptions, Transaction, TransactionPreparer,
};

// =============================================================================
// Page storage and host
// =============================================================================

/// `localStorage` stand-in.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// Host page that records every side effect.
#[derive(Debug, Default)]
pub struct RecordingHost {
    stripped: RefCell<Vec<String>>,
    notices: RefCell<Vec<String>>,
    prefetched: RefCell<Vec<String>>,
}

impl RecordingHost {
    /// A host with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Query parameters stripped so far.
    #[must_use]
    pub fn stripped_params(&self) -> Vec<String> {
        self.stripped.borrow().clone()
    }

    /// In-app browser notices shown so far.
    #[must_use]
    pub fn notices(&self) -> Vec<String> {
        self.notices.borrow().clone()
    }

    /// Prefetch URLs inserted so far.
    #[must_use]
    pub fn prefetched(&self) -> Vec<String> {
        self.prefetched.borrow().clone()
    }
}

impl HostPage for RecordingHost {
    fn strip_query_params(&self, params: &[&str]) {
        self.stripped
            .borrow_mut()
            .extend(params.iter().map(ToString::to_string));
    }

    fn show_in_app_browser_notice(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }

    fn insert_prefetch_link(&self, url: &str) {
        self.prefetched.borrow_mut().push(url.to_string());
    }
}

// =============================================================================
// Scripted channel
// =============================================================================

/// A call the adapter made on a [`ScriptedChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelCall {
    /// `init` with these options.
    Init(InitOptions),
    /// `sign_transaction`.
    SignTransaction,
    /// `sign_all_transactions` with this many transactions.
    SignAllTransactions(usize),
    /// `sign_message` with this message.
    SignMessage(Vec<u8>),
    /// `sign_in` on an established session.
    SignIn(Option<SignInPayload>),
    /// `send_transaction` with the prepared transaction.
    SendTransaction(Transaction),
    /// `clean_up`.
    CleanUp,
    /// `clear_elements`.
    ClearElements,
    /// `notify_disallowed`.
    NotifyDisallowed,
}

/// Shared script and call log for every channel a [`ScriptedChannelFactory`] opens.
#[derive(Default)]
pub struct ChannelScript {
    handshakes: RefCell<VecDeque<Result<HandshakeResult, ChannelError>>>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    calls: RefCell<Vec<ChannelCall>>,
    opened: Cell<usize>,
    logged_in: Cell<bool>,
    deliver_methods: Cell<bool>,
    shown: RefCell<Vec<Option<WalletPage>>>,
    hidden: Cell<usize>,
    signing_error: RefCell<Option<ChannelError>>,
    clean_up_error: RefCell<Option<ChannelError>>,
    sign_in_output: RefCell<Option<SignInOutput>>,
    listeners: RefCell<Vec<(ListenerId, AccountChangedListener)>>,
    next_listener: Cell<u64>,
}

impl ChannelScript {
    /// Queues the outcome of the next `init`. Unscripted handshakes fail to load.
    pub fn push_handshake(&self, result: Result<HandshakeResult, ChannelError>) {
        self.handshakes.borrow_mut().push_back(result);
    }

    /// Queues a successful handshake for `account`.
    pub fn push_account(&self, account: &str) {
        self.push_handshake(Ok(HandshakeResult {
            account: account.to_string(),
            sign_in_output: None,
        }));
    }

    /// Holds the next `init` pending until the returned sender fires (or is dropped).
    #[must_use]
    pub fn hold_next_handshake(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        *self.gate.borrow_mut() = Some(gate);
        release
    }

    /// Whether `init` delivers [`HandshakeMethods`] before resolving. Off by default.
    pub fn deliver_handshake_methods(&self, deliver: bool) {
        self.deliver_methods.set(deliver);
    }

    /// Whether channels report a logged-in session once their handshake succeeded.
    pub fn set_logged_in(&self, logged_in: bool) {
        self.logged_in.set(logged_in);
    }

    /// Makes every signing call reject with `error`.
    pub fn fail_signing(&self, error: ChannelError) {
        *self.signing_error.borrow_mut() = Some(error);
    }

    /// Makes `clean_up` reject with `error`.
    pub fn fail_clean_up(&self, error: ChannelError) {
        *self.clean_up_error.borrow_mut() = Some(error);
    }

    /// Output returned by `sign_in` on an established session.
    pub fn set_sign_in_output(&self, output: SignInOutput) {
        *self.sign_in_output.borrow_mut() = Some(output);
    }

    /// Delivers an account switch to every subscribed listener.
    pub fn emit_account_changed(&self, address: &str) {
        let listeners: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(address.to_string());
        }
    }

    /// Calls made so far, across all channels.
    #[must_use]
    pub fn calls(&self) -> Vec<ChannelCall> {
        self.calls.borrow().clone()
    }

    /// Number of `init` calls made so far.
    #[must_use]
    pub fn init_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, ChannelCall::Init(_)))
            .count()
    }

    /// Number of channels opened so far.
    #[must_use]
    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    /// Number of live account-change subscriptions.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Pages requested through the delivered show control.
    #[must_use]
    pub fn shown(&self) -> Vec<Option<WalletPage>> {
        self.shown.borrow().clone()
    }

    /// Number of times the delivered hide control ran.
    #[must_use]
    pub fn hidden(&self) -> usize {
        self.hidden.get()
    }

    fn record(&self, call: ChannelCall) {
        self.calls.borrow_mut().push(call);
    }

    fn signing_result(&self) -> Result<(), ChannelError> {
        self.signing_error.borrow().clone().map_or(Ok(()), Err)
    }
}

/// Channel answering from a shared [`ChannelScript`].
pub struct ScriptedChannel {
    script: Rc<ChannelScript>,
    established: Cell<bool>,
}

impl SessionChannel for ScriptedChannel {
    async fn init(
        &self,
        options: InitOptions,
        on_wallet_handshake: HandshakeCallback,
    ) -> Result<HandshakeResult, ChannelError> {
        self.script.record(ChannelCall::Init(options));

        if self.script.deliver_methods.get() {
            let show_script = Rc::clone(&self.script);
            let hide_script = Rc::clone(&self.script);
            on_wallet_handshake(HandshakeMethods::new(
                move |page| show_script.shown.borrow_mut().push(page),
                move || hide_script.hidden.set(hide_script.hidden.get() + 1),
            ));
        }

        let gate = self.script.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let result = self
            .script
            .handshakes
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ChannelError::LoadFailed("no scripted handshake".to_string())));
        self.established.set(result.is_ok());
        result
    }

    async fn sign_transaction(
        &self,
        mut transaction: Transaction,
    ) -> Result<Transaction, ChannelError> {
        self.script.record(ChannelCall::SignTransaction);
        self.script.signing_result()?;
        transaction.signatures.push(vec![0xAB; 64]);
        Ok(transaction)
    }

    async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, ChannelError> {
        self.script
            .record(ChannelCall::SignAllTransactions(transactions.len()));
        self.script.signing_result()?;
        Ok(transactions
            .into_iter()
            .map(|mut transaction| {
                transaction.signatures.push(vec![0xAB; 64]);
                transaction
            })
            .collect())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<SignedMessage, ChannelError> {
        self.script.record(ChannelCall::SignMessage(message.to_vec()));
        self.script.signing_result()?;
        Ok(SignedMessage {
            signature: vec![0xCD; 64],
        })
    }

    async fn sign_in(
        &self,
        payload: Option<SignInPayload>,
    ) -> Result<SignInOutput, ChannelError> {
        self.script.record(ChannelCall::SignIn(payload));
        self.script.signing_result()?;
        self.script
            .sign_in_output
            .borrow()
            .clone()
            .ok_or_else(|| ChannelError::Remote("no scripted sign-in output".to_string()))
    }

    async fn send_transaction<R: RpcConnection>(
        &self,
        transaction: Transaction,
        preparer: &TransactionPreparer,
        connection: &R,
        options: &SendOptions,
    ) -> Result<String, ChannelError> {
        let prepared = preparer
            .prepare(transaction, connection, options)
            .await
            .map_err(|error| ChannelError::Remote(error.to_string()))?;
        self.script
            .record(ChannelCall::SendTransaction(prepared.clone()));
        self.script.signing_result()?;
        connection
            .send_raw_transaction(&prepared, options)
            .await
            .map_err(|error| ChannelError::Remote(error.to_string()))
    }

    fn is_logged_in(&self) -> bool {
        self.established.get() && self.script.logged_in.get()
    }

    async fn clean_up(&self) -> Result<(), ChannelError> {
        self.script.record(ChannelCall::CleanUp);
        self.script.clean_up_error.borrow().clone().map_or(Ok(()), Err)
    }

    fn clear_elements(&self) {
        self.script.record(ChannelCall::ClearElements);
    }

    fn on_account_changed(&self, listener: AccountChangedListener) -> ListenerId {
        let id = ListenerId(self.script.next_listener.get());
        self.script.next_listener.set(id.0 + 1);
        self.script.listeners.borrow_mut().push((id, listener));
        id
    }

    fn off_account_changed(&self, id: ListenerId) {
        self.script
            .listeners
            .borrow_mut()
            .retain(|(listener_id, _)| *listener_id != id);
    }

    fn notify_disallowed(&self) {
        self.script.record(ChannelCall::NotifyDisallowed);
    }
}

/// Factory opening [`ScriptedChannel`]s that share one script.
pub struct ScriptedChannelFactory {
    script: Rc<ChannelScript>,
    capabilities: WalletCapabilities,
}

impl ScriptedChannelFactory {
    /// A factory with a fresh script and default capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capabilities(WalletCapabilities::default())
    }

    /// A factory advertising `capabilities`.
    #[must_use]
    pub fn with_capabilities(capabilities: WalletCapabilities) -> Self {
        Self {
            script: Rc::new(ChannelScript::default()),
            capabilities,
        }
    }

    /// The shared script.
    #[must_use]
    pub fn script(&self) -> Rc<ChannelScript> {
        Rc::clone(&self.script)
    }
}

impl Default for ScriptedChannelFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelFactory for ScriptedChannelFactory {
    type Channel = ScriptedChannel;

    fn open(&self, _session: &Session, _config: &AdapterConfig) -> Self::Channel {
        self.script.opened.set(self.script.opened.get() + 1);
        ScriptedChannel {
            script: Rc::clone(&self.script),
            established: Cell::new(false),
        }
    }

    fn capabilities(&self) -> WalletCapabilities {
        self.capabilities
    }
}

// =============================================================================
// RPC connection
// =============================================================================

/// RPC connection that accepts every transaction without a network.
#[derive(Debug, Default)]
pub struct MemoryRpcConnection {
    blockhash: String,
    submitted: RefCell<Vec<Transaction>>,
    confirmed: RefCell<Vec<String>>,
    rejection: RefCell<Option<String>>,
}

impl MemoryRpcConnection {
    /// A connection whose latest blockhash is `blockhash`.
    #[must_use]
    pub fn new(blockhash: &str) -> Self {
        Self {
            blockhash: blockhash.to_string(),
            ..Self::default()
        }
    }

    /// Makes every submission fail with `reason`.
    pub fn reject_submissions(&self, reason: &str) {
        *self.rejection.borrow_mut() = Some(reason.to_string());
    }

    /// Transactions submitted so far.
    #[must_use]
    pub fn submitted(&self) -> Vec<Transaction> {
        self.submitted.borrow().clone()
    }

    /// Signatures confirmed so far.
    #[must_use]
    pub fn confirmed(&self) -> Vec<String> {
        self.confirmed.borrow().clone()
    }
}

impl RpcConnection for MemoryRpcConnection {
    async fn latest_blockhash(&self, _commitment: Commitment) -> Result<String, RpcError> {
        Ok(self.blockhash.clone())
    }

    async fn send_raw_transaction(
        &self,
        transaction: &Transaction,
        _options: &SendOptions,
    ) -> Result<String, RpcError> {
        if let Some(reason) = self.rejection.borrow().clone() {
            return Err(RpcError::Rejected(reason));
        }
        let mut submitted = self.submitted.borrow_mut();
        submitted.push(transaction.clone());
        Ok(format!("signature-{}", submitted.len()))
    }

    async fn confirm_transaction(
        &self,
        signature: &str,
        _commitment: Commitment,
    ) -> Result<(), RpcError> {
        self.confirmed.borrow_mut().push(signature.to_string());
        Ok(())
    }
}
