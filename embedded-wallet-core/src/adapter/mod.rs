//! The connection state machine.
//!
//! [`EmbeddedWalletAdapter`] is the public surface host applications and wallet-selection
//! frameworks use. It tracks `connecting` / `connected` / `disconnected`, decides between an
//! interactive and a silent handshake, persists the last connected account, and routes every
//! wallet operation through the embedded session channel of the current connection.
//!
//! All state lives behind one `Rc` and is only touched between suspension points, so the
//! adapter needs no locking: the `connecting` flag alone keeps at most one handshake in flight.

mod events;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tokio::sync::broadcast;

pub use events::AdapterEvent;

use crate::allowlist::AllowlistGuard;
use crate::channel::{
    AccountChangedListener, ChannelFactory, HandshakeCallback, HandshakeMethods, InitOptions,
    ListenerId, SessionChannel, WalletCapabilities, WalletPage,
};
use crate::config::{AdapterConfig, BuildEnv};
use crate::defaults::{surface_url, PERSISTED_ACCOUNT_KEY, TRANSIENT_QUERY_PARAMS};
use crate::environment::{EnvironmentProfile, EnvironmentSnapshot};
use crate::error::WalletAdapterError;
use crate::platform::{HostPage, PersistentStore};
use crate::public_key::PublicKey;
use crate::readiness::{compute_ready_state, WalletReadyState};
use crate::session::Session;
use crate::sign_in::{SignInOutput, SignInPayload, SignedMessage};
use crate::transaction::{
    sign_and_send_transaction, RpcConnection, SendOptions, SignerWallet, Transaction,
    TransactionPreparer,
};

const EVENT_CAPACITY: usize = 64;

const IN_APP_BROWSER_NOTICE: &str = "This in-app browser cannot open the wallet. \
     Open this page in your device's default browser to continue.";

/// Mutable connection state of one adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionState {
    /// A handshake is in flight.
    pub connecting: bool,
    /// The adapter was disconnected (or never connected) and no attempt is running.
    pub disconnected: bool,
    /// The connected account.
    pub public_key: Option<PublicKey>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            connecting: false,
            disconnected: true,
            public_key: None,
        }
    }
}

/// Host-page collaborators an adapter is built with.
pub struct AdapterContext {
    /// Signals read from the page at construction.
    pub environment: EnvironmentSnapshot,
    /// Storage for the last connected account.
    pub store: Rc<dyn PersistentStore>,
    /// Page side effects.
    pub host: Rc<dyn HostPage>,
    /// Deployment of the embedded surface.
    pub build_env: BuildEnv,
    /// Allowlist client.
    pub allowlist: AllowlistGuard,
}

impl AdapterContext {
    /// Bundles the collaborators, using the allowlist service of `build_env`.
    #[must_use]
    pub fn new(
        environment: EnvironmentSnapshot,
        store: Rc<dyn PersistentStore>,
        host: Rc<dyn HostPage>,
        build_env: BuildEnv,
    ) -> Self {
        Self {
            environment,
            store,
            host,
            build_env,
            allowlist: AllowlistGuard::new(build_env),
        }
    }

    /// Replaces the allowlist client.
    #[must_use]
    pub fn with_allowlist(mut self, allowlist: AllowlistGuard) -> Self {
        self.allowlist = allowlist;
        self
    }
}

#[derive(Debug, Default)]
struct ConnectRequest {
    direct: bool,
    auto_connect: bool,
    sign_in: Option<SignInPayload>,
}

struct Inner<F: ChannelFactory> {
    config: AdapterConfig,
    session: Session,
    environment: EnvironmentProfile,
    page_url: Option<String>,
    ready_state: WalletReadyState,
    capabilities: WalletCapabilities,
    factory: F,
    store: Rc<dyn PersistentStore>,
    host: Rc<dyn HostPage>,
    allowlist: AllowlistGuard,
    state: RefCell<ConnectionState>,
    channel: RefCell<Option<Rc<F::Channel>>>,
    handshake: RefCell<Option<HandshakeMethods>>,
    account_listener: Cell<Option<ListenerId>>,
    disallowed: Cell<bool>,
    // Bumped by every connect attempt and every disconnect; a handshake continuation whose
    // attempt is no longer current is stale.
    attempt: Cell<u64>,
    events: broadcast::Sender<AdapterEvent>,
}

/// An in-flight connect attempt.
///
/// Dropping it ends the attempt: while it is still the current one, `connecting` is cleared and
/// a channel that never produced a session is released. This also covers a caller dropping the
/// `connect` future before the handshake resolves.
struct Attempt<'a, F: ChannelFactory + 'static> {
    adapter: &'a EmbeddedWalletAdapter<F>,
    id: u64,
}

impl<F: ChannelFactory + 'static> Drop for Attempt<'_, F> {
    fn drop(&mut self) {
        let inner = &self.adapter.inner;
        if inner.attempt.get() != self.id {
            return;
        }
        let established = {
            let mut state = inner.state.borrow_mut();
            state.connecting = false;
            state.public_key.is_some()
        };
        if !established {
            self.adapter.discard_channel();
        }
    }
}

/// Wallet adapter backed by an embedded wallet surface.
///
/// Cloning is cheap and yields another handle to the same adapter.
pub struct EmbeddedWalletAdapter<F: ChannelFactory> {
    inner: Rc<Inner<F>>,
}

impl<F: ChannelFactory> Clone for EmbeddedWalletAdapter<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<F: ChannelFactory + 'static> EmbeddedWalletAdapter<F> {
    /// Creates an adapter.
    ///
    /// Classifies the environment, starts the session, and (when a document exists) inserts a
    /// prefetch hint for the embedded surface. Does not contact the allowlist service; hosts
    /// start [`Self::enforce_allowlist`] right after construction.
    pub fn new(config: AdapterConfig, context: AdapterContext, factory: F) -> Self {
        let environment = EnvironmentProfile::classify(&context.environment);
        let session = Session::new(
            context.build_env,
            &environment,
            context.environment.referrer.as_deref(),
        );
        let ready_state = compute_ready_state(&environment, config.install_flags());

        if environment.has_document() {
            if let Some(url) = surface_url(
                context.build_env,
                &config.client_id,
                config.network,
                session.dapp_session_id(),
            ) {
                context.host.insert_prefetch_link(url.as_str());
            }
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Rc::new(Inner {
                capabilities: factory.capabilities(),
                config,
                session,
                environment,
                page_url: context.environment.page_url,
                ready_state,
                factory,
                store: context.store,
                host: context.host,
                allowlist: context.allowlist,
                state: RefCell::new(ConnectionState::default()),
                channel: RefCell::new(None),
                handshake: RefCell::new(None),
                account_listener: Cell::new(None),
                disallowed: Cell::new(false),
                attempt: Cell::new(0),
                events,
            }),
        }
    }

    /// The configuration the adapter was built with.
    #[must_use]
    pub fn config(&self) -> &AdapterConfig {
        &self.inner.config
    }

    /// The adapter's session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// The environment classification made at construction.
    #[must_use]
    pub fn environment(&self) -> &EnvironmentProfile {
        &self.inner.environment
    }

    /// Availability for wallet-selection interfaces.
    #[must_use]
    pub fn ready_state(&self) -> WalletReadyState {
        self.inner.ready_state
    }

    /// Optional features, fixed at construction.
    #[must_use]
    pub fn capabilities(&self) -> WalletCapabilities {
        self.inner.capabilities
    }

    /// Snapshot of the connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// The connected account.
    #[must_use]
    pub fn public_key(&self) -> Option<PublicKey> {
        self.inner.state.borrow().public_key
    }

    /// Whether a handshake is in flight.
    #[must_use]
    pub fn connecting(&self) -> bool {
        self.inner.state.borrow().connecting
    }

    /// Whether an account is connected.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.inner.state.borrow().public_key.is_some()
    }

    /// Subscribes to adapter events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AdapterEvent> {
        self.inner.events.subscribe()
    }

    /// Connects interactively.
    ///
    /// Resolves immediately without doing anything when already connected or connecting. A
    /// previously connected account, or an environment that forces iframe mode, downgrades the
    /// attempt to a silent auto-connect handshake.
    ///
    /// # Errors
    ///
    /// `NotReady` when the environment cannot host the wallet, `Config` when the client id
    /// failed the allowlist or the surface rejected the configuration, `PublicKey` when the
    /// surface returned a malformed account, and `Connection` for every other handshake
    /// failure, including an account that differs from the previously connected one.
    pub async fn connect(&self) -> Result<(), WalletAdapterError> {
        self.connect_with(ConnectRequest {
            direct: true,
            ..ConnectRequest::default()
        })
        .await
        .map(|_| ())
    }

    /// Reconnects silently, typically on page load.
    ///
    /// # Errors
    ///
    /// Same as [`Self::connect`].
    pub async fn auto_connect(&self) -> Result<(), WalletAdapterError> {
        self.connect_with(ConnectRequest {
            auto_connect: true,
            ..ConnectRequest::default()
        })
        .await
        .map(|_| ())
    }

    async fn connect_with(
        &self,
        request: ConnectRequest,
    ) -> Result<Option<SignInOutput>, WalletAdapterError> {
        {
            let state = self.inner.state.borrow();
            if state.connecting || state.public_key.is_some() {
                return Ok(None);
            }
        }
        self.check_connectable().map_err(|error| self.reported(error))?;

        let attempt = self.begin_attempt();
        let result = self.establish(attempt.id, request).await;
        drop(attempt);
        result.map_err(|error| self.reported(error))
    }

    fn check_connectable(&self) -> Result<(), WalletAdapterError> {
        let inner = &self.inner;
        if inner.disallowed.get() {
            return Err(WalletAdapterError::Config(
                "client id is not allowlisted for this origin".to_string(),
            ));
        }
        if inner.ready_state == WalletReadyState::Unsupported {
            return Err(WalletAdapterError::NotReady(
                "no browser document available".to_string(),
            ));
        }
        if inner.environment.is_in_app_browser() && !inner.session.force_iframe() {
            inner.host.show_in_app_browser_notice(IN_APP_BROWSER_NOTICE);
            return Err(WalletAdapterError::NotReady(
                "in-app browser cannot complete the wallet handshake".to_string(),
            ));
        }
        Ok(())
    }

    fn begin_attempt(&self) -> Attempt<'_, F> {
        let id = self.inner.attempt.get() + 1;
        self.inner.attempt.set(id);
        let mut state = self.inner.state.borrow_mut();
        state.connecting = true;
        state.disconnected = false;
        Attempt { adapter: self, id }
    }

    fn is_stale(&self, attempt: u64) -> bool {
        self.inner.attempt.get() != attempt || self.inner.state.borrow().disconnected
    }

    async fn establish(
        &self,
        attempt: u64,
        request: ConnectRequest,
    ) -> Result<Option<SignInOutput>, WalletAdapterError> {
        let inner = &self.inner;
        let persisted = inner.store.get_item(PERSISTED_ACCOUNT_KEY);
        let silent = persisted.is_some() || inner.session.force_iframe();
        let direct = request.direct && !silent;
        let auto_connect = request.auto_connect || silent;
        log::debug!(
            "starting wallet handshake (direct: {direct}, auto connect: {auto_connect})"
        );

        let channel = Rc::new(inner.factory.open(&inner.session, &inner.config));
        *inner.channel.borrow_mut() = Some(Rc::clone(&channel));

        let options = InitOptions {
            direct,
            auto_connect,
            sign_in: request.sign_in,
            force_click_to_continue: inner.session.force_iframe(),
            theme: inner.config.theme,
            hide_draggable_widget: inner.config.hide_draggable_widget,
            hide_wallet_onboard: inner.config.hide_wallet_onboard,
            title: inner.config.title.clone(),
            client_id: inner.config.client_id.clone(),
            network: inner.config.network,
            dapp_session_id: inner.session.dapp_session_id().to_string(),
        };
        let weak = Rc::downgrade(&self.inner);
        let on_handshake: HandshakeCallback = Box::new(move |methods| {
            if let Some(inner) = weak.upgrade().filter(|inner| inner.attempt.get() == attempt) {
                *inner.handshake.borrow_mut() = Some(methods);
            }
        });

        let handshake = channel.init(options, on_handshake).await;

        if self.is_stale(attempt) {
            log::debug!("discarding handshake of a cancelled connect attempt");
            return Ok(None);
        }

        let handshake = match handshake {
            Ok(handshake) => handshake,
            Err(error) => {
                self.discard_channel();
                return Err(WalletAdapterError::from_handshake(error));
            }
        };
        let account = match handshake.account.parse::<PublicKey>() {
            Ok(account) => account,
            Err(error) => {
                self.discard_channel();
                return Err(error.into());
            }
        };

        let previous = persisted.and_then(|text| text.parse::<PublicKey>().ok());
        if previous.is_some_and(|previous| previous != account) {
            log::warn!(
                "wallet returned {account}, which differs from the previously connected account; disconnecting"
            );
            self.disconnect().await;
            return Err(WalletAdapterError::Connection(
                "connected account differs from the previously connected account".to_string(),
            ));
        }

        inner.host.strip_query_params(&TRANSIENT_QUERY_PARAMS);
        let listener_id = channel.on_account_changed(self.account_changed_listener());
        inner.account_listener.set(Some(listener_id));
        inner.store.set_item(PERSISTED_ACCOUNT_KEY, &account.to_base58());
        inner.state.borrow_mut().public_key = Some(account);
        self.emit(AdapterEvent::Connect(account));

        Ok(handshake.sign_in_output)
    }

    /// Releases a channel that never produced a session.
    fn discard_channel(&self) {
        let channel = self.inner.channel.borrow_mut().take();
        self.inner.handshake.borrow_mut().take();
        if let Some(channel) = channel {
            channel.clear_elements();
        }
    }

    /// Disconnects. Idempotent.
    ///
    /// State is marked disconnected before any teardown runs, so a handshake still in flight is
    /// discarded when it resolves. Always emits [`AdapterEvent::Disconnect`]; a failing
    /// teardown is reported as an [`AdapterEvent::Error`] first.
    pub async fn disconnect(&self) {
        let inner = &self.inner;
        {
            let mut state = inner.state.borrow_mut();
            state.disconnected = true;
            state.connecting = false;
            state.public_key = None;
        }
        inner.attempt.set(inner.attempt.get() + 1);
        inner.handshake.borrow_mut().take();

        let channel = inner.channel.borrow_mut().take();
        if let Some(channel) = channel {
            if let Some(listener_id) = inner.account_listener.take() {
                channel.off_account_changed(listener_id);
            }
            if channel.is_logged_in() {
                if let Err(error) = channel.clean_up().await {
                    log::error!("wallet teardown failed: {error}");
                    self.emit(AdapterEvent::Error(WalletAdapterError::Disconnection(
                        error.to_string(),
                    )));
                }
            } else {
                channel.clear_elements();
            }
        }

        self.emit(AdapterEvent::Disconnect);
    }

    /// Synchronous teardown used when another adapter instance takes over the page.
    pub(crate) fn tear_down(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.disconnected = true;
            state.connecting = false;
            state.public_key = None;
        }
        self.inner.attempt.set(self.inner.attempt.get() + 1);
        let channel = self.inner.channel.borrow_mut().take();
        if let Some(channel) = channel {
            if let Some(listener_id) = self.inner.account_listener.take() {
                channel.off_account_changed(listener_id);
            }
            channel.clear_elements();
        }
        self.inner.handshake.borrow_mut().take();
    }

    fn account_changed_listener(&self) -> AccountChangedListener {
        let weak = Rc::downgrade(&self.inner);
        Rc::new(move |address: String| {
            if let Some(inner) = weak.upgrade() {
                Self { inner }.handle_account_changed(&address);
            }
        })
    }

    /// Applies an account switch made inside the embedded surface.
    fn handle_account_changed(&self, address: &str) {
        let account = match address.parse::<PublicKey>() {
            Ok(account) => account,
            Err(error) => {
                log::warn!("ignoring malformed account change notification: {error}");
                self.emit(AdapterEvent::Error(error.into()));
                return;
            }
        };

        {
            let mut state = self.inner.state.borrow_mut();
            if state.public_key.is_none() || state.public_key == Some(account) {
                return;
            }
            state.public_key = Some(account);
        }
        self.inner.store.set_item(PERSISTED_ACCOUNT_KEY, &account.to_base58());
        self.emit(AdapterEvent::Connect(account));
    }

    fn live_channel(&self) -> Result<Rc<F::Channel>, WalletAdapterError> {
        if !self.connected() {
            return Err(WalletAdapterError::NotConnected);
        }
        self.inner
            .channel
            .borrow()
            .clone()
            .ok_or(WalletAdapterError::NotConnected)
    }

    async fn try_sign_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Transaction, WalletAdapterError> {
        let channel = self.live_channel()?;
        channel
            .sign_transaction(transaction)
            .await
            .map_err(|error| WalletAdapterError::SignTransaction(error.to_string()))
    }

    async fn try_sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletAdapterError> {
        let channel = self.live_channel()?;
        channel
            .sign_all_transactions(transactions)
            .await
            .map_err(|error| WalletAdapterError::SignTransaction(error.to_string()))
    }

    async fn try_sign_message(&self, message: &[u8]) -> Result<SignedMessage, WalletAdapterError> {
        let channel = self.live_channel()?;
        channel
            .sign_message(message)
            .await
            .map_err(|error| WalletAdapterError::SignMessage(error.to_string()))
    }

    /// Signs a transaction in the embedded wallet.
    ///
    /// # Errors
    ///
    /// `NotConnected` without a session (the channel is not contacted), `SignTransaction`
    /// when the wallet refuses. Errors are also emitted as events.
    pub async fn sign_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Transaction, WalletAdapterError> {
        let result = self.try_sign_transaction(transaction).await;
        self.report(result)
    }

    /// Signs several transactions in one approval.
    ///
    /// # Errors
    ///
    /// Same as [`Self::sign_transaction`].
    pub async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletAdapterError> {
        let result = self.try_sign_all_transactions(transactions).await;
        self.report(result)
    }

    /// Signs an arbitrary message.
    ///
    /// # Errors
    ///
    /// `NotConnected` without a session, `SignMessage` when the wallet refuses.
    pub async fn sign_message(&self, message: &[u8]) -> Result<SignedMessage, WalletAdapterError> {
        let result = self.try_sign_message(message).await;
        self.report(result)
    }

    /// Prepares, signs and submits a transaction, returning its signature.
    ///
    /// When the surface can submit transactions itself the prepared transaction is handed to
    /// it; otherwise the adapter signs through the surface and submits with `connection`
    /// ([`sign_and_send_transaction`]).
    ///
    /// # Errors
    ///
    /// `NotConnected` without a session, `SendTransaction` when the surface or RPC fails, or
    /// the signing error of the fallback path. Every failure is emitted as an event.
    pub async fn send_transaction<R: RpcConnection>(
        &self,
        transaction: Transaction,
        connection: &R,
        options: &SendOptions,
    ) -> Result<String, WalletAdapterError> {
        let result = async {
            if !self.inner.capabilities.remote_send_transaction {
                return sign_and_send_transaction(
                    &Unreported(self),
                    connection,
                    transaction,
                    options,
                )
                .await;
            }
            let channel = self.live_channel()?;
            let fee_payer = self.public_key().ok_or(WalletAdapterError::NotConnected)?;
            channel
                .send_transaction(
                    transaction,
                    &TransactionPreparer::new(fee_payer),
                    connection,
                    options,
                )
                .await
                .map_err(|error| WalletAdapterError::SendTransaction(error.to_string()))
        }
        .await;
        self.report(result)
    }

    /// Signs in.
    ///
    /// While disconnected this connects, carrying `payload` through the handshake, and returns
    /// the proof the handshake produced. While connected it asks the surface for a sign-in on
    /// the existing session instead.
    ///
    /// # Errors
    ///
    /// The connect errors of [`Self::connect`] while disconnected, `SignIn` if a payload was
    /// given and no proof came back, or if the wallet refuses.
    pub async fn sign_in(
        &self,
        payload: Option<SignInPayload>,
    ) -> Result<Option<SignInOutput>, WalletAdapterError> {
        if !self.inner.capabilities.sign_in {
            return self.report(Err(WalletAdapterError::SignIn(
                "sign-in is not supported by this wallet".to_string(),
            )));
        }

        if !self.connected() {
            let requested = payload.is_some();
            let output = self
                .connect_with(ConnectRequest {
                    direct: true,
                    auto_connect: false,
                    sign_in: payload,
                })
                .await?;
            if requested && output.is_none() {
                return self.report(Err(WalletAdapterError::SignIn(
                    "the wallet handshake produced no sign-in output".to_string(),
                )));
            }
            return Ok(output);
        }

        let result = async {
            let channel = self.live_channel()?;
            channel
                .sign_in(payload)
                .await
                .map(Some)
                .map_err(|error| WalletAdapterError::SignIn(error.to_string()))
        }
        .await;
        self.report(result)
    }

    /// Opens the wallet UI. Logs and does nothing before the surface delivered its controls.
    pub fn show_wallet(&self, page: Option<WalletPage>) {
        let methods = self.inner.handshake.borrow().clone();
        match methods {
            Some(methods) => methods.show_wallet(page),
            None => log::error!("show_wallet called before the wallet handshake completed"),
        }
    }

    /// Collapses the wallet UI. Logs and does nothing before the surface delivered its controls.
    pub fn hide_wallet(&self) {
        let methods = self.inner.handshake.borrow().clone();
        match methods {
            Some(methods) => methods.hide_wallet(),
            None => log::error!("hide_wallet called before the wallet handshake completed"),
        }
    }

    /// Runs the allowlist check for the page origin.
    ///
    /// On rejection the open surface (if any) is told to terminate, the adapter disconnects,
    /// and later connect attempts fail with a config error. Safe to run concurrently with a
    /// connect attempt. Returns whether the client is allowed.
    pub async fn enforce_allowlist(&self) -> bool {
        let origin = self.inner.page_url.clone().unwrap_or_default();
        let allowed = self
            .inner
            .allowlist
            .check_allowlisted(&self.inner.config.client_id, &origin, || {
                self.mark_disallowed();
            })
            .await;
        if !allowed {
            self.disconnect().await;
        }
        allowed
    }

    fn mark_disallowed(&self) {
        self.inner.disallowed.set(true);
        let channel = self.inner.channel.borrow().clone();
        if let Some(channel) = channel {
            channel.notify_disallowed();
        }
    }

    fn emit(&self, event: AdapterEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    fn reported(&self, error: WalletAdapterError) -> WalletAdapterError {
        self.emit(AdapterEvent::Error(error.clone()));
        error
    }

    fn report<T>(&self, result: Result<T, WalletAdapterError>) -> Result<T, WalletAdapterError> {
        result.map_err(|error| self.reported(error))
    }
}

impl<F: ChannelFactory + 'static> SignerWallet for EmbeddedWalletAdapter<F> {
    fn public_key(&self) -> Option<PublicKey> {
        Self::public_key(self)
    }

    async fn sign_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Transaction, WalletAdapterError> {
        Self::sign_transaction(self, transaction).await
    }

    async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletAdapterError> {
        Self::sign_all_transactions(self, transactions).await
    }

    async fn sign_message(&self, message: &[u8]) -> Result<SignedMessage, WalletAdapterError> {
        Self::sign_message(self, message).await
    }

    async fn sign_in(
        &self,
        payload: Option<SignInPayload>,
    ) -> Result<Option<SignInOutput>, WalletAdapterError> {
        Self::sign_in(self, payload).await
    }
}

/// Signs without emitting error events, for use inside an operation that reports at its own
/// boundary.
struct Unreported<'a, F: ChannelFactory>(&'a EmbeddedWalletAdapter<F>);

impl<F: ChannelFactory + 'static> SignerWallet for Unreported<'_, F> {
    fn public_key(&self) -> Option<PublicKey> {
        self.0.public_key()
    }

    async fn sign_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Transaction, WalletAdapterError> {
        self.0.try_sign_transaction(transaction).await
    }

    async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletAdapterError> {
        self.0.try_sign_all_transactions(transactions).await
    }

    async fn sign_message(&self, message: &[u8]) -> Result<SignedMessage, WalletAdapterError> {
        self.0.try_sign_message(message).await
    }

    async fn sign_in(
        &self,
        _payload: Option<SignInPayload>,
    ) -> Result<Option<SignInOutput>, WalletAdapterError> {
        Err(WalletAdapterError::SignIn(
            "sign-in is not part of the send policy".to_string(),
        ))
    }
}
