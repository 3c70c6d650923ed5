//! Contract of the embedded session channel.
//!
//! The channel owns the iframe or popup hosting the wallet, the cross-context message channel to
//! it, and the session id. Its implementation lives outside the core (the wasm crate bridges to
//! a JavaScript implementation; [`crate::memory`] has a scripted one for tests). The adapter
//! talks to it only through [`SessionChannel`], and creates one per connect attempt through
//! [`ChannelFactory`].

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::config::{AdapterConfig, Network, Theme};
use crate::error::ChannelError;
use crate::session::Session;
use crate::sign_in::{SignInOutput, SignInPayload, SignedMessage};
use crate::transaction::{RpcConnection, SendOptions, Transaction, TransactionPreparer};

/// Options for the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct InitOptions {
    /// Try an interactive connection that may open a visible prompt.
    pub direct: bool,
    /// Silent reconnection on page load.
    pub auto_connect: bool,
    /// Sign-in request to complete as part of the handshake.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_in: Option<SignInPayload>,
    /// Require a click inside the surface before it opens anything, for contexts that block
    /// popups not triggered by a gesture.
    pub force_click_to_continue: bool,
    /// Requested colour scheme.
    pub theme: Theme,
    /// Hide the draggable launcher widget.
    pub hide_draggable_widget: bool,
    /// Skip onboarding screens.
    pub hide_wallet_onboard: bool,
    /// Application name.
    pub title: String,
    /// Integrating application's client id.
    pub client_id: String,
    /// Cluster.
    pub network: Network,
    /// Session id of the adapter instance.
    pub dapp_session_id: String,
}

/// What a successful handshake yields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeResult {
    /// Base58 address of the authenticated account, not yet validated.
    pub account: String,
    /// Proof for the sign-in request carried by the handshake, if any.
    #[serde(default)]
    pub sign_in_output: Option<SignInOutput>,
}

/// Screens of the embedded wallet that can be opened directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WalletPage {
    /// Account overview.
    Home,
    /// Receive funds.
    Deposit,
    /// Send funds.
    Send,
    /// Transaction history.
    Activity,
    /// Wallet settings.
    Settings,
}

/// UI controls delivered by the surface once it is ready.
#[derive(Clone)]
pub struct HandshakeMethods {
    show: Rc<dyn Fn(Option<WalletPage>)>,
    hide: Rc<dyn Fn()>,
}

impl HandshakeMethods {
    /// Bundles the surface's show and hide controls.
    pub fn new(show: impl Fn(Option<WalletPage>) + 'static, hide: impl Fn() + 'static) -> Self {
        Self {
            show: Rc::new(show),
            hide: Rc::new(hide),
        }
    }

    /// Opens the wallet UI, optionally on a given page.
    pub fn show_wallet(&self, page: Option<WalletPage>) {
        (self.show)(page);
    }

    /// Collapses the wallet UI.
    pub fn hide_wallet(&self) {
        (self.hide)();
    }
}

impl fmt::Debug for HandshakeMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandshakeMethods").finish_non_exhaustive()
    }
}

/// Receives the [`HandshakeMethods`] while `init` is pending. Called at most once.
pub type HandshakeCallback = Box<dyn FnOnce(HandshakeMethods)>;

/// Receives the base58 address of an account selected inside the surface.
pub type AccountChangedListener = Rc<dyn Fn(String)>;

/// Handle returned by [`SessionChannel::on_account_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Remote-procedure interface to one embedded wallet surface.
///
/// Each remote call can fail on its own; a failed call does not end the session.
#[allow(async_fn_in_trait)]
pub trait SessionChannel {
    /// Opens the surface and performs the handshake.
    ///
    /// # Errors
    ///
    /// Rejects if the user cancels, the surface fails to load, or the handshake times out.
    async fn init(
        &self,
        options: InitOptions,
        on_wallet_handshake: HandshakeCallback,
    ) -> Result<HandshakeResult, ChannelError>;

    /// Asks the surface to sign a transaction.
    ///
    /// # Errors
    ///
    /// Returns the surface's rejection.
    async fn sign_transaction(&self, transaction: Transaction)
        -> Result<Transaction, ChannelError>;

    /// Asks the surface to sign several transactions.
    ///
    /// # Errors
    ///
    /// Returns the surface's rejection.
    async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, ChannelError>;

    /// Asks the surface to sign a message.
    ///
    /// # Errors
    ///
    /// Returns the surface's rejection.
    async fn sign_message(&self, message: &[u8]) -> Result<SignedMessage, ChannelError>;

    /// Performs a sign-in on an already established session.
    ///
    /// # Errors
    ///
    /// Returns the surface's rejection.
    async fn sign_in(&self, payload: Option<SignInPayload>)
        -> Result<SignInOutput, ChannelError>;

    /// Prepares `transaction` with `preparer`, then has the surface sign and submit it.
    ///
    /// Only called when the factory advertises
    /// [`WalletCapabilities::remote_send_transaction`].
    ///
    /// # Errors
    ///
    /// Returns the surface's rejection, or the preparation failure.
    async fn send_transaction<R: RpcConnection>(
        &self,
        transaction: Transaction,
        preparer: &TransactionPreparer,
        connection: &R,
        options: &SendOptions,
    ) -> Result<String, ChannelError>;

    /// Whether the surface reports a logged-in session.
    fn is_logged_in(&self) -> bool;

    /// Graceful teardown of a logged-in session.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote side fails to acknowledge.
    async fn clean_up(&self) -> Result<(), ChannelError>;

    /// Forced, synchronous removal of the surface's elements.
    fn clear_elements(&self);

    /// Subscribes to account switches performed inside the surface.
    fn on_account_changed(&self, listener: AccountChangedListener) -> ListenerId;

    /// Removes a subscription.
    fn off_account_changed(&self, id: ListenerId);

    /// Tells the surface that the host failed the allowlist check so it terminates itself.
    fn notify_disallowed(&self);
}

/// Optional features of a channel implementation, fixed at adapter construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletCapabilities {
    /// The surface supports sign-in.
    pub sign_in: bool,
    /// The surface delivers [`HandshakeMethods`].
    pub show_wallet: bool,
    /// The surface can sign and submit a transaction itself.
    pub remote_send_transaction: bool,
}

impl Default for WalletCapabilities {
    fn default() -> Self {
        Self {
            sign_in: true,
            show_wallet: true,
            remote_send_transaction: true,
        }
    }
}

/// Creates channels for an adapter.
pub trait ChannelFactory {
    /// The channel type produced.
    type Channel: SessionChannel;

    /// Creates a channel for one connect attempt. No remote work happens until `init`.
    fn open(&self, session: &Session, config: &AdapterConfig) -> Self::Channel;

    /// Features the produced channels support.
    fn capabilities(&self) -> WalletCapabilities {
        WalletCapabilities::default()
    }
}
