//! WebAssembly bindings for `embedded_wallet_core`.
//!
//! Exposes the embedded wallet adapter to browser applications through `wasm-bindgen`. The
//! session channel itself (iframe or popup plus its message channel) stays in JavaScript and is
//! handed in as a factory function; everything else runs here.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::future_not_send)]

mod browser;
mod channel;
mod connection;
mod logger;

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;

use embedded_wallet_core::logger::set_logger;
use embedded_wallet_core::transaction::SendOptions;
use embedded_wallet_core::{
    register_embedded_wallet, registered_wallets, AdapterConfig, AdapterContext, AdapterEvent,
    BuildEnv, EmbeddedWalletAdapter, RegistrationOptions, SignInPayload, Transaction,
    Unregister, WalletAdapterError, WalletCapabilities, WalletPage,
};
use js_sys::{Function, Promise};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, oneshot};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::browser::{BrowserHost, LocalStorageStore};
use crate::channel::{to_js, JsChannelFactory};
use crate::connection::JsConnection;
use crate::logger::ConsoleLogger;

/// Routes the adapter's logs to the browser console. Call once, before anything else.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    set_logger(Arc::new(ConsoleLogger));
}

/// Host-side options that are not part of the adapter configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HostOptions {
    build_env: Option<String>,
    capabilities: WalletCapabilities,
    rpc_url: Option<String>,
}

impl HostOptions {
    fn build_env(&self) -> Result<BuildEnv, JsValue> {
        self.build_env
            .as_deref()
            .map_or_else(|| Ok(BuildEnv::default()), BuildEnv::from_str)
            .map_err(|err| JsValue::from_str(&format!("invalid buildEnv: {err}")))
    }
}

/// Browser-backed collaborators for an adapter.
fn browser_context(build_env: BuildEnv) -> AdapterContext {
    AdapterContext::new(
        browser::snapshot(),
        Rc::new(LocalStorageStore::new()),
        Rc::new(BrowserHost),
        build_env,
    )
}

/// Starts the allowlist check without blocking construction.
fn spawn_allowlist_check(adapter: &EmbeddedWalletAdapter<JsChannelFactory>) {
    if !adapter.environment().has_document() {
        return;
    }
    let adapter = adapter.clone();
    spawn_local(async move {
        if !adapter.enforce_allowlist().await {
            log::error!("client id is not allowlisted for this origin; wallet disabled");
        }
    });
}

/// Solana wallet adapter backed by an embedded wallet surface.
#[wasm_bindgen]
#[derive(Clone)]
pub struct EmbeddedWallet(EmbeddedWalletAdapter<JsChannelFactory>);

#[wasm_bindgen]
impl EmbeddedWallet {
    /// Creates an adapter.
    ///
    /// `channel_factory` is called with `(session, config)` on every connect attempt and
    /// returns an `EmbeddedChannel`. `host_options` may set `buildEnv`, `capabilities` and
    /// `rpcUrl`.
    ///
    /// # Errors
    /// Throws when `config` or `host_options` cannot be parsed.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: JsValue,
        channel_factory: Function,
        host_options: JsValue,
    ) -> Result<Self, JsValue> {
        let config: AdapterConfig = parse(config)?;
        let host: HostOptions = parse_optional(host_options)?;
        let build_env = host.build_env()?;
        let factory = JsChannelFactory::new(channel_factory, host.capabilities, host.rpc_url);

        let adapter = EmbeddedWalletAdapter::new(config, browser_context(build_env), factory);
        spawn_allowlist_check(&adapter);
        Ok(Self(adapter))
    }

    /// Base58 address of the connected account.
    #[wasm_bindgen(getter, js_name = publicKey)]
    #[must_use]
    pub fn public_key(&self) -> Option<String> {
        self.0.public_key().map(|key| key.to_base58())
    }

    /// Whether a handshake is in flight.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn connecting(&self) -> bool {
        self.0.connecting()
    }

    /// Whether an account is connected.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn connected(&self) -> bool {
        self.0.connected()
    }

    /// `Installed`, `Loadable` or `Unsupported`.
    #[wasm_bindgen(getter, js_name = readyState)]
    #[must_use]
    pub fn ready_state(&self) -> String {
        self.0.ready_state().to_string()
    }

    /// Features the embedded surface supports.
    ///
    /// # Errors
    /// Throws if the capabilities cannot be converted.
    #[wasm_bindgen(getter)]
    pub fn capabilities(&self) -> Result<JsValue, JsValue> {
        to_js(&self.0.capabilities())
    }

    /// The adapter's session id.
    #[wasm_bindgen(getter, js_name = dappSessionId)]
    #[must_use]
    pub fn dapp_session_id(&self) -> String {
        self.0.session().dapp_session_id().to_string()
    }

    /// Connects interactively.
    ///
    /// # Errors
    /// Returns a rejected promise when the handshake fails.
    pub fn connect(&self) -> Promise {
        let adapter = self.0.clone();
        future_to_promise(async move {
            adapter
                .connect()
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(|err| adapter_error_to_jsvalue(&err))
        })
    }

    /// Reconnects silently.
    ///
    /// # Errors
    /// Returns a rejected promise when the handshake fails.
    #[wasm_bindgen(js_name = autoConnect)]
    pub fn auto_connect(&self) -> Promise {
        let adapter = self.0.clone();
        future_to_promise(async move {
            adapter
                .auto_connect()
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(|err| adapter_error_to_jsvalue(&err))
        })
    }

    /// Disconnects. Never rejects.
    pub fn disconnect(&self) -> Promise {
        let adapter = self.0.clone();
        future_to_promise(async move {
            adapter.disconnect().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Signs a transaction.
    ///
    /// # Errors
    /// Returns a rejected promise when not connected or the wallet refuses.
    #[wasm_bindgen(js_name = signTransaction)]
    pub fn sign_transaction(&self, transaction: JsValue) -> Promise {
        let adapter = self.0.clone();
        future_to_promise(async move {
            let transaction: Transaction = parse(transaction)?;
            let signed = adapter
                .sign_transaction(transaction)
                .await
                .map_err(|err| adapter_error_to_jsvalue(&err))?;
            to_js(&signed)
        })
    }

    /// Signs several transactions.
    ///
    /// # Errors
    /// Returns a rejected promise when not connected or the wallet refuses.
    #[wasm_bindgen(js_name = signAllTransactions)]
    pub fn sign_all_transactions(&self, transactions: JsValue) -> Promise {
        let adapter = self.0.clone();
        future_to_promise(async move {
            let transactions: Vec<Transaction> = parse(transactions)?;
            let signed = adapter
                .sign_all_transactions(transactions)
                .await
                .map_err(|err| adapter_error_to_jsvalue(&err))?;
            to_js(&signed)
        })
    }

    /// Signs a message.
    ///
    /// # Errors
    /// Returns a rejected promise when not connected or the wallet refuses.
    #[wasm_bindgen(js_name = signMessage)]
    pub fn sign_message(&self, message: Vec<u8>) -> Promise {
        let adapter = self.0.clone();
        future_to_promise(async move {
            let signed = adapter
                .sign_message(&message)
                .await
                .map_err(|err| adapter_error_to_jsvalue(&err))?;
            to_js(&signed)
        })
    }

    /// Signs in, connecting first when disconnected.
    ///
    /// # Errors
    /// Returns a rejected promise when sign-in fails or produces no proof.
    #[wasm_bindgen(js_name = signIn)]
    pub fn sign_in(&self, input: JsValue) -> Promise {
        let adapter = self.0.clone();
        future_to_promise(async move {
            let payload: Option<SignInPayload> = parse_optional(input)?;
            let output = adapter
                .sign_in(payload)
                .await
                .map_err(|err| adapter_error_to_jsvalue(&err))?;
            to_js(&output)
        })
    }

    /// Prepares, signs and submits a transaction through `connection`, resolving with its
    /// signature.
    ///
    /// # Errors
    /// Returns a rejected promise when not connected, or signing or submission fails.
    #[wasm_bindgen(js_name = sendTransaction)]
    pub fn send_transaction(
        &self,
        transaction: JsValue,
        connection: JsValue,
        options: JsValue,
    ) -> Promise {
        let adapter = self.0.clone();
        future_to_promise(async move {
            let transaction: Transaction = parse(transaction)?;
            let options: SendOptions = parse_optional(options)?;
            adapter
                .send_transaction(transaction, &JsConnection::new(connection), &options)
                .await
                .map(JsValue::from)
                .map_err(|err| adapter_error_to_jsvalue(&err))
        })
    }

    /// Opens the wallet UI, optionally on `page`.
    #[wasm_bindgen(js_name = showWallet)]
    pub fn show_wallet(&self, page: Option<String>) {
        let page = match page.as_deref().map(WalletPage::from_str).transpose() {
            Ok(page) => page,
            Err(err) => {
                log::error!("unknown wallet page: {err}");
                return;
            }
        };
        self.0.show_wallet(page);
    }

    /// Collapses the wallet UI.
    #[wasm_bindgen(js_name = hideWallet)]
    pub fn hide_wallet(&self) {
        self.0.hide_wallet();
    }

    /// Calls `callback` for every `connect`, `disconnect` or `error` event until the returned
    /// subscription is cancelled.
    #[must_use]
    pub fn on(&self, event: String, callback: Function) -> EventSubscription {
        let events = self.0.subscribe();
        let (cancel, cancelled) = oneshot::channel();

        spawn_local(async move {
            forward_events(events, cancelled, &event, |received| {
                let payload = event_payload(received);
                if let Err(err) = callback.call1(&JsValue::UNDEFINED, &payload) {
                    log::error!("{event} listener threw: {err:?}");
                }
            })
            .await;
        });

        EventSubscription {
            cancel: RefCell::new(Some(cancel)),
        }
    }
}

/// Handle returned by [`EmbeddedWallet::on`].
///
/// Dropping the handle keeps the listener; only [`EventSubscription::cancel`] removes it.
#[wasm_bindgen]
pub struct EventSubscription {
    cancel: RefCell<Option<oneshot::Sender<()>>>,
}

#[wasm_bindgen]
impl EventSubscription {
    /// Stops delivering events to the callback and releases the listener.
    pub fn cancel(&self) {
        if let Some(cancel) = self.cancel.borrow_mut().take() {
            let _ = cancel.send(());
        }
    }
}

/// Outcome of [`register_embedded_wallet_js`].
#[wasm_bindgen]
pub struct WalletRegistration {
    wallet: Option<EmbeddedWallet>,
    unregister: RefCell<Option<Unregister>>,
}

#[wasm_bindgen]
impl WalletRegistration {
    /// The registered wallet; `undefined` outside a browser document.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn wallet(&self) -> Option<EmbeddedWallet> {
        self.wallet.clone()
    }

    /// Removes the wallet from the page. Later calls do nothing.
    pub fn unregister(&self) {
        if let Some(unregister) = self.unregister.borrow_mut().take() {
            unregister.unregister();
        }
    }
}

/// Registers the embedded wallet with the page, replacing any previous registration.
///
/// # Errors
/// Throws when `options` or `host_options` cannot be parsed.
#[wasm_bindgen(js_name = registerEmbeddedWallet)]
pub fn register_embedded_wallet_js(
    options: JsValue,
    channel_factory: Function,
    host_options: JsValue,
) -> Result<WalletRegistration, JsValue> {
    let options: RegistrationOptions = parse(options)?;
    let host: HostOptions = parse_optional(host_options)?;
    let build_env = host.build_env()?;
    let factory = JsChannelFactory::new(
        channel_factory,
        host.capabilities,
        Some(options.rpc_url.clone()),
    );

    let (wallet, unregister) =
        register_embedded_wallet(&options, browser_context(build_env), factory).into_parts();
    let wallet = wallet.map(|wallet| EmbeddedWallet(wallet.adapter().clone()));
    if let Some(wallet) = &wallet {
        spawn_allowlist_check(&wallet.0);
    }

    Ok(WalletRegistration {
        wallet,
        unregister: RefCell::new(Some(unregister)),
    })
}

/// Describes the wallets registered on this page.
///
/// # Errors
/// Throws if the descriptors cannot be converted.
#[wasm_bindgen(js_name = registeredWallets)]
pub fn registered_wallets_js() -> Result<JsValue, JsValue> {
    to_js(&registered_wallets())
}

/// Hands every event called `name` to `deliver` until `cancelled` fires or the adapter is gone.
///
/// A dropped cancel sender does not end forwarding.
async fn forward_events(
    mut events: broadcast::Receiver<AdapterEvent>,
    mut cancelled: oneshot::Receiver<()>,
    name: &str,
    deliver: impl Fn(&AdapterEvent),
) {
    loop {
        let received = tokio::select! {
            biased;
            Ok(()) = &mut cancelled => break,
            received = events.recv() => received,
        };
        match received {
            Ok(received) if received.name() == name => deliver(&received),
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("{name} listener missed {skipped} events");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn event_payload(event: &AdapterEvent) -> JsValue {
    match event {
        AdapterEvent::Connect(key) => JsValue::from_str(&key.to_base58()),
        AdapterEvent::Disconnect => JsValue::UNDEFINED,
        AdapterEvent::Error(err) => adapter_error_to_jsvalue(err),
    }
}

fn parse<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(JsValue::from)
}

/// Like [`parse`], with `undefined` and `null` meaning the default.
fn parse_optional<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    parse(value)
}

fn adapter_error_to_jsvalue(error: &WalletAdapterError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[wasm_bindgen(typescript_custom_section)]
const TYPESCRIPT_DEFS: &str = r#"
export type WalletPage = "home" | "deposit" | "send" | "activity" | "settings";

export interface Transaction {
    feePayer?: string;
    recentBlockhash?: string;
    message: number[];
    signatures: number[][];
}

export interface SignInOutput {
    address: string;
    signedMessage: number[];
    signature: number[];
    signatureType?: string;
}

export interface WalletCapabilities {
    signIn?: boolean;
    showWallet?: boolean;
    remoteSendTransaction?: boolean;
}

export interface HostOptions {
    buildEnv?: "production" | "staging" | "local";
    capabilities?: WalletCapabilities;
    rpcUrl?: string;
}

export interface SessionInfo {
    dappSessionId: string;
    buildEnv: string;
    forceIframe: boolean;
    surfaceUrl?: string;
}

export interface EmbeddedChannel {
    init(
        options: object,
        onWalletHandshake: (methods: {
            showWallet(page?: WalletPage): void;
            hideWallet(): void;
        }) => void
    ): Promise<{ account: string; signInOutput?: SignInOutput }>;
    signTransaction(transaction: Transaction): Promise<Transaction>;
    signAllTransactions(transactions: Transaction[]): Promise<Transaction[]>;
    signMessage(message: Uint8Array): Promise<{ signature: number[] }>;
    signIn(input?: object): Promise<SignInOutput>;
    sendTransaction?(transaction: Transaction, options: object): Promise<string>;
    isLoggedIn(): boolean;
    cleanUp(): Promise<void>;
    clearElements(): void;
    onAccountChanged(listener: (address: string) => void): () => void;
    notifyDisallowed(): void;
}

export type ChannelFactory = (session: SessionInfo, config: object) => EmbeddedChannel;

export interface RpcConnection {
    getLatestBlockhash(commitment: string): Promise<string | { blockhash: string }>;
    sendRawTransaction(transaction: Transaction, options: object): Promise<string>;
    confirmTransaction(signature: string, commitment: string): Promise<void>;
}
"#;

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use embedded_wallet_core::{AdapterEvent, WalletAdapterError};
    use tokio::sync::{broadcast, oneshot};

    use super::forward_events;

    #[tokio::test]
    async fn test_cancel_ends_forwarding_while_adapter_is_alive() {
        let (events, receiver) = broadcast::channel(8);
        let (cancel, cancelled) = oneshot::channel();
        let delivered = RefCell::new(Vec::new());

        events.send(AdapterEvent::Disconnect).unwrap();
        cancel.send(()).unwrap();
        forward_events(receiver, cancelled, "disconnect", |event| {
            delivered.borrow_mut().push(event.clone());
        })
        .await;

        assert!(delivered.borrow().is_empty());
        assert_eq!(events.receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_forwards_only_the_named_event() {
        let (events, receiver) = broadcast::channel(8);
        let (_cancel, cancelled) = oneshot::channel();
        let delivered = RefCell::new(Vec::new());

        events
            .send(AdapterEvent::Error(WalletAdapterError::NotConnected))
            .unwrap();
        events.send(AdapterEvent::Disconnect).unwrap();
        drop(events);
        forward_events(receiver, cancelled, "disconnect", |event| {
            delivered.borrow_mut().push(event.clone());
        })
        .await;

        assert_eq!(*delivered.borrow(), vec![AdapterEvent::Disconnect]);
    }

    #[tokio::test]
    async fn test_dropped_handle_keeps_forwarding() {
        let (events, receiver) = broadcast::channel(8);
        let (cancel, cancelled) = oneshot::channel::<()>();
        let delivered = RefCell::new(Vec::new());

        drop(cancel);
        events.send(AdapterEvent::Disconnect).unwrap();
        drop(events);
        forward_events(receiver, cancelled, "disconnect", |event| {
            delivered.borrow_mut().push(event.clone());
        })
        .await;

        assert_eq!(*delivered.borrow(), vec![AdapterEvent::Disconnect]);
    }
}
