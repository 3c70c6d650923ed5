//! Bridge from [`SessionChannel`] to a JavaScript channel object.
//!
//! The JavaScript side owns the iframe or popup and its message channel. It is created per
//! connect attempt by the factory function the host passes in, and must expose the methods
//! listed in the `EmbeddedChannel` interface of the generated TypeScript definitions.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use embedded_wallet_core::channel::{
    AccountChangedListener, ChannelFactory, HandshakeCallback, HandshakeMethods,
    HandshakeResult, InitOptions, ListenerId, SessionChannel, WalletCapabilities, WalletPage,
};
use embedded_wallet_core::session::Session;
use embedded_wallet_core::transaction::{
    RpcConnection, SendOptions, Transaction, TransactionPreparer,
};
use embedded_wallet_core::{
    surface_url, AdapterConfig, ChannelError, SignInOutput, SignInPayload, SignedMessage,
};
use js_sys::{Array, Function, Promise, Reflect, Uint8Array};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

const TIMEOUT_MARKER: &str = "embedded-wallet:handshake-timeout";

/// Session details handed to the JavaScript factory.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionInfo<'a> {
    dapp_session_id: &'a str,
    build_env: String,
    force_iframe: bool,
    surface_url: Option<String>,
}

/// Creates [`JsSessionChannel`]s by calling a JavaScript factory function.
pub struct JsChannelFactory {
    create: Function,
    capabilities: WalletCapabilities,
    rpc_url: Option<String>,
}

impl JsChannelFactory {
    pub const fn new(
        create: Function,
        capabilities: WalletCapabilities,
        rpc_url: Option<String>,
    ) -> Self {
        Self {
            create,
            capabilities,
            rpc_url,
        }
    }

    fn instantiate(&self, session: &Session, config: &AdapterConfig) -> Result<JsValue, JsValue> {
        let info = SessionInfo {
            dapp_session_id: session.dapp_session_id(),
            build_env: session.build_env().to_string(),
            force_iframe: session.force_iframe(),
            surface_url: surface_url(
                session.build_env(),
                &config.client_id,
                config.network,
                session.dapp_session_id(),
            )
            .map(String::from),
        };
        let config_value = to_js(config)?;
        if let Some(rpc_url) = &self.rpc_url {
            Reflect::set(&config_value, &"rpcUrl".into(), &rpc_url.into())?;
        }
        self.create
            .call2(&JsValue::UNDEFINED, &to_js(&info)?, &config_value)
    }
}

impl ChannelFactory for JsChannelFactory {
    type Channel = JsSessionChannel;

    fn open(&self, session: &Session, config: &AdapterConfig) -> Self::Channel {
        let target = self.instantiate(session, config).map_err(|err| {
            log::error!("channel factory failed: {}", describe(&err));
            ChannelError::LoadFailed(describe(&err))
        });
        JsSessionChannel {
            target,
            handshake_timeout_ms: config.handshake_timeout_ms,
            listeners: RefCell::new(HashMap::new()),
            next_listener: Cell::new(0),
        }
    }

    fn capabilities(&self) -> WalletCapabilities {
        self.capabilities
    }
}

struct Subscription {
    // Keeps the callback alive for as long as JavaScript may call it.
    _callback: Closure<dyn Fn(String)>,
    unsubscribe: Option<Function>,
}

/// One JavaScript channel object.
pub struct JsSessionChannel {
    target: Result<JsValue, ChannelError>,
    handshake_timeout_ms: Option<u32>,
    listeners: RefCell<HashMap<u64, Subscription>>,
    next_listener: Cell<u64>,
}

impl JsSessionChannel {
    fn target(&self) -> Result<&JsValue, ChannelError> {
        self.target.as_ref().map_err(Clone::clone)
    }

    fn call(&self, name: &str, args: &[JsValue]) -> Result<JsValue, ChannelError> {
        let target = self.target()?;
        let method = Reflect::get(target, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| ChannelError::Remote(format!("channel does not implement {name}")))?;
        let args: Array = args.iter().collect();
        method.apply(target, &args).map_err(|err| channel_error(&err))
    }

    async fn call_async(&self, name: &str, args: &[JsValue]) -> Result<JsValue, ChannelError> {
        let value = self.call(name, args)?;
        JsFuture::from(Promise::resolve(&value))
            .await
            .map_err(|err| channel_error(&err))
    }

    /// Best-effort synchronous call; failures are logged.
    fn notify(&self, name: &str, args: &[JsValue]) {
        if let Err(err) = self.call(name, args) {
            log::warn!("{name} failed: {err}");
        }
    }
}

impl SessionChannel for JsSessionChannel {
    async fn init(
        &self,
        options: InitOptions,
        on_wallet_handshake: HandshakeCallback,
    ) -> Result<HandshakeResult, ChannelError> {
        let on_handshake = Closure::once_into_js(move |methods: JsValue| {
            on_wallet_handshake(handshake_methods(methods));
        });
        let options = encode(&options)?;
        let pending = self.call("init", &[options, on_handshake])?;
        let pending = Promise::resolve(&pending);

        let settled = match self.handshake_timeout_ms {
            Some(timeout_ms) => {
                let (timer, handle) = timeout_promise(timeout_ms)?;
                let race: Array = [JsValue::from(pending), timer.into()].iter().collect();
                let settled = JsFuture::from(Promise::race(&race)).await;
                if let Some(window) = web_sys::window() {
                    window.clear_timeout_with_handle(handle);
                }
                settled
            }
            None => JsFuture::from(pending).await,
        };
        match settled {
            Ok(value) => from_js(value),
            Err(err) if err.as_string().as_deref() == Some(TIMEOUT_MARKER) => {
                Err(ChannelError::Timeout)
            }
            Err(err) => Err(channel_error(&err)),
        }
    }

    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, ChannelError> {
        let value = self
            .call_async("signTransaction", &[encode(&transaction)?])
            .await?;
        from_js(value)
    }

    async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, ChannelError> {
        let value = self
            .call_async("signAllTransactions", &[encode(&transactions)?])
            .await?;
        from_js(value)
    }

    async fn sign_message(&self, message: &[u8]) -> Result<SignedMessage, ChannelError> {
        let value = self
            .call_async("signMessage", &[Uint8Array::from(message).into()])
            .await?;
        from_js(value)
    }

    async fn sign_in(&self, payload: Option<SignInPayload>) -> Result<SignInOutput, ChannelError> {
        let value = self.call_async("signIn", &[encode(&payload)?]).await?;
        from_js(value)
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
            .map_err(|err| ChannelError::Remote(err.to_string()))?;
        let value = self
            .call_async("sendTransaction", &[encode(&prepared)?, encode(options)?])
            .await?;
        value.as_string().ok_or_else(|| {
            ChannelError::Remote("sendTransaction did not return a signature".to_string())
        })
    }

    fn is_logged_in(&self) -> bool {
        self.call("isLoggedIn", &[])
            .is_ok_and(|value| value.is_truthy())
    }

    async fn clean_up(&self) -> Result<(), ChannelError> {
        self.call_async("cleanUp", &[]).await.map(|_| ())
    }

    fn clear_elements(&self) {
        self.notify("clearElements", &[]);
    }

    fn on_account_changed(&self, listener: AccountChangedListener) -> ListenerId {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);

        let callback = Closure::<dyn Fn(String)>::new(move |address: String| listener(address));
        let unsubscribe = match self.call("onAccountChanged", &[callback.as_ref().clone()]) {
            Ok(value) => value.dyn_into::<Function>().ok(),
            Err(err) => {
                log::warn!("onAccountChanged failed: {err}");
                None
            }
        };
        self.listeners.borrow_mut().insert(
            id,
            Subscription {
                _callback: callback,
                unsubscribe,
            },
        );
        ListenerId(id)
    }

    fn off_account_changed(&self, id: ListenerId) {
        let subscription = self.listeners.borrow_mut().remove(&id.0);
        if let Some(unsubscribe) = subscription.and_then(|subscription| subscription.unsubscribe) {
            let _ = unsubscribe.call0(&JsValue::UNDEFINED);
        }
    }

    fn notify_disallowed(&self) {
        self.notify("notifyDisallowed", &[]);
    }
}

/// Wraps the `{ showWallet, hideWallet }` object the surface hands over.
fn handshake_methods(methods: JsValue) -> HandshakeMethods {
    let hide_target = methods.clone();
    HandshakeMethods::new(
        move |page: Option<WalletPage>| {
            let page = page.map_or(JsValue::UNDEFINED, |page| page.to_string().into());
            invoke(&methods, "showWallet", &page);
        },
        move || invoke(&hide_target, "hideWallet", &JsValue::UNDEFINED),
    )
}

fn invoke(target: &JsValue, name: &str, arg: &JsValue) {
    let called = Reflect::get(target, &JsValue::from_str(name))
        .and_then(JsCast::dyn_into::<Function>)
        .and_then(|method| method.call1(target, arg));
    if let Err(err) = called {
        log::error!("{name} failed: {}", describe(&err));
    }
}

/// A promise rejecting with [`TIMEOUT_MARKER`] after `timeout_ms`, and its timer handle.
fn timeout_promise(timeout_ms: u32) -> Result<(Promise, i32), ChannelError> {
    let window = web_sys::window()
        .ok_or_else(|| ChannelError::LoadFailed("no window for the handshake timer".to_string()))?;
    let timeout = i32::try_from(timeout_ms).unwrap_or(i32::MAX);
    let mut scheduled = Ok(0);
    let promise = Promise::new(&mut |_resolve, reject| {
        scheduled = window.set_timeout_with_callback_and_timeout_and_arguments_1(
            &reject,
            timeout,
            &JsValue::from_str(TIMEOUT_MARKER),
        );
    });
    let handle = scheduled.map_err(|err| channel_error(&err))?;
    Ok((promise, handle))
}

/// Maps a JavaScript rejection onto the channel taxonomy.
///
/// Rejections may carry a `code` of `cancelled`, `config`, `load_failed` or `timeout`; anything
/// else is a remote failure.
pub fn channel_error(err: &JsValue) -> ChannelError {
    let code = Reflect::get(err, &JsValue::from_str("code"))
        .ok()
        .and_then(|code| code.as_string());
    let message = describe(err);
    match code.as_deref() {
        Some("cancelled") => ChannelError::Cancelled,
        Some("config") => ChannelError::Config(message),
        Some("load_failed") => ChannelError::LoadFailed(message),
        Some("timeout") => ChannelError::Timeout,
        _ => ChannelError::Remote(message),
    }
}

/// Human-readable text of a JavaScript value, preferring `Error.message`.
pub fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, ChannelError> {
    to_js(value).map_err(|err| channel_error(&err))
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, ChannelError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|err| ChannelError::Remote(format!("unexpected response from the wallet: {err}")))
}
