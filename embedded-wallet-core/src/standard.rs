//! Wallet-standard registration.
//!
//! Exposes an [`EmbeddedWalletAdapter`] to generic wallet-selection interfaces. Registration
//! is page-global: registering again tears down the adapter that owned the page before.

use std::rc::Rc;

use serde::Serialize;

use crate::adapter::{AdapterContext, EmbeddedWalletAdapter};
use crate::channel::{ChannelFactory, WalletCapabilities};
use crate::config::RegistrationOptions;
use crate::defaults::INSTANCE_KIND;
use crate::readiness::WalletReadyState;
use crate::registry::{self, RegisteredInstance};

/// Name shown by wallet-selection interfaces.
pub const WALLET_NAME: &str = "Embedded Wallet";

/// Wallet-standard version implemented.
pub const STANDARD_VERSION: &str = "1.0.0";

/// `standard:connect`
pub const CONNECT_FEATURE: &str = "standard:connect";
/// `standard:disconnect`
pub const DISCONNECT_FEATURE: &str = "standard:disconnect";
/// `standard:events`
pub const EVENTS_FEATURE: &str = "standard:events";
/// `solana:signTransaction`
pub const SIGN_TRANSACTION_FEATURE: &str = "solana:signTransaction";
/// `solana:signAndSendTransaction`
pub const SIGN_AND_SEND_TRANSACTION_FEATURE: &str = "solana:signAndSendTransaction";
/// `solana:signMessage`
pub const SIGN_MESSAGE_FEATURE: &str = "solana:signMessage";
/// `solana:signIn`
pub const SIGN_IN_FEATURE: &str = "solana:signIn";

/// Static description of a registered wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDescriptor {
    /// Display name.
    pub name: String,
    /// Wallet-standard version.
    pub version: String,
    /// Supported chain ids.
    pub chains: Vec<String>,
    /// Supported feature names.
    pub features: Vec<String>,
    /// Base58 addresses of the connected accounts.
    pub accounts: Vec<String>,
    /// Availability.
    pub ready_state: WalletReadyState,
}

/// Features a wallet with `capabilities` supports.
///
/// `solana:signAndSendTransaction` is always present: without remote submission the adapter
/// signs through the surface and submits itself.
#[must_use]
pub fn features_for(capabilities: WalletCapabilities) -> Vec<&'static str> {
    let mut features = vec![
        CONNECT_FEATURE,
        DISCONNECT_FEATURE,
        EVENTS_FEATURE,
        SIGN_TRANSACTION_FEATURE,
        SIGN_AND_SEND_TRANSACTION_FEATURE,
        SIGN_MESSAGE_FEATURE,
    ];
    if capabilities.sign_in {
        features.push(SIGN_IN_FEATURE);
    }
    features
}

/// Wallet-standard view of an adapter.
pub struct StandardWallet<F: ChannelFactory> {
    adapter: EmbeddedWalletAdapter<F>,
}

impl<F: ChannelFactory> Clone for StandardWallet<F> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
        }
    }
}

impl<F: ChannelFactory + 'static> StandardWallet<F> {
    /// Wraps `adapter`.
    #[must_use]
    pub const fn new(adapter: EmbeddedWalletAdapter<F>) -> Self {
        Self { adapter }
    }

    /// The wrapped adapter.
    #[must_use]
    pub const fn adapter(&self) -> &EmbeddedWalletAdapter<F> {
        &self.adapter
    }

    /// The chain of the configured network.
    #[must_use]
    pub fn chains(&self) -> Vec<String> {
        vec![self.adapter.config().network.chain_id().to_string()]
    }

    /// Supported features.
    #[must_use]
    pub fn features(&self) -> Vec<&'static str> {
        features_for(self.adapter.capabilities())
    }

    /// Connected accounts, at most one.
    #[must_use]
    pub fn accounts(&self) -> Vec<String> {
        self.adapter
            .public_key()
            .map(|key| key.to_base58())
            .into_iter()
            .collect()
    }
}

impl<F: ChannelFactory + 'static> RegisteredInstance for StandardWallet<F> {
    fn tear_down(&self) {
        self.adapter.tear_down();
    }

    fn descriptor(&self) -> WalletDescriptor {
        WalletDescriptor {
            name: WALLET_NAME.to_string(),
            version: STANDARD_VERSION.to_string(),
            chains: self.chains(),
            features: self.features().into_iter().map(str::to_string).collect(),
            accounts: self.accounts(),
            ready_state: self.adapter.ready_state(),
        }
    }
}

/// Handle removing a registration.
#[must_use = "dropping the handle keeps the wallet registered"]
pub struct Unregister {
    instance: Option<Rc<dyn RegisteredInstance>>,
}

impl Unregister {
    /// A handle that does nothing.
    pub const fn noop() -> Self {
        Self { instance: None }
    }

    /// Whether the handle refers to a registration.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.instance.is_none()
    }

    /// Removes the wallet from the registry and tears it down.
    ///
    /// A registration that was already replaced by a newer one is left alone.
    pub fn unregister(self) {
        let Some(instance) = self.instance else {
            return;
        };
        let current = registry::get(INSTANCE_KIND);
        if current.is_some_and(|current| Rc::ptr_eq(&current, &instance)) {
            registry::clear(INSTANCE_KIND);
        }
        instance.tear_down();
    }
}

/// Outcome of [`register_embedded_wallet`].
#[must_use]
pub struct Registration<F: ChannelFactory> {
    wallet: Option<StandardWallet<F>>,
    unregister: Unregister,
}

impl<F: ChannelFactory + 'static> Registration<F> {
    /// The registered wallet; `None` outside a browser document.
    pub const fn wallet(&self) -> Option<&StandardWallet<F>> {
        self.wallet.as_ref()
    }

    /// Splits into the wallet and its unregister handle.
    pub fn into_parts(self) -> (Option<StandardWallet<F>>, Unregister) {
        (self.wallet, self.unregister)
    }

    /// Removes the registration.
    pub fn unregister(self) {
        self.unregister.unregister();
    }
}

/// Builds an adapter from `options` and registers it with the page.
///
/// Does nothing outside a browser document. The adapter previously registered on this page, if
/// any, is torn down. The caller starts [`EmbeddedWalletAdapter::enforce_allowlist`] on the
/// returned wallet.
pub fn register_embedded_wallet<F: ChannelFactory + 'static>(
    options: &RegistrationOptions,
    context: AdapterContext,
    factory: F,
) -> Registration<F> {
    if !context.environment.has_document {
        log::debug!("no browser document; skipping wallet registration");
        return Registration {
            wallet: None,
            unregister: Unregister::noop(),
        };
    }

    let adapter = EmbeddedWalletAdapter::new(options.to_adapter_config(), context, factory);
    let wallet = StandardWallet::new(adapter);
    let instance: Rc<dyn RegisteredInstance> = Rc::new(wallet.clone());
    if let Some(previous) = registry::set(INSTANCE_KIND, Rc::clone(&instance)) {
        log::info!("replacing the previously registered embedded wallet");
        previous.tear_down();
    }

    Registration {
        wallet: Some(wallet),
        unregister: Unregister {
            instance: Some(instance),
        },
    }
}

/// Describes every registered wallet.
#[must_use]
pub fn registered_wallets() -> Vec<WalletDescriptor> {
    registry::descriptors()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildEnv, Network};
    use crate::environment::EnvironmentSnapshot;
    use crate::memory::{ChannelCall, MemoryStore, RecordingHost, ScriptedChannelFactory};

    const ADDR: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";
    const DESKTOP_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";

    fn options() -> RegistrationOptions {
        serde_json::from_value(serde_json::json!({
            "clientId": "client-1",
            "title": "Test App",
            "rpcUrl": "https://api.devnet.solana.com",
            "network": "devnet",
        }))
        .unwrap()
    }

    fn context(environment: EnvironmentSnapshot) -> AdapterContext {
        AdapterContext::new(
            environment,
            Rc::new(MemoryStore::new()),
            Rc::new(RecordingHost::new()),
            BuildEnv::Local,
        )
    }

    fn browser() -> EnvironmentSnapshot {
        EnvironmentSnapshot::browser(DESKTOP_UA, "https://dapp.example/")
    }

    #[test]
    fn test_registration_is_a_noop_without_document() {
        let registration = register_embedded_wallet(
            &options(),
            context(EnvironmentSnapshot::headless()),
            ScriptedChannelFactory::new(),
        );
        assert!(registration.wallet().is_none());
        assert!(registry::get(INSTANCE_KIND).is_none());

        let (_, unregister) = registration.into_parts();
        assert!(unregister.is_noop());
        unregister.unregister();
    }

    #[test]
    fn test_features_follow_capabilities() {
        let without_sign_in = WalletCapabilities {
            sign_in: false,
            ..WalletCapabilities::default()
        };
        assert!(!features_for(without_sign_in).contains(&SIGN_IN_FEATURE));
        assert!(features_for(without_sign_in).contains(&SIGN_AND_SEND_TRANSACTION_FEATURE));
        assert!(features_for(WalletCapabilities::default()).contains(&SIGN_IN_FEATURE));
    }

    #[tokio::test]
    async fn test_registering_again_tears_down_previous_instance() {
        let first_factory = ScriptedChannelFactory::new();
        let first_script = first_factory.script();
        first_script.push_account(ADDR);
        let first = register_embedded_wallet(&options(), context(browser()), first_factory);
        let first_wallet = first.wallet().unwrap().clone();
        first_wallet.adapter().connect().await.unwrap();

        let descriptors = registered_wallets();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].accounts, vec![ADDR.to_string()]);
        assert_eq!(descriptors[0].chains, vec![Network::Devnet.chain_id().to_string()]);

        let second =
            register_embedded_wallet(&options(), context(browser()), ScriptedChannelFactory::new());

        assert!(!first_wallet.adapter().connected());
        assert_eq!(first_script.calls().last(), Some(&ChannelCall::ClearElements));

        // The stale handle must not remove the newer registration.
        first.unregister();
        assert_eq!(registered_wallets().len(), 1);

        second.unregister();
        assert!(registered_wallets().is_empty());
    }
}
