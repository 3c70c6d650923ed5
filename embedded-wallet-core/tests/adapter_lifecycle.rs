//! End-to-end adapter lifecycle through the public API: registration, reloads and wallet
//! browsers.

mod common;

use common::{TestPage, ADDR_A, ADDR_B, PHANTOM_IOS_UA};
use embedded_wallet_core::channel::InitOptions;
use embedded_wallet_core::memory::{
    ChannelCall, ChannelScript, MemoryRpcConnection, ScriptedChannelFactory,
};
use embedded_wallet_core::platform::PersistentStore;
use embedded_wallet_core::standard::{SIGN_IN_FEATURE, WALLET_NAME};
use embedded_wallet_core::transaction::SendOptions;
use embedded_wallet_core::{
    register_embedded_wallet, registered_wallets, sign_and_send_transaction, AdapterConfig,
    EmbeddedWalletAdapter, EnvironmentSnapshot, PublicKey, Transaction, WalletReadyState,
    PERSISTED_ACCOUNT_KEY,
};

fn first_init(script: &ChannelScript) -> InitOptions {
    script
        .calls()
        .into_iter()
        .find_map(|call| match call {
            ChannelCall::Init(options) => Some(options),
            _ => None,
        })
        .expect("an init call")
}

#[tokio::test]
async fn test_registered_wallet_session() {
    let page = TestPage::new();
    let factory = ScriptedChannelFactory::new();
    let script = factory.script();
    script.push_account(ADDR_A);

    let registration = register_embedded_wallet(
        &common::registration_options(),
        page.context(common::desktop()),
        factory,
    );
    let wallet = registration.wallet().expect("registered in a browser").clone();
    let adapter = wallet.adapter().clone();
    let mut events = adapter.subscribe();

    let descriptors = registered_wallets();
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].name, WALLET_NAME);
    assert_eq!(descriptors[0].chains, vec!["solana:mainnet".to_string()]);
    assert!(descriptors[0].features.contains(&SIGN_IN_FEATURE.to_string()));
    assert!(descriptors[0].accounts.is_empty());

    adapter.connect().await.unwrap();
    assert_eq!(registered_wallets()[0].accounts, vec![ADDR_A.to_string()]);
    assert_eq!(first_init(&script).title, "Integration");

    // Adapters plug into the generic send policy like any other signer.
    let rpc = MemoryRpcConnection::new("blockhash");
    let signature = sign_and_send_transaction(
        &adapter,
        &rpc,
        Transaction::default(),
        &SendOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(rpc.confirmed(), vec![signature]);

    script.emit_account_changed(ADDR_B);
    assert_eq!(wallet.accounts(), vec![ADDR_B.to_string()]);

    adapter.disconnect().await;

    let received: Vec<&str> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|event| event.name())
        .collect();
    assert_eq!(received, vec!["connect", "connect", "disconnect"]);

    registration.unregister();
    assert!(registered_wallets().is_empty());
}

#[tokio::test]
async fn test_reload_reconnects_silently() {
    let page = TestPage::new();
    let config = AdapterConfig {
        client_id: "integration-client".to_string(),
        ..AdapterConfig::default()
    };

    let first_factory = ScriptedChannelFactory::new();
    first_factory.script().push_account(ADDR_A);
    let first =
        EmbeddedWalletAdapter::new(config.clone(), page.context(common::desktop()), first_factory);
    first.connect().await.unwrap();
    drop(first);

    assert_eq!(
        page.store.get_item(PERSISTED_ACCOUNT_KEY).as_deref(),
        Some(ADDR_A)
    );

    let second_factory = ScriptedChannelFactory::new();
    let script = second_factory.script();
    script.push_account(ADDR_A);
    let second =
        EmbeddedWalletAdapter::new(config, page.context(common::desktop()), second_factory);
    second.auto_connect().await.unwrap();

    let options = first_init(&script);
    assert!(options.auto_connect);
    assert!(!options.direct);
    assert_eq!(second.public_key(), Some(ADDR_A.parse::<PublicKey>().unwrap()));
}

#[tokio::test]
async fn test_wallet_app_browser_forces_iframe() {
    let page = TestPage::new();
    let factory = ScriptedChannelFactory::new();
    let script = factory.script();
    script.push_account(ADDR_A);
    let adapter = EmbeddedWalletAdapter::new(
        AdapterConfig::default(),
        page.context(EnvironmentSnapshot::browser(
            PHANTOM_IOS_UA,
            "https://dapp.example/",
        )),
        factory,
    );

    assert_eq!(adapter.ready_state(), WalletReadyState::Loadable);
    assert!(adapter.session().force_iframe());

    adapter.connect().await.unwrap();

    let options = first_init(&script);
    assert!(options.force_click_to_continue);
    assert!(options.auto_connect);
    assert!(page.host.notices().is_empty());
}
