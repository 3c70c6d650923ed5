//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::rc::Rc;

use embedded_wallet_core::memory::{MemoryStore, RecordingHost};
use embedded_wallet_core::{AdapterContext, BuildEnv, EnvironmentSnapshot, RegistrationOptions};

/// A valid account address.
pub const ADDR_A: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";
/// A second valid account address, distinct from [`ADDR_A`].
pub const ADDR_B: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

/// Desktop Chrome on Linux.
pub const DESKTOP_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
/// Phantom's in-app browser on iOS.
pub const PHANTOM_IOS_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148 Phantom/ios";

/// Page collaborators kept around so tests can inspect them after handing them to an adapter.
pub struct TestPage {
    /// Storage handed to the adapter.
    pub store: Rc<MemoryStore>,
    /// Host page handed to the adapter.
    pub host: Rc<RecordingHost>,
}

impl TestPage {
    /// Empty storage and a fresh host.
    pub fn new() -> Self {
        Self {
            store: Rc::new(MemoryStore::new()),
            host: Rc::new(RecordingHost::new()),
        }
    }

    /// Adapter collaborators backed by this page, on the staging deployment.
    pub fn context(&self, environment: EnvironmentSnapshot) -> AdapterContext {
        AdapterContext::new(
            environment,
            Rc::clone(&self.store) as _,
            Rc::clone(&self.host) as _,
            BuildEnv::Staging,
        )
    }
}

impl Default for TestPage {
    fn default() -> Self {
        Self::new()
    }
}

/// A desktop browser page with a document.
pub fn desktop() -> EnvironmentSnapshot {
    EnvironmentSnapshot::browser(DESKTOP_UA, "https://dapp.example/")
}

/// Mainnet registration options with a dark theme.
pub fn registration_options() -> RegistrationOptions {
    serde_json::from_value(serde_json::json!({
        "clientId": "integration-client",
        "title": "Integration",
        "theme": "dark",
        "rpcUrl": "https://api.mainnet-beta.solana.com",
    }))
    .expect("valid registration options")
}
