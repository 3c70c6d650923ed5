#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
// The adapter is single-threaded by construction (browser main thread); its futures hold `Rc`s.
#![allow(clippy::future_not_send)]

//! Core of a Solana wallet adapter backed by an embedded wallet surface.
//!
//! The wallet runs inside an iframe or popup owned by the host page instead of a browser
//! extension. This crate holds the platform-independent parts: environment classification,
//! the allowlist guard, the session-channel contract, the connection state machine and
//! wallet-standard registration. Browser bindings live in `embedded-wallet-wasm`.

pub mod adapter;
pub use adapter::{AdapterContext, AdapterEvent, ConnectionState, EmbeddedWalletAdapter};

pub mod allowlist;
pub use allowlist::AllowlistGuard;

pub mod channel;
pub use channel::{ChannelFactory, SessionChannel, WalletCapabilities, WalletPage};

mod config;
pub use config::*;

pub mod environment;
pub use environment::{EnvironmentProfile, EnvironmentSnapshot};

mod error;
pub use error::*;

pub mod logger;

pub mod memory;

pub mod platform;

mod public_key;
pub use public_key::PublicKey;

mod readiness;
pub use readiness::*;

pub mod registry;

pub mod session;

mod sign_in;
pub use sign_in::*;

pub mod standard;
pub use standard::{register_embedded_wallet, registered_wallets, Unregister};

pub mod transaction;
pub use transaction::{sign_and_send_transaction, Transaction};

mod defaults;
pub use defaults::{
    surface_url, BuildEnvEndpoints, INSTANCE_KIND, PERSISTED_ACCOUNT_KEY, TRANSIENT_QUERY_PARAMS,
};

// private modules
mod request;
