use crate::error::WalletAdapterError;
use crate::public_key::PublicKey;

/// Notifications broadcast by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterEvent {
    /// An account is connected, either by a handshake or by a switch inside the surface.
    Connect(PublicKey),
    /// The adapter disconnected.
    Disconnect,
    /// An operation failed. The same error is also returned to the caller, if any.
    Error(WalletAdapterError),
}

impl AdapterEvent {
    /// The event name used by wallet-adapter event emitters.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Connect(_) => "connect",
            Self::Disconnect => "disconnect",
            Self::Error(_) => "error",
        }
    }
}
