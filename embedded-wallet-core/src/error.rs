use thiserror::Error;

/// Error outputs from the embedded wallet adapter.
///
/// Every rejection the adapter surfaces to its caller is one of these kinds. The same value is
/// also broadcast as an [`AdapterEvent::Error`](crate::AdapterEvent::Error) before the call
/// returns, so consumers may rely on either the event or the returned `Result`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletAdapterError {
    /// The runtime cannot host the embedded wallet (no document, or an in-app browser that
    /// cannot complete the handshake).
    #[error("wallet_not_ready: {0}")]
    NotReady(String),
    /// Construction-time options were rejected, either by the embedded surface or by the
    /// allowlist.
    #[error("wallet_config_error: {0}")]
    Config(String),
    /// The handshake with the embedded surface was attempted and failed.
    #[error("wallet_connection_error: {0}")]
    Connection(String),
    /// A wallet operation was attempted without an active session.
    #[error("wallet_not_connected")]
    NotConnected,
    /// An account identifier could not be parsed as a Solana public key.
    #[error("wallet_public_key_error: {0}")]
    PublicKey(String),
    /// The embedded surface failed to sign one or more transactions.
    #[error("wallet_sign_transaction_error: {0}")]
    SignTransaction(String),
    /// The embedded surface failed to sign a message.
    #[error("wallet_sign_message_error: {0}")]
    SignMessage(String),
    /// Sign-in failed or produced no proof.
    #[error("wallet_sign_in_error: {0}")]
    SignIn(String),
    /// A transaction could not be prepared, signed, submitted or confirmed.
    #[error("wallet_send_transaction_error: {0}")]
    SendTransaction(String),
    /// Tearing down the embedded surface failed.
    #[error("wallet_disconnection_error: {0}")]
    Disconnection(String),
}

/// Rejections reported by the embedded session channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The user dismissed the embedded surface.
    #[error("user_cancelled")]
    Cancelled,
    /// The surface rejected the options it was opened with.
    #[error("invalid_config: {0}")]
    Config(String),
    /// The surface could not be loaded.
    #[error("load_failed: {0}")]
    LoadFailed(String),
    /// The surface did not answer in time.
    #[error("timeout")]
    Timeout,
    /// Any other failure reported by the remote side.
    #[error("remote_error: {0}")]
    Remote(String),
}

/// Failures reported by the blockchain RPC connection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcError {
    /// The RPC endpoint could not be reached.
    #[error("rpc_network_error: {0}")]
    Network(String),
    /// The node rejected the submitted transaction.
    #[error("rpc_transaction_rejected: {0}")]
    Rejected(String),
    /// The transaction did not reach the requested commitment.
    #[error("rpc_confirmation_failed: {0}")]
    Confirmation(String),
}

/// The presented text is not a valid Solana public key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublicKeyError {
    /// Not valid base58.
    #[error("invalid_base58: {0}")]
    InvalidBase58(String),
    /// Decoded to the wrong number of bytes.
    #[error("invalid_length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

impl From<PublicKeyError> for WalletAdapterError {
    fn from(error: PublicKeyError) -> Self {
        Self::PublicKey(error.to_string())
    }
}

impl From<RpcError> for WalletAdapterError {
    fn from(error: RpcError) -> Self {
        Self::SendTransaction(error.to_string())
    }
}

impl WalletAdapterError {
    /// Maps a handshake rejection into the adapter taxonomy.
    ///
    /// A surface that refuses its options is a configuration problem; every other failure
    /// is a connection failure.
    #[must_use]
    pub fn from_handshake(error: ChannelError) -> Self {
        match error {
            ChannelError::Config(reason) => Self::Config(reason),
            other => Self::Connection(other.to_string()),
        }
    }
}
