//! Transactions, the RPC collaborator, and the generic send policy.
//!
//! The adapter never builds or inspects transaction messages; it only fills the two fields a
//! wallet must own (fee payer and recent blockhash) before handing the transaction to a signer.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{RpcError, WalletAdapterError};
use crate::public_key::PublicKey;
use crate::sign_in::{SignInOutput, SignInPayload, SignedMessage};

/// A Solana transaction as exchanged with the embedded surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Account paying the fees. Filled with the connected account when absent.
    pub fee_payer: Option<PublicKey>,
    /// Blockhash the transaction is bound to. Fetched from the RPC connection when absent.
    pub recent_blockhash: Option<String>,
    /// Serialized message body, opaque to the adapter.
    pub message: Vec<u8>,
    /// Signatures collected so far, in signer order.
    pub signatures: Vec<Vec<u8>>,
}

/// Commitment level for RPC reads and confirmations.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    /// Processed by the connected node.
    Processed,
    /// Voted on by a supermajority.
    #[default]
    Confirmed,
    /// Rooted.
    Finalized,
}

/// Options for submitting a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendOptions {
    /// Skip the node's preflight simulation.
    pub skip_preflight: bool,
    /// Commitment used for preflight and for fetching the blockhash.
    pub preflight_commitment: Option<Commitment>,
    /// Maximum number of times the node retries the submission.
    pub max_retries: Option<u32>,
    /// Minimum slot the node must have reached.
    pub min_context_slot: Option<u64>,
}

impl SendOptions {
    /// The commitment to read and confirm at.
    #[must_use]
    pub fn commitment(&self) -> Commitment {
        self.preflight_commitment.unwrap_or_default()
    }
}

/// The blockchain RPC connection. Supplied by the host application.
#[allow(async_fn_in_trait)]
pub trait RpcConnection {
    /// Fetches the latest blockhash.
    ///
    /// # Errors
    ///
    /// Returns an error if the node cannot be reached.
    async fn latest_blockhash(&self, commitment: Commitment) -> Result<String, RpcError>;

    /// Submits a fully signed transaction and returns its base58 signature.
    ///
    /// # Errors
    ///
    /// Returns an error if the node rejects the transaction.
    async fn send_raw_transaction(
        &self,
        transaction: &Transaction,
        options: &SendOptions,
    ) -> Result<String, RpcError>;

    /// Waits until `signature` reaches `commitment`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails or is dropped.
    async fn confirm_transaction(
        &self,
        signature: &str,
        commitment: Commitment,
    ) -> Result<(), RpcError>;
}

/// Fills in the wallet-owned fields of a transaction before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionPreparer {
    fee_payer: PublicKey,
}

impl TransactionPreparer {
    /// A preparer paying fees from `fee_payer`.
    #[must_use]
    pub const fn new(fee_payer: PublicKey) -> Self {
        Self { fee_payer }
    }

    /// Sets the fee payer and recent blockhash where the caller left them empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the blockhash has to be fetched and the fetch fails.
    pub async fn prepare<R: RpcConnection>(
        &self,
        mut transaction: Transaction,
        connection: &R,
        options: &SendOptions,
    ) -> Result<Transaction, RpcError> {
        if transaction.fee_payer.is_none() {
            transaction.fee_payer = Some(self.fee_payer);
        }
        if transaction.recent_blockhash.is_none() {
            transaction.recent_blockhash =
                Some(connection.latest_blockhash(options.commitment()).await?);
        }
        Ok(transaction)
    }
}

/// The signing surface of a wallet.
#[allow(async_fn_in_trait)]
pub trait SignerWallet {
    /// The connected account, if any.
    fn public_key(&self) -> Option<PublicKey>;

    /// Signs one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet is not connected or refuses to sign.
    async fn sign_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Transaction, WalletAdapterError>;

    /// Signs several transactions in one approval.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet is not connected or refuses to sign.
    async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletAdapterError>;

    /// Signs an arbitrary message.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet is not connected or refuses to sign.
    async fn sign_message(&self, message: &[u8]) -> Result<SignedMessage, WalletAdapterError>;

    /// Produces a sign-in proof.
    ///
    /// # Errors
    ///
    /// Returns an error if sign-in fails.
    async fn sign_in(
        &self,
        payload: Option<SignInPayload>,
    ) -> Result<Option<SignInOutput>, WalletAdapterError>;
}

/// Generic send policy: prepare, sign with `wallet`, submit, then confirm.
///
/// Returns the base58 transaction signature.
///
/// # Errors
///
/// Returns `NotConnected` without a connected account, the wallet's own error if signing
/// fails, and `SendTransaction` for any RPC failure.
pub async fn sign_and_send_transaction<W, R>(
    wallet: &W,
    connection: &R,
    transaction: Transaction,
    options: &SendOptions,
) -> Result<String, WalletAdapterError>
where
    W: SignerWallet,
    R: RpcConnection,
{
    let fee_payer = wallet.public_key().ok_or(WalletAdapterError::NotConnected)?;
    let prepared = TransactionPreparer::new(fee_payer)
        .prepare(transaction, connection, options)
        .await?;
    let signed = wallet.sign_transaction(prepared).await?;
    let signature = connection.send_raw_transaction(&signed, options).await?;
    connection
        .confirm_transaction(&signature, options.commitment())
        .await?;
    Ok(signature)
}
