//! Sign-in (SIWS) request and proof, and message signatures.
//!
//! The adapter forwards the payload to the embedded surface untouched and returns whatever
//! proof the surface produces.

use serde::{Deserialize, Serialize};

/// A structured sign-in request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInPayload {
    /// RFC 4501 dns authority requesting the sign-in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Account expected to sign in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Human-readable statement shown to the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    /// URI the sign-in refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Message version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Chain the sign-in is bound to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    /// Replay-protection nonce.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// ISO 8601 issuance time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    /// ISO 8601 expiry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<String>,
    /// ISO 8601 time before which the proof is invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<String>,
    /// Application-defined request id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// URIs the user is asked to grant access to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

/// The signed attestation returned by a sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInOutput {
    /// Base58 address of the account that signed.
    pub address: String,
    /// The exact message bytes that were signed.
    pub signed_message: Vec<u8>,
    /// Signature over `signed_message`.
    pub signature: Vec<u8>,
    /// Signature scheme, `ed25519` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_type: Option<String>,
}

/// A signature over an arbitrary message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    /// The ed25519 signature bytes.
    pub signature: Vec<u8>,
}
