//! [`RpcConnection`] over a JavaScript connection object.
//!
//! The object is whatever RPC client the host already uses, wrapped to expose
//! `getLatestBlockhash(commitment)`, `sendRawTransaction(transaction, options)` and
//! `confirmTransaction(signature, commitment)`.

use embedded_wallet_core::transaction::{Commitment, RpcConnection, SendOptions, Transaction};
use embedded_wallet_core::RpcError;
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::channel::{describe, to_js};

/// A host-supplied RPC connection.
pub struct JsConnection(JsValue);

impl JsConnection {
    pub const fn new(connection: JsValue) -> Self {
        Self(connection)
    }

    async fn call(&self, name: &str, args: &[JsValue]) -> Result<JsValue, RpcError> {
        let method = Reflect::get(&self.0, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| RpcError::Network(format!("connection does not implement {name}")))?;
        let args: js_sys::Array = args.iter().collect();
        let value = method
            .apply(&self.0, &args)
            .map_err(|err| RpcError::Network(describe(&err)))?;
        JsFuture::from(Promise::resolve(&value))
            .await
            .map_err(|err| RpcError::Network(describe(&err)))
    }
}

impl RpcConnection for JsConnection {
    async fn latest_blockhash(&self, commitment: Commitment) -> Result<String, RpcError> {
        let value = self
            .call("getLatestBlockhash", &[commitment.to_string().into()])
            .await?;
        // Accept both `{ blockhash }` and a bare string.
        value
            .as_string()
            .or_else(|| {
                Reflect::get(&value, &JsValue::from_str("blockhash"))
                    .ok()
                    .and_then(|blockhash| blockhash.as_string())
            })
            .ok_or_else(|| {
                RpcError::Network("getLatestBlockhash returned no blockhash".to_string())
            })
    }

    async fn send_raw_transaction(
        &self,
        transaction: &Transaction,
        options: &SendOptions,
    ) -> Result<String, RpcError> {
        let encode = |value: Result<JsValue, JsValue>| {
            value.map_err(|err| RpcError::Rejected(describe(&err)))
        };
        let args = [encode(to_js(transaction))?, encode(to_js(options))?];
        let signature = self
            .call("sendRawTransaction", &args)
            .await
            .map_err(|err| match err {
                RpcError::Network(reason) => RpcError::Rejected(reason),
                other => other,
            })?;
        signature.as_string().ok_or_else(|| {
            RpcError::Rejected("sendRawTransaction returned no signature".to_string())
        })
    }

    async fn confirm_transaction(
        &self,
        signature: &str,
        commitment: Commitment,
    ) -> Result<(), RpcError> {
        self.call(
            "confirmTransaction",
            &[signature.into(), commitment.to_string().into()],
        )
        .await
        .map(|_| ())
        .map_err(|err| match err {
            RpcError::Network(reason) => RpcError::Confirmation(reason),
            other => other,
        })
    }
}
