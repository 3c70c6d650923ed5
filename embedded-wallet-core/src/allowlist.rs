//! Origin allowlist check.
//!
//! Every client id is registered for a set of origins. Before (or while) the wallet is used on a
//! page, the adapter asks the allowlist service whether the page's origin belongs to the client
//! id. The check fails closed: anything other than an explicit positive answer counts as "not
//! allowed".

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde_json::Value;

use crate::config::BuildEnv;
use crate::defaults::BuildEnvEndpoints;
use crate::request::Request;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AllowlistQuery<'a> {
    client_id: &'a str,
    referrer_url: &'a str,
}

/// Client for the allowlist service.
#[derive(Debug, Clone)]
pub struct AllowlistGuard {
    endpoint: String,
    request: Request,
}

impl AllowlistGuard {
    /// A guard talking to the allowlist service of `build_env`.
    #[must_use]
    pub fn new(build_env: BuildEnv) -> Self {
        Self::with_endpoint(build_env.allowlist_endpoint())
    }

    /// A guard talking to a custom allowlist endpoint.
    #[must_use]
    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            request: Request::new(),
        }
    }

    /// Checks whether `client_id` may be used on the origin of `origin_url`.
    ///
    /// Performs exactly one request. When the answer is "not allowed" (including every
    /// failure), `on_disallowed` runs once before this returns `false`. Never errors.
    pub async fn check_allowlisted(
        &self,
        client_id: &str,
        origin_url: &str,
        on_disallowed: impl FnOnce(),
    ) -> bool {
        let allowed = self.query(client_id, origin_url).await;
        if !allowed {
            log::warn!("client id {client_id} is not allowlisted for this origin");
            on_disallowed();
        }
        allowed
    }

    async fn query(&self, client_id: &str, origin_url: &str) -> bool {
        let Some(origin) = normalize_origin(origin_url) else {
            log::warn!("[AllowlistGuard] page url has no usable origin");
            return false;
        };
        let Some(url) = self.request_url(client_id, &origin) else {
            log::error!("[AllowlistGuard] malformed allowlist endpoint {}", self.endpoint);
            return false;
        };

        let response = match self.request.get(url).await {
            Ok(response) => response,
            Err(err) => {
                log::warn!("[AllowlistGuard] allowlist request failed: {err}");
                return false;
            }
        };
        if response.status() != StatusCode::OK {
            log::warn!(
                "[AllowlistGuard] allowlist responded with status {}",
                response.status()
            );
            return false;
        }

        match response.json::<Value>().await {
            Ok(body) => body.get("ancestor").is_some_and(is_truthy),
            Err(err) => {
                log::warn!("[AllowlistGuard] unreadable allowlist response: {err}");
                false
            }
        }
    }

    /// `{endpoint}/{base64(json)}`, with the encoded segment percent-escaped.
    fn request_url(&self, client_id: &str, origin: &str) -> Option<Url> {
        let query = AllowlistQuery {
            client_id,
            referrer_url: origin,
        };
        let encoded = STANDARD.encode(serde_json::to_vec(&query).ok()?);

        let mut url = Url::parse(&self.endpoint).ok()?;
        url.path_segments_mut().ok()?.push(&encoded);
        Some(url)
    }
}

/// Reduces a URL to `scheme://host[:port]`, dropping path, query and fragment.
///
/// Returns `None` for URLs without a network origin (`data:`, `file:`, unparsable input).
#[must_use]
pub fn normalize_origin(url: &str) -> Option<String> {
    let origin = Url::parse(url).ok()?.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use mockito::{Matcher, Server};

    use super::*;

    fn allowlist_path() -> Matcher {
        Matcher::Regex(r"^/v1/allowlist/[^/]+$".to_string())
    }

    #[test]
    fn test_normalize_origin_drops_path_and_query() {
        assert_eq!(
            normalize_origin("https://dapp.example:8443/swap?token=abc#frag").as_deref(),
            Some("https://dapp.example:8443")
        );
        assert_eq!(
            normalize_origin("https://dapp.example/").as_deref(),
            Some("https://dapp.example")
        );
        assert_eq!(normalize_origin("data:text/plain,hello"), None);
        assert_eq!(normalize_origin("not a url"), None);
    }

    #[test]
    fn test_request_url_encodes_client_and_origin() {
        let guard = AllowlistGuard::with_endpoint("https://api.example/v1/allowlist/");
        let url = guard.request_url("client-1", "https://dapp.example").unwrap();

        let segment = url.path_segments().unwrap().next_back().unwrap().to_string();
        let segment = segment.replace("%2F", "/");
        let decoded = STANDARD.decode(segment).unwrap();
        let json: Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(json["clientId"], "client-1");
        assert_eq!(json["referrerUrl"], "https://dapp.example");
        assert!(url.as_str().starts_with("https://api.example/v1/allowlist/"));
    }

    #[tokio::test]
    async fn test_allowed_when_ancestor_present() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", allowlist_path())
            .with_status(200)
            .with_body(r#"{"ancestor": "https://dapp.example"}"#)
            .expect(1)
            .create_async()
            .await;

        let guard = AllowlistGuard::with_endpoint(&format!("{}/v1/allowlist", server.url()));
        let called = Cell::new(0);
        let allowed = guard
            .check_allowlisted("client", "https://dapp.example/page?x=1", || {
                called.set(called.get() + 1);
            })
            .await;

        mock.assert_async().await;
        assert!(allowed);
        assert_eq!(called.get(), 0);
    }

    #[tokio::test]
    async fn test_empty_ancestor_is_disallowed() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", allowlist_path())
            .with_status(200)
            .with_body(r#"{"ancestor": ""}"#)
            .create_async()
            .await;

        let guard = AllowlistGuard::with_endpoint(&format!("{}/v1/allowlist", server.url()));
        let called = Cell::new(0);
        let allowed = guard
            .check_allowlisted("client", "https://dapp.example", || {
                called.set(called.get() + 1);
            })
            .await;

        assert!(!allowed);
        assert_eq!(called.get(), 1);
    }

    #[tokio::test]
    async fn test_non_200_is_disallowed() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", allowlist_path())
            .with_status(403)
            .with_body(r#"{"ancestor": "https://dapp.example"}"#)
            .create_async()
            .await;

        let guard = AllowlistGuard::with_endpoint(&format!("{}/v1/allowlist", server.url()));
        let called = Cell::new(0);
        let allowed = guard
            .check_allowlisted("client", "https://dapp.example", || {
                called.set(called.get() + 1);
            })
            .await;

        assert!(!allowed);
        assert_eq!(called.get(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_is_disallowed() {
        // Nothing listens on port 9 (discard) in the test environment.
        let guard = AllowlistGuard::with_endpoint("http://127.0.0.1:9/v1/allowlist");
        let called = Cell::new(0);
        let allowed = guard
            .check_allowlisted("client", "https://dapp.example", || {
                called.set(called.get() + 1);
            })
            .await;

        assert!(!allowed);
        assert_eq!(called.get(), 1);
    }

    #[tokio::test]
    async fn test_unusable_origin_skips_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", allowlist_path())
            .expect(0)
            .create_async()
            .await;

        let guard = AllowlistGuard::with_endpoint(&format!("{}/v1/allowlist", server.url()));
        let allowed = guard.check_allowlisted("client", "about:blank", || {}).await;

        mock.assert_async().await;
        assert!(!allowed);
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&Value::Bool(true)));
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&serde_json::json!(0)));
        assert!(is_truthy(&serde_json::json!({"a": 1})));
    }
}
