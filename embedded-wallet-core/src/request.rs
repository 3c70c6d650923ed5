use reqwest::Url;

#[cfg(not(target_arch = "wasm32"))]
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Thin wrapper over the HTTP client with the adapter's defaults applied.
#[derive(Debug, Clone)]
pub struct Request {
    client: reqwest::Client,
}

impl Request {
    pub(crate) fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Issues a single GET. No retries: the allowlist check performs exactly one round trip.
    ///
    /// In the browser the user agent and timeout are owned by `fetch`.
    pub(crate) async fn get(&self, url: Url) -> Result<reqwest::Response, reqwest::Error> {
        let builder = self.client.get(url);
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(REQUEST_TIMEOUT).header(
            "User-Agent",
            format!("embedded-wallet-core/{}", env!("CARGO_PKG_VERSION")),
        );
        builder.send().await
    }
}
