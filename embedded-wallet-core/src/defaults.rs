use reqwest::Url;

use crate::config::{BuildEnv, Network};

/// Storage key holding the base58 address of the last connected account.
pub const PERSISTED_ACCOUNT_KEY: &str = "embeddedWalletLastConnectedAccount";

/// Query parameters the surface appends to the page URL on mobile redirect round-trips.
pub const TRANSIENT_QUERY_PARAMS: [&str; 3] = [
    "hyperLinkAutoConnect",
    "hyperLinkAutoConnectPublicKey",
    "promptHyperLinkAutoConnect",
];

/// Label under which the live adapter instance is kept in the instance registry.
pub const INSTANCE_KIND: &str = "embedded-solana-wallet";

/// Endpoints a build environment resolves to.
pub trait BuildEnvEndpoints {
    /// Origin serving the embedded wallet surface.
    fn surface_origin(&self) -> &'static str;

    /// Base URL of the allowlist service.
    fn allowlist_endpoint(&self) -> &'static str;
}

impl BuildEnvEndpoints for BuildEnv {
    fn surface_origin(&self) -> &'static str {
        match self {
            Self::Production => "https://wallet.embedded-solana.app",
            Self::Staging => "https://wallet.stage.embedded-solana.app",
            Self::Local => "http://localhost:3000",
        }
    }

    fn allowlist_endpoint(&self) -> &'static str {
        match self {
            Self::Production => "https://api.embedded-solana.app/v1/allowlist",
            Self::Staging => "https://api.stage.embedded-solana.app/v1/allowlist",
            Self::Local => "http://localhost:3001/v1/allowlist",
        }
    }
}

/// Builds the URL of the embedded surface for a client, cluster and session.
///
/// Returns `None` only if the build environment's origin is malformed, which cannot happen for
/// the compiled-in values.
#[must_use]
pub fn surface_url(
    build_env: BuildEnv,
    client_id: &str,
    network: Network,
    dapp_session_id: &str,
) -> Option<Url> {
    let mut url = Url::parse(build_env.surface_origin()).ok()?;
    url.set_path("/embedded_adapter");
    url.query_pairs_mut()
        .append_pair("clientId", client_id)
        .append_pair("cluster", network.cluster())
        .append_pair("dAppSessionId", dapp_session_id);
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_url_is_parameterized() {
        let url = surface_url(BuildEnv::Production, "client 1", Network::Devnet, "sess")
            .unwrap();
        assert_eq!(url.origin().ascii_serialization(), BuildEnv::Production.surface_origin());
        assert_eq!(url.path(), "/embedded_adapter");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("clientId".to_string(), "client 1".to_string()),
                ("cluster".to_string(), "devnet".to_string()),
                ("dAppSessionId".to_string(), "sess".to_string()),
            ]
        );
    }

    #[test]
    fn test_local_build_env_uses_localhost() {
        let url = surface_url(BuildEnv::Local, "c", Network::Mainnet, "s").unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(3000));
    }
}
