//! Per-adapter session identity and iframe policy.

use reqwest::Url;
use uuid::Uuid;

use crate::config::BuildEnv;
use crate::defaults::BuildEnvEndpoints;
use crate::environment::EnvironmentProfile;

/// Per-instance session data shared with the embedded surface.
///
/// Created once when the adapter is constructed and owned by that adapter alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    dapp_session_id: String,
    build_env: BuildEnv,
    force_iframe: bool,
}

impl Session {
    /// Starts a session with a fresh session id.
    ///
    /// The surface is forced into iframe mode (no popup) inside installed PWAs, inside known
    /// wallet in-app browsers, and when the page was reached from the surface itself (a mobile
    /// redirect round-trip), since none of those contexts can complete a popup handshake.
    #[must_use]
    pub fn new(
        build_env: BuildEnv,
        environment: &EnvironmentProfile,
        referrer: Option<&str>,
    ) -> Self {
        let referred_by_surface = referrer
            .and_then(|referrer| Url::parse(referrer).ok())
            .is_some_and(|url| url.origin().ascii_serialization() == build_env.surface_origin());

        Self {
            dapp_session_id: Uuid::new_v4().to_string(),
            build_env,
            force_iframe: environment.is_pwa()
                || environment.is_known_in_app_wallet_browser()
                || referred_by_surface,
        }
    }

    /// Opaque identifier for this adapter instance's session.
    #[must_use]
    pub fn dapp_session_id(&self) -> &str {
        &self.dapp_session_id
    }

    /// Deployment the surface is loaded from.
    #[must_use]
    pub const fn build_env(&self) -> BuildEnv {
        self.build_env
    }

    /// Whether the surface must be opened as an iframe with click-to-continue.
    #[must_use]
    pub const fn force_iframe(&self) -> bool {
        self.force_iframe
    }
}
