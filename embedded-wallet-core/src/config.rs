//! Construction-time configuration.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Colour scheme requested from the embedded surface.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the operating system preference.
    #[default]
    System,
    /// Light colour scheme.
    Light,
    /// Dark colour scheme.
    Dark,
}

/// Solana cluster the wallet operates on.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// `mainnet-beta`.
    #[default]
    Mainnet,
    /// `devnet`.
    Devnet,
}

impl Network {
    /// The wallet-standard chain identifier for this cluster.
    #[must_use]
    pub const fn chain_id(self) -> &'static str {
        match self {
            Self::Mainnet => "solana:mainnet",
            Self::Devnet => "solana:devnet",
        }
    }

    /// The cluster name the embedded surface expects in its URL.
    #[must_use]
    pub const fn cluster(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet-beta",
            Self::Devnet => "devnet",
        }
    }
}

/// Deployment of the embedded surface and its companion services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum BuildEnv {
    /// Public production deployment.
    #[default]
    Production,
    /// Pre-release deployment.
    Staging,
    /// A surface served from the developer's machine.
    Local,
}

/// Options fixed for the lifetime of one adapter instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdapterConfig {
    /// Identifier issued to the integrating application; checked against the allowlist.
    pub client_id: String,
    /// Application name shown inside the embedded surface.
    pub title: String,
    /// Requested colour scheme.
    pub theme: Theme,
    /// Whether the wallet counts as installed on desktop browsers.
    pub installed_on_desktop: bool,
    /// Whether the wallet counts as installed on iOS.
    pub installed_on_ios: bool,
    /// Whether the wallet counts as installed on Android.
    pub installed_on_android: bool,
    /// Hide the draggable launcher widget the surface shows while connected.
    pub hide_draggable_widget: bool,
    /// Skip the surface's onboarding screens.
    pub hide_wallet_onboard: bool,
    /// Cluster the wallet operates on.
    pub network: Network,
    /// Optional upper bound on the handshake, in milliseconds. `None` waits indefinitely.
    pub handshake_timeout_ms: Option<u32>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            title: String::new(),
            theme: Theme::System,
            installed_on_desktop: true,
            installed_on_ios: true,
            installed_on_android: true,
            hide_draggable_widget: false,
            hide_wallet_onboard: false,
            network: Network::Mainnet,
            handshake_timeout_ms: None,
        }
    }
}

/// Platform install flags, grouped for the readiness computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallFlags {
    /// See [`AdapterConfig::installed_on_desktop`].
    pub desktop: bool,
    /// See [`AdapterConfig::installed_on_ios`].
    pub ios: bool,
    /// See [`AdapterConfig::installed_on_android`].
    pub android: bool,
}

impl AdapterConfig {
    /// Returns the per-platform install flags.
    #[must_use]
    pub const fn install_flags(&self) -> InstallFlags {
        InstallFlags {
            desktop: self.installed_on_desktop,
            ios: self.installed_on_ios,
            android: self.installed_on_android,
        }
    }
}

/// Options accepted by wallet-standard registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOptions {
    /// See [`AdapterConfig::client_id`].
    pub client_id: String,
    /// See [`AdapterConfig::title`].
    pub title: String,
    /// See [`AdapterConfig::theme`].
    #[serde(default)]
    pub theme: Theme,
    /// RPC endpoint used by wallet-standard consumers that sign and send.
    pub rpc_url: String,
    /// See [`AdapterConfig::installed_on_desktop`].
    #[serde(default = "default_installed")]
    pub installed_on_desktop: bool,
    /// See [`AdapterConfig::installed_on_ios`].
    #[serde(default = "default_installed")]
    pub installed_on_ios: bool,
    /// See [`AdapterConfig::installed_on_android`].
    #[serde(default = "default_installed")]
    pub installed_on_android: bool,
    /// See [`AdapterConfig::network`].
    #[serde(default)]
    pub network: Network,
}

const fn default_installed() -> bool {
    true
}

impl RegistrationOptions {
    /// Builds the adapter configuration these options describe.
    #[must_use]
    pub fn to_adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            client_id: self.client_id.clone(),
            title: self.title.clone(),
            theme: self.theme,
            installed_on_desktop: self.installed_on_desktop,
            installed_on_ios: self.installed_on_ios,
            installed_on_android: self.installed_on_android,
            network: self.network,
            ..AdapterConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_config_from_camel_case_json() {
        let config: AdapterConfig = serde_json::from_str(
            r#"{"clientId":"abc","title":"Demo","theme":"dark","installedOnIos":false,"network":"devnet"}"#,
        )
        .unwrap();
        assert_eq!(config.client_id, "abc");
        assert_eq!(config.theme, Theme::Dark);
        assert!(!config.installed_on_ios);
        assert!(config.installed_on_android);
        assert_eq!(config.network, Network::Devnet);
        assert_eq!(config.handshake_timeout_ms, None);
    }

    #[test]
    fn test_enum_strings() {
        assert_eq!(Theme::from_str("light").unwrap(), Theme::Light);
        assert_eq!(BuildEnv::from_str("staging").unwrap(), BuildEnv::Staging);
        assert_eq!(Network::from_str("mainnet").unwrap(), Network::Mainnet);
        assert_eq!(Network::Devnet.to_string(), "devnet");
        assert_eq!(Network::Devnet.chain_id(), "solana:devnet");
        assert_eq!(Network::Mainnet.cluster(), "mainnet-beta");
    }

    #[test]
    fn test_registration_options_carry_into_config() {
        let options = RegistrationOptions {
            client_id: "client".to_string(),
            title: "Demo".to_string(),
            theme: Theme::Light,
            rpc_url: "https://rpc.example".to_string(),
            installed_on_desktop: false,
            installed_on_ios: true,
            installed_on_android: true,
            network: Network::Devnet,
        };
        let config = options.to_adapter_config();
        assert_eq!(config.client_id, "client");
        assert!(!config.installed_on_desktop);
        assert_eq!(config.network, Network::Devnet);
        assert!(!config.hide_draggable_widget);
    }
}
