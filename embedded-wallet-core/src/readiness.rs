use serde::Serialize;
use strum::Display;

use crate::config::InstallFlags;
use crate::environment::EnvironmentProfile;

/// Availability of the wallet as reported to wallet-selection interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum WalletReadyState {
    /// Usable immediately; selection UIs list it as installed.
    Installed,
    /// Usable after loading the embedded surface.
    Loadable,
    /// Cannot run here at all.
    Unsupported,
}

/// Computes the ready state for an environment and the configured install flags.
///
/// Outside a browser document the wallet is always `Unsupported`. Inside a known wallet app's
/// in-app browser the host wallet owns the injected provider, so the embedded wallet is only
/// offered as `Loadable`.
#[must_use]
pub const fn compute_ready_state(
    environment: &EnvironmentProfile,
    flags: InstallFlags,
) -> WalletReadyState {
    if !environment.has_document() {
        return WalletReadyState::Unsupported;
    }
    if environment.is_known_in_app_wallet_browser() {
        return WalletReadyState::Loadable;
    }

    let installed = if environment.is_mobile_android() {
        flags.android
    } else if environment.is_mobile_ios() {
        flags.ios
    } else {
        flags.desktop
    };

    if installed {
        WalletReadyState::Installed
    } else {
        WalletReadyState::Loadable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvironmentSnapshot;

    const ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36";
    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1";

    fn env(ua: &str) -> EnvironmentProfile {
        EnvironmentProfile::classify(&EnvironmentSnapshot::browser(ua, "https://dapp.example"))
    }

    const fn flags(desktop: bool, ios: bool, android: bool) -> InstallFlags {
        InstallFlags {
            desktop,
            ios,
            android,
        }
    }

    #[test]
    fn test_android_uses_android_flag() {
        assert_eq!(
            compute_ready_state(&env(ANDROID), flags(true, true, false)),
            WalletReadyState::Loadable
        );
        assert_eq!(
            compute_ready_state(&env(ANDROID), flags(false, false, true)),
            WalletReadyState::Installed
        );
    }

    #[test]
    fn test_ios_uses_ios_flag() {
        assert_eq!(
            compute_ready_state(&env(IPHONE), flags(true, false, true)),
            WalletReadyState::Loadable
        );
    }

    #[test]
    fn test_desktop_uses_desktop_flag() {
        let desktop = env("Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) Firefox/125.0");
        assert_eq!(
            compute_ready_state(&desktop, flags(true, false, false)),
            WalletReadyState::Installed
        );
    }

    #[test]
    fn test_ready_state_names() {
        for state in [
            WalletReadyState::Installed,
            WalletReadyState::Loadable,
            WalletReadyState::Unsupported,
        ] {
            let expected = match state {
                WalletReadyState::Installed => "Installed",
                WalletReadyState::Loadable => "Loadable",
                WalletReadyState::Unsupported => "Unsupported",
            };
            assert_eq!(state.to_string(), expected);
        }
    }

    #[test]
    fn test_headless_is_unsupported() {
        let headless = EnvironmentProfile::classify(&EnvironmentSnapshot::headless());
        assert_eq!(
            compute_ready_state(&headless, flags(true, true, true)),
            WalletReadyState::Unsupported
        );
    }
}
