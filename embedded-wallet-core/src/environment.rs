//! Runtime classification.
//!
//! The adapter behaves differently along four overlapping axes: the mobile operating system,
//! whether the page runs inside a WebView, whether it runs inside another app's in-app browser,
//! and whether it was launched as an installed PWA. The browser signals behind those axes cannot
//! change while a page is loaded, so they are read once into an [`EnvironmentSnapshot`] and
//! classified once into an [`EnvironmentProfile`] that the adapter carries for its lifetime.

/// Raw signals read from the host page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    /// `navigator.userAgent`, if the runtime exposes one.
    pub user_agent: Option<String>,
    /// Whether `(display-mode: standalone)` matches.
    pub display_mode_standalone: bool,
    /// iOS Safari's non-standard `navigator.standalone`.
    pub navigator_standalone: bool,
    /// Whether a browser `document` exists.
    pub has_document: bool,
    /// Full URL of the current page.
    pub page_url: Option<String>,
    /// `document.referrer`, if non-empty.
    pub referrer: Option<String>,
}

impl EnvironmentSnapshot {
    /// A snapshot of a runtime without any browser document, such as server-side rendering.
    #[must_use]
    pub fn headless() -> Self {
        Self::default()
    }

    /// A browser snapshot with the given user agent and page URL.
    #[must_use]
    pub fn browser(user_agent: &str, page_url: &str) -> Self {
        Self {
            user_agent: Some(user_agent.to_string()),
            has_document: true,
            page_url: Some(page_url.to_string()),
            ..Self::default()
        }
    }
}

const IOS_MARKERS: [&str; 3] = ["iphone", "ipad", "ipod"];

const IN_APP_BROWSER_MARKERS: [&str; 13] = [
    "fban",
    "fbav",
    "instagram",
    "line/",
    "twitter",
    "micromessenger",
    "snapchat",
    "tiktok",
    "bytedancewebview",
    "musical_ly",
    "linkedinapp",
    "kakaotalk",
    "telegram",
];

const WALLET_BROWSER_MARKERS: [&str; 9] = [
    "phantom",
    "solflare",
    "backpack",
    "trustwallet",
    "coinbasewallet",
    "okapp",
    "bitkeep",
    "tokenpocket",
    "exodus",
];

/// Classification of the runtime, computed once from an [`EnvironmentSnapshot`].
///
/// Every predicate is `false` when the snapshot carries no user agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct EnvironmentProfile {
    has_document: bool,
    mobile_android: bool,
    mobile_ios: bool,
    webview: bool,
    in_app_browser: bool,
    known_in_app_wallet_browser: bool,
    pwa: bool,
}

impl EnvironmentProfile {
    /// Classifies a snapshot.
    #[must_use]
    pub fn classify(snapshot: &EnvironmentSnapshot) -> Self {
        let Some(user_agent) = snapshot.user_agent.as_deref() else {
            return Self {
                has_document: snapshot.has_document,
                ..Self::default()
            };
        };
        let ua = user_agent.to_ascii_lowercase();

        let mobile_android = ua.contains("android");
        let mobile_ios = IOS_MARKERS.iter().any(|marker| ua.contains(marker));
        let webview = (mobile_android && ua.contains("; wv)"))
            || (mobile_ios && !ua.contains("safari"))
            || ua.contains("webview");
        let known_in_app_wallet_browser =
            WALLET_BROWSER_MARKERS.iter().any(|marker| ua.contains(marker));
        let social_in_app =
            IN_APP_BROWSER_MARKERS.iter().any(|marker| ua.contains(marker));

        Self {
            has_document: snapshot.has_document,
            mobile_android,
            mobile_ios,
            webview,
            in_app_browser: !known_in_app_wallet_browser && (social_in_app || webview),
            known_in_app_wallet_browser,
            pwa: snapshot.display_mode_standalone || snapshot.navigator_standalone,
        }
    }

    /// Whether a browser document exists.
    #[must_use]
    pub const fn has_document(&self) -> bool {
        self.has_document
    }

    /// Android phone or tablet.
    #[must_use]
    pub const fn is_mobile_android(&self) -> bool {
        self.mobile_android
    }

    /// iPhone, iPad or iPod.
    #[must_use]
    pub const fn is_mobile_ios(&self) -> bool {
        self.mobile_ios
    }

    /// Either mobile OS.
    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        self.mobile_android || self.mobile_ios
    }

    /// An embedded WebView rather than a full browser.
    #[must_use]
    pub const fn is_webview(&self) -> bool {
        self.webview
    }

    /// A third-party app's in-app browser (social apps, generic WebViews) other than a known
    /// wallet browser.
    #[must_use]
    pub const fn is_in_app_browser(&self) -> bool {
        self.in_app_browser
    }

    /// The in-app browser of a known Solana wallet app.
    #[must_use]
    pub const fn is_known_in_app_wallet_browser(&self) -> bool {
        self.known_in_app_wallet_browser
    }

    /// Launched as an installed progressive web app.
    #[must_use]
    pub const fn is_pwa(&self) -> bool {
        self.pwa
    }
}
