//! `web-sys` implementations of the page interfaces.

use embedded_wallet_core::platform::{HostPage, PersistentStore};
use embedded_wallet_core::EnvironmentSnapshot;
use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlLinkElement, Storage, Url};

/// Reads the environment signals of the current page.
pub fn snapshot() -> EnvironmentSnapshot {
    let Some(window) = web_sys::window() else {
        return EnvironmentSnapshot::headless();
    };
    let document = window.document();
    let navigator = window.navigator();

    let display_mode_standalone = window
        .match_media("(display-mode: standalone)")
        .ok()
        .flatten()
        .is_some_and(|query| query.matches());
    // Non-standard, Safari only.
    let navigator_standalone = Reflect::get(&navigator, &JsValue::from_str("standalone"))
        .ok()
        .and_then(|value| value.as_bool())
        .unwrap_or(false);

    EnvironmentSnapshot {
        user_agent: navigator.user_agent().ok(),
        display_mode_standalone,
        navigator_standalone,
        has_document: document.is_some(),
        page_url: window.location().href().ok(),
        referrer: document
            .map(|document| document.referrer())
            .filter(|referrer| !referrer.is_empty()),
    }
}

/// `window.localStorage`. Every operation is a no-op where storage is unavailable.
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage is unavailable; the last account will not be remembered");
        }
        Self { storage }
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistentStore for LocalStorageStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage
            .as_ref()
            .and_then(|storage| storage.get_item(key).ok().flatten())
    }

    fn set_item(&self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            if storage.set_item(key, value).is_err() {
                log::warn!("failed to write {key} to localStorage");
            }
        }
    }

    fn remove_item(&self, key: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.remove_item(key);
        }
    }
}

/// The current document.
pub struct BrowserHost;

impl HostPage for BrowserHost {
    fn strip_query_params(&self, params: &[&str]) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(href) = window.location().href() else {
            return;
        };
        let Ok(url) = Url::new(&href) else {
            return;
        };

        let search = url.search_params();
        if !params.iter().any(|param| search.has(param)) {
            return;
        }
        // The search params are live: deleting from them rewrites `url`.
        for param in params {
            search.delete(param);
        }

        let replaced = window.history().and_then(|history| {
            history.replace_state_with_url(&JsValue::NULL, "", Some(&url.href()))
        });
        if let Err(err) = replaced {
            log::warn!("failed to update the page url: {err:?}");
        }
    }

    fn show_in_app_browser_notice(&self, message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    fn insert_prefetch_link(&self, url: &str) {
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            return;
        };
        let Some(head) = document.head() else {
            return;
        };
        let Ok(link) = document
            .create_element("link")
            .map(|element| element.unchecked_into::<HtmlLinkElement>())
        else {
            return;
        };
        link.set_rel("prefetch");
        link.set_href(url);
        if head.append_child(&link).is_err() {
            log::debug!("could not insert prefetch link for {url}");
        }
    }
}
