//! Interfaces to the host page.
//!
//! The core never touches browser APIs directly. Page storage and the few page mutations the
//! adapter performs go through these traits; the wasm crate implements them with `web-sys`, and
//! [`crate::memory`] has in-memory versions for tests.

/// Durable, page-scoped key/value storage (`localStorage` in a browser).
pub trait PersistentStore {
    /// Reads the value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`. Storage failures (quota, private mode) are ignored.
    fn set_item(&self, key: &str, value: &str);

    /// Removes `key`.
    fn remove_item(&self, key: &str);
}

/// Page-level side effects the adapter needs.
pub trait HostPage {
    /// Removes the given query parameters from the address bar without navigating.
    fn strip_query_params(&self, params: &[&str]);

    /// Tells the user that this in-app browser cannot host the wallet and how to continue.
    fn show_in_app_browser_notice(&self, message: &str);

    /// Inserts a `<link rel="prefetch">` hint for `url` into the document head.
    ///
    /// Best effort: implementations silently do nothing when prefetch is unavailable.
    fn insert_prefetch_link(&self, url: &str);
}
