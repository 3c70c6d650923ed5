//! Registry of live adapter instances.
//!
//! A page reload inside a single-page app, or a second registration of the wallet, must be able
//! to find the adapter that owns the current embedded surface and tear it down before a new one
//! takes over. Instances are kept per thread (the browser main thread in practice) under a fixed
//! instance-kind label.
//!
//! Single-writer discipline: only [`crate::standard::register_embedded_wallet`] and the
//! [`crate::standard::Unregister`] handle it returns write to the registry. Everything else
//! reads.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::standard::WalletDescriptor;

/// An adapter instance as seen by the registry.
pub trait RegisteredInstance {
    /// Removes the instance's embedded surface immediately.
    fn tear_down(&self);

    /// Describes the wallet to selection interfaces.
    fn descriptor(&self) -> WalletDescriptor;
}

thread_local! {
    static INSTANCES: RefCell<HashMap<&'static str, Rc<dyn RegisteredInstance>>> =
        RefCell::new(HashMap::new());
}

/// Returns the instance registered under `kind`.
#[must_use]
pub fn get(kind: &str) -> Option<Rc<dyn RegisteredInstance>> {
    INSTANCES.with(|instances| instances.borrow().get(kind).cloned())
}

/// Registers `instance` under `kind` and returns the instance it replaced.
pub fn set(
    kind: &'static str,
    instance: Rc<dyn RegisteredInstance>,
) -> Option<Rc<dyn RegisteredInstance>> {
    INSTANCES.with(|instances| instances.borrow_mut().insert(kind, instance))
}

/// Removes and returns the instance registered under `kind`.
pub fn clear(kind: &str) -> Option<Rc<dyn RegisteredInstance>> {
    INSTANCES.with(|instances| instances.borrow_mut().remove(kind))
}

/// Describes every registered instance.
#[must_use]
pub fn descriptors() -> Vec<WalletDescriptor> {
    INSTANCES.with(|instances| {
        let mut descriptors: Vec<_> = instances
            .borrow()
            .values()
            .map(|instance| instance.descriptor())
            .collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    })
}
