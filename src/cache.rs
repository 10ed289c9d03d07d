use alloc::vec::Vec;
use parking_lot::Mutex;
use tracing::debug;

use crate::binding::BootstrapperBinding;

/// Storage for a discovered binding list, consulted before re-running
/// inspection.
///
/// The list is opaque to the cache; keying (for example by bootstrapper-set
/// identity) is the caller's concern.
pub trait BindingCache: Send + Sync {
    /// The cached binding list, or `None` if nothing has been stored.
    fn get(&self) -> Option<Vec<BootstrapperBinding>>;

    fn set(&self, bindings: &[BootstrapperBinding]);
}

/// Process-local [`BindingCache`] backed by a mutex-held slot.
#[derive(Default)]
pub struct MemoryBindingCache {
    bindings: Mutex<Option<Vec<BootstrapperBinding>>>,
}

impl MemoryBindingCache {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BindingCache for MemoryBindingCache {
    fn get(&self) -> Option<Vec<BootstrapperBinding>> {
        let bindings = self.bindings.lock().clone();
        debug!(hit = bindings.is_some(), "Binding cache queried");
        bindings
    }

    fn set(&self, bindings: &[BootstrapperBinding]) {
        debug!(count = bindings.len(), "Binding cache updated");
        *self.bindings.lock() = Some(bindings.to_vec());
    }
}
