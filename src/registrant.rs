use alloc::{collections::BTreeSet, sync::Arc};
use core::cell::RefCell;
use parking_lot::ReentrantMutex;
use tracing::{debug, info_span};

use crate::{
    binding::BootstrapperBinding,
    bootstrapper::BootstrapperId,
    container::Container,
    registration::{BoxedFactory, Registration},
};

/// Installs discovered bindings into the real container as deferred factories.
///
/// Each factory runs the owning bootstrapper's real registration logic on
/// first invocation, at most once per bootstrapper across all of its
/// bindings, then resolves the now-actually-bound value.
pub struct LazyBindingRegistrant {
    container: Arc<dyn Container>,
    /// Bootstrappers whose real registration logic has already run. The lock
    /// is reentrant: one resolution cascade may trigger nested deferred
    /// factories on the same thread, while a second thread has to wait so it
    /// can't observe a bootstrapper as undispatched mid-dispatch.
    dispatched: Arc<ReentrantMutex<RefCell<BTreeSet<BootstrapperId>>>>,
}

impl LazyBindingRegistrant {
    #[inline]
    #[must_use]
    pub fn new(container: Arc<dyn Container>) -> Self {
        Self {
            container,
            dispatched: Arc::new(ReentrantMutex::new(RefCell::new(BTreeSet::new()))),
        }
    }

    /// Installs one deferred factory per binding, under the binding's own
    /// slot.
    pub fn register_bindings(&self, bindings: &[BootstrapperBinding]) {
        for binding in bindings {
            let binding = binding.clone();
            let dispatched = Arc::clone(&self.dispatched);

            let factory_binding = binding.clone();
            let factory: BoxedFactory = Arc::new(move |container: &dyn Container| {
                let binding = &factory_binding;
                let span = info_span!("deferred_factory", interface = binding.interface().name);
                let _guard = span.enter();

                let state = dispatched.lock();

                // Remove this factory as the resolution path before running
                // the real registration logic, which may resolve the same
                // interface and would otherwise re-enter the factory.
                container.unbind_key(binding.key());

                let id = binding.bootstrapper_id();
                let already_dispatched = state.borrow().contains(&id);
                if !already_dispatched {
                    binding.bootstrapper().register_bindings(container)?;
                    // Only a bootstrapper that succeeded is marked, so a
                    // failed one is retried on the next resolution.
                    state.borrow_mut().insert(id);
                    debug!(bootstrapper = binding.bootstrapper().name(), "Dispatched");
                }

                container.resolve_key(binding.key()).map_err(anyhow::Error::from)
            });

            debug!(
                interface = binding.interface().name,
                bootstrapper = binding.bootstrapper().name(),
                "Registered deferred factory",
            );
            self.container.bind_key(binding.key(), Registration::erased_factory(factory));
        }
    }
}
