use alloc::{sync::Arc, vec::Vec};
use core::mem;
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::{
    any::{BindingKey, RcAny},
    binding::BootstrapperBinding,
    bootstrapper::Bootstrapper,
    container::Container,
    errors::ResolveErrorKind,
    registration::Registration,
};

/// Value handed back for a simulated resolution. Never a real instance.
struct Placeholder;

#[derive(Clone)]
struct RecordedBinding {
    key: BindingKey,
    bootstrapper: Arc<dyn Bootstrapper>,
}

/// Container stand-in used while simulating bootstrapper registration.
///
/// Binds are recorded with the bootstrapper they came from instead of being
/// installed; resolutions succeed against the recorded set and return a
/// placeholder. [`BindingInspector`](crate::BindingInspector) drives the
/// attempt lifecycle: each simulated pass mutates a working copy of the
/// record list, which replaces the committed list only when the pass
/// finishes without an unsatisfied resolution.
///
/// One instance serves exactly one inspection run.
#[derive(Default)]
pub struct InspectionContainer {
    state: Mutex<InspectionState>,
}

#[derive(Default)]
struct InspectionState {
    committed: Vec<RecordedBinding>,
    working: Vec<RecordedBinding>,
    current: Option<Arc<dyn Bootstrapper>>,
}

impl InspectionContainer {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a simulated pass for the given bootstrapper.
    pub(crate) fn begin(&self, bootstrapper: Arc<dyn Bootstrapper>) {
        let state = &mut *self.state.lock();
        state.working = state.committed.clone();
        state.current = Some(bootstrapper);
    }

    /// Makes the current pass's effects permanent.
    pub(crate) fn commit(&self) {
        let state = &mut *self.state.lock();
        state.committed = mem::take(&mut state.working);
        state.current = None;
    }

    /// Discards the current pass's effects.
    pub(crate) fn rollback(&self) {
        let state = &mut *self.state.lock();
        state.working.clear();
        state.current = None;
    }

    /// The bindings recorded by committed passes, in the order the binds
    /// took effect.
    #[must_use]
    pub fn bindings(&self) -> Vec<BootstrapperBinding> {
        self.state
            .lock()
            .committed
            .iter()
            .map(|recorded| BootstrapperBinding::new(recorded.key, Arc::clone(&recorded.bootstrapper)))
            .collect()
    }

    #[must_use]
    pub(crate) fn into_bindings(self) -> Vec<BootstrapperBinding> {
        self.state
            .into_inner()
            .committed
            .into_iter()
            .map(|recorded| BootstrapperBinding::new(recorded.key, recorded.bootstrapper))
            .collect()
    }
}

impl Container for InspectionContainer {
    fn bind_key(&self, key: BindingKey, _registration: Registration) {
        let state = &mut *self.state.lock();
        let bootstrapper = state
            .current
            .clone()
            .expect("a bind can only be recorded inside an inspection pass");

        // Last bind wins: a rebind replaces the earlier record for the slot.
        state.working.retain(|recorded| recorded.key != key);
        state.working.push(RecordedBinding { key, bootstrapper });
        debug!(interface = key.interface.name, targeted = key.is_targeted(), "Recorded bind");
    }

    fn unbind_key(&self, key: BindingKey) {
        let state = &mut *self.state.lock();
        state.working.retain(|recorded| recorded.key != key);
        debug!(interface = key.interface.name, targeted = key.is_targeted(), "Cleared recorded bind");
    }

    fn resolve_key(&self, key: BindingKey) -> Result<RcAny, ResolveErrorKind> {
        let state = &mut *self.state.lock();

        if state.working.iter().any(|recorded| recorded.key == key) {
            debug!(interface = key.interface.name, "Satisfied resolve");
            let value: RcAny = Arc::new(Placeholder);
            return Ok(value);
        }

        match key.target {
            Some(target) => {
                // A universal bind satisfies a targeted resolve. Re-scope the
                // record to where the consumer looked for it, so the deferred
                // factory is later installed under that same slot.
                if let Some(recorded) = state
                    .working
                    .iter_mut()
                    .find(|recorded| recorded.key.interface == key.interface && !recorded.key.is_targeted())
                {
                    recorded.key.target = Some(target);
                    debug!(interface = key.interface.name, "Satisfied targeted resolve from universal bind");
                    let value: RcAny = Arc::new(Placeholder);
                    return Ok(value);
                }

                let err = ResolveErrorKind::NotBound {
                    interface: key.interface,
                };
                debug!("{}", err);
                Err(err)
            }
            None => {
                // A targeted bind is invisible to universal consumers, and no
                // later pass can change that: fail hard instead of retrying.
                let err = if state.working.iter().any(|recorded| recorded.key.interface == key.interface) {
                    ResolveErrorKind::OnlyTargetedBound {
                        interface: key.interface,
                    }
                } else {
                    ResolveErrorKind::NotBound {
                        interface: key.interface,
                    }
                };
                error!("{}", err);
                Err(err)
            }
        }
    }
}
