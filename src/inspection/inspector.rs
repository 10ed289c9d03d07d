use alloc::{collections::VecDeque, sync::Arc, vec::Vec};
use tracing::{debug, error, info_span};

use super::container::InspectionContainer;
use crate::{
    binding::BootstrapperBinding,
    bootstrapper::Bootstrapper,
    errors::{FailedResolution, ImpossibleBindingErrorKind, ResolveErrorKind},
};

/// Discovers the bindings a set of bootstrappers would produce, without
/// running any real registration logic.
///
/// Bootstrappers are simulated one at a time against an
/// [`InspectionContainer`]. A pass that resolves an interface nobody has
/// bound yet is rolled back and requeued, since a later bootstrapper may
/// provide the bind; the retry budget bounds the reordering so a cyclical
/// set fails instead of looping.
#[derive(Default)]
pub struct BindingInspector;

impl BindingInspector {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns one binding per bind that took visible effect during
    /// simulation, ordered as the binds occurred across committed passes.
    /// The order is deterministic for a given bootstrapper sequence.
    ///
    /// # Errors
    /// Returns [`ImpossibleBindingErrorKind`] if no ordering of the set is
    /// resolvable, if a universal resolution can only be satisfied by a
    /// targeted binding, or if a bootstrapper fails during simulation.
    pub fn get_bindings(
        &self,
        bootstrappers: &[Arc<dyn Bootstrapper>],
    ) -> Result<Vec<BootstrapperBinding>, ImpossibleBindingErrorKind> {
        let span = info_span!("get_bindings", bootstrappers = bootstrappers.len());
        let _guard = span.enter();

        let container = InspectionContainer::new();
        let mut pending: VecDeque<Arc<dyn Bootstrapper>> = bootstrappers.iter().map(Arc::clone).collect();
        let mut budget = pending.len() * pending.len();
        let mut failures: Vec<FailedResolution> = Vec::new();

        while let Some(bootstrapper) = pending.pop_front() {
            container.begin(Arc::clone(&bootstrapper));
            match bootstrapper.register_bindings(&container) {
                Ok(()) => {
                    container.commit();
                    debug!(bootstrapper = bootstrapper.name(), "Pass committed");
                }
                Err(err) => {
                    container.rollback();
                    match err.downcast::<ResolveErrorKind>() {
                        Ok(ResolveErrorKind::NotBound { interface }) => {
                            debug!(
                                bootstrapper = bootstrapper.name(),
                                interface = interface.name,
                                "Pass requeued",
                            );

                            let failure = FailedResolution {
                                interface,
                                bootstrapper: bootstrapper.name(),
                            };
                            if !failures.contains(&failure) {
                                failures.push(failure);
                            }

                            budget -= 1;
                            if budget == 0 {
                                let err = ImpossibleBindingErrorKind::RetryBudgetExhausted { failures };
                                error!("{}", err);
                                return Err(err);
                            }
                            pending.push_back(bootstrapper);
                        }
                        Ok(ResolveErrorKind::OnlyTargetedBound { interface }) => {
                            let err = ImpossibleBindingErrorKind::TargetedOnly {
                                interface,
                                bootstrapper: bootstrapper.name(),
                            };
                            error!("{}", err);
                            return Err(err);
                        }
                        Ok(other) => {
                            let err = ImpossibleBindingErrorKind::Bootstrapper {
                                bootstrapper: bootstrapper.name(),
                                source: other.into(),
                            };
                            error!("{}", err);
                            return Err(err);
                        }
                        Err(source) => {
                            let err = ImpossibleBindingErrorKind::Bootstrapper {
                                bootstrapper: bootstrapper.name(),
                                source,
                            };
                            error!("{}", err);
                            return Err(err);
                        }
                    }
                }
            }
        }

        Ok(container.into_bindings())
    }
}
