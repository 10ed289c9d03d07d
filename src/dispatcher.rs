use alloc::sync::Arc;
use tracing::{debug, info_span};

use crate::{
    bootstrapper::Bootstrapper,
    cache::BindingCache,
    container::Container,
    errors::ImpossibleBindingErrorKind,
    inspection::BindingInspector,
    registrant::LazyBindingRegistrant,
};

/// Top-level entry point: discovers bindings (or takes them from the cache)
/// and installs them into the real container as deferred factories.
///
/// After a dispatch, no bootstrapper has run for real yet; each one runs on
/// the first resolution of something it provides.
pub struct BindingInspectorDispatcher {
    cache: Option<Arc<dyn BindingCache>>,
    inspector: BindingInspector,
    registrant: LazyBindingRegistrant,
}

impl BindingInspectorDispatcher {
    /// Creates a dispatcher without caching: every dispatch re-runs
    /// inspection.
    #[inline]
    #[must_use]
    pub fn new(container: Arc<dyn Container>) -> Self {
        Self {
            cache: None,
            inspector: BindingInspector::new(),
            registrant: LazyBindingRegistrant::new(container),
        }
    }

    /// Creates a dispatcher that consults the cache before inspecting and
    /// stores what inspection discovers.
    #[inline]
    #[must_use]
    pub fn with_cache(container: Arc<dyn Container>, cache: Arc<dyn BindingCache>) -> Self {
        Self {
            cache: Some(cache),
            inspector: BindingInspector::new(),
            registrant: LazyBindingRegistrant::new(container),
        }
    }

    /// # Errors
    /// Returns [`ImpossibleBindingErrorKind`] if the bootstrapper set is not
    /// resolvable. Nothing is registered in that case.
    pub fn dispatch(&self, bootstrappers: &[Arc<dyn Bootstrapper>]) -> Result<(), ImpossibleBindingErrorKind> {
        let span = info_span!("dispatch", bootstrappers = bootstrappers.len());
        let _guard = span.enter();

        let bindings = match &self.cache {
            None => self.inspector.get_bindings(bootstrappers)?,
            Some(cache) => match cache.get() {
                Some(bindings) => {
                    debug!("Using cached bindings");
                    bindings
                }
                None => {
                    let bindings = self.inspector.get_bindings(bootstrappers)?;
                    cache.set(&bindings);
                    bindings
                }
            },
        };

        self.registrant.register_bindings(&bindings);
        Ok(())
    }
}
