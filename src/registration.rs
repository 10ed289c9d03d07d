use alloc::sync::Arc;

use crate::{any::RcAny, container::Container};

/// Erased binding factory. Receives the container it was installed in, so it
/// can resolve its own dependencies from it.
pub type BoxedFactory = Arc<dyn Fn(&dyn Container) -> anyhow::Result<RcAny> + Send + Sync>;

/// What a bind installs into a container slot.
///
/// The payload only matters to the runtime container. During inspection it is
/// recorded for attribution and then discarded.
#[derive(Clone)]
pub struct Registration {
    pub(crate) kind: RegistrationKind,
}

#[derive(Clone)]
pub(crate) enum RegistrationKind {
    Instance(RcAny),
    Factory {
        factory: BoxedFactory,
        cache_provides: bool,
        cached: Option<RcAny>,
    },
}

impl Registration {
    /// Binds an already-constructed value.
    #[inline]
    #[must_use]
    pub fn instance(value: RcAny) -> Self {
        Self {
            kind: RegistrationKind::Instance(value),
        }
    }

    /// Binds a factory that is called on every resolution.
    #[must_use]
    pub fn factory<I, F>(factory: F) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn Container) -> anyhow::Result<Arc<I>> + Send + Sync + 'static,
    {
        Self {
            kind: RegistrationKind::Factory {
                factory: boxed_factory(factory),
                cache_provides: false,
                cached: None,
            },
        }
    }

    /// Binds a factory whose first provided value is cached and reused.
    #[must_use]
    pub fn singleton<I, F>(factory: F) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn Container) -> anyhow::Result<Arc<I>> + Send + Sync + 'static,
    {
        Self {
            kind: RegistrationKind::Factory {
                factory: boxed_factory(factory),
                cache_provides: true,
                cached: None,
            },
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn erased_factory(factory: BoxedFactory) -> Self {
        Self {
            kind: RegistrationKind::Factory {
                factory,
                cache_provides: false,
                cached: None,
            },
        }
    }
}

#[must_use]
fn boxed_factory<I, F>(factory: F) -> BoxedFactory
where
    I: ?Sized + Send + Sync + 'static,
    F: Fn(&dyn Container) -> anyhow::Result<Arc<I>> + Send + Sync + 'static,
{
    Arc::new(move |container: &dyn Container| {
        factory(container).map(|dependency| {
            let value: RcAny = Arc::new(dependency);
            value
        })
    })
}
