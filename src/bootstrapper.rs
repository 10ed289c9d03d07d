use alloc::sync::Arc;
use core::any::type_name;

use crate::container::Container;

/// A caller-supplied unit of registration logic.
///
/// A bootstrapper binds the interfaces it provides and may resolve interfaces
/// other bootstrappers provide. The same logic runs against an inspection
/// container during discovery and against the runtime container on first real
/// use, so it must not depend on which one it is given.
pub trait Bootstrapper: Send + Sync + 'static {
    /// # Errors
    /// Propagates any error raised while calling container operations.
    fn register_bindings(&self, container: &dyn Container) -> anyhow::Result<()>;

    #[must_use]
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

impl<F> Bootstrapper for F
where
    F: Fn(&dyn Container) -> anyhow::Result<()> + Send + Sync + 'static,
{
    #[inline]
    fn register_bindings(&self, container: &dyn Container) -> anyhow::Result<()> {
        self(container)
    }
}

/// Identity of one bootstrapper instance, keyed by its shared handle.
///
/// Pointer identity keeps two instances of the same bootstrapper type
/// distinct, and is stable across the binding list and any cache of it
/// because both hold clones of the same handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct BootstrapperId(usize);

impl BootstrapperId {
    #[inline]
    #[must_use]
    pub(crate) fn of(bootstrapper: &Arc<dyn Bootstrapper>) -> Self {
        Self(Arc::as_ptr(bootstrapper).cast::<()>() as usize)
    }
}
