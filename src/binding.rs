use alloc::sync::Arc;
use core::fmt::{self, Debug, Formatter};

use crate::{
    any::{BindingKey, TypeInfo},
    bootstrapper::{Bootstrapper, BootstrapperId},
};

/// A discovered binding: the named bootstrapper will, when dispatched, make
/// the interface resolvable, optionally only for one target class.
///
/// Created by inspection, read-only afterward.
#[derive(Clone)]
pub struct BootstrapperBinding {
    key: BindingKey,
    bootstrapper: Arc<dyn Bootstrapper>,
}

impl BootstrapperBinding {
    #[inline]
    #[must_use]
    pub(crate) fn new(key: BindingKey, bootstrapper: Arc<dyn Bootstrapper>) -> Self {
        Self { key, bootstrapper }
    }

    #[inline]
    #[must_use]
    pub fn interface(&self) -> TypeInfo {
        self.key.interface
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<TypeInfo> {
        self.key.target
    }

    #[inline]
    #[must_use]
    pub fn is_targeted(&self) -> bool {
        self.key.is_targeted()
    }

    #[inline]
    #[must_use]
    pub fn bootstrapper(&self) -> &Arc<dyn Bootstrapper> {
        &self.bootstrapper
    }

    #[inline]
    #[must_use]
    pub(crate) fn key(&self) -> BindingKey {
        self.key
    }

    #[inline]
    #[must_use]
    pub(crate) fn bootstrapper_id(&self) -> BootstrapperId {
        BootstrapperId::of(&self.bootstrapper)
    }
}

impl Debug for BootstrapperBinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapperBinding")
            .field("interface", &self.key.interface.short_name())
            .field("target", &self.key.target.map(|target| target.short_name()))
            .field("bootstrapper", &self.bootstrapper.name())
            .finish()
    }
}
