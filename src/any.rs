use alloc::sync::Arc;
use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
};

/// Erased handle to a bound value.
///
/// Every value stored in a container is an [`RcAny`] wrapping an `Arc<I>`,
/// where `I` is the bound interface type.
pub type RcAny = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn short_name(&self) -> &'static str {
        self.name.rsplit_once("::").map_or(self.name, |(_, name)| name)
    }
}

/// Identity of a binding slot: an interface, optionally scoped to a target class.
///
/// A key with `target == None` is a universal binding, visible to any consumer
/// of the interface. A key with `target == Some(..)` is visible only to
/// consumers resolving while constructing that target class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BindingKey {
    pub interface: TypeInfo,
    pub target: Option<TypeInfo>,
}

impl BindingKey {
    #[inline]
    #[must_use]
    pub fn new(interface: TypeInfo, target: Option<TypeInfo>) -> Self {
        Self { interface, target }
    }

    #[inline]
    #[must_use]
    pub fn universal<I>() -> Self
    where
        I: ?Sized + 'static,
    {
        Self {
            interface: TypeInfo::of::<I>(),
            target: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn targeted<I, T>() -> Self
    where
        I: ?Sized + 'static,
        T: ?Sized + 'static,
    {
        Self {
            interface: TypeInfo::of::<I>(),
            target: Some(TypeInfo::of::<T>()),
        }
    }

    /// The universal slot for the same interface.
    #[inline]
    #[must_use]
    pub(crate) fn to_universal(self) -> Self {
        Self {
            interface: self.interface,
            target: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_targeted(&self) -> bool {
        self.target.is_some()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{BindingKey, TypeInfo};

    struct Foo;
    struct Bar;

    #[test]
    fn test_type_info_identity() {
        assert_eq!(TypeInfo::of::<Foo>(), TypeInfo::of::<Foo>());
        assert_ne!(TypeInfo::of::<Foo>(), TypeInfo::of::<Bar>());
        assert_eq!(TypeInfo::of::<Foo>().short_name(), "Foo");
    }

    #[test]
    fn test_binding_key_scoping() {
        let universal = BindingKey::universal::<Foo>();
        let targeted = BindingKey::targeted::<Foo, Bar>();

        assert!(!universal.is_targeted());
        assert!(targeted.is_targeted());
        assert_ne!(universal, targeted);
        assert_eq!(targeted.to_universal(), universal);
    }
}
