use alloc::{collections::BTreeMap, sync::Arc};
use core::any::Any;
use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    any::{BindingKey, RcAny, TypeInfo},
    errors::ResolveErrorKind,
    registration::{Registration, RegistrationKind},
};

/// The capability set bootstrappers register against.
///
/// Operations are erased and keyed by [`BindingKey`] so the trait stays
/// dyn-compatible; callers use the typed sugar in [`ContainerExt`].
pub trait Container: Send + Sync {
    fn bind_key(&self, key: BindingKey, registration: Registration);

    fn unbind_key(&self, key: BindingKey);

    /// # Errors
    /// Returns [`ResolveErrorKind`] if the key can't be resolved.
    fn resolve_key(&self, key: BindingKey) -> Result<RcAny, ResolveErrorKind>;
}

/// Typed sugar over the erased [`Container`] operations.
pub trait ContainerExt: Container {
    /// Binds an already-constructed value to the interface `I`.
    fn bind_instance<I>(&self, instance: Arc<I>)
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let value: RcAny = Arc::new(instance);
        self.bind_key(BindingKey::universal::<I>(), Registration::instance(value));
    }

    /// Binds a factory for `I` that is called on every resolution.
    fn bind_factory<I, F>(&self, factory: F)
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn Container) -> anyhow::Result<Arc<I>> + Send + Sync + 'static,
    {
        self.bind_key(BindingKey::universal::<I>(), Registration::factory(factory));
    }

    /// Binds a factory for `I` whose first provided value is cached and reused.
    fn bind_singleton<I, F>(&self, factory: F)
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn Container) -> anyhow::Result<Arc<I>> + Send + Sync + 'static,
    {
        self.bind_key(BindingKey::universal::<I>(), Registration::singleton(factory));
    }

    fn unbind<I>(&self)
    where
        I: ?Sized + 'static,
    {
        self.unbind_key(BindingKey::universal::<I>());
    }

    /// Resolves `I` and returns the erased value handle.
    ///
    /// During inspection the handle is a placeholder and must not be
    /// inspected further; use [`ContainerExt::get`] for real values.
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind`] if `I` can't be resolved.
    fn resolve<I>(&self) -> Result<RcAny, ResolveErrorKind>
    where
        I: ?Sized + 'static,
    {
        self.resolve_key(BindingKey::universal::<I>())
    }

    /// Resolves `I` and downcasts to the bound value.
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind`] if `I` can't be resolved or the bound
    /// value has an unexpected type.
    fn get<I>(&self) -> Result<Arc<I>, ResolveErrorKind>
    where
        I: ?Sized + 'static,
    {
        let value = self.resolve_key(BindingKey::universal::<I>())?;
        match value.downcast_ref::<Arc<I>>() {
            Some(dependency) => Ok(Arc::clone(dependency)),
            None => {
                let err = ResolveErrorKind::IncorrectType {
                    interface: TypeInfo::of::<I>(),
                    actual: (*value).type_id(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Runs the callback against a view of this container scoped to the
    /// target class `T`: binds and resolutions inside the callback are
    /// targeted to `T` instead of universal.
    ///
    /// The view borrows `self`, so the prior scope is restored however the
    /// callback exits. Nested calls keep the innermost target.
    fn for_target<T, R>(&self, callback: impl FnOnce(&Targeted<'_, Self>) -> R) -> R
    where
        T: ?Sized + 'static,
    {
        let targeted = Targeted {
            container: self,
            target: TypeInfo::of::<T>(),
        };
        callback(&targeted)
    }
}

impl<C> ContainerExt for C where C: Container + ?Sized {}

/// A container view whose binds and resolutions are scoped to one target class.
pub struct Targeted<'a, C: ?Sized> {
    container: &'a C,
    target: TypeInfo,
}

impl<C: ?Sized> Targeted<'_, C> {
    /// Keys built by the typed sugar are universal; scope them here. A key
    /// that already carries a target comes from a nested view and wins.
    #[inline]
    fn retarget(&self, key: BindingKey) -> BindingKey {
        match key.target {
            Some(_) => key,
            None => BindingKey::new(key.interface, Some(self.target)),
        }
    }
}

impl<C> Container for Targeted<'_, C>
where
    C: Container + ?Sized,
{
    #[inline]
    fn bind_key(&self, key: BindingKey, registration: Registration) {
        self.container.bind_key(self.retarget(key), registration);
    }

    #[inline]
    fn unbind_key(&self, key: BindingKey) {
        self.container.unbind_key(self.retarget(key));
    }

    #[inline]
    fn resolve_key(&self, key: BindingKey) -> Result<RcAny, ResolveErrorKind> {
        self.container.resolve_key(self.retarget(key))
    }
}

/// The production container: stores registrations and instantiates on
/// resolution.
///
/// A targeted resolution falls back to the universal binding for the same
/// interface; a universal resolution never sees targeted bindings.
#[derive(Clone, Default)]
pub struct RuntimeContainer {
    inner: Arc<RuntimeContainerInner>,
}

#[derive(Default)]
struct RuntimeContainerInner {
    bindings: Mutex<BTreeMap<BindingKey, Registration>>,
}

impl RuntimeContainer {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Container for RuntimeContainer {
    fn bind_key(&self, key: BindingKey, registration: Registration) {
        debug!(interface = key.interface.name, targeted = key.is_targeted(), "Bound");
        self.inner.bindings.lock().insert(key, registration);
    }

    fn unbind_key(&self, key: BindingKey) {
        debug!(interface = key.interface.name, targeted = key.is_targeted(), "Unbound");
        self.inner.bindings.lock().remove(&key);
    }

    fn resolve_key(&self, key: BindingKey) -> Result<RcAny, ResolveErrorKind> {
        let span = info_span!(
            "resolve",
            interface = key.interface.name,
            target = key.target.map_or("", |target| target.name),
        );
        let _guard = span.enter();

        // The slot lookup clones the registration out so the map lock is
        // never held across a factory call. Factories may bind and unbind.
        let (resolved_key, registration) = {
            let bindings = self.inner.bindings.lock();
            let entry = match bindings.get(&key) {
                Some(registration) => Some((key, registration)),
                None if key.is_targeted() => {
                    let universal = key.to_universal();
                    bindings.get(&universal).map(|registration| (universal, registration))
                }
                None => None,
            };

            match entry {
                Some((resolved_key, registration)) => (resolved_key, registration.clone()),
                None => {
                    let err = ResolveErrorKind::NotBound {
                        interface: key.interface,
                    };
                    error!("{}", err);
                    return Err(err);
                }
            }
        };

        match registration.kind {
            RegistrationKind::Instance(value) => Ok(value),
            RegistrationKind::Factory {
                factory,
                cache_provides,
                cached,
            } => {
                if let Some(value) = cached {
                    debug!("Found cached value");
                    return Ok(value);
                }

                match factory(self as &dyn Container) {
                    Ok(value) => {
                        if cache_provides {
                            let mut bindings = self.inner.bindings.lock();
                            if let Some(registration) = bindings.get_mut(&resolved_key) {
                                if let RegistrationKind::Factory {
                                    cache_provides: true,
                                    cached,
                                    ..
                                } = &mut registration.kind
                                {
                                    if cached.is_none() {
                                        *cached = Some(value.clone());
                                        debug!("Cached");
                                    }
                                }
                            }
                        }
                        Ok(value)
                    }
                    Err(err) => {
                        let err = ResolveErrorKind::Factory(err);
                        error!("{}", err);
                        Err(err)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::{format, string::{String, ToString}};

    use super::{ContainerExt as _, RuntimeContainer};
    use crate::errors::ResolveErrorKind;

    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicU8, Ordering};
    use tracing_test::traced_test;

    trait Greeter: Send + Sync {
        fn greeting(&self) -> &'static str;
    }

    struct EnglishGreeter;

    impl Greeter for EnglishGreeter {
        fn greeting(&self) -> &'static str {
            "hello"
        }
    }

    struct Config(u32);
    struct Pool(u32);
    struct Consumer;
    struct OtherConsumer;

    #[test]
    #[traced_test]
    fn test_bind_instance_and_get() {
        let container = RuntimeContainer::new();
        container.bind_instance::<Config>(Arc::new(Config(42)));

        assert_eq!(container.get::<Config>().unwrap().0, 42);
        assert!(matches!(
            container.get::<Pool>(),
            Err(ResolveErrorKind::NotBound { interface: _ }),
        ));
    }

    #[test]
    #[traced_test]
    fn test_bind_trait_object() {
        let container = RuntimeContainer::new();
        container.bind_instance::<dyn Greeter>(Arc::new(EnglishGreeter));

        let greeter = container.get::<dyn Greeter>().unwrap();
        assert_eq!(greeter.greeting(), "hello");
    }

    #[test]
    #[traced_test]
    fn test_factory_runs_on_every_resolution() {
        let call_count = Arc::new(AtomicU8::new(0));

        let container = RuntimeContainer::new();
        container.bind_factory::<Pool, _>({
            let call_count = call_count.clone();
            move |_| {
                call_count.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(Pool(4)))
            }
        });

        let _ = container.get::<Pool>().unwrap();
        let _ = container.get::<Pool>().unwrap();

        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[traced_test]
    fn test_singleton_factory_runs_once() {
        let call_count = Arc::new(AtomicU8::new(0));

        let container = RuntimeContainer::new();
        container.bind_singleton::<Pool, _>({
            let call_count = call_count.clone();
            move |_| {
                call_count.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(Pool(4)))
            }
        });

        let first = container.get::<Pool>().unwrap();
        let second = container.get::<Pool>().unwrap();

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    #[traced_test]
    fn test_factory_resolves_dependencies_from_container() {
        let container = RuntimeContainer::new();
        container.bind_instance::<Config>(Arc::new(Config(8)));
        container.bind_factory::<Pool, _>(|container| {
            let config = container.get::<Config>()?;
            Ok(Arc::new(Pool(config.0)))
        });

        assert_eq!(container.get::<Pool>().unwrap().0, 8);
    }

    #[test]
    #[traced_test]
    fn test_factory_error_propagates() {
        let container = RuntimeContainer::new();
        container.bind_factory::<Pool, _>(|_| Err(anyhow::anyhow!("connection refused")));

        assert!(matches!(container.get::<Pool>(), Err(ResolveErrorKind::Factory(_))));
    }

    #[test]
    #[traced_test]
    fn test_unbind() {
        let container = RuntimeContainer::new();
        container.bind_instance::<Config>(Arc::new(Config(1)));
        container.unbind::<Config>();

        assert!(container.get::<Config>().is_err());
    }

    #[test]
    #[traced_test]
    fn test_targeted_binding_visibility() {
        let container = RuntimeContainer::new();
        container.for_target::<Consumer, _>(|container| {
            container.bind_instance::<Config>(Arc::new(Config(7)));
        });

        // Visible while constructing the target class it was bound for.
        let config = container.for_target::<Consumer, _>(|container| container.get::<Config>());
        assert_eq!(config.unwrap().0, 7);

        // Invisible universally and for other target classes.
        assert!(container.get::<Config>().is_err());
        let other = container.for_target::<OtherConsumer, _>(|container| container.get::<Config>());
        assert!(other.is_err());
    }

    #[test]
    #[traced_test]
    fn test_targeted_resolution_falls_back_to_universal() {
        let container = RuntimeContainer::new();
        container.bind_instance::<Config>(Arc::new(Config(3)));

        let config = container.for_target::<Consumer, _>(|container| container.get::<Config>());
        assert_eq!(config.unwrap().0, 3);
    }

    #[test]
    #[traced_test]
    fn test_targeted_unbind_leaves_universal_binding() {
        let container = RuntimeContainer::new();
        container.bind_instance::<Config>(Arc::new(Config(5)));
        container.for_target::<Consumer, _>(|container| {
            container.bind_instance::<Config>(Arc::new(Config(6)));
            container.unbind::<Config>();
        });

        assert_eq!(container.get::<Config>().unwrap().0, 5);
    }

    #[test]
    #[traced_test]
    fn test_nested_for_target_keeps_innermost_target() {
        let container = RuntimeContainer::new();
        container.for_target::<Consumer, _>(|outer| {
            outer.for_target::<OtherConsumer, _>(|inner| {
                inner.bind_instance::<Config>(Arc::new(Config(9)));
            });
        });

        let config = container.for_target::<OtherConsumer, _>(|container| container.get::<Config>());
        assert_eq!(config.unwrap().0, 9);
        let outer = container.for_target::<Consumer, _>(|container| container.get::<Config>());
        assert!(outer.is_err());
    }
}
