#![no_std]

extern crate alloc;

pub(crate) mod any;
pub(crate) mod binding;
pub(crate) mod bootstrapper;
pub(crate) mod cache;
pub(crate) mod container;
pub(crate) mod dispatcher;
pub(crate) mod errors;
pub(crate) mod inspection;
pub(crate) mod registrant;
pub(crate) mod registration;

pub use any::{BindingKey, RcAny, TypeInfo};
pub use binding::BootstrapperBinding;
pub use bootstrapper::Bootstrapper;
pub use cache::{BindingCache, MemoryBindingCache};
pub use container::{Container, ContainerExt, RuntimeContainer, Targeted};
pub use dispatcher::BindingInspectorDispatcher;
pub use errors::{FailedResolution, ImpossibleBindingErrorKind, ResolveErrorKind};
pub use inspection::{BindingInspector, InspectionContainer};
pub use registrant::LazyBindingRegistrant;
pub use registration::Registration;
