mod container;
mod inspection;

pub use container::ResolveErrorKind;
pub use inspection::{FailedResolution, ImpossibleBindingErrorKind};
