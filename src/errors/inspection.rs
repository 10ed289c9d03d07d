use alloc::vec::Vec;
use core::fmt::{self, Display, Formatter};

use crate::any::TypeInfo;

/// One resolution that could not be satisfied during an inspection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedResolution {
    pub interface: TypeInfo,
    pub bootstrapper: &'static str,
}

#[derive(thiserror::Error, Debug)]
pub enum ImpossibleBindingErrorKind {
    /// The retry budget ran out with bootstrappers still pending: no ordering
    /// of the set can satisfy every resolution before the bind that would
    /// provide it.
    RetryBudgetExhausted { failures: Vec<FailedResolution> },
    /// A universal resolution can only ever be satisfied by a targeted
    /// binding. This is a structural conflict, not an ordering problem.
    TargetedOnly {
        interface: TypeInfo,
        bootstrapper: &'static str,
    },
    /// A bootstrapper failed during simulation for a reason other than an
    /// unsatisfied resolution.
    Bootstrapper {
        bootstrapper: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Display for ImpossibleBindingErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryBudgetExhausted { failures } => {
                write!(f, "Cyclical or unsatisfiable bootstrapper set. Unresolved: ")?;
                for (index, failure) in failures.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "`{}` wanted by `{}`", failure.interface.name, failure.bootstrapper)?;
                }
                Ok(())
            }
            Self::TargetedOnly { interface, bootstrapper } => {
                write!(
                    f,
                    "`{}` is resolved universally by `{bootstrapper}` but is bound only for specific target classes",
                    interface.name,
                )
            }
            Self::Bootstrapper { bootstrapper, source } => {
                write!(f, "Bootstrapper `{bootstrapper}` failed during inspection: {source}")
            }
        }
    }
}
