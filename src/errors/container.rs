use core::any::TypeId;

use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No binding registered for `{}`", interface.name)]
    NotBound { interface: TypeInfo },
    #[error(
        "`{}` is bound only for specific target classes. \
        A universal resolution can't see targeted bindings\
        ",
        interface.name,
    )]
    OnlyTargetedBound { interface: TypeInfo },
    #[error("Bound value for `{}` has an unexpected type. Actual: {:?}, expected: {:?}", interface.name, actual, interface.id)]
    IncorrectType { interface: TypeInfo, actual: TypeId },
    #[error(transparent)]
    Factory(anyhow::Error),
}
