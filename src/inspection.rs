mod container;
mod inspector;

pub use container::InspectionContainer;
pub use inspector::BindingInspector;
