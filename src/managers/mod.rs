// Dashboard state managers
// The registry owns service order; list models mirror it for front-ends.

pub mod service_list_model;
pub mod service_registry;
