// Dashboard shared type definitions
// Each submodule defines types used across the crate.

pub mod errors;
pub mod event;
pub mod icon;
pub mod service;
pub mod settings;
