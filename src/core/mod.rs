//! Core recipe logic — entry types, classification, templates, loading.

pub mod classifier;
pub mod recipe;
pub mod template;
pub mod types;
