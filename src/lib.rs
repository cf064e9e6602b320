//! Cradle — typed lifecycle entries for infrastructure recipes.
//!
//! Recipe fields that describe actions may be a command, a list of
//! commands, an inline script, or a map of named sub-events. Cradle
//! classifies them into one typed tree that execution logic can consume.

pub mod cli;
pub mod core;
