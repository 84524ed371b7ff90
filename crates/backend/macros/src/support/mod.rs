//! Shared helpers for parsing derive input.

pub mod attrs;
pub mod utils;
