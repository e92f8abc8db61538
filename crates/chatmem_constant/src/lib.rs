//! Shared constants for chatmem.

pub mod app;
pub mod defaults;
pub mod keys;
