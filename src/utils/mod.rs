//! Utility modules.

pub mod text;

pub use text::{sanitize_unit_key, truncate_chars};
