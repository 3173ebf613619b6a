//! Utility functions for string formatting and manipulation.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_age, format_date, format_optional, ordinal, strip_html, truncate_string};
