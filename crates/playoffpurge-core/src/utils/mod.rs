//! Utility functions for string formatting and comparison.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{eq_ignore_case, format_points, normalize_key, truncate_string};
