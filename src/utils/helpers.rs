//! Helper functions and utilities
//!
//! Formatting helpers for reports.

/// Render a participant counter, e.g. `12/40` or `12/∞`
pub fn format_capacity(current: i32, max: Option<i32>) -> String {
    match max {
        Some(max) => format!("{}/{}", current, max),
        None => format!("{}/∞", current),
    }
}
