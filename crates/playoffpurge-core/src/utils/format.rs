/// Compare two sheet values ignoring case and surrounding whitespace
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Normalize a key cell: `Current Week` -> `current_week`
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace(' ', "_")
}

/// Format fantasy points with two decimals
pub fn format_points(points: f64) -> String {
    format!("{:.2}", points)
}

/// Truncate a string to a maximum number of characters, adding a note with
/// the full length if anything was cut
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len).collect();
        format!("{}... (truncated, {} total bytes)", truncated, s.len())
    }
}
