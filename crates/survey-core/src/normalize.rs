//! Name normalization used when matching imported names against stored ones.

/// Normalize a program name for comparison.
///
/// Lower-cases the input and keeps only ASCII letters and digits, so
/// `"Computer  Science!"` and `"computer science"` compare equal.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Trim a name, returning `None` when nothing is left.
pub fn trimmed(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|s| !s.is_empty())
}
