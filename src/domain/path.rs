//! Path splitting and joining.
//!
//! Paths carry no escaping. Empty segments produced by leading, trailing or
//! doubled separators are kept as literal empty names.

use itertools::Itertools;

/// Default segment separator.
pub const DEFAULT_SEPARATOR: char = '/';

/// Split a path into its segments.
///
/// `""` yields a single empty segment, the same as `"a//b"` yields
/// `["a", "", "b"]`.
pub fn split(path: &str, separator: char) -> impl Iterator<Item = &str> {
    path.split(separator)
}

/// Join segments into a path string.
pub fn join<I, S>(segments: I, separator: char) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .join(&separator.to_string())
}

/// Leading segment of a path (the type name in a registry path).
pub fn head(path: &str, separator: char) -> &str {
    path.split(separator).next().unwrap_or(path)
}
